//! Backend bridge: command queue types and the thread that owns the async runtime.

pub mod commands;
pub mod runtime;
