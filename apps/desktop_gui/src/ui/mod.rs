//! UI layer for desktop GUI: the request panel that renders controller snapshots.

pub mod app;

pub use app::BackdropApp;
