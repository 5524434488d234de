//! Backend commands queued from UI to backend worker.

use client_core::DisplayResolution;
use shared::domain::FieldName;

pub enum BackendCommand {
    /// Sent once, after the first frame reports the monitor size.
    Start {
        display: Option<DisplayResolution>,
    },
    SetField {
        name: FieldName,
        value: String,
    },
    Submit,
    Dismiss,
    Shutdown,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Start { .. } => "start",
            BackendCommand::SetField { .. } => "set_field",
            BackendCommand::Submit => "submit",
            BackendCommand::Dismiss => "dismiss",
            BackendCommand::Shutdown => "shutdown",
        }
    }
}
