use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerErrorCode {
    DestinationMissing,
    Unauthorized,
    RateLimited,
    Listing,
    Download,
    Storage,
    Exhausted,
    Unavailable,
    Internal,
}

/// Failure reported by the bulk-fetch operation.
///
/// Displays as the bare message so it can be shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct WorkerFailure {
    pub code: WorkerErrorCode,
    pub message: String,
}

impl WorkerFailure {
    pub fn new(code: WorkerErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(WorkerErrorCode::Internal, message)
    }
}
