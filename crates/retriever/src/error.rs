use std::path::PathBuf;

use reqwest::StatusCode;
use shared::error::{WorkerErrorCode, WorkerFailure};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RetrieverError {
    #[error("Download path '{}' does not exist", .0.display())]
    DestinationMissing(PathBuf),
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("rate limited by {url}: got {status}")]
    RateLimited { url: String, status: StatusCode },
    #[error("oauth token request rejected: got {status}")]
    Unauthorized { status: StatusCode },
    #[error("request to {url} returned status {status}: {body}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },
    #[error("failed to parse response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid url '{url}': {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("unknown file type for image with url: {0}")]
    UnknownImageType(String),
    #[error("failed to write '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("listing ran out of matching images after saving {saved} of {requested}")]
    ListingExhausted { saved: u32, requested: u32 },
    #[error("gave up after {secs}s with {saved} of {requested} images saved")]
    TimeBudgetExhausted { secs: u64, saved: u32, requested: u32 },
}

impl RetrieverError {
    pub fn code(&self) -> WorkerErrorCode {
        match self {
            RetrieverError::DestinationMissing(_) => WorkerErrorCode::DestinationMissing,
            RetrieverError::Unauthorized { .. } => WorkerErrorCode::Unauthorized,
            RetrieverError::RateLimited { .. } => WorkerErrorCode::RateLimited,
            RetrieverError::Http { .. }
            | RetrieverError::Status { .. }
            | RetrieverError::Decode { .. }
            | RetrieverError::Url { .. } => WorkerErrorCode::Listing,
            RetrieverError::UnknownImageType(_) => WorkerErrorCode::Download,
            RetrieverError::Io { .. } => WorkerErrorCode::Storage,
            RetrieverError::ListingExhausted { .. } | RetrieverError::TimeBudgetExhausted { .. } => {
                WorkerErrorCode::Exhausted
            }
            RetrieverError::Client(_) => WorkerErrorCode::Internal,
        }
    }
}

impl From<RetrieverError> for WorkerFailure {
    fn from(value: RetrieverError) -> Self {
        WorkerFailure::new(value.code(), value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_keeps_the_user_facing_message() {
        let failure: WorkerFailure =
            RetrieverError::DestinationMissing(PathBuf::from("/nope")).into();
        assert_eq!(failure.code, WorkerErrorCode::DestinationMissing);
        assert_eq!(failure.message, "Download path '/nope' does not exist");
    }

    #[test]
    fn exhaustion_maps_to_its_own_code() {
        let err = RetrieverError::TimeBudgetExhausted {
            secs: 30,
            saved: 2,
            requested: 5,
        };
        assert_eq!(err.code(), WorkerErrorCode::Exhausted);
        assert_eq!(
            err.to_string(),
            "gave up after 30s with 2 of 5 images saved"
        );
    }
}
