//! Contracts the controller consumes from the background worker.

use async_trait::async_trait;
use shared::{
    domain::BulkRequest,
    error::{WorkerErrorCode, WorkerFailure},
    protocol::WorkerEvent,
};
use tokio::sync::broadcast;

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[async_trait]
pub trait BackgroundFetcher: Send + Sync {
    /// Retrieves and saves the whole batch. Resolves once, after the last
    /// `image_saved` event for this request has been published.
    async fn retrieve_backgrounds(&self, request: BulkRequest) -> Result<(), WorkerFailure>;
}

pub trait ItemEventSource: Send + Sync {
    fn subscribe_events(&self) -> broadcast::Receiver<WorkerEvent>;
}

pub trait BackgroundWorker: BackgroundFetcher + ItemEventSource {}

impl<T: BackgroundFetcher + ItemEventSource> BackgroundWorker for T {}

/// Stands in when the real worker could not be constructed; every request fails with `reason`.
pub struct MissingBackgroundWorker {
    reason: String,
    events: broadcast::Sender<WorkerEvent>,
}

impl MissingBackgroundWorker {
    pub fn new(reason: impl Into<String>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            reason: reason.into(),
            events,
        }
    }
}

#[async_trait]
impl BackgroundFetcher for MissingBackgroundWorker {
    async fn retrieve_backgrounds(&self, _request: BulkRequest) -> Result<(), WorkerFailure> {
        Err(WorkerFailure::new(
            WorkerErrorCode::Unavailable,
            format!("Background worker unavailable: {}", self.reason),
        ))
    }
}

impl ItemEventSource for MissingBackgroundWorker {
    fn subscribe_events(&self) -> broadcast::Receiver<WorkerEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_worker_fails_every_request_with_its_reason() {
        let worker = MissingBackgroundWorker::new("retriever config is invalid");
        let _events = worker.subscribe_events();
        let failure = worker
            .retrieve_backgrounds(BulkRequest {
                item_count: 1,
                width: 10,
                height: 10,
                destination_path: "/tmp".into(),
            })
            .await
            .expect_err("always fails");
        assert_eq!(failure.code, WorkerErrorCode::Unavailable);
        assert_eq!(
            failure.to_string(),
            "Background worker unavailable: retriever config is invalid"
        );
    }
}
