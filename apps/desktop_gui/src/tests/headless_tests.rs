use async_trait::async_trait;
use client_core::{BackgroundFetcher, ItemEventSource, MissingBackgroundWorker};
use shared::{
    domain::BulkRequest,
    error::WorkerFailure,
    protocol::{ImageSaved, WorkerEvent},
};
use tokio::sync::{broadcast, Mutex};

use super::*;

struct RecordingWorker {
    events: broadcast::Sender<WorkerEvent>,
    requests: Mutex<Vec<BulkRequest>>,
}

impl RecordingWorker {
    fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            events,
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl BackgroundFetcher for RecordingWorker {
    async fn retrieve_backgrounds(&self, request: BulkRequest) -> Result<(), WorkerFailure> {
        for index in 0..request.item_count {
            let _ = self
                .events
                .send(WorkerEvent::ImageSaved(ImageSaved::now(format!("t3_{index}.png"))));
        }
        self.requests.lock().await.push(request);
        Ok(())
    }
}

impl ItemEventSource for RecordingWorker {
    fn subscribe_events(&self) -> broadcast::Receiver<WorkerEvent> {
        self.events.subscribe()
    }
}

fn request(count: &str, path: &str) -> HeadlessRequest {
    HeadlessRequest {
        count: Some(count.to_string()),
        width: None,
        height: None,
        path: Some(path.to_string()),
    }
}

#[tokio::test]
async fn valid_arguments_reach_the_worker_with_display_defaults() {
    let worker = Arc::new(RecordingWorker::new());
    let display = DisplayResolution {
        width: 2560,
        height: 1440,
    };

    run_with_worker(
        &Settings::default(),
        request("3", "/tmp/backdrop"),
        Some(display),
        worker.clone(),
    )
    .await
    .expect("headless run");

    let calls = worker.requests.lock().await.clone();
    assert_eq!(
        calls,
        vec![BulkRequest {
            item_count: 3,
            width: 2560,
            height: 1440,
            destination_path: "/tmp/backdrop".into(),
        }]
    );
}

#[tokio::test]
async fn invalid_arguments_list_every_field_error() {
    let worker = Arc::new(RecordingWorker::new());
    let mut args = request("500", "  ");
    args.width = Some("wide".to_string());

    let err = run_with_worker(&Settings::default(), args, None, worker.clone())
        .await
        .expect_err("rejected");

    let message = err.to_string();
    assert!(message.starts_with("Form is invalid"));
    assert!(message.contains("Backgrounds: At most 50 can be retrieved at one time"));
    assert!(message.contains("Width:"));
    assert!(message.contains("Download Path:"));
    assert!(!message.contains("Height:"));
    assert!(worker.requests.lock().await.is_empty());
}

#[tokio::test]
async fn worker_failure_is_reported() {
    let worker = Arc::new(MissingBackgroundWorker::new("offline"));

    let err = run_with_worker(&Settings::default(), request("1", "/tmp"), None, worker)
        .await
        .expect_err("worker unavailable");

    assert_eq!(
        err.to_string(),
        "request failed: Background worker unavailable: offline"
    );
}
