//! Progress event bridge: tallies `image_saved` notifications.

use shared::protocol::WorkerEvent;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

use crate::worker::ItemEventSource;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressState {
    completed_count: u64,
    required_count: u32,
}

impl ProgressState {
    pub fn completed_count(&self) -> u64 {
        self.completed_count
    }

    pub fn required_count(&self) -> u32 {
        self.required_count
    }

    /// Not clamped: late notifications may push this past 100.
    pub fn percent(&self) -> f64 {
        if self.required_count == 0 {
            return 0.0;
        }
        self.completed_count as f64 * 100.0 / f64::from(self.required_count)
    }

    pub fn label(&self) -> String {
        format!("{}/{}", self.completed_count, self.required_count)
    }
}

/// Holds the one long-lived subscription to the worker's event stream.
///
/// The subscription survives across requests; resetting the count at the
/// start of a request is the caller's job.
pub struct ProgressBridge {
    subscription: Option<broadcast::Receiver<WorkerEvent>>,
    progress: ProgressState,
}

impl ProgressBridge {
    pub fn subscribe<S>(source: &S) -> Self
    where
        S: ItemEventSource + ?Sized,
    {
        Self {
            subscription: Some(source.subscribe_events()),
            progress: ProgressState::default(),
        }
    }

    pub fn progress(&self) -> ProgressState {
        self.progress
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn reset(&mut self) {
        self.progress.completed_count = 0;
    }

    pub fn start_request(&mut self, required_count: u32) {
        self.progress = ProgressState {
            completed_count: 0,
            required_count,
        };
    }

    pub fn record_completed(&mut self, items: u64) {
        self.progress.completed_count = self.progress.completed_count.saturating_add(items);
    }

    /// Waits for the next notification and counts it.
    ///
    /// Returns how many items were counted, or `None` once the stream has
    /// closed (after which this future never resolves again).
    pub async fn next_completion(&mut self) -> Option<u64> {
        let Some(subscription) = self.subscription.as_mut() else {
            return futures::future::pending().await;
        };
        let items = match subscription.recv().await {
            Ok(event) => match event {
                WorkerEvent::ImageSaved(_) => 1,
            },
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "progress subscription lagged; counting skipped notifications");
                skipped
            }
            Err(RecvError::Closed) => {
                debug!("worker event stream closed");
                self.subscription = None;
                return None;
            }
        };
        self.record_completed(items);
        Some(items)
    }

    /// Releases the subscription. Safe to call more than once; only the first call releases.
    pub fn unsubscribe(&mut self) {
        if self.subscription.take().is_some() {
            debug!("released worker event subscription");
        }
    }
}

impl Drop for ProgressBridge {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

#[cfg(test)]
mod tests {
    use shared::protocol::ImageSaved;

    use super::*;

    struct Source(broadcast::Sender<WorkerEvent>);

    impl ItemEventSource for Source {
        fn subscribe_events(&self) -> broadcast::Receiver<WorkerEvent> {
            self.0.subscribe()
        }
    }

    fn saved() -> WorkerEvent {
        WorkerEvent::ImageSaved(ImageSaved::now("t3_x.jpg"))
    }

    #[test]
    fn percent_and_label_follow_the_counts() {
        let mut progress = ProgressState::default();
        assert_eq!(progress.percent(), 0.0);
        assert_eq!(progress.label(), "0/0");

        progress.required_count = 5;
        progress.completed_count = 3;
        assert_eq!(progress.percent(), 60.0);
        assert_eq!(progress.label(), "3/5");
    }

    #[tokio::test]
    async fn each_notification_counts_once() {
        let (tx, _) = broadcast::channel(16);
        let source = Source(tx.clone());
        let mut bridge = ProgressBridge::subscribe(&source);
        bridge.start_request(5);

        for _ in 0..3 {
            tx.send(saved()).expect("send");
        }
        for _ in 0..3 {
            assert_eq!(bridge.next_completion().await, Some(1));
        }
        assert_eq!(bridge.progress().completed_count(), 3);
        assert_eq!(bridge.progress().label(), "3/5");

        bridge.reset();
        assert_eq!(bridge.progress().completed_count(), 0);
        assert_eq!(bridge.progress().required_count(), 5);
    }

    #[tokio::test]
    async fn lagged_notifications_are_still_counted() {
        let (tx, _) = broadcast::channel(2);
        let source = Source(tx.clone());
        let mut bridge = ProgressBridge::subscribe(&source);

        for _ in 0..5 {
            tx.send(saved()).expect("send");
        }
        let mut counted = 0;
        while counted < 5 {
            counted += bridge.next_completion().await.expect("open stream");
        }
        assert_eq!(bridge.progress().completed_count(), 5);
    }

    #[tokio::test]
    async fn closed_stream_and_unsubscribe_release_the_receiver() {
        let (tx, _) = broadcast::channel(4);
        let source = Source(tx.clone());
        let mut bridge = ProgressBridge::subscribe(&source);
        assert_eq!(tx.receiver_count(), 1);

        bridge.unsubscribe();
        bridge.unsubscribe();
        assert!(!bridge.is_subscribed());
        assert_eq!(tx.receiver_count(), 0);

        let mut dropped = ProgressBridge::subscribe(&source);
        drop(tx);
        drop(source);
        assert_eq!(dropped.next_completion().await, None);
        assert!(!dropped.is_subscribed());
    }
}
