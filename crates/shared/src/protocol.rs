use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const IMAGE_SAVED_EVENT: &str = "image_saved";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSaved {
    pub file_name: String,
    pub saved_at: DateTime<Utc>,
}

impl ImageSaved {
    pub fn now(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            saved_at: Utc::now(),
        }
    }
}

/// Notifications published by the background worker while a request runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum WorkerEvent {
    ImageSaved(ImageSaved),
}

impl WorkerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            WorkerEvent::ImageSaved(_) => IMAGE_SAVED_EVENT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_saved_serializes_under_its_event_name() {
        let event = WorkerEvent::ImageSaved(ImageSaved::now("t3_abc.jpg"));
        let value = serde_json::to_value(&event).expect("serialize");
        assert_eq!(value["type"], IMAGE_SAVED_EVENT);
        assert_eq!(value["payload"]["file_name"], "t3_abc.jpg");
        assert_eq!(event.name(), IMAGE_SAVED_EVENT);
    }
}
