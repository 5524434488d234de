use std::{fmt, path::PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies one dispatched bulk request in logs on both sides of the worker seam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    BackgroundsCount,
    ImageWidth,
    ImageHeight,
    DownloadPath,
}

impl FieldName {
    pub const ALL: [FieldName; 4] = [
        FieldName::BackgroundsCount,
        FieldName::ImageWidth,
        FieldName::ImageHeight,
        FieldName::DownloadPath,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldName::BackgroundsCount => "backgrounds_count",
            FieldName::ImageWidth => "image_width",
            FieldName::ImageHeight => "image_height",
            FieldName::DownloadPath => "download_path",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FieldName::BackgroundsCount => "Backgrounds",
            FieldName::ImageWidth => "Width",
            FieldName::ImageHeight => "Height",
            FieldName::DownloadPath => "Download Path",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated request for `item_count` images of at least `width`x`height`
/// pixels, saved into `destination_path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkRequest {
    pub item_count: u32,
    pub width: u32,
    pub height: u32,
    pub destination_path: PathBuf,
}
