use serde::Deserialize;
use thiserror::Error;

use crate::validation::{Limits, DEFAULT_MAX_BATCH_SIZE, DEFAULT_MAX_DIMENSION_PX};

/// Resolution of the host display, used to prefill the width/height fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DisplayResolution {
    pub width: u32,
    pub height: u32,
}

impl Default for DisplayResolution {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub max_batch_size: u32,
    pub max_dimension_px: u32,
    /// Used when the host display cannot be queried.
    pub fallback_display: DisplayResolution,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            max_dimension_px: DEFAULT_MAX_DIMENSION_PX,
            fallback_display: DisplayResolution::default(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max_batch_size must be at least 1")]
    ZeroBatchSize,
    #[error("max_dimension_px must be at least 1")]
    ZeroDimension,
}

impl ControllerConfig {
    pub fn limits(&self) -> Limits {
        Limits {
            max_batch_size: self.max_batch_size,
            max_dimension_px: self.max_dimension_px,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        if self.max_dimension_px == 0 {
            return Err(ConfigError::ZeroDimension);
        }
        Ok(())
    }

    /// Picks the display to prefill from, falling back when the host reports nothing usable.
    pub fn display_or_fallback(&self, detected: Option<DisplayResolution>) -> DisplayResolution {
        match detected {
            Some(display) if display.width > 0 && display.height > 0 => display,
            _ => self.fallback_display,
        }
    }
}
