//! Field validators for the bulk request form.
//!
//! Every function here is pure: the same input always yields the same
//! verdict, so callers may re-run them as often as they like.

use shared::domain::FieldName;
use thiserror::Error;

pub const DEFAULT_MAX_BATCH_SIZE: u32 = 50;
/// 8K in both dimensions.
pub const DEFAULT_MAX_DIMENSION_PX: u32 = 7680;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_batch_size: u32,
    pub max_dimension_px: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            max_dimension_px: DEFAULT_MAX_DIMENSION_PX,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{}", missing_value_message(.0))]
    MissingValue(FieldName),
    #[error("At most {max} can be retrieved at one time")]
    TooMany { max: u32 },
    #[error("At least 1 background must be retrieved")]
    TooFew,
    #[error("Maximum size of backgrounds that can be retrieved is {max}px in both dimensions")]
    OutOfRange { max: u32 },
    #[error("Only whole numbers are accepted")]
    NotInteger,
    #[error("'{0}' is not a number")]
    NotANumber(String),
}

fn missing_value_message(field: &FieldName) -> &'static str {
    match field {
        FieldName::BackgroundsCount => {
            "The number of backgrounds you wish to retrieve must be specified"
        }
        FieldName::ImageWidth | FieldName::ImageHeight => {
            "Both background width and height must be specified"
        }
        FieldName::DownloadPath => {
            "The directory path to which to save the backgrounds to must be specified"
        }
    }
}

/// Validates raw field input. Receives the untrimmed text as typed.
pub type Validator = fn(&str, &Limits) -> Result<(), ValidationError>;

/// Parses numeric text input. Blank input is "unset".
pub fn parse_number(raw: &str) -> Result<Option<f64>, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(ValidationError::NotANumber(trimmed.to_string())),
    }
}

pub fn validate_count(count: Option<f64>, limits: &Limits) -> Result<(), ValidationError> {
    let Some(count) = count.filter(|count| *count != 0.0) else {
        return Err(ValidationError::MissingValue(FieldName::BackgroundsCount));
    };
    if count > f64::from(limits.max_batch_size) {
        return Err(ValidationError::TooMany {
            max: limits.max_batch_size,
        });
    }
    if count < 1.0 {
        return Err(ValidationError::TooFew);
    }
    if count.fract() != 0.0 {
        return Err(ValidationError::NotInteger);
    }
    Ok(())
}

/// `field` names the dimension being checked, for the missing-value error.
pub fn validate_dimension(
    field: FieldName,
    px: Option<f64>,
    limits: &Limits,
) -> Result<(), ValidationError> {
    // Zero counts as unset, same as a blank field.
    let Some(px) = px.filter(|px| *px != 0.0) else {
        return Err(ValidationError::MissingValue(field));
    };
    if px < 1.0 || px > f64::from(limits.max_dimension_px) {
        return Err(ValidationError::OutOfRange {
            max: limits.max_dimension_px,
        });
    }
    if px.fract() != 0.0 {
        return Err(ValidationError::NotInteger);
    }
    Ok(())
}

pub fn validate_path(path: &str) -> Result<(), ValidationError> {
    if path.trim().is_empty() {
        return Err(ValidationError::MissingValue(FieldName::DownloadPath));
    }
    Ok(())
}

pub fn count_input(raw: &str, limits: &Limits) -> Result<(), ValidationError> {
    validate_count(parse_number(raw)?, limits)
}

pub fn width_input(raw: &str, limits: &Limits) -> Result<(), ValidationError> {
    validate_dimension(FieldName::ImageWidth, parse_number(raw)?, limits)
}

pub fn height_input(raw: &str, limits: &Limits) -> Result<(), ValidationError> {
    validate_dimension(FieldName::ImageHeight, parse_number(raw)?, limits)
}

pub fn path_input(raw: &str, _limits: &Limits) -> Result<(), ValidationError> {
    validate_path(raw)
}

pub fn validator_for(field: FieldName) -> Validator {
    match field {
        FieldName::BackgroundsCount => count_input,
        FieldName::ImageWidth => width_input,
        FieldName::ImageHeight => height_input,
        FieldName::DownloadPath => path_input,
    }
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
