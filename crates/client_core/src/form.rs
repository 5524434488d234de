//! Form state store: the four request fields and their validity.

use std::{collections::BTreeMap, fmt};

use shared::domain::{BulkRequest, FieldName};
use thiserror::Error;

use crate::{
    config::DisplayResolution,
    validation::{parse_number, validator_for, Limits, ValidationError, Validator},
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("Form is invalid")]
    Invalid,
}

#[derive(Clone)]
pub struct Field {
    name: FieldName,
    value: String,
    error: Option<ValidationError>,
    validator: Validator,
}

impl Field {
    fn new(name: FieldName, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
            error: None,
            validator: validator_for(name),
        }
    }

    pub fn name(&self) -> FieldName {
        self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// A field that has never been validated reports valid, so untouched
    /// inputs are not flagged before the user interacts or submits.
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    pub fn error(&self) -> Option<&ValidationError> {
        self.error.as_ref()
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    fn check(&self, limits: &Limits) -> Result<(), ValidationError> {
        (self.validator)(&self.value, limits)
    }

    fn revalidate(&mut self, limits: &Limits) -> bool {
        self.error = self.check(limits).err();
        self.error.is_none()
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("value", &self.value)
            .field("error", &self.error)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Form {
    fields: BTreeMap<FieldName, Field>,
    limits: Limits,
}

impl Form {
    /// Count starts unset and the path empty; both are invalid until filled in.
    pub fn with_defaults(limits: Limits, display: DisplayResolution) -> Self {
        let fields = [
            Field::new(FieldName::BackgroundsCount, ""),
            Field::new(FieldName::ImageWidth, display.width.to_string()),
            Field::new(FieldName::ImageHeight, display.height.to_string()),
            Field::new(FieldName::DownloadPath, ""),
        ]
        .into_iter()
        .map(|field| (field.name, field))
        .collect();

        Self { fields, limits }
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    pub fn field(&self, name: FieldName) -> &Field {
        // Every FieldName is inserted by `with_defaults` and never removed.
        &self.fields[&name]
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.values()
    }

    pub fn set_field_value(&mut self, name: FieldName, value: impl Into<String>) -> bool {
        let limits = self.limits;
        let field = self.field_mut(name);
        field.value = value.into();
        field.revalidate(&limits)
    }

    /// Re-runs every validator, including ones for fields never touched.
    pub fn validate_all(&mut self) -> bool {
        let limits = self.limits;
        self.fields
            .values_mut()
            .fold(true, |valid, field| field.revalidate(&limits) && valid)
    }

    pub fn is_valid(&self) -> bool {
        self.fields.values().all(Field::is_valid)
    }

    /// Builds the request from the current values.
    ///
    /// Every field is checked against its validator here, whether or not it
    /// was validated before; any failure yields [`FormError::Invalid`].
    pub fn to_request(&self) -> Result<BulkRequest, FormError> {
        let limits = self.limits;
        if !self.fields.values().all(|field| field.check(&limits).is_ok()) {
            return Err(FormError::Invalid);
        }
        Ok(BulkRequest {
            item_count: self.whole_number(FieldName::BackgroundsCount)?,
            width: self.whole_number(FieldName::ImageWidth)?,
            height: self.whole_number(FieldName::ImageHeight)?,
            destination_path: self.field(FieldName::DownloadPath).value.trim().into(),
        })
    }

    fn whole_number(&self, name: FieldName) -> Result<u32, FormError> {
        let value = parse_number(&self.field(name).value)
            .ok()
            .flatten()
            .ok_or(FormError::Invalid)?
            .trunc();
        if value < 1.0 || value > f64::from(u32::MAX) {
            return Err(FormError::Invalid);
        }
        Ok(value as u32)
    }

    fn field_mut(&mut self, name: FieldName) -> &mut Field {
        self.fields
            .entry(name)
            .or_insert_with(|| Field::new(name, ""))
    }
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
