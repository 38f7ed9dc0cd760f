//! Shared validation helpers for inbound HTTP adapters.

use serde_json::json;

use crate::domain::{Error, NoteId};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidInteger,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidInteger => "invalid_integer",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

pub(crate) const ID_FIELD: FieldName = FieldName::new("id");
pub(crate) const IMAGE_FIELD: FieldName = FieldName::new("image");

/// Builder for validation errors with field context.
struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName, message: &str) -> Error {
    ValidationError::new(field.as_str(), message).with_code(ErrorCode::MissingField)
}

pub(crate) fn missing_image_error() -> Error {
    missing_field_error(IMAGE_FIELD, "No image file provided")
}

/// Parse the `id` form field.
///
/// An absent or empty value is "Note ID required"; anything that is not an
/// integer is "Invalid note ID".
pub(crate) fn parse_note_id(value: Option<&str>) -> Result<NoteId, Error> {
    let value = match value {
        Some(value) if !value.is_empty() => value,
        _ => return Err(missing_field_error(ID_FIELD, "Note ID required")),
    };
    value.parse().map_err(|_| {
        ValidationError::new(ID_FIELD.as_str(), "Invalid note ID")
            .with_value(ErrorCode::InvalidInteger, value)
    })
}
