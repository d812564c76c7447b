//! Error types for protocol parsing and validation.

use serde::Serialize;
use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ValidationError>;

/// Errors produced while interpreting a marker value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarkerError {
    /// The marker has a JSON type that cannot be ordered.
    #[error("timestamp must be an integer or an ISO-8601 string, got {0}")]
    WrongType(&'static str),

    /// A numeric marker that is not an integer number of milliseconds.
    #[error("numeric timestamp must be an integer number of milliseconds, got {0}")]
    NotInteger(String),

    /// An integer marker too large for `i64` milliseconds.
    #[error("timestamp {0} is out of range for milliseconds since the epoch")]
    OutOfRange(String),

    /// A string marker that is not a valid ISO-8601 date-time.
    #[error("invalid ISO-8601 timestamp: {0:?}")]
    Unparseable(String),
}

impl MarkerError {
    /// Returns the machine-readable error kind, shared by all variants.
    pub fn kind(&self) -> &'static str {
        "value_error.timestamp"
    }
}

/// One segment of the location of a field error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LocSegment {
    /// An object key.
    Field(String),
    /// A list index.
    Index(usize),
}

impl From<&str> for LocSegment {
    fn from(name: &str) -> Self {
        LocSegment::Field(name.to_string())
    }
}

impl From<usize> for LocSegment {
    fn from(index: usize) -> Self {
        LocSegment::Index(index)
    }
}

/// A single problem found in a request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Location of the offending value, starting at `"body"`.
    pub loc: Vec<LocSegment>,
    /// Human-readable description.
    pub msg: String,
    /// Machine-readable error kind, e.g. `value_error.missing`.
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldError {
    /// Creates a field error.
    pub fn new(loc: Vec<LocSegment>, msg: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            loc,
            msg: msg.into(),
            kind: kind.into(),
        }
    }

    /// Dotted path of the location, e.g. `body.tasks.2`.
    pub fn path(&self) -> String {
        self.loc
            .iter()
            .map(|seg| match seg {
                LocSegment::Field(name) => name.clone(),
                LocSegment::Index(i) => i.to_string(),
            })
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// A request body failed validation.
///
/// Carries every field-level problem found, not just the first.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid request body: {}", describe(.errors))]
pub struct ValidationError {
    /// All field errors, in discovery order.
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    /// Creates a validation error with a single field error.
    pub fn single(error: FieldError) -> Self {
        Self {
            errors: vec![error],
        }
    }

    /// Returns true if any error is located at the given top-level field.
    pub fn mentions(&self, field: &str) -> bool {
        self.errors
            .iter()
            .any(|e| matches!(e.loc.get(1), Some(LocSegment::Field(name)) if name == field))
    }
}

fn describe(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.path(), e.msg))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_error_path() {
        let err = FieldError::new(
            vec!["body".into(), "tasks".into(), 2usize.into()],
            "value is not a valid dict",
            "type_error.dict",
        );
        assert_eq!(err.path(), "body.tasks.2");
    }

    #[test]
    fn validation_error_display_lists_fields() {
        let err = ValidationError {
            errors: vec![
                FieldError::new(
                    vec!["body".into(), "projects".into()],
                    "field required",
                    "value_error.missing",
                ),
                FieldError::new(
                    vec!["body".into(), "timestamp".into()],
                    "field required",
                    "value_error.missing",
                ),
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("body.projects: field required"));
        assert!(msg.contains("body.timestamp"));
        assert!(err.mentions("projects"));
        assert!(!err.mentions("tasks"));
    }

    #[test]
    fn every_marker_error_has_one_kind() {
        let errors = [
            MarkerError::WrongType("null"),
            MarkerError::WrongType("boolean"),
            MarkerError::WrongType("object"),
            MarkerError::NotInteger("1.5".into()),
            MarkerError::OutOfRange("18446744073709551615".into()),
            MarkerError::Unparseable("yesterday".into()),
        ];
        for err in errors {
            assert_eq!(err.kind(), "value_error.timestamp", "{err}");
        }
    }

    #[test]
    fn field_error_serializes_with_type_key() {
        let err = FieldError::new(
            vec!["body".into(), "users".into(), 0usize.into()],
            "value is not a valid dict",
            "type_error.dict",
        );
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["loc"], serde_json::json!(["body", "users", 0]));
        assert_eq!(json["type"], "type_error.dict");
    }
}
