//! Field-by-field validation of JSON request bodies.

use crate::error::{FieldError, LocSegment, ValidationError};
use crate::marker::Marker;
use crate::snapshot::Record;
use serde_json::{Map, Value};

/// Parses raw bytes into a JSON object, or fails with a body-level error.
pub(crate) fn parse_object(bytes: &[u8]) -> Result<Map<String, Value>, ValidationError> {
    let value: Value = serde_json::from_slice(bytes).map_err(|e| {
        ValidationError::single(FieldError::new(
            vec!["body".into()],
            format!("invalid JSON: {e}"),
            "value_error.jsondecode",
        ))
    })?;
    into_object(value)
}

/// Unwraps a JSON object, or fails with a body-level error.
pub(crate) fn into_object(value: Value) -> Result<Map<String, Value>, ValidationError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ValidationError::single(FieldError::new(
            vec!["body".into()],
            "value is not a valid dict",
            "type_error.dict",
        ))),
    }
}

/// Walks the fields of a request body and accumulates every problem found.
pub(crate) struct BodyValidator<'a> {
    body: &'a Map<String, Value>,
    errors: Vec<FieldError>,
}

impl<'a> BodyValidator<'a> {
    pub(crate) fn new(body: &'a Map<String, Value>) -> Self {
        Self {
            body,
            errors: Vec::new(),
        }
    }

    fn push(&mut self, loc: Vec<LocSegment>, msg: impl Into<String>, kind: &str) {
        self.errors.push(FieldError::new(loc, msg, kind));
    }

    fn loc(field: &str) -> Vec<LocSegment> {
        vec!["body".into(), field.into()]
    }

    /// Returns a field that must be present and non-null.
    pub(crate) fn required(&mut self, field: &str) -> Option<&'a Value> {
        match self.body.get(field) {
            Some(Value::Null) | None => {
                self.push(Self::loc(field), "field required", "value_error.missing");
                None
            }
            Some(value) => Some(value),
        }
    }

    /// Returns a field that may be absent; `null` counts as absent.
    pub(crate) fn optional(&self, field: &str) -> Option<&'a Value> {
        match self.body.get(field) {
            Some(Value::Null) | None => None,
            Some(value) => Some(value),
        }
    }

    /// Interprets a value as a list of records (JSON objects).
    pub(crate) fn records(&mut self, field: &str, value: &Value) -> Option<Vec<Record>> {
        let Value::Array(items) = value else {
            self.push(
                Self::loc(field),
                "value is not a valid list",
                "type_error.list",
            );
            return None;
        };

        let mut records = Vec::with_capacity(items.len());
        let mut valid = true;
        for (index, item) in items.iter().enumerate() {
            match item {
                Value::Object(map) => records.push(map.clone()),
                _ => {
                    valid = false;
                    self.push(
                        vec!["body".into(), field.into(), index.into()],
                        "value is not a valid dict",
                        "type_error.dict",
                    );
                }
            }
        }
        valid.then_some(records)
    }

    /// Interprets a value as a marker.
    pub(crate) fn marker(&mut self, field: &str, value: &Value) -> Option<Marker> {
        match Marker::from_json(value) {
            Ok(marker) => Some(marker),
            Err(e) => {
                self.push(Self::loc(field), e.to_string(), e.kind());
                None
            }
        }
    }

    /// Interprets a value as a string.
    pub(crate) fn string(&mut self, field: &str, value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            _ => {
                self.push(Self::loc(field), "str type expected", "type_error.str");
                None
            }
        }
    }

    /// Interprets a value as a boolean.
    pub(crate) fn boolean(&mut self, field: &str, value: &Value) -> Option<bool> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => {
                self.push(
                    Self::loc(field),
                    "value could not be parsed to a boolean",
                    "type_error.bool",
                );
                None
            }
        }
    }

    /// Records an enumeration mismatch.
    pub(crate) fn invalid_choice(&mut self, field: &str, permitted: &[&str]) {
        let choices = permitted
            .iter()
            .map(|p| format!("'{p}'"))
            .collect::<Vec<_>>()
            .join(", ");
        self.push(
            Self::loc(field),
            format!("value is not a valid enumeration member; permitted: {choices}"),
            "type_error.enum",
        );
    }

    /// Finishes validation, yielding the parsed value when no errors were found.
    pub(crate) fn finish<T>(self, parsed: Option<T>) -> Result<T, ValidationError> {
        if !self.errors.is_empty() {
            return Err(ValidationError {
                errors: self.errors,
            });
        }
        parsed.ok_or_else(|| {
            ValidationError::single(FieldError::new(
                vec!["body".into()],
                "incomplete request body",
                "value_error",
            ))
        })
    }
}
