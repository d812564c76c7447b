//! Error types for the sync server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tasksync_protocol::ValidationError;
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur in the sync server.
///
/// A stale update is not an error; see `SyncResponse::Stale`.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Request body failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No task in the stored snapshot has the given id.
    #[error("task {0} not found")]
    TaskNotFound(String),

    /// No route matches the request.
    #[error("Not Found")]
    NotFound,

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The request body exceeded the configured size limit.
    #[error("request body too large")]
    PayloadTooLarge,

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    /// Returns true if this is a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ServerError::Validation(_)
                | ServerError::TaskNotFound(_)
                | ServerError::NotFound
                | ServerError::Timeout
                | ServerError::PayloadTooLarge
        )
    }

    /// Returns true if this is a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        matches!(self, ServerError::Io(_))
    }

    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::TaskNotFound(_) | ServerError::NotFound => StatusCode::NOT_FOUND,
            ServerError::Timeout => StatusCode::REQUEST_TIMEOUT,
            ServerError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ServerError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            ServerError::Validation(err) => json!({ "detail": err.errors }),
            other => {
                if other.is_server_error() {
                    tracing::error!(error = %other, "request failed");
                }
                json!({ "detail": other.to_string() })
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use tasksync_protocol::FieldError;

    fn missing(field: &str) -> ValidationError {
        ValidationError::single(FieldError::new(
            vec!["body".into(), field.into()],
            "field required",
            "value_error.missing",
        ))
    }

    #[test]
    fn error_classification() {
        assert!(ServerError::from(missing("tasks")).is_client_error());
        assert!(ServerError::TaskNotFound("7".into()).is_client_error());
        assert!(ServerError::Timeout.is_client_error());
        assert!(ServerError::PayloadTooLarge.is_client_error());
        assert!(ServerError::from(io::Error::other("disk")).is_server_error());
        assert!(!ServerError::NotFound.is_server_error());
    }

    #[test]
    fn status_codes() {
        assert_eq!(
            ServerError::from(missing("tasks")).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ServerError::TaskNotFound("7".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServerError::Timeout.status_code(),
            StatusCode::REQUEST_TIMEOUT
        );
        assert_eq!(
            ServerError::PayloadTooLarge.status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            ServerError::from(io::Error::other("x")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn error_display() {
        let msg = ServerError::TaskNotFound("42".into()).to_string();
        assert_eq!(msg, "task 42 not found");
        assert!(ServerError::from(missing("projects"))
            .to_string()
            .contains("body.projects"));
    }
}
