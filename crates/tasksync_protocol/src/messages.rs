//! Response messages.

use crate::marker::Marker;
use serde::{Deserialize, Serialize};

/// Outcome of `POST /api/sync`.
///
/// Both variants are successful responses; a stale update is an expected
/// outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncResponse {
    /// The snapshot replaced the stored one.
    Updated {
        /// The new stored marker.
        timestamp: Marker,
    },
    /// The snapshot was not newer than the stored one and was ignored.
    Stale {
        /// The stored marker, unchanged.
        current_timestamp: Marker,
    },
}

impl SyncResponse {
    /// Returns true if the update was accepted.
    pub fn is_updated(&self) -> bool {
        matches!(self, SyncResponse::Updated { .. })
    }

    /// Returns the marker the store holds after the request.
    pub fn marker(&self) -> &Marker {
        match self {
            SyncResponse::Updated { timestamp } => timestamp,
            SyncResponse::Stale { current_timestamp } => current_timestamp,
        }
    }
}

/// Body of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"`.
    pub status: String,
    /// Service name.
    pub app: String,
}

impl HealthResponse {
    /// Creates a healthy response for the named service.
    pub fn ok(app: impl Into<String>) -> Self {
        Self {
            status: "ok".into(),
            app: app.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sync_response_shapes() {
        let updated = SyncResponse::Updated {
            timestamp: Marker::Millis(10),
        };
        assert_eq!(
            serde_json::to_value(&updated).unwrap(),
            json!({"status": "updated", "timestamp": 10})
        );

        let stale = SyncResponse::Stale {
            current_timestamp: "2024-01-01T00:00:00.000Z".parse().unwrap(),
        };
        assert_eq!(
            serde_json::to_value(&stale).unwrap(),
            json!({"status": "stale", "current_timestamp": "2024-01-01T00:00:00.000Z"})
        );
        assert!(!stale.is_updated());
    }

    #[test]
    fn sync_response_decodes() {
        let resp: SyncResponse =
            serde_json::from_value(json!({"status": "stale", "current_timestamp": 5})).unwrap();
        assert_eq!(resp.marker(), &Marker::Millis(5));
    }

    #[test]
    fn health_shape() {
        assert_eq!(
            serde_json::to_value(HealthResponse::ok("tasksync")).unwrap(),
            json!({"status": "ok", "app": "tasksync"})
        );
    }
}
