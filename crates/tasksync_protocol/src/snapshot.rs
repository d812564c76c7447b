//! Snapshots and the sync request that carries them.

use crate::error::ProtocolResult;
use crate::marker::Marker;
use crate::validate::{into_object, parse_object, BodyValidator};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An opaque structured record (project, task or user).
pub type Record = Map<String, Value>;

/// Full point-in-time copy of the shared state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Projects, in client order.
    pub projects: Vec<Record>,
    /// Tasks, in client order.
    pub tasks: Vec<Record>,
    /// Users, in client order.
    #[serde(default)]
    pub users: Vec<Record>,
    /// Marker of the update that produced this snapshot.
    #[serde(rename = "timestamp")]
    pub marker: Marker,
}

impl Snapshot {
    /// Creates an empty snapshot at the given marker.
    pub fn empty(marker: Marker) -> Self {
        Self {
            projects: Vec::new(),
            tasks: Vec::new(),
            users: Vec::new(),
            marker,
        }
    }

    /// Returns true if the snapshot holds no records at all.
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty() && self.tasks.is_empty() && self.users.is_empty()
    }
}

/// A client's request to replace the shared snapshot.
///
/// Body: `{"projects": [...], "tasks": [...], "users"?: [...], "timestamp": <marker>}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncRequest {
    /// Projects to store.
    pub projects: Vec<Record>,
    /// Tasks to store.
    pub tasks: Vec<Record>,
    /// Users to store; only a non-empty list replaces the stored users.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<Record>>,
    /// Marker of the client snapshot.
    pub timestamp: Marker,
}

impl SyncRequest {
    /// Creates a request without users.
    pub fn new(projects: Vec<Record>, tasks: Vec<Record>, timestamp: Marker) -> Self {
        Self {
            projects,
            tasks,
            users: None,
            timestamp,
        }
    }

    /// Sets the users collection.
    pub fn with_users(mut self, users: Vec<Record>) -> Self {
        self.users = Some(users);
        self
    }

    /// Returns the users that should replace the stored ones, if any.
    pub fn replacement_users(&self) -> Option<&[Record]> {
        self.users.as_deref().filter(|users| !users.is_empty())
    }

    /// Parses and validates a raw JSON body.
    pub fn from_json(bytes: &[u8]) -> ProtocolResult<Self> {
        Self::from_object(&parse_object(bytes)?)
    }

    /// Validates an already-parsed JSON value.
    pub fn from_value(value: Value) -> ProtocolResult<Self> {
        Self::from_object(&into_object(value)?)
    }

    fn from_object(body: &Map<String, Value>) -> ProtocolResult<Self> {
        let mut v = BodyValidator::new(body);

        let projects = v
            .required("projects")
            .and_then(|p| v.records("projects", p));
        let tasks = v.required("tasks").and_then(|t| v.records("tasks", t));
        let users = match v.optional("users") {
            Some(u) => v.records("users", u).map(Some),
            None => Some(None),
        };
        let timestamp = v
            .required("timestamp")
            .and_then(|t| v.marker("timestamp", t));

        let parsed = match (projects, tasks, users, timestamp) {
            (Some(projects), Some(tasks), Some(users), Some(timestamp)) => Some(Self {
                projects,
                tasks,
                users,
                timestamp,
            }),
            _ => None,
        };
        v.finish(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LocSegment;
    use serde_json::json;

    #[test]
    fn parses_full_body() {
        let body = json!({
            "projects": [{"id": 1, "name": "Block A"}],
            "tasks": [{"id": 7, "status": "todo"}],
            "users": [{"id": 1, "username": "admin"}],
            "timestamp": "2024-02-01T10:00:00.000Z"
        });
        let req = SyncRequest::from_json(body.to_string().as_bytes()).unwrap();
        assert_eq!(req.projects.len(), 1);
        assert_eq!(req.tasks[0]["id"], json!(7));
        assert_eq!(req.users.as_ref().map(Vec::len), Some(1));
        assert_eq!(req.timestamp.to_string(), "2024-02-01T10:00:00.000Z");
    }

    #[test]
    fn users_are_optional() {
        let req = SyncRequest::from_value(json!({
            "projects": [], "tasks": [], "timestamp": 5
        }))
        .unwrap();
        assert_eq!(req.users, None);
        assert!(req.replacement_users().is_none());

        let req = SyncRequest::from_value(json!({
            "projects": [], "tasks": [], "users": null, "timestamp": 5
        }))
        .unwrap();
        assert_eq!(req.users, None);
    }

    #[test]
    fn empty_users_do_not_replace() {
        let req = SyncRequest::new(vec![], vec![], Marker::Millis(1)).with_users(vec![]);
        assert!(req.replacement_users().is_none());
    }

    #[test]
    fn reports_every_missing_field() {
        let err = SyncRequest::from_value(json!({})).unwrap_err();
        assert_eq!(err.errors.len(), 3);
        assert!(err.mentions("projects"));
        assert!(err.mentions("tasks"));
        assert!(err.mentions("timestamp"));
        assert!(err.errors.iter().all(|e| e.kind == "value_error.missing"));
    }

    #[test]
    fn rejects_non_object_records() {
        let err = SyncRequest::from_value(json!({
            "projects": [{"id": 1}, 42],
            "tasks": "nope",
            "timestamp": 1
        }))
        .unwrap_err();

        assert_eq!(err.errors.len(), 2);
        assert_eq!(
            err.errors[0].loc,
            vec![
                LocSegment::Field("body".into()),
                LocSegment::Field("projects".into()),
                LocSegment::Index(1)
            ]
        );
        assert_eq!(err.errors[1].kind, "type_error.list");
    }

    #[test]
    fn rejects_bad_marker() {
        let err = SyncRequest::from_value(json!({
            "projects": [], "tasks": [], "timestamp": "last tuesday"
        }))
        .unwrap_err();
        assert!(err.mentions("timestamp"));
        assert_eq!(err.errors[0].kind, "value_error.timestamp");
    }

    #[test]
    fn rejects_non_json_and_non_object() {
        let err = SyncRequest::from_json(b"{not json").unwrap_err();
        assert_eq!(err.errors[0].kind, "value_error.jsondecode");

        let err = SyncRequest::from_json(b"[1, 2]").unwrap_err();
        assert_eq!(err.errors[0].kind, "type_error.dict");
    }

    #[test]
    fn snapshot_serializes_marker_as_timestamp() {
        let snapshot = Snapshot::empty(Marker::Millis(10));
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(
            json,
            json!({"projects": [], "tasks": [], "users": [], "timestamp": 10})
        );
        let back: Snapshot = serde_json::from_value(json).unwrap();
        assert_eq!(back, snapshot);
        assert!(back.is_empty());
    }
}
