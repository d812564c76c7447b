//! Task status transitions.

use crate::error::ProtocolResult;
use crate::validate::{into_object, parse_object, BodyValidator};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Workflow status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Planned, not started.
    Todo,
    /// Work under way.
    InProgress,
    /// Awaiting supervisor review.
    Review,
    /// Accepted as complete.
    Done,
    /// Sent back for corrections.
    Rework,
}

impl TaskStatus {
    /// Every status, in workflow order.
    pub const ALL: [TaskStatus; 5] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Review,
        TaskStatus::Done,
        TaskStatus::Rework,
    ];

    /// Returns the wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Review => "review",
            TaskStatus::Done => "done",
            TaskStatus::Rework => "rework",
        }
    }

    fn wire_names() -> Vec<&'static str> {
        Self::ALL.iter().map(TaskStatus::as_str).collect()
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown task status: {s:?}"))
    }
}

/// A task identifier taken from a request path.
///
/// Records carry ids as JSON numbers or strings, so matching compares the
/// textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskId(String);

impl TaskId {
    /// Creates a task id from its textual form.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the textual form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if a record's `id` value refers to this task.
    pub fn matches(&self, id: &Value) -> bool {
        match id {
            Value::Number(n) => n.to_string() == self.0,
            Value::String(s) => *s == self.0,
            _ => false,
        }
    }

    /// Returns the id as it should appear in a JSON response.
    pub fn to_json(&self) -> Value {
        match self.0.parse::<i64>() {
            Ok(n) => Value::from(n),
            Err(_) => Value::String(self.0.clone()),
        }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for TaskId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Body of `PATCH /api/tasks/{id}/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusPatchRequest {
    /// Requested status.
    pub new_status: TaskStatus,
    /// Optional supervisor comment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Whether evidence was attached with the transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence_added: Option<bool>,
}

impl StatusPatchRequest {
    /// Creates a request with only a status.
    pub fn new(new_status: TaskStatus) -> Self {
        Self {
            new_status,
            comment: None,
            evidence_added: None,
        }
    }

    /// Sets the comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
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

        let new_status = v.required("new_status").and_then(|raw| {
            let parsed = raw.as_str().and_then(|s| s.parse::<TaskStatus>().ok());
            if parsed.is_none() {
                v.invalid_choice("new_status", &TaskStatus::wire_names());
            }
            parsed
        });
        let comment = match v.optional("comment") {
            Some(c) => v.string("comment", c).map(Some),
            None => Some(None),
        };
        let evidence_added = match v.optional("evidence_added") {
            Some(e) => v.boolean("evidence_added", e).map(Some),
            None => Some(None),
        };

        let parsed = match (new_status, comment, evidence_added) {
            (Some(new_status), Some(comment), Some(evidence_added)) => Some(Self {
                new_status,
                comment,
                evidence_added,
            }),
            _ => None,
        };
        v.finish(parsed)
    }
}

/// Response to a status patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusPatchResponse {
    /// The task id, echoed from the path.
    pub id: TaskId,
    /// The status now reported for the task.
    pub status: TaskStatus,
    /// When the change was recorded (RFC 3339, milliseconds, UTC).
    pub updated_at: String,
}
