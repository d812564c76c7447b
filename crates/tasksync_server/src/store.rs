//! The shared snapshot register.

use crate::error::{ServerError, ServerResult};
use parking_lot::RwLock;
use serde_json::Value;
use tasksync_protocol::{
    Marker, Record, Snapshot, StatusPatchRequest, SyncRequest, SyncResponse, TaskId,
};

/// Result of offering a snapshot to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The snapshot replaced the stored one.
    Accepted {
        /// The new stored marker.
        marker: Marker,
    },
    /// The snapshot was not strictly newer; nothing changed.
    Stale {
        /// The stored marker.
        current: Marker,
    },
}

impl UpdateOutcome {
    /// Returns true if the snapshot was accepted.
    pub fn is_accepted(&self) -> bool {
        matches!(self, UpdateOutcome::Accepted { .. })
    }
}

impl From<UpdateOutcome> for SyncResponse {
    fn from(outcome: UpdateOutcome) -> Self {
        match outcome {
            UpdateOutcome::Accepted { marker } => SyncResponse::Updated { timestamp: marker },
            UpdateOutcome::Stale { current } => SyncResponse::Stale {
                current_timestamp: current,
            },
        }
    }
}

/// Holds the one authoritative snapshot.
///
/// Updates follow last-write-wins at whole-snapshot granularity: an incoming
/// snapshot replaces the stored one only when its marker is strictly greater.
/// The compare and the replace happen under one write lock, so concurrent
/// writers never leave a mix of two snapshots behind.
pub struct SnapshotStore {
    state: RwLock<Snapshot>,
}

impl SnapshotStore {
    /// Creates an empty store at the epoch marker.
    pub fn new() -> Self {
        Self::with_marker(Marker::EPOCH)
    }

    /// Creates an empty store at the given marker.
    pub fn with_marker(marker: Marker) -> Self {
        Self {
            state: RwLock::new(Snapshot::empty(marker)),
        }
    }

    /// Returns a copy of the current snapshot.
    pub fn read(&self) -> Snapshot {
        self.state.read().clone()
    }

    /// Returns the current marker.
    pub fn marker(&self) -> Marker {
        self.state.read().marker.clone()
    }

    /// Offers a snapshot to the store.
    ///
    /// Users are replaced only when the request carries a non-empty list.
    pub fn update(&self, incoming: SyncRequest) -> UpdateOutcome {
        let mut state = self.state.write();

        if !incoming.timestamp.supersedes(&state.marker) {
            return UpdateOutcome::Stale {
                current: state.marker.clone(),
            };
        }

        let SyncRequest {
            projects,
            tasks,
            users,
            timestamp,
        } = incoming;

        state.projects = projects;
        state.tasks = tasks;
        if let Some(users) = users.filter(|users| !users.is_empty()) {
            state.users = users;
        }
        state.marker = timestamp.clone();

        UpdateOutcome::Accepted { marker: timestamp }
    }

    /// Writes a status change into the matching stored task.
    ///
    /// Sets `status` and `updatedAt`, and `supervisorComment` when a comment
    /// is given. The store marker moves to `now` only if `now` is newer.
    pub fn apply_status(
        &self,
        task_id: &TaskId,
        patch: &StatusPatchRequest,
        now: &Marker,
    ) -> ServerResult<Record> {
        let mut state = self.state.write();

        let task = state
            .tasks
            .iter_mut()
            .find(|task| task.get("id").is_some_and(|id| task_id.matches(id)))
            .ok_or_else(|| ServerError::TaskNotFound(task_id.to_string()))?;

        task.insert(
            "status".into(),
            Value::String(patch.new_status.as_str().into()),
        );
        task.insert("updatedAt".into(), now.to_json());
        if let Some(comment) = &patch.comment {
            task.insert("supervisorComment".into(), Value::String(comment.clone()));
        }
        let updated = task.clone();

        if now.supersedes(&state.marker) {
            state.marker = now.clone();
        }

        Ok(updated)
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}
