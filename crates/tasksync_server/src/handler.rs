//! Request handlers for sync endpoints.

use crate::config::{ServerConfig, StatusPatchMode};
use crate::error::ServerResult;
use crate::store::SnapshotStore;
use std::sync::Arc;
use tasksync_protocol::{
    HealthResponse, Marker, Snapshot, StatusPatchRequest, StatusPatchResponse, SyncRequest,
    SyncResponse, TaskId,
};
use tracing::{debug, info, warn};

/// Context for request handling.
pub struct HandlerContext {
    /// Server configuration.
    pub config: ServerConfig,
    /// The shared snapshot store.
    pub store: Arc<SnapshotStore>,
}

impl HandlerContext {
    /// Creates a new handler context.
    pub fn new(config: ServerConfig, store: Arc<SnapshotStore>) -> Self {
        Self { config, store }
    }
}

/// Handler for sync requests.
///
/// Independent of the HTTP layer: handlers take raw bodies and return
/// protocol messages or `ServerError`.
pub struct RequestHandler {
    context: Arc<HandlerContext>,
}

impl RequestHandler {
    /// Creates a new request handler.
    pub fn new(context: Arc<HandlerContext>) -> Self {
        Self { context }
    }

    /// Returns the handler context.
    pub fn context(&self) -> &HandlerContext {
        &self.context
    }

    /// Handles a health check.
    pub fn handle_health(&self) -> HealthResponse {
        HealthResponse::ok(self.context.config.app_name.clone())
    }

    /// Returns the current snapshot.
    pub fn handle_read(&self) -> Snapshot {
        let snapshot = self.context.store.read();
        debug!(
            marker = %snapshot.marker,
            projects = snapshot.projects.len(),
            tasks = snapshot.tasks.len(),
            "snapshot read"
        );
        snapshot
    }

    /// Handles a raw sync body.
    pub fn handle_sync(&self, body: &[u8]) -> ServerResult<SyncResponse> {
        let request = SyncRequest::from_json(body).map_err(|e| {
            warn!(error = %e, "rejected sync payload");
            e
        })?;
        Ok(self.handle_sync_request(request))
    }

    /// Handles an already-validated sync request.
    pub fn handle_sync_request(&self, request: SyncRequest) -> SyncResponse {
        let incoming = request.timestamp.clone();
        let (projects, tasks) = (request.projects.len(), request.tasks.len());

        let outcome = self.context.store.update(request);
        if outcome.is_accepted() {
            info!(marker = %incoming, projects, tasks, "snapshot updated");
        } else {
            debug!(
                incoming = %incoming,
                current = %self.context.store.marker(),
                "stale snapshot ignored"
            );
        }
        outcome.into()
    }

    /// Handles a raw status patch body for the given task.
    pub fn handle_status_patch(
        &self,
        task_id: &str,
        body: &[u8],
    ) -> ServerResult<StatusPatchResponse> {
        let patch = StatusPatchRequest::from_json(body).map_err(|e| {
            warn!(task_id, error = %e, "rejected status patch");
            e
        })?;
        self.apply_status_patch(TaskId::new(task_id), patch, Marker::now())
    }

    /// Handles a validated status patch, stamping it with `now`.
    pub fn apply_status_patch(
        &self,
        task_id: TaskId,
        patch: StatusPatchRequest,
        now: Marker,
    ) -> ServerResult<StatusPatchResponse> {
        match self.context.config.status_patch_mode {
            StatusPatchMode::Echo => {
                debug!(task_id = %task_id, status = %patch.new_status, "status patch echoed");
            }
            StatusPatchMode::Apply => {
                self.context.store.apply_status(&task_id, &patch, &now)?;
                info!(
                    task_id = %task_id,
                    status = %patch.new_status,
                    evidence_added = patch.evidence_added.unwrap_or(false),
                    "task status applied"
                );
            }
        }

        Ok(StatusPatchResponse {
            id: task_id,
            status: patch.new_status,
            updated_at: now.to_string(),
        })
    }
}
