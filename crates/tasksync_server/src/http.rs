//! HTTP routing.
//!
//! Maps the JSON endpoints onto `RequestHandler`:
//!
//! | method | path                        |
//! |--------|-----------------------------|
//! | GET    | `/api/health`               |
//! | GET    | `/api/sync`                 |
//! | POST   | `/api/sync`                 |
//! | PATCH  | `/api/tasks/{id}/status`    |

use crate::error::{ServerError, ServerResult};
use crate::handler::RequestHandler;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::{header, StatusCode};
use axum::middleware::map_response;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch};
use axum::{Json, Router};
use bytes::Bytes;
use std::sync::Arc;
use tasksync_protocol::{HealthResponse, Snapshot, StatusPatchResponse, SyncResponse};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Builds the router for the given handler.
pub fn router(handler: Arc<RequestHandler>) -> Router {
    let config = &handler.context().config;
    let body_limit = config.max_body_bytes;
    let timeout = config.request_timeout;
    let open_cors = config.cors_permissive;

    let mut router = Router::new()
        .route("/api/health", get(health))
        .route("/api/sync", get(read_snapshot).post(sync))
        .route("/api/tasks/:task_id/status", patch(status_patch))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TimeoutLayer::new(timeout))
        .layer(map_response(json_error_bodies))
        .layer(TraceLayer::new_for_http());

    if open_cors {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router.with_state(handler)
}

async fn health(State(handler): State<Arc<RequestHandler>>) -> Json<HealthResponse> {
    Json(handler.handle_health())
}

async fn read_snapshot(State(handler): State<Arc<RequestHandler>>) -> Json<Snapshot> {
    Json(handler.handle_read())
}

async fn sync(
    State(handler): State<Arc<RequestHandler>>,
    body: Bytes,
) -> ServerResult<Json<SyncResponse>> {
    handler.handle_sync(&body).map(Json)
}

async fn status_patch(
    State(handler): State<Arc<RequestHandler>>,
    Path(task_id): Path<String>,
    body: Bytes,
) -> ServerResult<Json<StatusPatchResponse>> {
    handler.handle_status_patch(&task_id, &body).map(Json)
}

async fn not_found() -> ServerError {
    ServerError::NotFound
}

/// Rewrites the plain-text or empty bodies produced by the body limit and the
/// timeout layer into the JSON `detail` shape used by every other error.
async fn json_error_bodies(response: Response) -> Response {
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));
    if is_json {
        return response;
    }

    match response.status() {
        StatusCode::REQUEST_TIMEOUT => ServerError::Timeout.into_response(),
        StatusCode::PAYLOAD_TOO_LARGE => ServerError::PayloadTooLarge.into_response(),
        _ => response,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn timeout_gets_json_detail() {
        let empty = StatusCode::REQUEST_TIMEOUT.into_response();
        let response = json_error_bodies(empty).await;
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(
            body_json(response).await,
            json!({"detail": "request timed out"})
        );
    }

    #[tokio::test]
    async fn plain_payload_too_large_gets_json_detail() {
        let plain = (StatusCode::PAYLOAD_TOO_LARGE, "length limit exceeded").into_response();
        let response = json_error_bodies(plain).await;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            body_json(response).await,
            json!({"detail": "request body too large"})
        );
    }

    #[tokio::test]
    async fn json_and_success_responses_pass_through() {
        let ok = Json(json!({"status": "ok"})).into_response();
        let ok = json_error_bodies(ok).await;
        assert_eq!(ok.status(), StatusCode::OK);
        assert_eq!(body_json(ok).await, json!({"status": "ok"}));

        let not_found = ServerError::NotFound.into_response();
        let not_found = json_error_bodies(not_found).await;
        assert_eq!(body_json(not_found).await, json!({"detail": "Not Found"}));
    }
}
