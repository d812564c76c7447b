//! Main sync server.

use crate::config::{ServerConfig, StatusPatchMode};
use crate::error::ServerResult;
use crate::handler::{HandlerContext, RequestHandler};
use crate::http;
use crate::store::SnapshotStore;
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use tasksync_protocol::{Marker, Snapshot};
use tokio::net::TcpListener;
use tracing::{info, warn};

/// The sync server.
///
/// Owns the snapshot store and serves it over HTTP. The store lives only in
/// memory; its contents are lost when the process exits.
///
/// # Example
///
/// ```
/// use tasksync_server::{ServerConfig, SyncServer};
///
/// let server = SyncServer::new(ServerConfig::default());
/// assert!(server.snapshot().is_empty());
///
/// // In a real application: server.serve().await
/// ```
pub struct SyncServer {
    handler: Arc<RequestHandler>,
    context: Arc<HandlerContext>,
}

impl SyncServer {
    /// Creates a new sync server with an empty store.
    pub fn new(config: ServerConfig) -> Self {
        let store = Arc::new(SnapshotStore::with_marker(config.initial_marker.clone()));
        Self::with_store(config, store)
    }

    /// Creates a sync server around an existing store.
    pub fn with_store(config: ServerConfig, store: Arc<SnapshotStore>) -> Self {
        let context = Arc::new(HandlerContext::new(config, store));
        let handler = Arc::new(RequestHandler::new(Arc::clone(&context)));

        Self { handler, context }
    }

    /// Returns the request handler.
    pub fn handler(&self) -> &RequestHandler {
        &self.handler
    }

    /// Builds the HTTP router.
    pub fn router(&self) -> Router {
        http::router(Arc::clone(&self.handler))
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.context.store.read()
    }

    /// Returns the current store marker.
    pub fn marker(&self) -> Marker {
        self.context.store.marker()
    }

    /// Binds the configured address and serves until Ctrl-C.
    pub async fn serve(self) -> ServerResult<()> {
        let listener = TcpListener::bind(self.context.config.bind_addr).await?;
        self.serve_with_shutdown(listener, shutdown_signal()).await
    }

    /// Serves on an already-bound listener until `signal` resolves.
    pub async fn serve_with_shutdown<F>(self, listener: TcpListener, signal: F) -> ServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        self.log_startup();
        info!(%addr, app = %self.context.config.app_name, "listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(signal)
            .await?;

        info!("server stopped");
        Ok(())
    }

    fn log_startup(&self) {
        let config = &self.context.config;
        info!(
            marker = %self.marker(),
            "snapshot store is in-memory only; state is lost on restart"
        );
        if config.cors_permissive {
            warn!("CORS allows every origin, method and header");
        }
        if config.status_patch_mode == StatusPatchMode::Echo {
            warn!("status patches are echoed only and do not modify stored tasks");
        }
    }
}

/// Resolves when the process receives Ctrl-C.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
