//! Server configuration.

use std::net::SocketAddr;
use std::time::Duration;
use tasksync_protocol::Marker;

/// How `PATCH /api/tasks/{id}/status` treats the shared snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusPatchMode {
    /// Echo the requested change without touching the store.
    #[default]
    Echo,
    /// Write the change into the matching task of the stored snapshot.
    Apply,
}

/// Configuration for the sync server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_addr: SocketAddr,
    /// Service name reported by the health endpoint.
    pub app_name: String,
    /// Request timeout.
    pub request_timeout: Duration,
    /// Maximum accepted request body size in bytes.
    pub max_body_bytes: usize,
    /// Whether to allow every origin, method and header (open CORS).
    pub cors_permissive: bool,
    /// Status patch behavior.
    pub status_patch_mode: StatusPatchMode,
    /// Marker of the empty snapshot the store starts with.
    pub initial_marker: Marker,
}

impl ServerConfig {
    /// Creates a new server configuration.
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            app_name: "tasksync".into(),
            request_timeout: Duration::from_secs(30),
            max_body_bytes: 16 * 1024 * 1024,
            cors_permissive: true,
            status_patch_mode: StatusPatchMode::Echo,
            initial_marker: Marker::EPOCH,
        }
    }

    /// Sets the service name.
    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = name.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the maximum request body size.
    pub fn with_max_body_bytes(mut self, max: usize) -> Self {
        self.max_body_bytes = max;
        self
    }

    /// Enables or disables open CORS.
    pub fn with_cors_permissive(mut self, enabled: bool) -> Self {
        self.cors_permissive = enabled;
        self
    }

    /// Sets the status patch behavior.
    pub fn with_status_patch_mode(mut self, mode: StatusPatchMode) -> Self {
        self.status_patch_mode = mode;
        self
    }

    /// Sets the marker of the initial empty snapshot.
    pub fn with_initial_marker(mut self, marker: Marker) -> Self {
        self.initial_marker = marker;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(SocketAddr::from(([127, 0, 0, 1], 8000)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.port(), 8000);
        assert_eq!(config.app_name, "tasksync");
        assert!(config.cors_permissive);
        assert_eq!(config.status_patch_mode, StatusPatchMode::Echo);
        assert_eq!(config.initial_marker, Marker::Millis(0));
    }

    #[test]
    fn config_builder() {
        let config = ServerConfig::new("0.0.0.0:9000".parse().unwrap())
            .with_app_name("site-sync")
            .with_max_body_bytes(1024)
            .with_cors_permissive(false)
            .with_status_patch_mode(StatusPatchMode::Apply)
            .with_initial_marker("2024-01-01T00:00:00.000Z".parse().unwrap());

        assert_eq!(config.app_name, "site-sync");
        assert_eq!(config.max_body_bytes, 1024);
        assert!(!config.cors_permissive);
        assert_eq!(config.status_patch_mode, StatusPatchMode::Apply);
        assert_eq!(
            config.initial_marker.to_string(),
            "2024-01-01T00:00:00.000Z"
        );
    }
}
