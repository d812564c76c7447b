//! Serve command implementation.

use std::net::SocketAddr;
use std::time::Duration;
use tasksync_protocol::Marker;
use tasksync_server::{ServerConfig, ServerResult, StatusPatchMode, SyncServer};

/// Options collected from the command line.
pub struct ServeOptions {
    pub bind: SocketAddr,
    pub app_name: String,
    pub timeout_secs: u64,
    pub max_body_bytes: usize,
    pub cors: bool,
    pub apply_status_patches: bool,
    pub initial_timestamp: Marker,
}

impl ServeOptions {
    fn into_config(self) -> ServerConfig {
        let mode = if self.apply_status_patches {
            StatusPatchMode::Apply
        } else {
            StatusPatchMode::Echo
        };

        ServerConfig::new(self.bind)
            .with_app_name(self.app_name)
            .with_request_timeout(Duration::from_secs(self.timeout_secs))
            .with_max_body_bytes(self.max_body_bytes)
            .with_cors_permissive(self.cors)
            .with_status_patch_mode(mode)
            .with_initial_marker(self.initial_timestamp)
    }
}

pub async fn run(options: ServeOptions) -> ServerResult<()> {
    let server = SyncServer::new(options.into_config());
    server.serve().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_map_onto_config() {
        let options = ServeOptions {
            bind: "0.0.0.0:9001".parse().unwrap(),
            app_name: "site".into(),
            timeout_secs: 5,
            max_body_bytes: 2048,
            cors: false,
            apply_status_patches: true,
            initial_timestamp: Marker::Millis(100),
        };

        let config = options.into_config();
        assert_eq!(config.bind_addr.port(), 9001);
        assert_eq!(config.app_name, "site");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.max_body_bytes, 2048);
        assert!(!config.cors_permissive);
        assert_eq!(config.status_patch_mode, StatusPatchMode::Apply);
        assert_eq!(config.initial_marker, Marker::Millis(100));
    }
}
