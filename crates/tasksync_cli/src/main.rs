//! tasksync CLI
//!
//! Runs the snapshot sync server.
//!
//! # Commands
//!
//! - `serve` - Serve the sync API over HTTP
//! - `version` - Show version information

mod commands;

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use tasksync_protocol::Marker;
use tracing_subscriber::EnvFilter;

/// tasksync snapshot sync server.
#[derive(Parser)]
#[command(name = "tasksync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the sync API over HTTP
    Serve {
        /// Address to listen on
        #[arg(short, long, default_value = "127.0.0.1:8000")]
        bind: SocketAddr,

        /// Service name reported by /api/health
        #[arg(long, default_value = "tasksync")]
        app_name: String,

        /// Request timeout in seconds
        #[arg(long, default_value = "30")]
        timeout_secs: u64,

        /// Maximum request body size in bytes
        #[arg(long, default_value = "16777216")]
        max_body_bytes: usize,

        /// Disable the open CORS policy
        #[arg(long)]
        no_cors: bool,

        /// Write status patches into stored tasks instead of echoing them
        #[arg(long)]
        apply_status_patches: bool,

        /// Timestamp of the initial empty snapshot (milliseconds or ISO-8601)
        #[arg(long, default_value = "0")]
        initial_timestamp: Marker,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG overrides the default level
    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Serve {
            bind,
            app_name,
            timeout_secs,
            max_body_bytes,
            no_cors,
            apply_status_patches,
            initial_timestamp,
        } => {
            let options = commands::serve::ServeOptions {
                bind,
                app_name,
                timeout_secs,
                max_body_bytes,
                cors: !no_cors,
                apply_status_patches,
                initial_timestamp,
            };
            commands::serve::run(options).await?;
        }
        Commands::Version => {
            println!("tasksync v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
