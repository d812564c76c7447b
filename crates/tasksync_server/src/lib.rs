//! # tasksync server
//!
//! Snapshot sync server for task/project management clients.
//!
//! This crate provides:
//! - `SnapshotStore`, the last-write-wins register holding one snapshot
//! - Request handlers for health, read, sync and status patch
//! - An axum router exposing them as JSON over HTTP
//!
//! # Protocol
//!
//! A client posts its whole local snapshot with a timestamp. The store keeps
//! it only if the timestamp is strictly greater than the stored one; otherwise
//! the client receives `{"status": "stale", "current_timestamp": ...}` and
//! should pull with `GET /api/sync`.
//!
//! State is held in memory and is lost on restart.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod config;
mod error;
mod handler;
mod http;
mod server;
mod store;

pub use config::{ServerConfig, StatusPatchMode};
pub use error::{ServerError, ServerResult};
pub use handler::{HandlerContext, RequestHandler};
pub use http::router;
pub use server::{shutdown_signal, SyncServer};
pub use store::{SnapshotStore, UpdateOutcome};
