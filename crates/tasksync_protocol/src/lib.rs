//! # tasksync protocol
//!
//! Wire types for the tasksync snapshot protocol.
//!
//! This crate provides:
//! - `Snapshot` and `SyncRequest`, the unit of synchronization
//! - `Marker`, the timestamp that orders snapshots
//! - `TaskStatus` and the status patch messages
//! - Field-level validation of JSON request bodies
//!
//! This is a pure protocol crate with no I/O operations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod marker;
mod messages;
mod snapshot;
mod task;
mod validate;

pub use error::{FieldError, LocSegment, MarkerError, ProtocolResult, ValidationError};
pub use marker::Marker;
pub use messages::{HealthResponse, SyncResponse};
pub use snapshot::{Record, Snapshot, SyncRequest};
pub use task::{StatusPatchRequest, StatusPatchResponse, TaskId, TaskStatus};
