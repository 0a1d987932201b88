//! Snapshot persistence for the smart order router.
//!
//! Snapshots are JSON documents produced by the ingestion layer. This crate
//! reads and writes them and rejects structurally broken ones before they
//! reach the engine.

/// Error types.
pub mod error;
/// Snapshot repositories.
pub mod repositories;

pub use error::{DataError, DataResult};
pub use repositories::{SnapshotRepository, parse_snapshot, validate_snapshot};
