//! Repository implementations for snapshot persistence.
//!
//! This module provides file-backed storage for pool snapshots and the
//! structural checks applied to every snapshot it hands out.

mod snapshot_repository;

pub use snapshot_repository::{SnapshotRepository, parse_snapshot, validate_snapshot};
