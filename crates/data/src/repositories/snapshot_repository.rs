//! File-backed snapshot repository.

use crate::error::{DataError, DataResult};
use sor_domain::entities::{PoolRecord, PoolSnapshot};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Parses and validates a snapshot from its JSON text.
///
/// # Errors
/// Returns an error if the JSON is malformed or the snapshot fails
/// [`validate_snapshot`].
pub fn parse_snapshot(json: &str) -> DataResult<PoolSnapshot> {
    let snapshot: PoolSnapshot = serde_json::from_str(json)?;
    validate_snapshot(&snapshot)?;
    Ok(snapshot)
}

fn invalid(pool: &PoolRecord, reason: impl Into<String>) -> DataError {
    DataError::Invalid {
        pool: pool.id.clone(),
        reason: reason.into(),
    }
}

fn validate_pool(snapshot: &PoolSnapshot, pool: &PoolRecord) -> DataResult<()> {
    if pool.chain_id != snapshot.chain_id {
        return Err(invalid(
            pool,
            format!("chain {} in a chain {} snapshot", pool.chain_id, snapshot.chain_id),
        ));
    }
    if pool.tokens.is_empty() {
        return Err(invalid(pool, "no tokens"));
    }
    let mut indices: Vec<usize> = pool.tokens.iter().map(|t| t.index).collect();
    indices.sort_unstable();
    if indices.iter().enumerate().any(|(expected, index)| expected != *index) {
        return Err(invalid(pool, "token indices are not contiguous from 0"));
    }
    let mut addresses = BTreeSet::new();
    for token in &pool.tokens {
        if !addresses.insert(token.address.to_ascii_lowercase()) {
            return Err(invalid(pool, format!("token {} listed twice", token.address)));
        }
        if token.balance.is_sign_negative() {
            return Err(invalid(pool, format!("negative balance for {}", token.address)));
        }
    }
    Ok(())
}

/// Structural checks: unique pool ids, pools on the snapshot's chain, and
/// contiguous, unique token entries per pool.
///
/// Curve parameters are not checked here; a pool whose parameters do not
/// make a valid model is skipped when the engine builds it.
///
/// # Errors
/// Returns the first violation found.
pub fn validate_snapshot(snapshot: &PoolSnapshot) -> DataResult<()> {
    let mut seen = BTreeSet::new();
    for pool in &snapshot.pools {
        if !seen.insert(pool.id.as_str()) {
            return Err(DataError::DuplicatePool(pool.id.clone()));
        }
        validate_pool(snapshot, pool)?;
    }
    Ok(())
}

/// Reads and writes snapshots as JSON files.
#[derive(Debug, Clone)]
pub struct SnapshotRepository {
    path: PathBuf,
}

impl SnapshotRepository {
    /// Creates a repository backed by the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, e: &std::io::Error) -> DataError {
        DataError::Io {
            path: self.path.display().to_string(),
            message: e.to_string(),
        }
    }

    /// Loads and validates the snapshot.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, is not valid JSON or
    /// fails validation.
    pub fn load(&self) -> DataResult<PoolSnapshot> {
        let json = fs::read_to_string(&self.path).map_err(|e| self.io_error(&e))?;
        let snapshot = parse_snapshot(&json).inspect_err(|e| {
            warn!(path = %self.path.display(), error = %e, "Rejected snapshot");
        })?;
        debug!(
            path = %self.path.display(),
            chain_id = snapshot.chain_id,
            pools = snapshot.pools.len(),
            "Loaded snapshot"
        );
        Ok(snapshot)
    }

    /// Validates and writes the snapshot as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns an error if the snapshot is invalid or the file cannot be
    /// written.
    pub fn save(&self, snapshot: &PoolSnapshot) -> DataResult<()> {
        validate_snapshot(snapshot)?;
        let json = serde_json::to_string_pretty(snapshot)?;
        fs::write(&self.path, json).map_err(|e| self.io_error(&e))?;
        debug!(path = %self.path.display(), pools = snapshot.pools.len(), "Saved snapshot");
        Ok(())
    }
}
