//! Errors raised while loading snapshots.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    #[error("cannot access {path}: {message}")]
    Io { path: String, message: String },
    #[error("malformed snapshot: {0}")]
    Json(String),
    #[error("pool {0} appears more than once")]
    DuplicatePool(String),
    #[error("pool {pool}: {reason}")]
    Invalid { pool: String, reason: String },
}

impl From<serde_json::Error> for DataError {
    fn from(e: serde_json::Error) -> Self {
        DataError::Json(e.to_string())
    }
}

/// Result alias for snapshot loading.
pub type DataResult<T> = Result<T, DataError>;
