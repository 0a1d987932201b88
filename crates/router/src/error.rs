//! Router errors.

use sor_protocols::error::PoolError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    #[error("input and output token are the same")]
    SameToken,
    #[error("swap amount is zero")]
    ZeroAmount,
    /// A pool failed for a reason other than lack of capacity.
    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// Result alias for routing operations.
pub type RouterResult<T> = Result<T, RouterError>;
