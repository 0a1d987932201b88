//! Errors surfaced by the order router facade.

use sor_domain::error::DomainError;
use sor_protocols::error::PoolError;
use sor_router::error::RouterError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SorError {
    /// The request amount is not denominated in the token its kind fixes.
    #[error("amount is in {actual}, expected {expected}")]
    AmountTokenMismatch { expected: String, actual: String },
    #[error(transparent)]
    Router(#[from] RouterError),
    #[error(transparent)]
    Domain(#[from] DomainError),
    /// A pool record that parses but does not make a valid model.
    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// Result alias for the facade.
pub type SorResult<T> = Result<T, SorError>;
