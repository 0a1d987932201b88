//! Error types shared by the math library and the snapshot entities.

use thiserror::Error;

/// Fixed-point arithmetic faults.
///
/// These never occur with valid data; when they do they signal a bug or a
/// corrupt snapshot and are propagated to the caller as hard errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MathError {
    /// Result does not fit in 256 bits.
    #[error("arithmetic overflow")]
    Overflow,
    /// Subtraction would go below zero.
    #[error("arithmetic underflow")]
    Underflow,
    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,
    /// Exponent outside the range supported by `exp`/`pow`.
    #[error("exponent out of bounds")]
    InvalidExponent,
    /// `ln(x) * y` falls outside the natural exponent bounds.
    #[error("product out of bounds")]
    ProductOutOfBounds,
    /// Logarithm argument is zero or negative.
    #[error("logarithm of a non-positive number")]
    OutOfLogBounds,
    /// An iterative solver did not converge.
    #[error("{0} did not converge")]
    NotConverged(&'static str),
    /// Square root outside its tolerance band.
    #[error("square root did not meet its tolerance")]
    SqrtFailed,
    /// Signed value where an unsigned one was required.
    #[error("negative value where a non-negative one was expected")]
    Negative,
}

/// Errors raised while turning snapshot records into domain values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A token was requested from a pool that does not hold it.
    #[error("token {0} not in pool")]
    TokenNotInPool(String),
    /// A required field is missing from the pool record.
    #[error("pool {pool} is missing {field}")]
    MissingPoolData {
        /// Pool identifier.
        pool: String,
        /// Name of the missing field.
        field: &'static str,
    },
    /// A numeric field could not be converted to fixed point.
    #[error("invalid number for {field}: {value}")]
    InvalidNumber {
        /// Name of the field.
        field: &'static str,
        /// Offending value.
        value: String,
    },
    /// The pool type tag is not one of the supported curves.
    #[error("unsupported pool type {0}")]
    UnsupportedPoolType(String),
    /// Fixed-point fault while converting values.
    #[error(transparent)]
    Math(#[from] MathError),
}

/// Result alias for the math library.
pub type MathResult<T> = Result<T, MathError>;
