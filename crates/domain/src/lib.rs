//! Domain layer of the smart order router.
//!
//! This crate holds everything the pool models and the router share:
//! - Fixed-point math reproducing the settlement contracts' rounding
//! - Tokens, token amounts and pool tokens
//! - Snapshot records as persisted by the ingestion layer
//! - The hook-state resolver

/// Prelude module for convenient imports.
pub mod prelude;

/// Snapshot records.
pub mod entities;
/// Shared enumerations.
pub mod enums;
/// Error types.
pub mod error;
/// Hook types and hook-state resolution.
pub mod hooks;
/// Fixed-point math library.
pub mod math;
/// Pool tokens and pair liquidity.
pub mod pool;
/// Tokens and token amounts.
pub mod token;
