//! Prelude module for convenient imports.
//!
//! # Example
//!
//! ```rust
//! use sor_domain::prelude::*;
//! ```

// Entities
pub use crate::entities::{
    HookParams, HookRecord, PairLiquidityRecord, PoolRecord, PoolSnapshot, PoolTokenRecord,
};

// Enums
pub use crate::enums::{PoolType, Rounding, SwapKind};

// Errors
pub use crate::error::{DomainError, MathError, MathResult};

// Hooks
pub use crate::hooks::{HookState, HookType, resolve_hook_state};

// Math
pub use crate::math::{FixedPoint, ONE, SignedFixedPoint};

// Pools and tokens
pub use crate::pool::{PoolToken, TokenPairLiquidity};
pub use crate::token::{Token, TokenAmount};
