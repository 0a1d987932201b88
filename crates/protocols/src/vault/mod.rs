//! The settlement engine of vault pools.
//!
//! A vault pool is a [`PoolCurve`] plus a [`PoolState`]; the [`Vault`] turns
//! raw token amounts into curve calls and applies fees and hooks.

pub mod base_pool_math;
pub mod curve;
pub mod hooks;
pub mod pool_state;
pub mod settlement;

pub use curve::{PoolCurve, SwapParams};
pub use hooks::PoolHook;
pub use pool_state::PoolState;
pub use settlement::{
    AddLiquidityInput, AddLiquidityKind, AddLiquidityResult, MAX_FEE, RemoveLiquidityInput,
    RemoveLiquidityKind, RemoveLiquidityResult, SwapInput, Vault, WrappingDirection,
};
