//! The seam between the vault and the invariant math of each pool type.

use crate::error::PoolResult;
use primitive_types::U256;
use sor_domain::enums::{Rounding, SwapKind};
use std::fmt;

/// A swap as seen by a curve: live 18-decimal balances, fees already handled.
#[derive(Debug, Clone, Copy)]
pub struct SwapParams<'a> {
    pub kind: SwapKind,
    pub amount_given_scaled18: U256,
    pub balances_live_scaled18: &'a [U256],
    pub index_in: usize,
    pub index_out: usize,
}

/// The invariant-specific half of a vault pool.
///
/// The vault owns scaling, fees, hooks and liquidity accounting; a curve
/// only prices swaps and solves its invariant.
pub trait PoolCurve: Send + Sync + fmt::Debug {
    /// Amount out (given in) or amount in (given out), live 18 decimals.
    fn on_swap(&self, params: &SwapParams<'_>) -> PoolResult<U256>;

    fn compute_invariant(&self, balances_live_scaled18: &[U256], rounding: Rounding)
    -> PoolResult<U256>;

    /// Balance of `token_index` that scales the invariant by `invariant_ratio`.
    fn compute_balance(
        &self,
        balances_live_scaled18: &[U256],
        token_index: usize,
        invariant_ratio: U256,
    ) -> PoolResult<U256>;

    fn minimum_invariant_ratio(&self) -> U256;

    fn maximum_invariant_ratio(&self) -> U256;

    /// Largest live 18-decimal amount the curve accepts on the given side.
    fn max_swap_amount(
        &self,
        kind: SwapKind,
        balances_live_scaled18: &[U256],
        index_in: usize,
        index_out: usize,
    ) -> PoolResult<U256>;
}
