//! Scaling and fee conventions of legacy pools, which settle directly
//! instead of through the vault.
//!
//! Fees are taken from raw amounts: exact-in swaps lose `amount.mul_up(fee)`
//! before upscaling, exact-out swaps gross the computed input up by
//! `1 / (1 - fee)` after downscaling.

use crate::error::PoolResult;
use primitive_types::U256;
use sor_domain::math::{
    FixedPoint, to_raw_undo_rate_round_down, to_raw_undo_rate_round_up,
    to_scaled18_apply_rate_round_down,
};
use sor_domain::pool::PoolToken;

pub fn subtract_swap_fee(amount: U256, swap_fee: U256) -> PoolResult<U256> {
    Ok(amount.try_sub(amount.mul_up(swap_fee)?)?)
}

pub fn add_swap_fee(amount: U256, swap_fee: U256) -> PoolResult<U256> {
    Ok(amount.div_up(swap_fee.complement())?)
}

pub fn upscale(amount: U256, token: &PoolToken) -> PoolResult<U256> {
    Ok(to_scaled18_apply_rate_round_down(amount, token.scaling_factor, token.rate)?)
}

pub fn downscale_down(amount: U256, token: &PoolToken) -> PoolResult<U256> {
    Ok(to_raw_undo_rate_round_down(amount, token.scaling_factor, token.rate)?)
}

pub fn downscale_up(amount: U256, token: &PoolToken) -> PoolResult<U256> {
    Ok(to_raw_undo_rate_round_up(amount, token.scaling_factor, token.rate)?)
}

/// Upscaled balances of `tokens`, in order.
pub fn upscaled_balances<'a>(tokens: impl IntoIterator<Item = &'a PoolToken>) -> PoolResult<Vec<U256>> {
    tokens
        .into_iter()
        .map(|t| upscale(t.balance, t))
        .collect()
}
