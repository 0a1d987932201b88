//! The vault: scaling, fees, hooks and liquidity accounting around a curve.

use crate::error::{PoolError, PoolResult};
use crate::vault::base_pool_math::{
    self, LiquidityAmounts, compute_add_liquidity_single_token_exact_out,
    compute_add_liquidity_unbalanced, compute_remove_liquidity_single_token_exact_in,
    compute_remove_liquidity_single_token_exact_out,
};
use crate::vault::curve::{PoolCurve, SwapParams};
use crate::vault::hooks::PoolHook;
use crate::vault::pool_state::PoolState;
use primitive_types::U256;
use sor_domain::enums::SwapKind;
use sor_domain::math::{
    FixedPoint, ONE, compute_rate_round_up, to_raw_undo_rate_round_down, to_raw_undo_rate_round_up,
    to_scaled18_apply_rate_round_down, to_scaled18_apply_rate_round_up,
};
use tracing::trace;

/// Highest swap fee a hook may return.
pub const MAX_FEE: U256 = U256([999_999_000_000_000_000, 0, 0, 0]);

/// A raw-amount swap between two pool token indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapInput {
    pub kind: SwapKind,
    pub amount_raw: U256,
    pub index_in: usize,
    pub index_out: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddLiquidityKind {
    /// Exact amounts in, BPT out computed.
    Unbalanced,
    /// Exact BPT out for a single token in, marked by the one nonzero
    /// entry of `max_amounts_in_raw`.
    SingleTokenExactOut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddLiquidityInput {
    pub kind: AddLiquidityKind,
    pub max_amounts_in_raw: Vec<U256>,
    pub min_bpt_amount_out_raw: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddLiquidityResult {
    pub bpt_amount_out_raw: U256,
    pub amounts_in_raw: Vec<U256>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveLiquidityKind {
    /// Exact BPT in for a single token out, marked by the one nonzero entry
    /// of `min_amounts_out_raw`.
    SingleTokenExactIn,
    /// Exact amount of a single token out, BPT in computed.
    SingleTokenExactOut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveLiquidityInput {
    pub kind: RemoveLiquidityKind,
    pub max_bpt_amount_in_raw: U256,
    pub min_amounts_out_raw: Vec<U256>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveLiquidityResult {
    pub bpt_amount_in_raw: U256,
    pub amounts_out_raw: Vec<U256>,
}

/// Direction of an ERC4626 buffer operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrappingDirection {
    /// underlying -> wrapped shares
    Wrap,
    /// wrapped shares -> underlying
    Unwrap,
}

/// Stateless settlement engine. Every call takes the pool state by reference
/// and leaves it untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Vault;

impl Vault {
    pub fn new() -> Self {
        Self
    }

    /// Raw amount out (given in) or raw amount in (given out).
    pub fn swap(
        &self,
        input: &SwapInput,
        state: &PoolState,
        curve: &dyn PoolCurve,
        hook: PoolHook<'_>,
    ) -> PoolResult<U256> {
        if input.amount_raw.is_zero() {
            return Ok(U256::zero());
        }
        let (i, o) = (input.index_in, input.index_out);

        let amount_given_scaled18 = match input.kind {
            SwapKind::GivenIn => to_scaled18_apply_rate_round_down(
                input.amount_raw,
                state.scaling_factors[i],
                state.token_rates[i],
            )?,
            SwapKind::GivenOut => to_scaled18_apply_rate_round_up(
                input.amount_raw,
                state.scaling_factors[o],
                compute_rate_round_up(state.token_rates[o])?,
            )?,
        };

        let mut params = SwapParams {
            kind: input.kind,
            amount_given_scaled18,
            balances_live_scaled18: &state.balances_live_scaled18,
            index_in: i,
            index_out: o,
        };

        let swap_fee = hook.compute_swap_fee(&params, state.swap_fee)?;
        if swap_fee > MAX_FEE {
            return Err(PoolError::SwapFeeTooHigh);
        }

        if input.kind == SwapKind::GivenIn {
            let fee_amount = amount_given_scaled18.mul_up(swap_fee)?;
            params.amount_given_scaled18 = amount_given_scaled18.try_sub(fee_amount)?;
        }

        let amount_calculated_scaled18 = curve.on_swap(&params)?;

        let amount_calculated_raw = match input.kind {
            SwapKind::GivenIn => to_raw_undo_rate_round_down(
                amount_calculated_scaled18,
                state.scaling_factors[o],
                state.token_rates[o],
            )?,
            SwapKind::GivenOut => {
                let fee_amount =
                    amount_calculated_scaled18.mul_div_up(swap_fee, swap_fee.complement())?;
                to_raw_undo_rate_round_up(
                    amount_calculated_scaled18.try_add(fee_amount)?,
                    state.scaling_factors[i],
                    compute_rate_round_up(state.token_rates[i])?,
                )?
            }
        };
        trace!(
            kind = %input.kind,
            amount = %input.amount_raw,
            calculated = %amount_calculated_raw,
            fee = %swap_fee,
            "Vault swap"
        );

        hook.after_swap(input.kind, amount_calculated_raw)
    }

    /// Largest raw amount the curve accepts on the given side of a swap.
    ///
    /// The exact-in bound is the curve's own, on the amount left after the
    /// swap fee. It is not grossed up by `1 / (1 - fee)`, so any gross
    /// amount up to it settles: routing stays short of the curve's edge by
    /// at most the fee.
    pub fn max_swap_amount(
        &self,
        kind: SwapKind,
        index_in: usize,
        index_out: usize,
        state: &PoolState,
        curve: &dyn PoolCurve,
    ) -> PoolResult<U256> {
        let limit_scaled18 =
            curve.max_swap_amount(kind, &state.balances_live_scaled18, index_in, index_out)?;
        match kind {
            SwapKind::GivenIn => Ok(to_raw_undo_rate_round_down(
                limit_scaled18,
                state.scaling_factors[index_in],
                state.token_rates[index_in],
            )?),
            SwapKind::GivenOut => {
                let sf = state.scaling_factors[index_out];
                let rate = state.token_rates[index_out];
                let raw = to_raw_undo_rate_round_down(limit_scaled18, sf, rate)?;
                // the swap scales exact-out amounts up, which may land past the limit
                let rescaled = to_scaled18_apply_rate_round_up(raw, sf, compute_rate_round_up(rate)?)?;
                if rescaled > limit_scaled18 {
                    Ok(raw.saturating_sub(U256::one()))
                } else {
                    Ok(raw)
                }
            }
        }
    }

    pub fn add_liquidity(
        &self,
        input: &AddLiquidityInput,
        state: &PoolState,
        curve: &dyn PoolCurve,
        hook: PoolHook<'_>,
    ) -> PoolResult<AddLiquidityResult> {
        if !state.supports_unbalanced_liquidity {
            return Err(PoolError::UnbalancedLiquidityDisabled);
        }
        if input.max_amounts_in_raw.len() != state.token_count() {
            return Err(PoolError::MissingData("amounts per token"));
        }

        let max_amounts_in_scaled18 = input
            .max_amounts_in_raw
            .iter()
            .enumerate()
            .map(|(i, amount)| {
                to_scaled18_apply_rate_round_down(
                    *amount,
                    state.scaling_factors[i],
                    state.token_rates[i],
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        let amounts: LiquidityAmounts = match input.kind {
            AddLiquidityKind::Unbalanced => compute_add_liquidity_unbalanced(
                &state.balances_live_scaled18,
                &max_amounts_in_scaled18,
                state.total_supply,
                state.swap_fee,
                curve,
            )?,
            AddLiquidityKind::SingleTokenExactOut => {
                let token_index = single_nonzero_index(&input.max_amounts_in_raw)?;
                compute_add_liquidity_single_token_exact_out(
                    &state.balances_live_scaled18,
                    token_index,
                    input.min_bpt_amount_out_raw,
                    state.total_supply,
                    state.swap_fee,
                    curve,
                )?
            }
        };

        let amounts_in_raw = amounts
            .amounts
            .iter()
            .enumerate()
            .map(|(i, amount)| {
                to_raw_undo_rate_round_up(
                    *amount,
                    state.scaling_factors[i],
                    compute_rate_round_up(state.token_rates[i])?,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(AddLiquidityResult {
            bpt_amount_out_raw: amounts.bpt_amount,
            amounts_in_raw: hook.after_add_liquidity(amounts_in_raw)?,
        })
    }

    pub fn remove_liquidity(
        &self,
        input: &RemoveLiquidityInput,
        state: &PoolState,
        curve: &dyn PoolCurve,
        hook: PoolHook<'_>,
    ) -> PoolResult<RemoveLiquidityResult> {
        if !state.supports_unbalanced_liquidity {
            return Err(PoolError::UnbalancedLiquidityDisabled);
        }
        if input.min_amounts_out_raw.len() != state.token_count() {
            return Err(PoolError::MissingData("amounts per token"));
        }
        hook.before_remove_liquidity()?;

        let token_index = single_nonzero_index(&input.min_amounts_out_raw)?;
        let amounts = match input.kind {
            RemoveLiquidityKind::SingleTokenExactIn => {
                compute_remove_liquidity_single_token_exact_in(
                    &state.balances_live_scaled18,
                    token_index,
                    input.max_bpt_amount_in_raw,
                    state.total_supply,
                    state.swap_fee,
                    curve,
                )?
            }
            RemoveLiquidityKind::SingleTokenExactOut => {
                let amount_out_scaled18 = to_scaled18_apply_rate_round_up(
                    input.min_amounts_out_raw[token_index],
                    state.scaling_factors[token_index],
                    compute_rate_round_up(state.token_rates[token_index])?,
                )?;
                compute_remove_liquidity_single_token_exact_out(
                    &state.balances_live_scaled18,
                    token_index,
                    amount_out_scaled18,
                    state.total_supply,
                    state.swap_fee,
                    curve,
                )?
            }
        };

        let amounts_out_raw = match input.kind {
            RemoveLiquidityKind::SingleTokenExactIn => amounts
                .amounts
                .iter()
                .enumerate()
                .map(|(i, amount)| {
                    to_raw_undo_rate_round_down(
                        *amount,
                        state.scaling_factors[i],
                        state.token_rates[i],
                    )
                })
                .collect::<Result<Vec<_>, _>>()?,
            // the exact amount asked for, not its rescaled image
            RemoveLiquidityKind::SingleTokenExactOut => {
                let mut out = vec![U256::zero(); state.token_count()];
                out[token_index] = input.min_amounts_out_raw[token_index];
                out
            }
        };

        Ok(RemoveLiquidityResult {
            bpt_amount_in_raw: amounts.bpt_amount,
            amounts_out_raw: hook.after_remove_liquidity(amounts_out_raw)?,
        })
    }

    /// ERC4626 preview of a buffer leg. `state` holds the wrapped token at
    /// index 0 with its share rate, and the underlying at index 1.
    pub fn erc4626_buffer_wrap_or_unwrap(
        &self,
        kind: SwapKind,
        direction: WrappingDirection,
        amount_raw: U256,
        state: &PoolState,
    ) -> PoolResult<U256> {
        if amount_raw.is_zero() {
            return Ok(U256::zero());
        }
        let (wrapped_factor, underlying_factor) = (state.scaling_factors[0], state.scaling_factors[1]);
        let rate = state.token_rates[0];
        let calculated = match (direction, kind) {
            // deposit: shares out for assets in
            (WrappingDirection::Wrap, SwapKind::GivenIn) => {
                let shares = to_scaled18_apply_rate_round_down(amount_raw, underlying_factor, ONE)?.div_down(rate)?;
                to_raw_undo_rate_round_down(shares, wrapped_factor, ONE)?
            }
            // mint: assets in for shares out
            (WrappingDirection::Wrap, SwapKind::GivenOut) => {
                let assets = to_scaled18_apply_rate_round_down(amount_raw, wrapped_factor, ONE)?.mul_up(rate)?;
                to_raw_undo_rate_round_up(assets, underlying_factor, ONE)?
            }
            // redeem: assets out for shares in
            (WrappingDirection::Unwrap, SwapKind::GivenIn) => {
                let assets = to_scaled18_apply_rate_round_down(amount_raw, wrapped_factor, ONE)?.mul_down(rate)?;
                to_raw_undo_rate_round_down(assets, underlying_factor, ONE)?
            }
            // withdraw: shares in for assets out
            (WrappingDirection::Unwrap, SwapKind::GivenOut) => {
                let shares = to_scaled18_apply_rate_round_down(amount_raw, underlying_factor, ONE)?.div_up(rate)?;
                to_raw_undo_rate_round_up(shares, wrapped_factor, ONE)?
            }
        };
        trace!(?direction, %kind, amount = %amount_raw, calculated = %calculated, "buffer leg");
        Ok(calculated)
    }

    /// BPT that may be burned single-sided before the curve's floor.
    pub fn max_single_sided_exit(&self, state: &PoolState, curve: &dyn PoolCurve) -> PoolResult<U256> {
        base_pool_math::max_single_sided_exit(state.total_supply, curve)
    }
}

fn single_nonzero_index(amounts: &[U256]) -> PoolResult<usize> {
    let mut nonzero = amounts.iter().enumerate().filter(|(_, a)| !a.is_zero());
    match (nonzero.next(), nonzero.next()) {
        (Some((index, _)), None) => Ok(index),
        _ => Err(PoolError::MissingData("exactly one token amount")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weighted::WeightedCurve;
    use sor_domain::enums::PoolType;
    use sor_domain::hooks::{HookState, HookType};
    use sor_domain::pool::PoolToken;
    use sor_domain::token::Token;

    fn e18(v: u64) -> U256 {
        U256::from(v) * ONE
    }

    fn state(swap_fee: U256) -> PoolState {
        let a = PoolToken::new(Token::new(1, "0xa", 18), e18(1000), 0, ONE).unwrap();
        let b = PoolToken::new(Token::new(1, "0xb", 18), e18(1000), 1, ONE).unwrap();
        PoolState::from_pool_tokens(PoolType::Weighted, &[a, b], swap_fee, e18(2000)).unwrap()
    }

    fn curve() -> WeightedCurve {
        WeightedCurve::new(vec![ONE / 2, ONE / 2]).unwrap()
    }

    fn swap(kind: SwapKind, amount: U256) -> SwapInput {
        SwapInput {
            kind,
            amount_raw: amount,
            index_in: 0,
            index_out: 1,
        }
    }

    #[test]
    fn test_zero_amount_is_zero() {
        let out = Vault::new()
            .swap(&swap(SwapKind::GivenIn, U256::zero()), &state(U256::zero()), &curve(), PoolHook::none())
            .unwrap();
        assert_eq!(out, U256::zero());
    }

    #[test]
    fn test_swap_given_in_50_50() {
        // 1000 * (1 - 1000 / 1010) = 9.90099009900990099
        let out = Vault::new()
            .swap(&swap(SwapKind::GivenIn, e18(10)), &state(U256::zero()), &curve(), PoolHook::none())
            .unwrap();
        assert!(out > U256::from(9_900_990_000_000_000_000u64));
        assert!(out < U256::from(9_900_991_000_000_000_000u64));
    }

    #[test]
    fn test_fee_reduces_output_and_grosses_up_input() {
        let fee = ONE / 100;
        let vault = Vault::new();
        let without = vault
            .swap(&swap(SwapKind::GivenIn, e18(10)), &state(U256::zero()), &curve(), PoolHook::none())
            .unwrap();
        let with = vault
            .swap(&swap(SwapKind::GivenIn, e18(10)), &state(fee), &curve(), PoolHook::none())
            .unwrap();
        assert!(with < without);

        let in_without = vault
            .swap(&swap(SwapKind::GivenOut, e18(10)), &state(U256::zero()), &curve(), PoolHook::none())
            .unwrap();
        let in_with = vault
            .swap(&swap(SwapKind::GivenOut, e18(10)), &state(fee), &curve(), PoolHook::none())
            .unwrap();
        // grossed up by 1 / 0.99
        assert!(in_with > in_without);
        assert!(in_with >= in_without.mul_down(ONE + ONE / 100).unwrap());
    }

    #[test]
    fn test_hook_fee_above_max_is_rejected() {
        let hook = PoolHook::new(Some(HookType::DirectionalFee), None);
        let state = state(U256::zero());
        // 1000 in then 1000 out: final 2000 vs 0 gives a 100% directional fee
        let err = Vault::new()
            .swap(&swap(SwapKind::GivenIn, e18(1000)), &state, &curve(), hook)
            .unwrap_err();
        assert_eq!(err, PoolError::SwapFeeTooHigh);
    }

    #[test]
    fn test_max_swap_amount_raw() {
        let a = PoolToken::new(Token::new(1, "0xa", 6), U256::from(1_000_000_000u64), 0, ONE).unwrap();
        let b = PoolToken::new(Token::new(1, "0xb", 18), e18(1000), 1, ONE).unwrap();
        let state = PoolState::from_pool_tokens(PoolType::Weighted, &[a, b], U256::zero(), e18(2000)).unwrap();
        let vault = Vault::new();
        // 30% of 1000 units of a 6-decimal token
        let max_in = vault.max_swap_amount(SwapKind::GivenIn, 0, 1, &state, &curve()).unwrap();
        assert_eq!(max_in, U256::from(300_000_000u64));
        let max_out = vault.max_swap_amount(SwapKind::GivenOut, 1, 0, &state, &curve()).unwrap();
        assert_eq!(max_out, U256::from(300_000_000u64));
    }

    #[test]
    fn test_add_and_remove_single_token() {
        let vault = Vault::new();
        let state = state(ONE / 1000);
        let add = vault
            .add_liquidity(
                &AddLiquidityInput {
                    kind: AddLiquidityKind::Unbalanced,
                    max_amounts_in_raw: vec![e18(10), U256::zero()],
                    min_bpt_amount_out_raw: U256::zero(),
                },
                &state,
                &curve(),
                PoolHook::none(),
            )
            .unwrap();
        // a one-sided 1% add on a 50/50 pool mints a bit under 0.5% of supply
        assert!(add.bpt_amount_out_raw < e18(10));
        assert!(add.bpt_amount_out_raw > e18(9));

        let remove = vault
            .remove_liquidity(
                &RemoveLiquidityInput {
                    kind: RemoveLiquidityKind::SingleTokenExactIn,
                    max_bpt_amount_in_raw: add.bpt_amount_out_raw,
                    min_amounts_out_raw: vec![U256::one(), U256::zero()],
                },
                &state,
                &curve(),
                PoolHook::none(),
            )
            .unwrap();
        assert!(remove.amounts_out_raw[0] < e18(10));
        assert_eq!(remove.amounts_out_raw[1], U256::zero());
    }

    #[test]
    fn test_unbalanced_disabled() {
        let mut state = state(U256::zero());
        state.supports_unbalanced_liquidity = false;
        let err = Vault::new()
            .add_liquidity(
                &AddLiquidityInput {
                    kind: AddLiquidityKind::Unbalanced,
                    max_amounts_in_raw: vec![e18(1), U256::zero()],
                    min_bpt_amount_out_raw: U256::zero(),
                },
                &state,
                &curve(),
                PoolHook::none(),
            )
            .unwrap_err();
        assert_eq!(err, PoolError::UnbalancedLiquidityDisabled);
    }

    #[test]
    fn test_exit_fee_hook_blocks_removal() {
        let exit = HookState::ExitFee {
            remove_liquidity_fee: ONE / 100,
        };
        let err = Vault::new()
            .remove_liquidity(
                &RemoveLiquidityInput {
                    kind: RemoveLiquidityKind::SingleTokenExactOut,
                    max_bpt_amount_in_raw: U256::MAX,
                    min_amounts_out_raw: vec![e18(1), U256::zero()],
                },
                &state(U256::zero()),
                &curve(),
                PoolHook::new(Some(HookType::ExitFee), Some(&exit)),
            )
            .unwrap_err();
        assert!(err.is_infeasible());
    }
}
