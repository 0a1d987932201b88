//! Hook callbacks applied by the vault around swaps and liquidity operations.

use crate::error::{PoolError, PoolResult};
use crate::stable::math as stable_math;
use crate::vault::curve::SwapParams;
use crate::weighted::math as weighted_math;
use primitive_types::U256;
use sor_domain::enums::SwapKind;
use sor_domain::hooks::{HookState, HookType};
use sor_domain::math::{FixedPoint, ONE};

/// The hook attached to a pool: its kind plus any resolved parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct PoolHook<'a> {
    pub hook_type: Option<HookType>,
    pub state: Option<&'a HookState>,
}

impl<'a> PoolHook<'a> {
    pub fn new(hook_type: Option<HookType>, state: Option<&'a HookState>) -> Self {
        Self { hook_type, state }
    }

    pub fn none() -> Self {
        Self::default()
    }

    /// Swap fee for this swap, `static_fee` when the hook has no opinion.
    pub fn compute_swap_fee(&self, params: &SwapParams<'_>, static_fee: U256) -> PoolResult<U256> {
        match (self.hook_type, self.state) {
            (Some(HookType::DirectionalFee), _) => directional_fee(params, static_fee),
            (
                _,
                Some(HookState::StableSurge {
                    amp,
                    surge_threshold,
                    max_surge_fee,
                }),
            ) => stable_surge_fee(params, static_fee, *amp, *surge_threshold, *max_surge_fee),
            (
                _,
                Some(HookState::Akron {
                    weights,
                    minimum_swap_fee,
                }),
            ) => akron_fee(params, weights, *minimum_swap_fee),
            _ => Ok(static_fee),
        }
    }

    /// Adjusts the raw calculated amount of a swap after settlement.
    pub fn after_swap(&self, kind: SwapKind, amount_calculated_raw: U256) -> PoolResult<U256> {
        let Some(HookState::FeeTaking { swap_fee, .. }) = self.state else {
            return Ok(amount_calculated_raw);
        };
        let hook_fee = amount_calculated_raw.mul_down(*swap_fee)?;
        Ok(match kind {
            SwapKind::GivenIn => amount_calculated_raw.try_sub(hook_fee)?,
            SwapKind::GivenOut => amount_calculated_raw.try_add(hook_fee)?,
        })
    }

    /// Adjusts raw amounts in after an add.
    pub fn after_add_liquidity(&self, amounts_in_raw: Vec<U256>) -> PoolResult<Vec<U256>> {
        let Some(HookState::FeeTaking {
            add_liquidity_fee, ..
        }) = self.state
        else {
            return Ok(amounts_in_raw);
        };
        amounts_in_raw
            .into_iter()
            .map(|amount| -> PoolResult<U256> {
                Ok(amount.try_add(amount.mul_down(*add_liquidity_fee)?)?)
            })
            .collect()
    }

    /// Gate for single-token removals.
    pub fn before_remove_liquidity(&self) -> PoolResult<()> {
        if let Some(HookState::ExitFee { .. }) = self.state {
            return Err(PoolError::HookAdjustmentFailed(
                "exit fee only supports proportional removal",
            ));
        }
        Ok(())
    }

    /// Adjusts raw amounts out after a removal.
    pub fn after_remove_liquidity(&self, amounts_out_raw: Vec<U256>) -> PoolResult<Vec<U256>> {
        let Some(HookState::FeeTaking {
            remove_liquidity_fee,
            ..
        }) = self.state
        else {
            return Ok(amounts_out_raw);
        };
        amounts_out_raw
            .into_iter()
            .map(|amount| -> PoolResult<U256> {
                Ok(amount.try_sub(amount.mul_down(*remove_liquidity_fee)?)?)
            })
            .collect()
    }
}

/// Charges swaps that push the pool away from balance in proportion to the
/// resulting imbalance between the two sides.
fn directional_fee(params: &SwapParams<'_>, static_fee: U256) -> PoolResult<U256> {
    let balances = params.balances_live_scaled18;
    let final_in = balances[params.index_in].try_add(params.amount_given_scaled18)?;
    let final_out = balances[params.index_out].saturating_sub(params.amount_given_scaled18);

    if final_in <= final_out {
        return Ok(static_fee);
    }
    let fee = (final_in - final_out).div_down(final_in.try_add(final_out)?)?;
    Ok(fee.max(static_fee))
}

fn stable_surge_fee(
    params: &SwapParams<'_>,
    static_fee: U256,
    amp: U256,
    surge_threshold: U256,
    max_surge_fee: U256,
) -> PoolResult<U256> {
    let balances = params.balances_live_scaled18;
    let invariant = stable_math::compute_invariant(amp, balances)?;

    let mut new_balances = balances.to_vec();
    match params.kind {
        SwapKind::GivenIn => {
            let out = stable_math::compute_out_given_exact_in(
                amp,
                balances,
                params.index_in,
                params.index_out,
                params.amount_given_scaled18,
                invariant,
            )?;
            new_balances[params.index_in] =
                new_balances[params.index_in].try_add(params.amount_given_scaled18)?;
            new_balances[params.index_out] = new_balances[params.index_out].try_sub(out)?;
        }
        SwapKind::GivenOut => {
            let amount_in = stable_math::compute_in_given_exact_out(
                amp,
                balances,
                params.index_in,
                params.index_out,
                params.amount_given_scaled18,
                invariant,
            )?;
            new_balances[params.index_in] = new_balances[params.index_in].try_add(amount_in)?;
            new_balances[params.index_out] =
                new_balances[params.index_out].try_sub(params.amount_given_scaled18)?;
        }
    }

    let new_imbalance = imbalance(&new_balances)?;
    let old_imbalance = imbalance(balances)?;
    if new_imbalance.is_zero() || new_imbalance <= old_imbalance || new_imbalance <= surge_threshold
    {
        return Ok(static_fee);
    }

    let surge = max_surge_fee
        .saturating_sub(static_fee)
        .mul_down((new_imbalance - surge_threshold).div_down(surge_threshold.complement())?)?;
    Ok(static_fee.try_add(surge)?)
}

/// Sum of absolute deviations from the median over the sum of balances.
fn imbalance(balances: &[U256]) -> PoolResult<U256> {
    let mut sorted = balances.to_vec();
    sorted.sort();
    let n = sorted.len();
    if n == 0 {
        return Ok(U256::zero());
    }
    let median = if n % 2 == 1 {
        sorted[n / 2]
    } else {
        sorted[n / 2 - 1].try_add(sorted[n / 2])? / 2
    };

    let mut total_balance = U256::zero();
    let mut total_diff = U256::zero();
    for balance in balances {
        total_balance = total_balance.try_add(*balance)?;
        let diff = if *balance > median {
            *balance - median
        } else {
            median - *balance
        };
        total_diff = total_diff.try_add(diff)?;
    }
    if total_balance.is_zero() {
        return Ok(U256::zero());
    }
    Ok(total_diff.div_down(total_balance)?)
}

/// Fee that captures the price impact of the swap itself, so that the
/// marginal price after the trade is what the trader pays on average.
fn akron_fee(params: &SwapParams<'_>, weights: &[U256], minimum_swap_fee: U256) -> PoolResult<U256> {
    let balances = params.balances_live_scaled18;
    let weight_in = *weights
        .get(params.index_in)
        .ok_or(PoolError::MissingData("akron weight"))?;
    let weight_out = *weights
        .get(params.index_out)
        .ok_or(PoolError::MissingData("akron weight"))?;
    let balance_in = balances[params.index_in];
    let balance_out = balances[params.index_out];

    let (amount_in, amount_out) = match params.kind {
        SwapKind::GivenIn => {
            let out = weighted_math::compute_out_given_exact_in(
                balance_in,
                weight_in,
                balance_out,
                weight_out,
                params.amount_given_scaled18,
            )?;
            (params.amount_given_scaled18, out)
        }
        SwapKind::GivenOut => {
            let amount_in = weighted_math::compute_in_given_exact_out(
                balance_in,
                weight_in,
                balance_out,
                weight_out,
                params.amount_given_scaled18,
            )?;
            (amount_in, params.amount_given_scaled18)
        }
    };
    if amount_out.is_zero() {
        return Ok(minimum_swap_fee);
    }

    let spot_after = balance_out
        .try_sub(amount_out)?
        .div_down(weight_out)?
        .div_down(balance_in.try_add(amount_in)?.div_up(weight_in)?)?;
    let fee = amount_in.mul_down(spot_after)?.div_down(amount_out)?;
    let fee = if fee >= ONE { U256::zero() } else { fee.complement() };
    Ok(fee.max(minimum_swap_fee))
}
