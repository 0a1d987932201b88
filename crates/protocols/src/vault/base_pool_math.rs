//! Add/remove liquidity math shared by every vault pool.
//!
//! All amounts are live 18-decimal values. Swap fees are charged on the
//! non-proportional part of single-sided and unbalanced operations.

use crate::error::{PoolError, PoolResult};
use crate::vault::curve::PoolCurve;
use primitive_types::U256;
use sor_domain::enums::Rounding;
use sor_domain::math::{FixedPoint, ONE};

/// Result of a liquidity computation: BPT amount and per-token amounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiquidityAmounts {
    pub bpt_amount: U256,
    pub amounts: Vec<U256>,
    pub swap_fee_amounts: Vec<U256>,
}

fn ensure_ratio_below_max(curve: &dyn PoolCurve, invariant_ratio: U256) -> PoolResult<()> {
    if invariant_ratio > curve.maximum_invariant_ratio() {
        return Err(PoolError::InvariantRatioAboveMax);
    }
    Ok(())
}

fn ensure_ratio_above_min(curve: &dyn PoolCurve, invariant_ratio: U256) -> PoolResult<()> {
    if invariant_ratio < curve.minimum_invariant_ratio() {
        return Err(PoolError::InvariantRatioBelowMin);
    }
    Ok(())
}

/// BPT out for arbitrary exact amounts in.
pub fn compute_add_liquidity_unbalanced(
    current_balances: &[U256],
    exact_amounts: &[U256],
    total_supply: U256,
    swap_fee: U256,
    curve: &dyn PoolCurve,
) -> PoolResult<LiquidityAmounts> {
    let mut new_balances = Vec::with_capacity(current_balances.len());
    for (balance, amount) in current_balances.iter().zip(exact_amounts) {
        // one wei less, to stay conservative
        new_balances.push(balance.try_add(*amount)?.try_sub(U256::one())?);
    }

    let current_invariant = curve.compute_invariant(current_balances, Rounding::Up)?;
    let new_invariant = curve.compute_invariant(&new_balances, Rounding::Down)?;
    let invariant_ratio = new_invariant.div_down(current_invariant)?;
    ensure_ratio_below_max(curve, invariant_ratio)?;

    let mut swap_fee_amounts = vec![U256::zero(); current_balances.len()];
    for (i, balance) in current_balances.iter().enumerate() {
        let proportional = invariant_ratio.mul_down(*balance)?;
        if new_balances[i] > proportional {
            let taxable = new_balances[i] - proportional;
            swap_fee_amounts[i] = taxable.mul_up(swap_fee)?;
            new_balances[i] = new_balances[i].try_sub(swap_fee_amounts[i])?;
        }
    }

    let invariant_with_fees = curve.compute_invariant(&new_balances, Rounding::Down)?;
    let growth = invariant_with_fees.saturating_sub(current_invariant);
    let bpt_amount_out = total_supply.try_mul(growth)?.try_div(current_invariant)?;

    Ok(LiquidityAmounts {
        bpt_amount: bpt_amount_out,
        amounts: exact_amounts.to_vec(),
        swap_fee_amounts,
    })
}

/// Token amount in needed to mint exactly `exact_bpt_amount_out`.
pub fn compute_add_liquidity_single_token_exact_out(
    current_balances: &[U256],
    token_in_index: usize,
    exact_bpt_amount_out: U256,
    total_supply: U256,
    swap_fee: U256,
    curve: &dyn PoolCurve,
) -> PoolResult<LiquidityAmounts> {
    let new_supply = exact_bpt_amount_out.try_add(total_supply)?;
    let invariant_ratio = new_supply.div_up(total_supply)?;
    ensure_ratio_below_max(curve, invariant_ratio)?;

    let balance = current_balances[token_in_index];
    let new_balance = curve.compute_balance(current_balances, token_in_index, invariant_ratio)?;
    let amount_in = new_balance.try_sub(balance)?;

    let non_taxable_balance = new_supply.mul_div_up(balance, total_supply)?;
    let taxable = new_balance.saturating_sub(non_taxable_balance);
    let fee = taxable.div_up(swap_fee.complement())?.try_sub(taxable)?;

    let mut amounts = vec![U256::zero(); current_balances.len()];
    let mut swap_fee_amounts = vec![U256::zero(); current_balances.len()];
    amounts[token_in_index] = amount_in.try_add(fee)?;
    swap_fee_amounts[token_in_index] = fee;

    Ok(LiquidityAmounts {
        bpt_amount: exact_bpt_amount_out,
        amounts,
        swap_fee_amounts,
    })
}

/// Token amount out for burning exactly `exact_bpt_amount_in`.
pub fn compute_remove_liquidity_single_token_exact_in(
    current_balances: &[U256],
    token_out_index: usize,
    exact_bpt_amount_in: U256,
    total_supply: U256,
    swap_fee: U256,
    curve: &dyn PoolCurve,
) -> PoolResult<LiquidityAmounts> {
    let new_supply = total_supply.try_sub(exact_bpt_amount_in)?;
    let invariant_ratio = new_supply.div_up(total_supply)?;
    ensure_ratio_above_min(curve, invariant_ratio)?;

    let balance = current_balances[token_out_index];
    let new_balance = curve.compute_balance(current_balances, token_out_index, invariant_ratio)?;
    let amount_out = balance.try_sub(new_balance)?;

    let new_balance_before_tax = new_supply.mul_div_up(balance, total_supply)?;
    let taxable = new_balance_before_tax.saturating_sub(new_balance);
    let fee = taxable.mul_up(swap_fee)?;

    let mut amounts = vec![U256::zero(); current_balances.len()];
    let mut swap_fee_amounts = vec![U256::zero(); current_balances.len()];
    amounts[token_out_index] = amount_out.try_sub(fee)?;
    swap_fee_amounts[token_out_index] = fee;

    Ok(LiquidityAmounts {
        bpt_amount: exact_bpt_amount_in,
        amounts,
        swap_fee_amounts,
    })
}

/// BPT in needed to withdraw exactly `exact_amount_out` of one token.
pub fn compute_remove_liquidity_single_token_exact_out(
    current_balances: &[U256],
    token_out_index: usize,
    exact_amount_out: U256,
    total_supply: U256,
    swap_fee: U256,
    curve: &dyn PoolCurve,
) -> PoolResult<LiquidityAmounts> {
    let mut new_balances = current_balances.to_vec();
    new_balances[token_out_index] = current_balances[token_out_index]
        .checked_sub(exact_amount_out)
        .ok_or(PoolError::AmountOutExceedsBalance)?;

    let current_invariant = curve.compute_invariant(current_balances, Rounding::Up)?;
    let invariant_ratio = curve
        .compute_invariant(&new_balances, Rounding::Up)?
        .div_up(current_invariant)?;
    ensure_ratio_above_min(curve, invariant_ratio)?;

    let taxable = invariant_ratio
        .mul_up(current_balances[token_out_index])?
        .saturating_sub(new_balances[token_out_index]);
    let fee = taxable.div_up(swap_fee.complement())?.try_sub(taxable)?;
    new_balances[token_out_index] = new_balances[token_out_index]
        .checked_sub(fee)
        .ok_or(PoolError::AmountOutExceedsBalance)?;

    let invariant_with_fees = curve.compute_invariant(&new_balances, Rounding::Down)?;
    let burned = current_invariant.saturating_sub(invariant_with_fees);
    let bpt_amount_in = total_supply.mul_div_up(burned, current_invariant)?;

    let mut amounts = vec![U256::zero(); current_balances.len()];
    let mut swap_fee_amounts = vec![U256::zero(); current_balances.len()];
    amounts[token_out_index] = exact_amount_out;
    swap_fee_amounts[token_out_index] = fee;

    Ok(LiquidityAmounts {
        bpt_amount: bpt_amount_in,
        amounts,
        swap_fee_amounts,
    })
}

/// Half of the BPT that can be burned before hitting the minimum invariant
/// ratio; the exit size the router is allowed to try single-sided.
pub fn max_single_sided_exit(total_supply: U256, curve: &dyn PoolCurve) -> PoolResult<U256> {
    let headroom = ONE.saturating_sub(curve.minimum_invariant_ratio());
    Ok(total_supply.mul_down(headroom)? / 2)
}
