//! StableSwap invariant math.
//!
//! Amplification carries three decimals (`AMP_PRECISION`). Balances are live
//! 18-decimal values. The BPT helpers at the bottom price joins and exits of
//! legacy composable pools, whose share token trades like any other token.

use crate::error::{PoolError, PoolResult};
use primitive_types::U256;
use sor_domain::error::MathError;
use sor_domain::math::{FixedPoint, ONE};

pub const AMP_PRECISION: U256 = U256([1_000, 0, 0, 0]);
/// Invariant may shrink to 60% in a single liquidity operation.
pub const MIN_INVARIANT_RATIO: U256 = U256([600_000_000_000_000_000, 0, 0, 0]);
/// Invariant may grow to 500% in a single liquidity operation.
pub const MAX_INVARIANT_RATIO: U256 = U256([5_000_000_000_000_000_000, 0, 0, 0]);

const MAX_ITERATIONS: usize = 255;

fn converged(current: U256, previous: U256) -> bool {
    if current > previous {
        current - previous <= U256::one()
    } else {
        previous - current <= U256::one()
    }
}

/// Newton iteration for the StableSwap invariant `D`.
pub fn compute_invariant(amp: U256, balances: &[U256]) -> PoolResult<U256> {
    let sum = balances
        .iter()
        .try_fold(U256::zero(), |acc, b| acc.try_add(*b))?;
    if sum.is_zero() {
        return Ok(U256::zero());
    }

    let num_tokens = U256::from(balances.len());
    let amp_times_total = amp.try_mul(num_tokens)?;
    let mut invariant = sum;

    for _ in 0..MAX_ITERATIONS {
        let mut d_p = invariant;
        for balance in balances {
            d_p = d_p.try_mul(invariant)?.try_div(balance.try_mul(num_tokens)?)?;
        }

        let previous = invariant;
        let numerator = amp_times_total
            .try_mul(sum)?
            .try_div(AMP_PRECISION)?
            .try_add(d_p.try_mul(num_tokens)?)?
            .try_mul(invariant)?;
        let denominator = amp_times_total
            .try_sub(AMP_PRECISION)?
            .try_mul(invariant)?
            .try_div(AMP_PRECISION)?
            .try_add(num_tokens.try_add(U256::one())?.try_mul(d_p)?)?;
        invariant = numerator.try_div(denominator)?;

        if converged(invariant, previous) {
            return Ok(invariant);
        }
    }
    Err(MathError::NotConverged("stable invariant").into())
}

/// Balance of `token_index` that keeps the invariant at `invariant` given
/// every other balance.
pub fn compute_balance(
    amp: U256,
    balances: &[U256],
    invariant: U256,
    token_index: usize,
) -> PoolResult<U256> {
    let num_tokens = U256::from(balances.len());
    let amp_times_total = amp.try_mul(num_tokens)?;

    let mut sum = balances[0];
    let mut p_d = balances[0].try_mul(num_tokens)?;
    for balance in &balances[1..] {
        p_d = p_d
            .try_mul(*balance)?
            .try_mul(num_tokens)?
            .try_div(invariant)?;
        sum = sum.try_add(*balance)?;
    }
    sum = sum.try_sub(balances[token_index])?;

    let invariant_squared = invariant.try_mul(invariant)?;
    let c = invariant_squared
        .try_mul(AMP_PRECISION)?
        .div_up_raw(amp_times_total.try_mul(p_d)?)?
        .try_mul(balances[token_index])?;
    let b = sum.try_add(invariant.try_mul(AMP_PRECISION)?.try_div(amp_times_total)?)?;

    let mut token_balance = invariant_squared
        .try_add(c)?
        .div_up_raw(invariant.try_add(b)?)?;

    for _ in 0..MAX_ITERATIONS {
        let previous = token_balance;
        let numerator = token_balance.try_mul(token_balance)?.try_add(c)?;
        let denominator = token_balance
            .try_mul(U256::from(2u64))?
            .try_add(b)?
            .try_sub(invariant)?;
        token_balance = numerator.div_up_raw(denominator)?;

        if converged(token_balance, previous) {
            return Ok(token_balance);
        }
    }
    Err(MathError::NotConverged("stable balance").into())
}

/// Amount out for an exact amount in, one wei in the pool's favour.
pub fn compute_out_given_exact_in(
    amp: U256,
    balances: &[U256],
    index_in: usize,
    index_out: usize,
    amount_in: U256,
    invariant: U256,
) -> PoolResult<U256> {
    let mut updated = balances.to_vec();
    updated[index_in] = updated[index_in].try_add(amount_in)?;
    let final_balance_out = compute_balance(amp, &updated, invariant, index_out)?;
    balances[index_out]
        .checked_sub(final_balance_out)
        .and_then(|v| v.checked_sub(U256::one()))
        .ok_or(PoolError::AmountOutExceedsBalance)
}

/// Amount in for an exact amount out, one wei in the pool's favour.
pub fn compute_in_given_exact_out(
    amp: U256,
    balances: &[U256],
    index_in: usize,
    index_out: usize,
    amount_out: U256,
    invariant: U256,
) -> PoolResult<U256> {
    let mut updated = balances.to_vec();
    updated[index_out] = updated[index_out]
        .checked_sub(amount_out)
        .ok_or(PoolError::AmountOutExceedsBalance)?;
    let final_balance_in = compute_balance(amp, &updated, invariant, index_in)?;
    Ok(final_balance_in
        .try_sub(balances[index_in])?
        .try_add(U256::one())?)
}

fn sum_of(balances: &[U256]) -> PoolResult<U256> {
    Ok(balances
        .iter()
        .try_fold(U256::zero(), |acc, b| acc.try_add(*b))?)
}

/// BPT minted for exact token amounts in; fees only on the part of each
/// amount above the proportional join.
pub fn bpt_out_given_exact_tokens_in(
    amp: U256,
    balances: &[U256],
    amounts_in: &[U256],
    bpt_total_supply: U256,
    current_invariant: U256,
    swap_fee: U256,
) -> PoolResult<U256> {
    let sum_balances = sum_of(balances)?;

    let mut balance_ratios_with_fee = Vec::with_capacity(balances.len());
    let mut invariant_ratio_with_fees = U256::zero();
    for (balance, amount) in balances.iter().zip(amounts_in) {
        let current_weight = balance.div_down(sum_balances)?;
        let ratio = balance.try_add(*amount)?.div_down(*balance)?;
        invariant_ratio_with_fees = invariant_ratio_with_fees.try_add(ratio.mul_down(current_weight)?)?;
        balance_ratios_with_fee.push(ratio);
    }

    let mut new_balances = Vec::with_capacity(balances.len());
    for (i, (balance, amount)) in balances.iter().zip(amounts_in).enumerate() {
        let amount_without_fee = if balance_ratios_with_fee[i] > invariant_ratio_with_fees {
            let non_taxable = if invariant_ratio_with_fees > ONE {
                balance.mul_down(invariant_ratio_with_fees - ONE)?
            } else {
                U256::zero()
            };
            let taxable = amount.try_sub(non_taxable)?;
            non_taxable.try_add(taxable.mul_down(swap_fee.complement())?)?
        } else {
            *amount
        };
        new_balances.push(balance.try_add(amount_without_fee)?);
    }

    let new_invariant = compute_invariant(amp, &new_balances)?;
    let invariant_ratio = new_invariant.div_down(current_invariant)?;
    if invariant_ratio > ONE {
        Ok(bpt_total_supply.mul_down(invariant_ratio - ONE)?)
    } else {
        Ok(U256::zero())
    }
}

/// Token amount in to mint exactly `bpt_amount_out`.
pub fn token_in_given_exact_bpt_out(
    amp: U256,
    balances: &[U256],
    token_index: usize,
    bpt_amount_out: U256,
    bpt_total_supply: U256,
    current_invariant: U256,
    swap_fee: U256,
) -> PoolResult<U256> {
    let new_invariant = bpt_total_supply
        .try_add(bpt_amount_out)?
        .div_up(bpt_total_supply)?
        .mul_up(current_invariant)?;
    let new_balance = compute_balance(amp, balances, new_invariant, token_index)?;
    let amount_in_without_fee = new_balance.try_sub(balances[token_index])?;

    let current_weight = balances[token_index].div_down(sum_of(balances)?)?;
    let taxable_percentage = current_weight.complement();
    let taxable = amount_in_without_fee.mul_up(taxable_percentage)?;
    let non_taxable = amount_in_without_fee.try_sub(taxable)?;

    Ok(non_taxable.try_add(taxable.div_up(swap_fee.complement())?)?)
}

/// BPT burned to withdraw exact token amounts.
pub fn bpt_in_given_exact_tokens_out(
    amp: U256,
    balances: &[U256],
    amounts_out: &[U256],
    bpt_total_supply: U256,
    current_invariant: U256,
    swap_fee: U256,
) -> PoolResult<U256> {
    let sum_balances = sum_of(balances)?;

    let mut balance_ratios_without_fee = Vec::with_capacity(balances.len());
    let mut invariant_ratio_without_fees = U256::zero();
    for (balance, amount) in balances.iter().zip(amounts_out) {
        let current_weight = balance.div_up(sum_balances)?;
        let remaining = balance
            .checked_sub(*amount)
            .ok_or(PoolError::AmountOutExceedsBalance)?;
        let ratio = remaining.div_up(*balance)?;
        invariant_ratio_without_fees =
            invariant_ratio_without_fees.try_add(ratio.mul_up(current_weight)?)?;
        balance_ratios_without_fee.push(ratio);
    }

    let mut new_balances = Vec::with_capacity(balances.len());
    for (i, (balance, amount)) in balances.iter().zip(amounts_out).enumerate() {
        let amount_with_fee = if invariant_ratio_without_fees > balance_ratios_without_fee[i] {
            let non_taxable = balance.mul_down(invariant_ratio_without_fees.complement())?;
            let taxable = amount.try_sub(non_taxable)?;
            non_taxable.try_add(taxable.div_up(swap_fee.complement())?)?
        } else {
            *amount
        };
        new_balances.push(
            balance
                .checked_sub(amount_with_fee)
                .ok_or(PoolError::AmountOutExceedsBalance)?,
        );
    }

    let new_invariant = compute_invariant(amp, &new_balances)?;
    let invariant_ratio = new_invariant.div_down(current_invariant)?;
    Ok(bpt_total_supply.mul_up(invariant_ratio.complement())?)
}

/// Token amount out for burning exactly `bpt_amount_in`.
pub fn token_out_given_exact_bpt_in(
    amp: U256,
    balances: &[U256],
    token_index: usize,
    bpt_amount_in: U256,
    bpt_total_supply: U256,
    current_invariant: U256,
    swap_fee: U256,
) -> PoolResult<U256> {
    let new_invariant = bpt_total_supply
        .try_sub(bpt_amount_in)?
        .div_up(bpt_total_supply)?
        .mul_up(current_invariant)?;
    let new_balance = compute_balance(amp, balances, new_invariant, token_index)?;
    let amount_out_without_fee = balances[token_index].try_sub(new_balance)?;

    let current_weight = balances[token_index].div_down(sum_of(balances)?)?;
    let taxable_percentage = current_weight.complement();
    let taxable = amount_out_without_fee.mul_up(taxable_percentage)?;
    let non_taxable = amount_out_without_fee.try_sub(taxable)?;

    Ok(non_taxable.try_add(taxable.mul_down(swap_fee.complement())?)?)
}
