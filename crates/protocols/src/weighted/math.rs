//! Constant weighted product math.

use crate::error::{PoolError, PoolResult};
use primitive_types::U256;
use sor_domain::math::{FixedPoint, ONE};

/// 30% of the balance in.
pub const MAX_IN_RATIO: U256 = U256([300_000_000_000_000_000, 0, 0, 0]);
/// 30% of the balance out.
pub const MAX_OUT_RATIO: U256 = U256([300_000_000_000_000_000, 0, 0, 0]);
/// Invariant may shrink to 70% in a single liquidity operation.
pub const MIN_INVARIANT_RATIO: U256 = U256([700_000_000_000_000_000, 0, 0, 0]);
/// Invariant may grow to 300% in a single liquidity operation.
pub const MAX_INVARIANT_RATIO: U256 = U256([3_000_000_000_000_000_000, 0, 0, 0]);

/// `prod(balance_i ^ weight_i)`, rounded down.
pub fn compute_invariant_down(weights: &[U256], balances: &[U256]) -> PoolResult<U256> {
    let mut invariant = ONE;
    for (weight, balance) in weights.iter().zip(balances) {
        invariant = invariant.mul_down(balance.pow_down(*weight)?)?;
    }
    if invariant.is_zero() {
        return Err(PoolError::UnsupportedOperation("zero invariant"));
    }
    Ok(invariant)
}

/// `prod(balance_i ^ weight_i)`, rounded up.
pub fn compute_invariant_up(weights: &[U256], balances: &[U256]) -> PoolResult<U256> {
    let mut invariant = ONE;
    for (weight, balance) in weights.iter().zip(balances) {
        invariant = invariant.mul_up(balance.pow_up(*weight)?)?;
    }
    if invariant.is_zero() {
        return Err(PoolError::UnsupportedOperation("zero invariant"));
    }
    Ok(invariant)
}

/// New balance of one token after scaling the invariant by `invariant_ratio`.
pub fn compute_balance_out_given_invariant(
    current_balance: U256,
    weight: U256,
    invariant_ratio: U256,
) -> PoolResult<U256> {
    // round the exponent in whichever direction makes the result larger
    let exponent = if invariant_ratio > ONE {
        ONE.div_up(weight)?
    } else {
        ONE.div_down(weight)?
    };
    let balance_ratio = invariant_ratio.pow_up(exponent)?;
    Ok(current_balance.mul_up(balance_ratio)?)
}

/// `b_out * (1 - (b_in / (b_in + a_in)) ^ (w_in / w_out))`
pub fn compute_out_given_exact_in(
    balance_in: U256,
    weight_in: U256,
    balance_out: U256,
    weight_out: U256,
    amount_in: U256,
) -> PoolResult<U256> {
    if amount_in > balance_in.mul_down(MAX_IN_RATIO)? {
        return Err(PoolError::MaxInRatio);
    }
    let denominator = balance_in.try_add(amount_in)?;
    let base = balance_in.div_up(denominator)?;
    let exponent = weight_in.div_down(weight_out)?;
    let power = base.pow_up(exponent)?;
    Ok(balance_out.mul_down(power.complement())?)
}

/// `b_in * ((b_out / (b_out - a_out)) ^ (w_out / w_in) - 1)`
pub fn compute_in_given_exact_out(
    balance_in: U256,
    weight_in: U256,
    balance_out: U256,
    weight_out: U256,
    amount_out: U256,
) -> PoolResult<U256> {
    if amount_out > balance_out.mul_down(MAX_OUT_RATIO)? {
        return Err(PoolError::MaxOutRatio);
    }
    let base = balance_out.div_up(balance_out.try_sub(amount_out)?)?;
    let exponent = weight_out.div_up(weight_in)?;
    let power = base.pow_up(exponent)?;
    let ratio = power.try_sub(ONE)?;
    Ok(balance_in.mul_up(ratio)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn e18(v: u64) -> U256 {
        U256::from(v) * ONE
    }

    fn half() -> U256 {
        ONE / 2
    }

    #[test]
    fn test_out_given_in_equal_weights() {
        // 1000 * (1 - 1000/1010) with 1000/1010 rounded up
        // = 1000 * 0.009900990099009900 = 9.9009900990099
        let out = compute_out_given_exact_in(e18(1000), half(), e18(1000), half(), e18(10)).unwrap();
        assert_eq!(out, U256::from(9_900_990_099_009_900_000u128));
    }

    #[test]
    fn test_in_given_out_equal_weights() {
        // 1000 * (1000/990 - 1) = 10.10101010101010...
        let amount_in =
            compute_in_given_exact_out(e18(1000), half(), e18(1000), half(), e18(10)).unwrap();
        assert_eq!(amount_in, U256::from(10_101_010_101_010_102_000u128));
    }

    #[test]
    fn test_ratio_limits() {
        let err = compute_out_given_exact_in(e18(1000), half(), e18(1000), half(), e18(301));
        assert_eq!(err, Err(PoolError::MaxInRatio));
        let err = compute_in_given_exact_out(e18(1000), half(), e18(1000), half(), e18(301));
        assert_eq!(err, Err(PoolError::MaxOutRatio));
    }

    #[test]
    fn test_invariant_brackets() {
        // 80/20 pool: 100^0.8 * 400^0.2 = 131.950791077...
        let weights = [U256::from(800_000_000_000_000_000u64), U256::from(200_000_000_000_000_000u64)];
        let balances = [e18(100), e18(400)];
        let down = compute_invariant_down(&weights, &balances).unwrap();
        let up = compute_invariant_up(&weights, &balances).unwrap();
        assert!(down < up);
        let approx = U256::from(131_950_791_077_289_000_000u128);
        assert!(down < approx + e18(1) / 1000 && up > approx - e18(1) / 1000);
    }

    #[test]
    fn test_balance_given_invariant() {
        // 50/50: doubling the invariant quadruples the balance
        let balance = compute_balance_out_given_invariant(e18(10), half(), e18(2)).unwrap();
        assert_eq!(balance, e18(40));
    }
}
