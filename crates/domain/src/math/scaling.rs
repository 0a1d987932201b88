//! Conversions between raw token amounts, 18-decimal live amounts and
//! human-readable decimals.

use crate::error::{MathError, MathResult};
use crate::math::fixed_point::{FixedPoint, ONE};
use primitive_types::U256;
use rust_decimal::Decimal;

/// `10^(18 - decimals)`: multiplier taking a raw amount to 18 decimals.
pub fn scaling_factor(decimals: u8) -> MathResult<U256> {
    if decimals > 18 {
        return Err(MathError::Overflow);
    }
    Ok(U256::exp10(usize::from(18 - decimals)))
}

/// Raw amount to live 18-decimal amount, rate applied, rounded down.
pub fn to_scaled18_apply_rate_round_down(
    amount: U256,
    scaling_factor: U256,
    rate: U256,
) -> MathResult<U256> {
    amount.try_mul(scaling_factor)?.mul_down(rate)
}

/// Raw amount to live 18-decimal amount, rate applied, rounded up.
pub fn to_scaled18_apply_rate_round_up(
    amount: U256,
    scaling_factor: U256,
    rate: U256,
) -> MathResult<U256> {
    amount.try_mul(scaling_factor)?.mul_up(rate)
}

/// Live 18-decimal amount back to raw, rate undone, rounded down.
pub fn to_raw_undo_rate_round_down(
    amount: U256,
    scaling_factor: U256,
    rate: U256,
) -> MathResult<U256> {
    amount.div_down(scaling_factor.try_mul(rate)?)
}

/// Live 18-decimal amount back to raw, rate undone, rounded up.
pub fn to_raw_undo_rate_round_up(
    amount: U256,
    scaling_factor: U256,
    rate: U256,
) -> MathResult<U256> {
    amount.div_up(scaling_factor.try_mul(rate)?)
}

/// Rounds a rate up to the next wei unless it is already a whole number.
pub fn compute_rate_round_up(rate: U256) -> MathResult<U256> {
    if (rate / ONE) * ONE == rate {
        Ok(rate)
    } else {
        rate.try_add(U256::one())
    }
}

/// Exact conversion of a non-negative decimal to an integer with `decimals`
/// decimal places. Digits beyond `decimals` are truncated.
pub fn decimal_to_fixed(value: Decimal, decimals: u32) -> MathResult<U256> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(MathError::Negative);
    }
    let mantissa = U256::from(value.mantissa().unsigned_abs());
    let scale = value.scale();
    if decimals >= scale {
        mantissa.try_mul(U256::exp10((decimals - scale) as usize))
    } else {
        Ok(mantissa / U256::exp10((scale - decimals) as usize))
    }
}

/// Converts a fixed-point integer with `decimals` places to a decimal, when
/// it fits `Decimal`'s 96-bit mantissa and 28-digit scale.
pub fn fixed_to_decimal(value: U256, decimals: u32) -> Option<Decimal> {
    if value.bits() > 96 || decimals > 28 {
        return None;
    }
    let mantissa = i128::try_from(value.low_u128()).ok()?;
    Some(Decimal::from_i128_with_scale(mantissa, decimals).normalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_scaling_factor() {
        assert_eq!(scaling_factor(18).unwrap(), U256::one());
        assert_eq!(scaling_factor(6).unwrap(), U256::exp10(12));
        assert!(scaling_factor(19).is_err());
    }

    #[test]
    fn test_apply_and_undo_rate() {
        // 1 USDC-like unit (6 decimals) at rate 1.1
        let sf = scaling_factor(6).unwrap();
        let rate = U256::from(1_100_000_000_000_000_000u64);
        let live = to_scaled18_apply_rate_round_down(U256::from(1_000_000u64), sf, rate).unwrap();
        assert_eq!(live, U256::from(1_100_000_000_000_000_000u64));
        let raw = to_raw_undo_rate_round_down(live, sf, rate).unwrap();
        assert_eq!(raw, U256::from(1_000_000u64));
    }

    #[test]
    fn test_rounding_direction_of_undo() {
        // 1 wei of live amount at rate 3 -> 0.333 raw: down 0, up 1
        let rate = U256::from(3u64) * ONE;
        assert_eq!(to_raw_undo_rate_round_down(U256::one(), U256::one(), rate).unwrap(), U256::zero());
        assert_eq!(to_raw_undo_rate_round_up(U256::one(), U256::one(), rate).unwrap(), U256::one());
    }

    #[test]
    fn test_compute_rate_round_up() {
        assert_eq!(compute_rate_round_up(ONE).unwrap(), ONE);
        let rate = U256::from(1_000_000_000_000_000_001u64);
        assert_eq!(compute_rate_round_up(rate).unwrap(), rate + 1);
    }

    #[test]
    fn test_decimal_to_fixed() {
        assert_eq!(
            decimal_to_fixed(dec!(1000.5), 18).unwrap(),
            U256::from(1_000_500_000_000_000_000_000u128)
        );
        // extra digits are truncated
        assert_eq!(decimal_to_fixed(dec!(1.1234567), 6).unwrap(), U256::from(1_123_456u64));
        assert_eq!(decimal_to_fixed(dec!(-1), 18), Err(MathError::Negative));
    }

    #[test]
    fn test_fixed_to_decimal() {
        let v = fixed_to_decimal(U256::from(9_901_000u64), 6).unwrap();
        assert_eq!(v, dec!(9.901));
        assert!(fixed_to_decimal(U256::MAX, 18).is_none());
    }
}
