//! Signed fixed point with an extra-precision (38 decimal) mode.
//!
//! Used by the elliptical concentrated-liquidity geometry, whose derived
//! parameters are stored with 38 decimals. The `*_mag` operations round the
//! magnitude of the result (toward or away from zero), not its signed value.

use crate::error::{MathError, MathResult};
use ethnum::{AsI256, AsU256, I256};
use primitive_types::U256;

/// 1.0 with 18 decimals.
pub const ONE: I256 = I256::new(1_000_000_000_000_000_000);
/// 1.0 with 38 decimals.
pub const ONE_XP: I256 = I256::new(100_000_000_000_000_000_000_000_000_000_000_000_000);

const E19: I256 = I256::new(10_000_000_000_000_000_000);

/// Converts an unsigned 256-bit value into a signed one.
pub fn to_signed(value: U256) -> MathResult<I256> {
    let [l0, l1, l2, l3] = value.0;
    let hi = (u128::from(l3) << 64) | u128::from(l2);
    let lo = (u128::from(l1) << 64) | u128::from(l0);
    let signed = ethnum::U256::from_words(hi, lo).as_i256();
    if signed < I256::ZERO {
        return Err(MathError::Overflow);
    }
    Ok(signed)
}

/// Converts a non-negative signed value back into an unsigned one.
pub fn to_unsigned(value: I256) -> MathResult<U256> {
    if value < I256::ZERO {
        return Err(MathError::Negative);
    }
    let (hi, lo) = value.as_u256().into_words();
    Ok(U256([
        lo as u64,
        (lo >> 64) as u64,
        hi as u64,
        (hi >> 64) as u64,
    ]))
}

/// Signed fixed-point operations. All multiplications are checked.
pub trait SignedFixedPoint: Sized {
    fn try_add(self, other: Self) -> MathResult<Self>;
    fn try_sub(self, other: Self) -> MathResult<Self>;
    /// Plain integer product, checked.
    fn try_mul(self, other: Self) -> MathResult<Self>;
    /// `a * b / 1e18`, magnitude rounded down.
    fn mul_down_mag(self, other: Self) -> MathResult<Self>;
    /// `a * b / 1e18`, magnitude rounded up.
    fn mul_up_mag(self, other: Self) -> MathResult<Self>;
    /// `a * 1e18 / b`, magnitude rounded down.
    fn div_down_mag(self, other: Self) -> MathResult<Self>;
    /// `a * 1e18 / b`, magnitude rounded up.
    fn div_up_mag(self, other: Self) -> MathResult<Self>;
    /// `a * b / 1e38`.
    fn mul_xp(self, other: Self) -> MathResult<Self>;
    /// `a * 1e38 / b`.
    fn div_xp(self, other: Self) -> MathResult<Self>;
    /// 18-decimal `self` times 38-decimal `other`, 18-decimal result, magnitude rounded down.
    fn mul_down_xp_to_np(self, other: Self) -> MathResult<Self>;
    /// 18-decimal `self` times 38-decimal `other`, 18-decimal result, magnitude rounded up.
    fn mul_up_xp_to_np(self, other: Self) -> MathResult<Self>;
}

fn checked_mul(a: I256, b: I256) -> MathResult<I256> {
    a.checked_mul(b).ok_or(MathError::Overflow)
}

impl SignedFixedPoint for I256 {
    fn try_add(self, other: Self) -> MathResult<Self> {
        self.checked_add(other).ok_or(MathError::Overflow)
    }

    fn try_sub(self, other: Self) -> MathResult<Self> {
        self.checked_sub(other).ok_or(MathError::Underflow)
    }

    fn try_mul(self, other: Self) -> MathResult<Self> {
        checked_mul(self, other)
    }

    fn mul_down_mag(self, other: Self) -> MathResult<Self> {
        Ok(checked_mul(self, other)? / ONE)
    }

    fn mul_up_mag(self, other: Self) -> MathResult<Self> {
        let product = checked_mul(self, other)?;
        if product > I256::ZERO {
            Ok((product - I256::ONE) / ONE + I256::ONE)
        } else if product < I256::ZERO {
            Ok((product + I256::ONE) / ONE - I256::ONE)
        } else {
            Ok(I256::ZERO)
        }
    }

    fn div_down_mag(self, other: Self) -> MathResult<Self> {
        if other == I256::ZERO {
            return Err(MathError::DivisionByZero);
        }
        if self == I256::ZERO {
            return Ok(I256::ZERO);
        }
        Ok(checked_mul(self, ONE)? / other)
    }

    fn div_up_mag(self, other: Self) -> MathResult<Self> {
        if other == I256::ZERO {
            return Err(MathError::DivisionByZero);
        }
        if self == I256::ZERO {
            return Ok(I256::ZERO);
        }
        let (a, b) = if other < I256::ZERO {
            (-self, -other)
        } else {
            (self, other)
        };
        let inflated = checked_mul(a, ONE)?;
        if inflated > I256::ZERO {
            Ok((inflated - I256::ONE) / b + I256::ONE)
        } else {
            Ok((inflated + I256::ONE) / b - I256::ONE)
        }
    }

    fn mul_xp(self, other: Self) -> MathResult<Self> {
        Ok(checked_mul(self, other)? / ONE_XP)
    }

    fn div_xp(self, other: Self) -> MathResult<Self> {
        if other == I256::ZERO {
            return Err(MathError::DivisionByZero);
        }
        if self == I256::ZERO {
            return Ok(I256::ZERO);
        }
        Ok(checked_mul(self, ONE_XP)? / other)
    }

    fn mul_down_xp_to_np(self, other: Self) -> MathResult<Self> {
        // split the 38-decimal factor to keep both partial products in range
        let b1 = other / E19;
        let b2 = other % E19;
        let prod1 = checked_mul(self, b1)?;
        let prod2 = checked_mul(self, b2)?;
        if prod1 >= I256::ZERO && prod2 >= I256::ZERO {
            Ok((prod1 + prod2 / E19) / E19)
        } else {
            Ok((prod1 + prod2 / E19 + I256::ONE) / E19 - I256::ONE)
        }
    }

    fn mul_up_xp_to_np(self, other: Self) -> MathResult<Self> {
        let b1 = other / E19;
        let b2 = other % E19;
        let prod1 = checked_mul(self, b1)?;
        let prod2 = checked_mul(self, b2)?;
        if prod1 <= I256::ZERO && prod2 <= I256::ZERO {
            Ok((prod1 + prod2 / E19) / E19)
        } else {
            Ok((prod1 + prod2 / E19 - I256::ONE) / E19 + I256::ONE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(v: i128) -> I256 {
        I256::new(v)
    }

    #[test]
    fn test_round_trip_conversion() {
        let big = U256::from_dec_str("123456789012345678901234567890123456789012345").unwrap();
        let signed = to_signed(big).unwrap();
        assert_eq!(to_unsigned(signed).unwrap(), big);
        assert_eq!(to_unsigned(n(-1)), Err(MathError::Negative));
        assert_eq!(to_signed(U256::MAX), Err(MathError::Overflow));
    }

    #[test]
    fn test_checked_add_sub() {
        assert_eq!(n(5).try_add(n(-7)).unwrap(), n(-2));
        assert_eq!(I256::MAX.try_add(n(1)), Err(MathError::Overflow));
        assert_eq!(I256::MIN.try_sub(n(1)), Err(MathError::Underflow));
        assert_eq!(n(-3).try_mul(n(4)).unwrap(), n(-12));
        assert_eq!(I256::MAX.try_mul(n(2)), Err(MathError::Overflow));
    }

    #[test]
    fn test_mag_rounding_is_symmetric() {
        // 1 wei * 1 wei: down -> 0, up -> +-1 wei
        assert_eq!(n(1).mul_down_mag(n(1)).unwrap(), n(0));
        assert_eq!(n(1).mul_up_mag(n(1)).unwrap(), n(1));
        assert_eq!(n(-1).mul_up_mag(n(1)).unwrap(), n(-1));
        assert_eq!(n(-1).mul_down_mag(n(1)).unwrap(), n(0));
    }

    #[test]
    fn test_div_mag() {
        // 1 / 3 with 18 decimals
        let third_down = ONE.div_down_mag(n(3_000_000_000_000_000_000)).unwrap();
        let third_up = ONE.div_up_mag(n(3_000_000_000_000_000_000)).unwrap();
        assert_eq!(third_down, n(333_333_333_333_333_333));
        assert_eq!(third_up, n(333_333_333_333_333_334));
        // negative divisor flips signs before rounding away from zero
        let neg = ONE.div_up_mag(n(-3_000_000_000_000_000_000)).unwrap();
        assert_eq!(neg, n(-333_333_333_333_333_334));
        assert_eq!(ONE.div_down_mag(n(0)), Err(MathError::DivisionByZero));
    }

    #[test]
    fn test_xp_to_np() {
        // 2.0 (18 dec) * 0.5 (38 dec) = 1.0 (18 dec)
        let half_xp = ONE_XP / n(2);
        let two = n(2) * ONE;
        assert_eq!(two.mul_down_xp_to_np(half_xp).unwrap(), ONE);
        assert_eq!(two.mul_up_xp_to_np(half_xp).unwrap(), ONE);
        // 1 wei * (1/3 in xp) rounds toward zero down, away from zero up
        let third_xp = ONE_XP / n(3);
        assert_eq!(n(1).mul_down_xp_to_np(third_xp).unwrap(), n(0));
        assert_eq!(n(1).mul_up_xp_to_np(third_xp).unwrap(), n(1));
        assert_eq!(n(-1).mul_up_xp_to_np(third_xp).unwrap(), n(0));
    }

    #[test]
    fn test_xp_mul_div() {
        let half_xp = ONE_XP / n(2);
        assert_eq!(half_xp.mul_xp(half_xp).unwrap(), ONE_XP / n(4));
        assert_eq!(ONE_XP.div_xp(n(2) * ONE_XP).unwrap(), half_xp);
    }
}
