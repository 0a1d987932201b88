//! 18-decimal fixed-point arithmetic over `U256`.
//!
//! Every multiplication and division comes in a round-down and a round-up
//! flavour; callers pick the one that rounds in the pool's favour for the
//! exact operation being reproduced.

use crate::error::{MathError, MathResult};
use crate::math::log_exp;
use primitive_types::U256;

/// 1.0 in 18-decimal fixed point.
pub const ONE: U256 = U256([1_000_000_000_000_000_000, 0, 0, 0]);
/// 2.0 in 18-decimal fixed point.
pub const TWO: U256 = U256([2_000_000_000_000_000_000, 0, 0, 0]);
/// 4.0 in 18-decimal fixed point.
pub const FOUR: U256 = U256([4_000_000_000_000_000_000, 0, 0, 0]);
/// Relative error bound of `log_exp::pow` (1e-14).
pub const MAX_POW_RELATIVE_ERROR: U256 = U256([10_000, 0, 0, 0]);

/// Builds a fixed-point constant from an integer number of wei.
#[must_use]
pub const fn wei(value: u64) -> U256 {
    U256([value, 0, 0, 0])
}

/// Checked, direction-aware fixed-point operations.
pub trait FixedPoint: Sized {
    /// Checked addition.
    fn try_add(self, other: Self) -> MathResult<Self>;
    /// Checked subtraction.
    fn try_sub(self, other: Self) -> MathResult<Self>;
    /// Checked raw multiplication (no rescaling).
    fn try_mul(self, other: Self) -> MathResult<Self>;
    /// Checked raw division rounding down (no rescaling).
    fn try_div(self, other: Self) -> MathResult<Self>;
    /// `a * b / 1e18`, rounded down.
    fn mul_down(self, other: Self) -> MathResult<Self>;
    /// `a * b / 1e18`, rounded up.
    fn mul_up(self, other: Self) -> MathResult<Self>;
    /// `a * 1e18 / b`, rounded down.
    fn div_down(self, other: Self) -> MathResult<Self>;
    /// `a * 1e18 / b`, rounded up.
    fn div_up(self, other: Self) -> MathResult<Self>;
    /// `a * b / c`, rounded up, without intermediate rescaling.
    fn mul_div_up(self, b: Self, c: Self) -> MathResult<Self>;
    /// Raw integer division rounded up.
    fn div_up_raw(self, other: Self) -> MathResult<Self>;
    /// `1 - x`, saturating at zero.
    fn complement(self) -> Self;
    /// `x^y` rounded down, with the pow relative error subtracted.
    fn pow_down(self, exp: Self) -> MathResult<Self>;
    /// `x^y` rounded up, with the pow relative error added.
    fn pow_up(self, exp: Self) -> MathResult<Self>;
}

impl FixedPoint for U256 {
    fn try_add(self, other: Self) -> MathResult<Self> {
        self.checked_add(other).ok_or(MathError::Overflow)
    }

    fn try_sub(self, other: Self) -> MathResult<Self> {
        self.checked_sub(other).ok_or(MathError::Underflow)
    }

    fn try_mul(self, other: Self) -> MathResult<Self> {
        self.checked_mul(other).ok_or(MathError::Overflow)
    }

    fn try_div(self, other: Self) -> MathResult<Self> {
        if other.is_zero() {
            return Err(MathError::DivisionByZero);
        }
        Ok(self / other)
    }

    fn mul_down(self, other: Self) -> MathResult<Self> {
        Ok(self.try_mul(other)? / ONE)
    }

    fn mul_up(self, other: Self) -> MathResult<Self> {
        let product = self.try_mul(other)?;
        if product.is_zero() {
            return Ok(U256::zero());
        }
        Ok((product - 1) / ONE + 1)
    }

    fn div_down(self, other: Self) -> MathResult<Self> {
        if other.is_zero() {
            return Err(MathError::DivisionByZero);
        }
        if self.is_zero() {
            return Ok(U256::zero());
        }
        Ok(self.try_mul(ONE)? / other)
    }

    fn div_up(self, other: Self) -> MathResult<Self> {
        if other.is_zero() {
            return Err(MathError::DivisionByZero);
        }
        if self.is_zero() {
            return Ok(U256::zero());
        }
        Ok((self.try_mul(ONE)? - 1) / other + 1)
    }

    fn mul_div_up(self, b: Self, c: Self) -> MathResult<Self> {
        if c.is_zero() {
            return Err(MathError::DivisionByZero);
        }
        let product = self.try_mul(b)?;
        if product.is_zero() {
            return Ok(U256::zero());
        }
        Ok((product - 1) / c + 1)
    }

    fn div_up_raw(self, other: Self) -> MathResult<Self> {
        if other.is_zero() {
            return Err(MathError::DivisionByZero);
        }
        if self.is_zero() {
            return Ok(U256::zero());
        }
        Ok((self - 1) / other + 1)
    }

    fn complement(self) -> Self {
        if self < ONE { ONE - self } else { U256::zero() }
    }

    fn pow_down(self, exp: Self) -> MathResult<Self> {
        if exp == ONE {
            return Ok(self);
        }
        if exp == TWO {
            return self.mul_down(self);
        }
        if exp == FOUR {
            let square = self.mul_down(self)?;
            return square.mul_down(square);
        }
        let raw = log_exp::pow(self, exp)?;
        let max_error = raw.mul_up(MAX_POW_RELATIVE_ERROR)?.try_add(U256::one())?;
        if raw < max_error {
            Ok(U256::zero())
        } else {
            Ok(raw - max_error)
        }
    }

    fn pow_up(self, exp: Self) -> MathResult<Self> {
        if exp == ONE {
            return Ok(self);
        }
        if exp == TWO {
            return self.mul_up(self);
        }
        if exp == FOUR {
            let square = self.mul_up(self)?;
            return square.mul_up(square);
        }
        let raw = log_exp::pow(self, exp)?;
        let max_error = raw.mul_up(MAX_POW_RELATIVE_ERROR)?.try_add(U256::one())?;
        raw.try_add(max_error)
    }
}

/// Parses a decimal integer string, mostly for constants and tests.
pub fn parse_u256(value: &str) -> MathResult<U256> {
    U256::from_dec_str(value).map_err(|_| MathError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn e18(v: u64) -> U256 {
        U256::from(v) * ONE
    }

    #[test]
    fn test_mul_rounding() {
        // 1.5 * 2 = 3 exactly
        let a = U256::from(1_500_000_000_000_000_000u64);
        assert_eq!(a.mul_down(TWO).unwrap(), e18(3));
        assert_eq!(a.mul_up(TWO).unwrap(), e18(3));

        // 1 wei * 1 wei = 1e-36, rounds to 0 or 1 wei
        assert_eq!(wei(1).mul_down(wei(1)).unwrap(), U256::zero());
        assert_eq!(wei(1).mul_up(wei(1)).unwrap(), wei(1));
    }

    #[test]
    fn test_div_rounding() {
        // 1 / 3 = 0.333... -> 333333333333333333 (down) / ...334 (up)
        let down = ONE.div_down(e18(3)).unwrap();
        let up = ONE.div_up(e18(3)).unwrap();
        assert_eq!(down, U256::from(333_333_333_333_333_333u64));
        assert_eq!(up, U256::from(333_333_333_333_333_334u64));
        assert_eq!(U256::zero().div_up(e18(3)).unwrap(), U256::zero());
    }

    #[test]
    fn test_division_by_zero_is_error() {
        assert_eq!(ONE.div_down(U256::zero()), Err(MathError::DivisionByZero));
        assert_eq!(ONE.div_up(U256::zero()), Err(MathError::DivisionByZero));
        assert_eq!(ONE.mul_div_up(ONE, U256::zero()), Err(MathError::DivisionByZero));
    }

    #[test]
    fn test_overflow_is_error() {
        assert_eq!(U256::MAX.mul_down(TWO), Err(MathError::Overflow));
        assert_eq!(U256::MAX.try_add(wei(1)), Err(MathError::Overflow));
        assert_eq!(wei(1).try_sub(wei(2)), Err(MathError::Underflow));
    }

    #[test]
    fn test_complement() {
        assert_eq!(U256::from(300_000_000_000_000_000u64).complement(), U256::from(700_000_000_000_000_000u64));
        assert_eq!(e18(2).complement(), U256::zero());
    }

    #[test]
    fn test_pow_fast_paths() {
        let x = U256::from(1_500_000_000_000_000_000u64);
        // 1.5^2 = 2.25, 1.5^4 = 5.0625
        assert_eq!(x.pow_down(TWO).unwrap(), U256::from(2_250_000_000_000_000_000u64));
        assert_eq!(x.pow_up(FOUR).unwrap(), U256::from(5_062_500_000_000_000_000u64));
        assert_eq!(x.pow_down(ONE).unwrap(), x);
    }

    #[test]
    fn test_pow_brackets_true_value() {
        // 2^0.5 = 1.414213562373095048...
        let x = TWO;
        let y = U256::from(500_000_000_000_000_000u64);
        let down = x.pow_down(y).unwrap();
        let up = x.pow_up(y).unwrap();
        let exact = U256::from(1_414_213_562_373_095_048u64);
        assert!(down <= exact && exact <= up);
        // relative error stays around 1e-14
        assert!(up - down < U256::from(100_000u64));
    }

    #[test]
    fn test_mul_div_up() {
        // 10 * 3 / 4 = 7.5 -> 8
        assert_eq!(wei(10).mul_div_up(wei(3), wei(4)).unwrap(), wei(8));
        assert_eq!(wei(0).mul_div_up(wei(3), wei(4)).unwrap(), wei(0));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_rounding_brackets_exact(a in 0u128..u128::MAX, b in 1u128..u128::MAX) {
                let (a, b) = (U256::from(a), U256::from(b));
                let down = a.mul_down(b).unwrap();
                let up = a.mul_up(b).unwrap();
                prop_assert!(up >= down && up - down <= U256::one());
                let down = a.div_down(b).unwrap();
                let up = a.div_up(b).unwrap();
                prop_assert!(up >= down && up - down <= U256::one());
            }
        }
    }
}
