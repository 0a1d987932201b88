//! Fixed-point square roots.

use crate::error::{MathError, MathResult};
use crate::math::fixed_point::{FixedPoint, ONE};
use primitive_types::U256;

// floor(sqrt(10^k * 1e18)) for inputs at or below 10^k wei, k = 1..=17
const SMALL_INPUT_GUESSES: [u64; 17] = [
    3_162_277_660,
    10_000_000_000,
    31_622_776_601,
    100_000_000_000,
    316_227_766_016,
    1_000_000_000_000,
    3_162_277_660_168,
    10_000_000_000_000,
    31_622_776_601_683,
    100_000_000_000_000,
    316_227_766_016_837,
    1_000_000_000_000_000,
    3_162_277_660_168_379,
    10_000_000_000_000_000,
    31_622_776_601_683_793,
    100_000_000_000_000_000,
    316_227_766_016_837_933,
];

/// Square root of an 18-decimal value by Newton iteration, checked against
/// `tolerance` (in wei, scaled by the result).
///
/// Seven iterations from the initial guess are enough for every input the
/// concentrated-liquidity curves produce; a result outside the tolerance band
/// is reported as [`MathError::SqrtFailed`].
pub fn gyro_sqrt(input: U256, tolerance: U256) -> MathResult<U256> {
    if input.is_zero() {
        return Ok(U256::zero());
    }

    let inflated = input.try_mul(ONE)?;
    let mut guess = initial_guess(input);
    for _ in 0..7 {
        guess = (guess + inflated / guess) / 2;
    }

    let guess_squared = guess.mul_down(guess)?;
    let error = guess.mul_up(tolerance)?;
    let upper = input.saturating_add(error);
    let lower = input.saturating_sub(error);
    if guess_squared > upper || guess_squared < lower {
        return Err(MathError::SqrtFailed);
    }
    Ok(guess)
}

/// Exact floor of `sqrt(x)` for an 18-decimal `x`.
pub fn sqrt_scaled18(x: U256) -> MathResult<U256> {
    Ok(x.try_mul(ONE)?.integer_sqrt())
}

fn initial_guess(input: U256) -> U256 {
    if input >= ONE {
        let halved_log = int_log2_halved(input / ONE);
        return (U256::one() << halved_log) * ONE;
    }
    let mut bound = U256::from(10u64);
    for guess in SMALL_INPUT_GUESSES {
        if input <= bound {
            return U256::from(guess);
        }
        bound = bound * 10;
    }
    input
}

fn int_log2_halved(x: U256) -> usize {
    let mut x = x;
    let mut n = 0usize;
    for shift in [128usize, 64, 32, 16, 8, 4, 2] {
        if x >= U256::one() << shift {
            x >>= shift;
            n += shift / 2;
        }
    }
    n
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tolerance() -> U256 {
        U256::from(5u64)
    }

    #[test]
    fn test_sqrt_of_perfect_square() {
        // sqrt(4.0) = 2.0
        let v = gyro_sqrt(U256::from(4_000_000_000_000_000_000u64), tolerance()).unwrap();
        assert_eq!(v, U256::from(2_000_000_000_000_000_000u64));
        assert_eq!(sqrt_scaled18(U256::from(4_000_000_000_000_000_000u64)).unwrap(), v);
    }

    #[test]
    fn test_sqrt_small_input() {
        // sqrt(0.01) = 0.1
        let v = gyro_sqrt(U256::from(10_000_000_000_000_000u64), tolerance()).unwrap();
        assert_eq!(v, U256::from(100_000_000_000_000_000u64));
    }

    #[test]
    fn test_sqrt_large_input() {
        // sqrt(2e30) in 18 decimals = 1.41421356237309504880e15
        let input = U256::from(2u64) * U256::exp10(48);
        let v = gyro_sqrt(input, tolerance()).unwrap();
        let exact = sqrt_scaled18(input).unwrap();
        let diff = if v > exact { v - exact } else { exact - v };
        assert!(diff <= U256::one());
    }

    #[test]
    fn test_sqrt_zero() {
        assert_eq!(gyro_sqrt(U256::zero(), tolerance()).unwrap(), U256::zero());
    }
}
