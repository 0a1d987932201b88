//! Exponentiation and logarithm over signed 256-bit fixed point.
//!
//! `exp` decomposes its argument over a table of precomputed powers of `e`
//! and finishes with a Taylor series; `ln` runs the same table in reverse
//! and finishes with the `atanh` series. Arguments close to one take the
//! 36-decimal `ln_36` path for extra precision.

use crate::error::{MathError, MathResult};
use crate::math::fixed_point::ONE;
use crate::math::signed::{to_signed, to_unsigned};
use ethnum::I256;
use primitive_types::U256;

const ONE_18: I256 = I256::new(1_000_000_000_000_000_000);
const ONE_20: I256 = I256::new(100_000_000_000_000_000_000);
const ONE_36: I256 = I256::new(1_000_000_000_000_000_000_000_000_000_000_000_000);
const HUNDRED: I256 = I256::new(100);

const MAX_NATURAL_EXPONENT: I256 = I256::new(130_000_000_000_000_000_000);
const MIN_NATURAL_EXPONENT: I256 = I256::new(-41_000_000_000_000_000_000);

const LN_36_LOWER_BOUND: I256 = I256::new(900_000_000_000_000_000);
const LN_36_UPPER_BOUND: I256 = I256::new(1_100_000_000_000_000_000);

// 18 decimal constants
const X0: I256 = I256::new(128_000_000_000_000_000_000); // 2^7
const X1: I256 = I256::new(64_000_000_000_000_000_000); // 2^6
const A1: I256 = I256::new(6_235_149_080_811_616_882_910_000_000); // e^(x1), no decimals

// 20 decimal constants
const X2: I256 = I256::new(3_200_000_000_000_000_000_000); // 2^5
const A2: I256 = I256::new(7_896_296_018_268_069_516_100_000_000_000_000); // e^(x2)
const X3: I256 = I256::new(1_600_000_000_000_000_000_000); // 2^4
const A3: I256 = I256::new(888_611_052_050_787_263_676_000_000); // e^(x3)
const X4: I256 = I256::new(800_000_000_000_000_000_000); // 2^3
const A4: I256 = I256::new(298_095_798_704_172_827_474_000); // e^(x4)
const X5: I256 = I256::new(400_000_000_000_000_000_000); // 2^2
const A5: I256 = I256::new(5_459_815_003_314_423_907_810); // e^(x5)
const X6: I256 = I256::new(200_000_000_000_000_000_000); // 2^1
const A6: I256 = I256::new(738_905_609_893_065_022_723); // e^(x6)
const X7: I256 = I256::new(100_000_000_000_000_000_000); // 2^0
const A7: I256 = I256::new(271_828_182_845_904_523_536); // e^(x7)
const X8: I256 = I256::new(50_000_000_000_000_000_000); // 2^-1
const A8: I256 = I256::new(164_872_127_070_012_814_685); // e^(x8)
const X9: I256 = I256::new(25_000_000_000_000_000_000); // 2^-2
const A9: I256 = I256::new(128_402_541_668_774_148_407); // e^(x9)
const X10: I256 = I256::new(12_500_000_000_000_000_000); // 2^-3
const A10: I256 = I256::new(113_314_845_306_682_631_683); // e^(x10)
const X11: I256 = I256::new(6_250_000_000_000_000_000); // 2^-4
const A11: I256 = I256::new(106_449_445_891_785_942_956); // e^(x11)

/// e^(x0), no decimals. Does not fit in 128 bits.
fn a0() -> I256 {
    I256::new(388_770_840_599_459_509_222) * I256::new(10_i128.pow(35))
}

/// 2^254 / 1e20: exponents above this would overflow `ln(x) * y`.
fn mild_exponent_bound() -> I256 {
    (I256::ONE << 254u32) / ONE_20
}

/// `x^y` for 18-decimal fixed-point `x` and `y`, computed as `exp(y * ln(x))`.
///
/// The result carries a relative error of up to 1e-14; see
/// [`FixedPoint::pow_down`](crate::math::fixed_point::FixedPoint::pow_down)
/// for the directed variants.
pub fn pow(x: U256, y: U256) -> MathResult<U256> {
    if y.is_zero() {
        return Ok(ONE);
    }
    if x.is_zero() {
        return Ok(U256::zero());
    }

    let x = to_signed(x)?;
    let y = to_signed(y)?;
    if y >= mild_exponent_bound() {
        return Err(MathError::InvalidExponent);
    }

    let logx_times_y = if LN_36_LOWER_BOUND < x && x < LN_36_UPPER_BOUND {
        let ln_36_x = ln_36(x);
        // ln_36_x has 36 decimals; split it to keep the product in range
        checked_mul(ln_36_x / ONE_18, y)? + checked_mul(ln_36_x % ONE_18, y)? / ONE_18
    } else {
        checked_mul(ln(x)?, y)?
    };
    let logx_times_y = logx_times_y / ONE_18;

    if !(MIN_NATURAL_EXPONENT..=MAX_NATURAL_EXPONENT).contains(&logx_times_y) {
        return Err(MathError::ProductOutOfBounds);
    }

    to_unsigned(exp(logx_times_y)?)
}

/// Natural exponentiation of an 18-decimal fixed-point number.
pub fn exp(x: I256) -> MathResult<I256> {
    if !(MIN_NATURAL_EXPONENT..=MAX_NATURAL_EXPONENT).contains(&x) {
        return Err(MathError::InvalidExponent);
    }
    if x < I256::ZERO {
        // e^(-x) = 1 / e^x
        return Ok((ONE_18 * ONE_18) / exp(-x)?);
    }

    let mut x = x;
    let first_an = if x >= X0 {
        x -= X0;
        a0()
    } else if x >= X1 {
        x -= X1;
        A1
    } else {
        I256::ONE
    };

    // Switch to 20 decimals for the remaining terms
    x *= HUNDRED;

    let mut product = ONE_20;
    for (xn, an) in [
        (X2, A2),
        (X3, A3),
        (X4, A4),
        (X5, A5),
        (X6, A6),
        (X7, A7),
        (X8, A8),
        (X9, A9),
    ] {
        if x >= xn {
            x -= xn;
            product = (product * an) / ONE_20;
        }
    }

    // Taylor series up to the 12th term; x < 2^-2 here so it converges fast
    let mut series_sum = ONE_20;
    let mut term = x;
    series_sum += term;
    for divisor in 2..=12 {
        term = ((term * x) / ONE_20) / I256::new(divisor);
        series_sum += term;
    }

    Ok((((product * series_sum) / ONE_20) * first_an) / HUNDRED)
}

/// Natural logarithm of an 18-decimal fixed-point number.
pub fn ln(a: I256) -> MathResult<I256> {
    if a <= I256::ZERO {
        return Err(MathError::OutOfLogBounds);
    }
    if a < ONE_18 {
        // ln(a) = -ln(1/a)
        return Ok(-ln((ONE_18 * ONE_18) / a)?);
    }

    let mut a = a;
    let mut sum = I256::ZERO;
    let a0 = a0();
    if a >= a0 * ONE_18 {
        a /= a0;
        sum += X0;
    }
    if a >= A1 * ONE_18 {
        a /= A1;
        sum += X1;
    }

    sum *= HUNDRED;
    a *= HUNDRED;

    for (xn, an) in [
        (X2, A2),
        (X3, A3),
        (X4, A4),
        (X5, A5),
        (X6, A6),
        (X7, A7),
        (X8, A8),
        (X9, A9),
        (X10, A10),
        (X11, A11),
    ] {
        if a >= an {
            a = (a * ONE_20) / an;
            sum += xn;
        }
    }

    // ln(a) = 2 * atanh(z), z = (a - 1) / (a + 1)
    let z = ((a - ONE_20) * ONE_20) / (a + ONE_20);
    let z_squared = (z * z) / ONE_20;

    let mut num = z;
    let mut series_sum = num;
    for divisor in [3, 5, 7, 9, 11] {
        num = (num * z_squared) / ONE_20;
        series_sum += num / I256::new(divisor);
    }
    series_sum *= I256::new(2);

    Ok((sum + series_sum) / HUNDRED)
}

/// High precision `ln` for arguments close to one. Returns 36 decimals.
fn ln_36(x: I256) -> I256 {
    let x = x * ONE_18;

    let z = ((x - ONE_36) * ONE_36) / (x + ONE_36);
    let z_squared = (z * z) / ONE_36;

    let mut num = z;
    let mut series_sum = num;
    for divisor in [3, 5, 7, 9, 11, 13, 15] {
        num = (num * z_squared) / ONE_36;
        series_sum += num / I256::new(divisor);
    }

    series_sum * I256::new(2)
}

fn checked_mul(a: I256, b: I256) -> MathResult<I256> {
    a.checked_mul(b).ok_or(MathError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: I256, b: I256, tolerance: i128) -> bool {
        (a - b).abs() <= I256::new(tolerance)
    }

    #[test]
    fn test_exp_of_one_is_e() {
        // e = 2.718281828459045235...
        let e = exp(ONE_18).unwrap();
        assert!(close(e, I256::new(2_718_281_828_459_045_235), 100));
    }

    #[test]
    fn test_exp_negative() {
        // e^-1 = 0.367879441171442321...
        let v = exp(-ONE_18).unwrap();
        assert!(close(v, I256::new(367_879_441_171_442_321), 100));
    }

    #[test]
    fn test_ln_of_e() {
        let v = ln(I256::new(2_718_281_828_459_045_235)).unwrap();
        assert!(close(v, ONE_18, 100));
    }

    #[test]
    fn test_ln_below_one() {
        // ln(0.5) = -0.693147180559945309...
        let v = ln(I256::new(500_000_000_000_000_000)).unwrap();
        assert!(close(v, I256::new(-693_147_180_559_945_309), 100));
    }

    #[test]
    fn test_ln_of_zero_is_error() {
        assert_eq!(ln(I256::ZERO), Err(MathError::OutOfLogBounds));
    }

    #[test]
    fn test_pow_near_one_uses_ln_36() {
        // 1.05^2.5 = 1.129726321947045721...
        let v = pow(
            U256::from(1_050_000_000_000_000_000u64),
            U256::from(2_500_000_000_000_000_000u64),
        )
        .unwrap();
        let expected = U256::from(1_129_726_321_947_045_721u64);
        let diff = if v > expected { v - expected } else { expected - v };
        assert!(diff < U256::from(1_000_000_000u64));
    }

    #[test]
    fn test_pow_zero_cases() {
        assert_eq!(pow(U256::from(5u64), U256::zero()).unwrap(), ONE);
        assert_eq!(pow(U256::zero(), ONE).unwrap(), U256::zero());
    }

    #[test]
    fn test_exp_out_of_bounds() {
        assert_eq!(exp(MAX_NATURAL_EXPONENT + ONE_18), Err(MathError::InvalidExponent));
    }
}
