//! Two-token concentrated liquidity over the price range `[alpha, beta]`.
//!
//! The pool behaves as a constant product over virtual balances
//! `x + L/sqrt(beta)` and `y + L*sqrt(alpha)`.

use crate::error::{PoolError, PoolResult};
use crate::vault::curve::{PoolCurve, SwapParams};
use primitive_types::U256;
use sor_domain::enums::{Rounding, SwapKind};
use sor_domain::math::sqrt::gyro_sqrt;
use sor_domain::math::{FixedPoint, ONE};

pub const MIN_INVARIANT_RATIO: U256 = U256([600_000_000_000_000_000, 0, 0, 0]);
pub const MAX_INVARIANT_RATIO: U256 = U256([5_000_000_000_000_000_000, 0, 0, 0]);

const SQRT_TOLERANCE: U256 = U256([5, 0, 0, 0]);

fn mul(a: U256, b: U256, rounding: Rounding) -> PoolResult<U256> {
    Ok(match rounding {
        Rounding::Down => a.mul_down(b)?,
        Rounding::Up => a.mul_up(b)?,
    })
}

fn div(a: U256, b: U256, rounding: Rounding) -> PoolResult<U256> {
    Ok(match rounding {
        Rounding::Down => a.div_down(b)?,
        Rounding::Up => a.div_up(b)?,
    })
}

fn inverse(rounding: Rounding) -> Rounding {
    match rounding {
        Rounding::Down => Rounding::Up,
        Rounding::Up => Rounding::Down,
    }
}

/// Invariant `L` solving `(x + L/sqrt(beta)) * (y + L*sqrt(alpha)) = L^2`.
pub fn calculate_invariant(
    balances: &[U256],
    sqrt_alpha: U256,
    sqrt_beta: U256,
    rounding: Rounding,
) -> PoolResult<U256> {
    let (x, y) = (balances[0], balances[1]);
    // `a` sits in the denominator, so it rounds against the requested direction
    let a = ONE.try_sub(div(sqrt_alpha, sqrt_beta, inverse(rounding))?)?;

    let mb = div(y, sqrt_beta, rounding)?.try_add(mul(x, sqrt_alpha, rounding)?)?;
    let mc = mul(x, y, rounding)?;

    // b^2 = x^2 * alpha + 2xy * sqrt(alpha / beta) + y^2 / beta
    let b_square_0 = mul(mul(mul(x, x, rounding)?, sqrt_alpha, rounding)?, sqrt_alpha, rounding)?;
    let b_square_1 = div(
        mul(mul(x, y, rounding)?, sqrt_alpha, rounding)?.try_mul(U256::from(2u64))?,
        sqrt_beta,
        rounding,
    )?;
    let b_square_2 = div(
        mul(y, y, rounding)?,
        mul(sqrt_beta, sqrt_beta, inverse(rounding))?,
        rounding,
    )?;
    let b_square = b_square_0.try_add(b_square_1)?.try_add(b_square_2)?;

    let radicand = b_square.try_add(mc.try_mul(U256::from(4u64))?)?;
    let sqrt = gyro_sqrt(radicand, SQRT_TOLERANCE)?;
    let numerator = mb.try_add(sqrt)?;
    div(numerator, a.try_mul(U256::from(2u64))?, rounding)
}

/// `L / sqrt(beta)`, the virtual offset of token 0.
pub fn virtual_offset_0(invariant: U256, sqrt_beta: U256, rounding: Rounding) -> PoolResult<U256> {
    div(invariant, sqrt_beta, rounding)
}

/// `L * sqrt(alpha)`, the virtual offset of token 1.
pub fn virtual_offset_1(invariant: U256, sqrt_alpha: U256, rounding: Rounding) -> PoolResult<U256> {
    mul(invariant, sqrt_alpha, rounding)
}

pub fn calc_out_given_in(
    balance_in: U256,
    balance_out: U256,
    amount_in: U256,
    virtual_offset_in: U256,
    virtual_offset_out: U256,
) -> PoolResult<U256> {
    // the input side is overestimated and the output side underestimated
    let virt_in_over = balance_in.try_add(virtual_offset_in.mul_up(ONE + 2)?)?;
    let virt_out_under = balance_out.try_add(virtual_offset_out.mul_down(ONE - 1)?)?;

    let amount_out = virt_out_under
        .mul_down(amount_in)?
        .div_down(virt_in_over.try_add(amount_in)?)?;
    if amount_out > balance_out {
        return Err(PoolError::AssetBoundsExceeded);
    }
    Ok(amount_out)
}

pub fn calc_in_given_out(
    balance_in: U256,
    balance_out: U256,
    amount_out: U256,
    virtual_offset_in: U256,
    virtual_offset_out: U256,
) -> PoolResult<U256> {
    if amount_out > balance_out {
        return Err(PoolError::AssetBoundsExceeded);
    }
    let virt_in_over = balance_in.try_add(virtual_offset_in.mul_up(ONE + 2)?)?;
    let virt_out_under = balance_out.try_add(virtual_offset_out.mul_down(ONE - 1)?)?;

    Ok(virt_in_over
        .mul_up(amount_out)?
        .div_up(virt_out_under.try_sub(amount_out)?)?)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gyro2ClpCurve {
    sqrt_alpha: U256,
    sqrt_beta: U256,
}

impl Gyro2ClpCurve {
    pub fn new(sqrt_alpha: U256, sqrt_beta: U256) -> PoolResult<Self> {
        if sqrt_alpha >= sqrt_beta {
            return Err(PoolError::MissingData("sqrt_alpha below sqrt_beta"));
        }
        Ok(Self {
            sqrt_alpha,
            sqrt_beta,
        })
    }

    /// Virtual offsets `(in, out)`: the input side from the rounded-up
    /// invariant, the output side from the rounded-down one.
    fn virtual_offsets(&self, balances: &[U256], token_in_is_token_0: bool) -> PoolResult<(U256, U256)> {
        let invariant_down = calculate_invariant(balances, self.sqrt_alpha, self.sqrt_beta, Rounding::Down)?;
        let invariant_up = calculate_invariant(balances, self.sqrt_alpha, self.sqrt_beta, Rounding::Up)?;
        if token_in_is_token_0 {
            Ok((
                virtual_offset_0(invariant_up, self.sqrt_beta, Rounding::Up)?,
                virtual_offset_1(invariant_down, self.sqrt_alpha, Rounding::Down)?,
            ))
        } else {
            Ok((
                virtual_offset_1(invariant_up, self.sqrt_alpha, Rounding::Up)?,
                virtual_offset_0(invariant_down, self.sqrt_beta, Rounding::Down)?,
            ))
        }
    }
}

impl PoolCurve for Gyro2ClpCurve {
    fn on_swap(&self, params: &SwapParams<'_>) -> PoolResult<U256> {
        let balances = params.balances_live_scaled18;
        let (offset_in, offset_out) = self.virtual_offsets(balances, params.index_in == 0)?;
        let balance_in = balances[params.index_in];
        let balance_out = balances[params.index_out];
        match params.kind {
            SwapKind::GivenIn => calc_out_given_in(
                balance_in,
                balance_out,
                params.amount_given_scaled18,
                offset_in,
                offset_out,
            ),
            SwapKind::GivenOut => calc_in_given_out(
                balance_in,
                balance_out,
                params.amount_given_scaled18,
                offset_in,
                offset_out,
            ),
        }
    }

    fn compute_invariant(&self, balances: &[U256], rounding: Rounding) -> PoolResult<U256> {
        calculate_invariant(balances, self.sqrt_alpha, self.sqrt_beta, rounding)
    }

    fn compute_balance(
        &self,
        balances: &[U256],
        token_index: usize,
        invariant_ratio: U256,
    ) -> PoolResult<U256> {
        let invariant = calculate_invariant(balances, self.sqrt_alpha, self.sqrt_beta, Rounding::Up)?
            .mul_up(invariant_ratio)?;
        let square = invariant.mul_up(invariant)?;
        if token_index == 0 {
            let virtual_y = balances[1].try_add(invariant.mul_down(self.sqrt_alpha)?)?;
            Ok(square
                .div_up(virtual_y)?
                .try_sub(invariant.div_down(self.sqrt_beta)?)?)
        } else {
            let virtual_x = balances[0].try_add(invariant.div_down(self.sqrt_beta)?)?;
            Ok(square
                .div_up(virtual_x)?
                .try_sub(invariant.mul_down(self.sqrt_alpha)?)?)
        }
    }

    fn minimum_invariant_ratio(&self) -> U256 {
        MIN_INVARIANT_RATIO
    }

    fn maximum_invariant_ratio(&self) -> U256 {
        MAX_INVARIANT_RATIO
    }

    fn max_swap_amount(
        &self,
        kind: SwapKind,
        balances: &[U256],
        index_in: usize,
        index_out: usize,
    ) -> PoolResult<U256> {
        let balance_out = balances[index_out];
        if balance_out.is_zero() {
            return Ok(U256::zero());
        }
        match kind {
            SwapKind::GivenOut => Ok(balance_out),
            SwapKind::GivenIn => {
                let (offset_in, offset_out) = self.virtual_offsets(balances, index_in == 0)?;
                calc_in_given_out(balances[index_in], balance_out, balance_out, offset_in, offset_out)
            }
        }
    }
}
