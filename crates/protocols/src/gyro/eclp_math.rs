//! Elliptic concentrated liquidity math.
//!
//! The curve is a circle stretched by `lambda` and rotated by `(c, s)`.
//! Primary parameters use 18 decimals; the derived `tau`, `u`, `v`, `w`, `z`
//! and `d_sq` use 38. The invariant is returned with an error bound; swaps
//! use `r = (invariant + 2 * error, invariant)` so that the x-component
//! overestimates and the y-component underestimates the true value.

use crate::error::{PoolError, PoolResult};
use ethnum::I256;
use primitive_types::U256;
use sor_domain::math::signed::{ONE_XP, SignedFixedPoint, to_signed, to_unsigned};
use sor_domain::math::sqrt::gyro_sqrt;

const MAX_BALANCES: I256 = I256::new(10_000_000_000_000_000_000_000_000_000_000_000);
const MAX_INVARIANT: I256 = I256::new(30_000_000_000_000_000_000_000_000_000_000_000_000);
const E38: I256 = I256::new(100_000_000_000_000_000_000_000_000_000_000_000_000);
const E36: I256 = I256::new(1_000_000_000_000_000_000_000_000_000_000_000_000);
const SQRT_TOLERANCE: U256 = U256([5, 0, 0, 0]);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vector2 {
    pub x: I256,
    pub y: I256,
}

impl Vector2 {
    pub const fn new(x: I256, y: I256) -> Self {
        Self { x, y }
    }
}

/// Primary curve parameters, 18 decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EclpParams {
    pub alpha: I256,
    pub beta: I256,
    pub c: I256,
    pub s: I256,
    pub lambda: I256,
}

/// Derived curve parameters, 38 decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedEclpParams {
    pub tau_alpha: Vector2,
    pub tau_beta: Vector2,
    pub u: I256,
    pub v: I256,
    pub w: I256,
    pub z: I256,
    pub d_sq: I256,
}

fn int(v: i128) -> I256 {
    I256::new(v)
}

fn signed_sqrt(value: I256) -> PoolResult<I256> {
    Ok(to_signed(gyro_sqrt(to_unsigned(value)?, SQRT_TOLERANCE)?)?)
}

/// Invariant and its absolute error bound.
pub fn calculate_invariant_with_error(
    balances: &[U256],
    p: &EclpParams,
    d: &DerivedEclpParams,
) -> PoolResult<(I256, I256)> {
    let x = to_signed(balances[0])?;
    let y = to_signed(balances[1])?;
    if x + y > MAX_BALANCES {
        return Err(PoolError::AssetBoundsExceeded);
    }

    let at_a_chi = calc_at_a_chi(x, y, p, d)?;
    let (sqrt, mut err) = calc_invariant_sqrt(x, y, p, d)?;
    if sqrt > I256::ZERO {
        err = (err + I256::ONE).div_up_mag(int(2) * sqrt)?;
    } else {
        err = if err > I256::ZERO {
            signed_sqrt(err)?
        } else {
            int(1_000_000_000)
        };
    }
    // error of the numerator, scaled to cover every term
    err = ((p.lambda.mul_up_mag(x + y)? / ONE_XP) + err + I256::ONE) * int(20);

    let a_chi_a_chi = calc_a_chi_a_chi_in_xp(p, d)?;
    let mul_denominator = ONE_XP.div_xp(a_chi_a_chi - ONE_XP)?;

    let invariant = (at_a_chi + sqrt - err).mul_down_xp_to_np(mul_denominator)?;
    err = err.mul_up_xp_to_np(mul_denominator)?;
    // relative error of the denominator grows with lambda^2
    err = err
        + (invariant.mul_up_xp_to_np(mul_denominator)? * ((p.lambda * p.lambda) / E36) * int(40))
            / ONE_XP
        + I256::ONE;

    if invariant + err > MAX_INVARIANT {
        return Err(PoolError::AssetBoundsExceeded);
    }
    Ok((invariant, err))
}

/// `(A t) . (A chi)`, the linear part of the invariant's quadratic.
pub fn calc_at_a_chi(x: I256, y: I256, p: &EclpParams, d: &DerivedEclpParams) -> PoolResult<I256> {
    let d_sq2 = d.d_sq.mul_xp(d.d_sq)?;

    // (cx - sy) * (w/lambda + z) / lambda, two factors of d_sq
    let term_xp = (d.w.div_down_mag(p.lambda)? + d.z)
        .div_down_mag(p.lambda)?
        .div_xp(d_sq2)?;
    let mut val = (x.mul_down_mag(p.c)? - y.mul_down_mag(p.s)?).mul_down_xp_to_np(term_xp)?;

    // (x lambda s + y lambda c) * u
    let term_np = x.mul_down_mag(p.lambda)?.mul_down_mag(p.s)? + y.mul_down_mag(p.lambda)?.mul_down_mag(p.c)?;
    val = val + term_np.mul_down_xp_to_np(d.u.div_xp(d_sq2)?)?;

    // (sx + cy) * v
    let term_np = x.mul_down_mag(p.s)? + y.mul_down_mag(p.c)?;
    val = val + term_np.mul_down_xp_to_np(d.v.div_xp(d_sq2)?)?;
    Ok(val)
}

/// `(A chi) . (A chi)` in 38 decimals, rounded up.
pub fn calc_a_chi_a_chi_in_xp(p: &EclpParams, d: &DerivedEclpParams) -> PoolResult<I256> {
    let d_sq3 = d.d_sq.mul_xp(d.d_sq)?.mul_xp(d.d_sq)?;

    let mut val = p
        .lambda
        .mul_up_mag((int(2) * d.u).mul_xp(d.v)?.div_xp(d_sq3)?)?;
    val = val
        + (d.u + I256::ONE)
            .mul_xp(d.u + I256::ONE)?
            .div_xp(d_sq3)?
            .mul_up_mag(p.lambda)?
            .mul_up_mag(p.lambda)?;
    val = val + d.v.mul_xp(d.v)?.div_xp(d_sq3)?;

    let term_xp = d.w.div_up_mag(p.lambda)? + d.z;
    val = val + term_xp.mul_xp(term_xp)?.div_xp(d_sq3)?;
    Ok(val)
}

/// Square root term of the invariant and the error inside it.
pub fn calc_invariant_sqrt(
    x: I256,
    y: I256,
    p: &EclpParams,
    d: &DerivedEclpParams,
) -> PoolResult<(I256, I256)> {
    let val = calc_min_atx_a_chiy_sq_plus_atx_sq(x, y, p, d)?
        + calc_2_atx_aty_a_chix_a_chiy(x, y, p, d)?
        + calc_min_aty_a_chix_sq_plus_aty_sq(x, y, p, d)?;
    let err = (x.mul_up_mag(x)? + y.mul_up_mag(y)?) / E38;
    let val = if val > I256::ZERO {
        signed_sqrt(val)?
    } else {
        I256::ZERO
    };
    Ok((val, err))
}

fn d_sq4(d: &DerivedEclpParams) -> PoolResult<I256> {
    Ok(d.d_sq.mul_xp(d.d_sq)?.mul_xp(d.d_sq)?.mul_xp(d.d_sq)?)
}

/// `-(At)_x^2 (A chi)_y^2 + (At)_x^2`, rounded down.
pub fn calc_min_atx_a_chiy_sq_plus_atx_sq(
    x: I256,
    y: I256,
    p: &EclpParams,
    d: &DerivedEclpParams,
) -> PoolResult<I256> {
    let mut term_np = x.mul_up_mag(x)?.mul_up_mag(p.c)?.mul_up_mag(p.c)?
        + y.mul_up_mag(y)?.mul_up_mag(p.s)?.mul_up_mag(p.s)?;
    term_np = term_np - x.mul_down_mag(y)?.mul_down_mag(p.c * int(2))?.mul_down_mag(p.s)?;

    let mut term_xp = d.u.mul_xp(d.u)?
        + (int(2) * d.u).mul_xp(d.v)?.div_down_mag(p.lambda)?
        + d.v.mul_xp(d.v)?.div_down_mag(p.lambda)?.div_down_mag(p.lambda)?;
    term_xp = term_xp.div_xp(d_sq4(d)?)?;
    let mut val = (-term_np).mul_down_xp_to_np(term_xp)?;

    val = val
        + (term_np - int(9))
            .div_down_mag(p.lambda)?
            .div_down_mag(p.lambda)?
            .mul_down_xp_to_np(ONE_XP.div_xp(d.d_sq)?)?;
    Ok(val)
}

/// `2 (At)_x (At)_y (A chi)_x (A chi)_y`, rounded down.
pub fn calc_2_atx_aty_a_chix_a_chiy(
    x: I256,
    y: I256,
    p: &EclpParams,
    d: &DerivedEclpParams,
) -> PoolResult<I256> {
    let mut term_np = (x.mul_down_mag(x)? - y.mul_up_mag(y)?)
        .mul_down_mag(int(2) * p.c)?
        .mul_down_mag(p.s)?;
    let xy = y.mul_down_mag(int(2) * x)?;
    term_np = term_np + xy.mul_down_mag(p.c)?.mul_down_mag(p.c)? - xy.mul_down_mag(p.s)?.mul_down_mag(p.s)?;

    let mut term_xp = d.z.mul_xp(d.u)? + d.w.mul_xp(d.v)?.div_down_mag(p.lambda)?.div_down_mag(p.lambda)?;
    term_xp = term_xp + (d.w.mul_xp(d.u)? + d.z.mul_xp(d.v)?).div_down_mag(p.lambda)?;
    term_xp = term_xp.div_xp(d_sq4(d)?)?;

    Ok(term_np.mul_down_xp_to_np(term_xp)?)
}

/// `-(At)_y^2 (A chi)_x^2 + (At)_y^2`, rounded down.
pub fn calc_min_aty_a_chix_sq_plus_aty_sq(
    x: I256,
    y: I256,
    p: &EclpParams,
    d: &DerivedEclpParams,
) -> PoolResult<I256> {
    let mut term_np = x.mul_up_mag(x)?.mul_up_mag(p.s)?.mul_up_mag(p.s)?
        + y.mul_up_mag(y)?.mul_up_mag(p.c)?.mul_up_mag(p.c)?;
    term_np = term_np + x.mul_up_mag(y)?.mul_up_mag(p.s * int(2))?.mul_up_mag(p.c)?;

    let mut term_xp = d.z.mul_xp(d.z)? + d.w.mul_xp(d.w)?.div_down_mag(p.lambda)?.div_down_mag(p.lambda)?;
    term_xp = term_xp + (int(2) * d.z).mul_xp(d.w)?.div_down_mag(p.lambda)?;
    term_xp = term_xp.div_xp(d_sq4(d)?)?;
    let mut val = (-term_np).mul_down_xp_to_np(term_xp)?;

    val = val + (term_np - int(9)).mul_down_xp_to_np(ONE_XP.div_xp(d.d_sq)?)?;
    Ok(val)
}

/// Virtual offset of token 0, rounded up.
pub fn virtual_offset_0(p: &EclpParams, d: &DerivedEclpParams, r: Vector2) -> PoolResult<I256> {
    let term_xp = d.tau_beta.x.div_xp(d.d_sq)?;
    let mut a = if d.tau_beta.x > I256::ZERO {
        r.x.mul_up_mag(p.lambda)?.mul_up_mag(p.c)?.mul_up_xp_to_np(term_xp)?
    } else {
        r.y.mul_up_mag(p.lambda)?.mul_up_mag(p.c)?.mul_up_xp_to_np(term_xp)?
    };
    a = a + r.x.mul_up_mag(p.s)?.mul_up_xp_to_np(d.tau_beta.y.div_xp(d.d_sq)?)?;
    Ok(a)
}

/// Virtual offset of token 1, rounded up.
pub fn virtual_offset_1(p: &EclpParams, d: &DerivedEclpParams, r: Vector2) -> PoolResult<I256> {
    let term_xp = d.tau_alpha.x.div_xp(d.d_sq)?;
    let mut b = if d.tau_alpha.x < I256::ZERO {
        r.x.mul_up_mag(p.lambda)?.mul_up_mag(p.s)?.mul_up_xp_to_np(-term_xp)?
    } else {
        (-r.y).mul_up_mag(p.lambda)?.mul_up_mag(p.s)?.mul_up_xp_to_np(term_xp)?
    };
    b = b + r.x.mul_up_mag(p.c)?.mul_up_xp_to_np(d.tau_alpha.y.div_xp(d.d_sq)?)?;
    Ok(b)
}

/// Largest balance of token 0 the curve can hold at invariant `r`.
pub fn max_balances_0(p: &EclpParams, d: &DerivedEclpParams, r: Vector2) -> PoolResult<I256> {
    let term_xp1 = (d.tau_beta.x - d.tau_alpha.x).div_xp(d.d_sq)?;
    let term_xp2 = (d.tau_beta.y - d.tau_alpha.y).div_xp(d.d_sq)?;

    let xp = r.y.mul_down_mag(p.lambda)?.mul_down_mag(p.c)?.mul_down_xp_to_np(term_xp1)?;
    let term2 = if term_xp2 > I256::ZERO {
        r.y.mul_down_mag(p.s)?
    } else {
        r.x.mul_up_mag(p.s)?
    };
    Ok(xp + term2.mul_down_xp_to_np(term_xp2)?)
}

/// Largest balance of token 1 the curve can hold at invariant `r`.
pub fn max_balances_1(p: &EclpParams, d: &DerivedEclpParams, r: Vector2) -> PoolResult<I256> {
    let term_xp1 = (d.tau_beta.x - d.tau_alpha.x).div_xp(d.d_sq)?;
    let term_xp2 = (d.tau_alpha.y - d.tau_beta.y).div_xp(d.d_sq)?;

    let yp = r.y.mul_down_mag(p.lambda)?.mul_down_mag(p.s)?.mul_down_xp_to_np(term_xp1)?;
    let term2 = if term_xp2 > I256::ZERO {
        r.y.mul_down_mag(p.c)?
    } else {
        r.x.mul_up_mag(p.c)?
    };
    Ok(yp + term2.mul_down_xp_to_np(term_xp2)?)
}

pub fn check_asset_bounds(
    p: &EclpParams,
    d: &DerivedEclpParams,
    r: Vector2,
    new_balance: I256,
    asset_index: usize,
) -> PoolResult<()> {
    let max = if asset_index == 0 {
        max_balances_0(p, d, r)?
    } else {
        max_balances_1(p, d, r)?
    };
    if new_balance > MAX_BALANCES || new_balance > max {
        return Err(PoolError::AssetBoundsExceeded);
    }
    Ok(())
}

/// `x'x' / lambda^2` for the shifted balance `x' = x - a`.
pub fn calc_xp_xp_div_lambda_lambda(
    x: I256,
    r: Vector2,
    lambda: I256,
    s: I256,
    c: I256,
    tau_beta: Vector2,
    d_sq: I256,
) -> PoolResult<I256> {
    let d_sq2 = d_sq.mul_xp(d_sq)?;
    let r_sq = r.x.mul_up_mag(r.x)?;

    // r^2 2sc tau_x tau_y
    let term_xp = tau_beta.x.mul_xp(tau_beta.y)?.div_xp(d_sq2)?;
    let mut qa = if term_xp > I256::ZERO {
        r_sq.mul_up_mag(int(2) * s)?
            .mul_up_mag(c)?
            .mul_up_xp_to_np(term_xp + int(7))?
    } else {
        r.y.mul_down_mag(r.y)?
            .mul_down_mag(int(2) * s)?
            .mul_down_mag(c)?
            .mul_up_xp_to_np(term_xp)?
    };

    // -rx 2c tau_x
    let qb = if tau_beta.x < I256::ZERO {
        r.x.mul_up_mag(x)?
            .mul_up_mag(int(2) * c)?
            .mul_up_xp_to_np(-tau_beta.x.div_xp(d_sq)? + int(3))?
    } else {
        (-r.y)
            .mul_down_mag(x)?
            .mul_down_mag(int(2) * c)?
            .mul_up_xp_to_np(tau_beta.x.div_xp(d_sq)?)?
    };
    qa = qa + qb;

    // r^2 s^2 tau_y^2 - rx 2s tau_y + x^2, over lambda^2
    let term_xp = tau_beta.y.mul_xp(tau_beta.y)?.div_xp(d_sq2)? + int(7);
    let mut qb = r_sq.mul_up_mag(s)?.mul_up_mag(s)?.mul_up_xp_to_np(term_xp)?;
    let qc = (-r.y)
        .mul_down_mag(x)?
        .mul_down_mag(int(2) * s)?
        .mul_up_xp_to_np(tau_beta.y.div_xp(d_sq)?)?;
    qb = qb + qc + x.mul_up_mag(x)?;
    qb = if qb > I256::ZERO {
        qb.div_up_mag(lambda)?
    } else {
        qb.div_down_mag(lambda)?
    };

    qa = qa + qb;
    qa = if qa > I256::ZERO {
        qa.div_up_mag(lambda)?
    } else {
        qa.div_down_mag(lambda)?
    };

    // + r^2 c^2 tau_x^2
    let term_xp = tau_beta.x.mul_xp(tau_beta.x)?.div_xp(d_sq2)? + int(7);
    let val = r_sq.mul_up_mag(c)?.mul_up_mag(c)?;
    Ok(val.mul_up_xp_to_np(term_xp)? + qa)
}

/// Solves the swap quadratic for the balance of the other token given `x`,
/// shifted by the virtual offsets `ab`.
#[allow(clippy::too_many_arguments)]
pub fn solve_quadratic_swap(
    lambda: I256,
    x: I256,
    s: I256,
    c: I256,
    r: Vector2,
    ab: Vector2,
    tau_beta: Vector2,
    d_sq: I256,
) -> PoolResult<I256> {
    let lam_bar = Vector2::new(
        ONE_XP - ONE_XP.div_down_mag(lambda)?.div_down_mag(lambda)?,
        ONE_XP - ONE_XP.div_up_mag(lambda)?.div_up_mag(lambda)?,
    );

    let xp = x - ab.x;
    let qb = if xp > I256::ZERO {
        (-xp)
            .mul_down_mag(s)?
            .mul_down_mag(c)?
            .mul_up_xp_to_np(lam_bar.y.div_xp(d_sq)?)?
    } else {
        (-xp)
            .mul_up_mag(s)?
            .mul_up_mag(c)?
            .mul_up_xp_to_np(lam_bar.x.div_xp(d_sq)? + I256::ONE)?
    };

    let s_term_x = lam_bar.y.mul_down_mag(s)?.mul_down_mag(s)?.div_xp(d_sq)?;
    let s_term_y = lam_bar.x.mul_up_mag(s)?.mul_up_mag(s)?.div_xp(d_sq + I256::ONE)? + I256::ONE;
    let s_term = Vector2::new(ONE_XP - s_term_x, ONE_XP - s_term_y);

    let mut qc = -calc_xp_xp_div_lambda_lambda(x, r, lambda, s, c, tau_beta, d_sq)?;
    qc = qc + r.y.mul_down_mag(r.y)?.mul_down_xp_to_np(s_term.y)?;
    qc = if qc > I256::ZERO {
        signed_sqrt(qc)?
    } else {
        I256::ZERO
    };

    let shifted = if qb - qc > I256::ZERO {
        (qb - qc).mul_up_xp_to_np(ONE_XP.div_xp(s_term.y)?)?
    } else {
        (qb - qc).mul_up_xp_to_np(ONE_XP.div_xp(s_term.x)?)?
    };
    Ok(shifted + ab.y)
}

pub fn calc_y_given_x(x: I256, p: &EclpParams, d: &DerivedEclpParams, r: Vector2) -> PoolResult<I256> {
    let ab = Vector2::new(virtual_offset_0(p, d, r)?, virtual_offset_1(p, d, r)?);
    solve_quadratic_swap(p.lambda, x, p.s, p.c, r, ab, d.tau_beta, d.d_sq)
}

pub fn calc_x_given_y(y: I256, p: &EclpParams, d: &DerivedEclpParams, r: Vector2) -> PoolResult<I256> {
    let ba = Vector2::new(virtual_offset_1(p, d, r)?, virtual_offset_0(p, d, r)?);
    // mirror of calc_y_given_x: swap s and c, reflect tau_alpha
    solve_quadratic_swap(
        p.lambda,
        y,
        p.c,
        p.s,
        r,
        ba,
        Vector2::new(-d.tau_alpha.x, d.tau_alpha.y),
        d.d_sq,
    )
}

pub fn calc_out_given_in(
    balances: &[U256],
    amount_in: U256,
    token_in_is_token_0: bool,
    p: &EclpParams,
    d: &DerivedEclpParams,
    r: Vector2,
) -> PoolResult<U256> {
    let (ix_in, ix_out) = if token_in_is_token_0 { (0, 1) } else { (1, 0) };
    let balance_in_new = to_signed(balances[ix_in])? + to_signed(amount_in)?;
    check_asset_bounds(p, d, r, balance_in_new, ix_in)?;

    let balance_out_new = if token_in_is_token_0 {
        calc_y_given_x(balance_in_new, p, d, r)?
    } else {
        calc_x_given_y(balance_in_new, p, d, r)?
    };
    if balance_out_new < I256::ZERO {
        return Err(PoolError::AssetBoundsExceeded);
    }
    balances[ix_out]
        .checked_sub(to_unsigned(balance_out_new)?)
        .ok_or(PoolError::AssetBoundsExceeded)
}

pub fn calc_in_given_out(
    balances: &[U256],
    amount_out: U256,
    token_in_is_token_0: bool,
    p: &EclpParams,
    d: &DerivedEclpParams,
    r: Vector2,
) -> PoolResult<U256> {
    let (ix_in, ix_out) = if token_in_is_token_0 { (0, 1) } else { (1, 0) };
    if amount_out > balances[ix_out] {
        return Err(PoolError::AssetBoundsExceeded);
    }
    let balance_out_new = to_signed(balances[ix_out] - amount_out)?;

    let balance_in_new = if token_in_is_token_0 {
        calc_x_given_y(balance_out_new, p, d, r)?
    } else {
        calc_y_given_x(balance_out_new, p, d, r)?
    };
    check_asset_bounds(p, d, r, balance_in_new, ix_in)?;
    if balance_in_new < I256::ZERO {
        return Err(PoolError::AssetBoundsExceeded);
    }
    to_unsigned(balance_in_new)?
        .checked_sub(balances[ix_in])
        .ok_or(PoolError::AssetBoundsExceeded)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use sor_domain::math::signed::ONE;

    fn xp(v: &str) -> I256 {
        I256::from_str_radix(v, 10).unwrap()
    }

    /// Price range [0.998502246630054917, 1.000200040008001600], rotated by
    /// 45 degrees with lambda 4000. `u = sc(tb.x - ta.x)`, `v = s^2 tb.y + c^2 ta.y`,
    /// `w = sc(tb.y - ta.y)`, `z = c^2 tb.x + s^2 ta.x`, `d_sq = c^2 + s^2`.
    pub fn params() -> (EclpParams, DerivedEclpParams) {
        let p = EclpParams {
            alpha: I256::new(998_502_246_630_054_917),
            beta: I256::new(1_000_200_040_008_001_600),
            c: I256::new(707_106_781_186_547_524),
            s: I256::new(707_106_781_186_547_524),
            lambda: ONE * I256::new(4000),
        };
        let d = DerivedEclpParams {
            tau_alpha: Vector2::new(
                xp("-94861212813096057289512505574275160547"),
                xp("31644119574235279926451292677567331630"),
            ),
            tau_beta: Vector2::new(
                xp("37142269533113549537591131345643981951"),
                xp("92846388265400743995957747409218517601"),
            ),
            u: xp("66001741173104803338721745994955553010"),
            v: xp("62245253919818011890633399060291020887"),
            w: xp("30601134345582731999059227365825592985"),
            z: xp("-28859471639991253843241687114315589298"),
            d_sq: xp("99999999999999999886624093342106115200"),
        };
        (p, d)
    }
}
