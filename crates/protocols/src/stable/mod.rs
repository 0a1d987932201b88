//! Stable pools: the vault curve and the legacy composable and meta models.

mod composable;
pub mod math;
mod meta;

pub use composable::ComposableStablePool;
pub use meta::MetaStablePool;

use crate::error::PoolResult;
use crate::legacy::{add_swap_fee, downscale_down, downscale_up, subtract_swap_fee, upscale};
use crate::vault::curve::{PoolCurve, SwapParams};
use primitive_types::U256;
use sor_domain::enums::{Rounding, SwapKind};
use sor_domain::math::FixedPoint;
use sor_domain::pool::PoolToken;

/// StableSwap curve; `amp` carries three decimals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StableCurve {
    amp: U256,
}

impl StableCurve {
    pub fn new(amp: U256) -> Self {
        Self { amp }
    }

    pub fn amp(&self) -> U256 {
        self.amp
    }
}

impl PoolCurve for StableCurve {
    fn on_swap(&self, params: &SwapParams<'_>) -> PoolResult<U256> {
        let balances = params.balances_live_scaled18;
        let invariant = math::compute_invariant(self.amp, balances)?;
        match params.kind {
            SwapKind::GivenIn => math::compute_out_given_exact_in(
                self.amp,
                balances,
                params.index_in,
                params.index_out,
                params.amount_given_scaled18,
                invariant,
            ),
            SwapKind::GivenOut => math::compute_in_given_exact_out(
                self.amp,
                balances,
                params.index_in,
                params.index_out,
                params.amount_given_scaled18,
                invariant,
            ),
        }
    }

    fn compute_invariant(&self, balances: &[U256], rounding: Rounding) -> PoolResult<U256> {
        let invariant = math::compute_invariant(self.amp, balances)?;
        if invariant.is_zero() || rounding == Rounding::Down {
            return Ok(invariant);
        }
        Ok(invariant.try_add(U256::one())?)
    }

    fn compute_balance(
        &self,
        balances: &[U256],
        token_index: usize,
        invariant_ratio: U256,
    ) -> PoolResult<U256> {
        let invariant = self
            .compute_invariant(balances, Rounding::Up)?
            .mul_up(invariant_ratio)?;
        math::compute_balance(self.amp, balances, invariant, token_index)
    }

    fn minimum_invariant_ratio(&self) -> U256 {
        math::MIN_INVARIANT_RATIO
    }

    fn maximum_invariant_ratio(&self) -> U256 {
        math::MAX_INVARIANT_RATIO
    }

    fn max_swap_amount(
        &self,
        kind: SwapKind,
        balances: &[U256],
        _index_in: usize,
        index_out: usize,
    ) -> PoolResult<U256> {
        stable_limit_scaled18(kind, balances[index_out])
    }
}

/// Near-par limit: any input can be absorbed up to roughly the output
/// balance; outputs stop just short of draining the pool.
fn stable_limit_scaled18(kind: SwapKind, balance_out_scaled18: U256) -> PoolResult<U256> {
    Ok(match kind {
        SwapKind::GivenIn => balance_out_scaled18,
        SwapKind::GivenOut => balance_out_scaled18.try_mul(U256::from(99u64))? / 100,
    })
}

/// Token-to-token swap of a legacy stable pool over upscaled `balances`.
pub(crate) fn legacy_swap(
    amp: U256,
    balances: &[U256],
    (tin, index_in): (&PoolToken, usize),
    (tout, index_out): (&PoolToken, usize),
    kind: SwapKind,
    amount: U256,
    swap_fee: U256,
) -> PoolResult<U256> {
    if amount.is_zero() {
        return Ok(U256::zero());
    }
    let invariant = math::compute_invariant(amp, balances)?;
    match kind {
        SwapKind::GivenIn => {
            let amount_in = upscale(subtract_swap_fee(amount, swap_fee)?, tin)?;
            let out = math::compute_out_given_exact_in(
                amp, balances, index_in, index_out, amount_in, invariant,
            )?;
            downscale_down(out, tout)
        }
        SwapKind::GivenOut => {
            let amount_in = math::compute_in_given_exact_out(
                amp,
                balances,
                index_in,
                index_out,
                upscale(amount, tout)?,
                invariant,
            )?;
            add_swap_fee(downscale_up(amount_in, tin)?, swap_fee)
        }
    }
}

/// Raw token-to-token limit of a legacy stable pool.
pub(crate) fn legacy_limit(tin: &PoolToken, tout: &PoolToken, kind: SwapKind) -> PoolResult<U256> {
    let limit = stable_limit_scaled18(kind, upscale(tout.balance, tout)?)?;
    match kind {
        SwapKind::GivenIn => downscale_down(limit, tin),
        SwapKind::GivenOut => downscale_down(limit, tout),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sor_domain::math::ONE;

    fn e18(v: u64) -> U256 {
        U256::from(v) * ONE
    }

    #[test]
    fn test_invariant_rounding() {
        let curve = StableCurve::new(U256::from(200_000u64));
        let balances = [e18(1000), e18(1000)];
        let down = curve.compute_invariant(&balances, Rounding::Down).unwrap();
        let up = curve.compute_invariant(&balances, Rounding::Up).unwrap();
        assert_eq!(up, down + 1);
        assert_eq!(curve.compute_invariant(&[U256::zero(), U256::zero()], Rounding::Up).unwrap(), U256::zero());
    }

    #[test]
    fn test_compute_balance_grows_with_ratio() {
        let curve = StableCurve::new(U256::from(200_000u64));
        let balances = [e18(1000), e18(1000)];
        // doubling the invariant single-sided needs a bit over 2000 more of token 0
        let new_balance = curve.compute_balance(&balances, 0, ONE * 2).unwrap();
        assert!(new_balance > e18(3000));
    }

    #[test]
    fn test_limits() {
        let curve = StableCurve::new(U256::from(200_000u64));
        let balances = [e18(1000), e18(500)];
        assert_eq!(curve.max_swap_amount(SwapKind::GivenIn, &balances, 0, 1).unwrap(), e18(500));
        assert_eq!(curve.max_swap_amount(SwapKind::GivenOut, &balances, 0, 1).unwrap(), e18(495));
    }
}
