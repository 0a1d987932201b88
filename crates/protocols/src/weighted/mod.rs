//! Weighted pools: the vault curve and the legacy direct-settlement model.

mod legacy;
pub mod math;

pub use legacy::LegacyWeightedPool;

use crate::error::{PoolError, PoolResult};
use crate::vault::curve::{PoolCurve, SwapParams};
use primitive_types::U256;
use sor_domain::enums::{Rounding, SwapKind};
use sor_domain::math::{FixedPoint, ONE};

/// Constant weighted product curve with normalized weights summing to one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightedCurve {
    weights: Vec<U256>,
}

impl WeightedCurve {
    pub fn new(weights: Vec<U256>) -> PoolResult<Self> {
        if weights.iter().any(|w| w.is_zero()) {
            return Err(PoolError::MissingData("weights"));
        }
        let total = weights
            .iter()
            .try_fold(U256::zero(), |acc, w| acc.try_add(*w))?;
        // tolerate rounding in persisted weights
        let tolerance = U256::from(1_000_000u64);
        if total > ONE + tolerance || total + tolerance < ONE {
            return Err(PoolError::MissingData("normalized weights"));
        }
        Ok(Self { weights })
    }

    pub fn weights(&self) -> &[U256] {
        &self.weights
    }

    fn weight(&self, index: usize) -> PoolResult<U256> {
        self.weights
            .get(index)
            .copied()
            .ok_or(PoolError::MissingData("weight"))
    }
}

impl PoolCurve for WeightedCurve {
    fn on_swap(&self, params: &SwapParams<'_>) -> PoolResult<U256> {
        let balance_in = params.balances_live_scaled18[params.index_in];
        let balance_out = params.balances_live_scaled18[params.index_out];
        let weight_in = self.weight(params.index_in)?;
        let weight_out = self.weight(params.index_out)?;
        match params.kind {
            SwapKind::GivenIn => math::compute_out_given_exact_in(
                balance_in,
                weight_in,
                balance_out,
                weight_out,
                params.amount_given_scaled18,
            ),
            SwapKind::GivenOut => math::compute_in_given_exact_out(
                balance_in,
                weight_in,
                balance_out,
                weight_out,
                params.amount_given_scaled18,
            ),
        }
    }

    fn compute_invariant(&self, balances: &[U256], rounding: Rounding) -> PoolResult<U256> {
        match rounding {
            Rounding::Down => math::compute_invariant_down(&self.weights, balances),
            Rounding::Up => math::compute_invariant_up(&self.weights, balances),
        }
    }

    fn compute_balance(
        &self,
        balances: &[U256],
        token_index: usize,
        invariant_ratio: U256,
    ) -> PoolResult<U256> {
        math::compute_balance_out_given_invariant(
            balances[token_index],
            self.weight(token_index)?,
            invariant_ratio,
        )
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
        index_in: usize,
        index_out: usize,
    ) -> PoolResult<U256> {
        Ok(match kind {
            SwapKind::GivenIn => balances[index_in].mul_down(math::MAX_IN_RATIO)?,
            SwapKind::GivenOut => balances[index_out].mul_down(math::MAX_OUT_RATIO)?,
        })
    }
}
