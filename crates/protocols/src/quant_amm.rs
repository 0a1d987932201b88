//! Weighted curve whose weights drift linearly between oracle updates.

use crate::error::{PoolError, PoolResult};
use crate::vault::curve::{PoolCurve, SwapParams};
use crate::weighted::math;
use ethnum::I256;
use primitive_types::U256;
use sor_domain::enums::{Rounding, SwapKind};
use sor_domain::math::signed::{to_signed, to_unsigned};
use sor_domain::math::{FixedPoint, SignedFixedPoint};

/// Weight schedule as of the last oracle update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightSchedule {
    /// Weights at `last_update_time`, 18 decimals.
    pub base_weights: Vec<U256>,
    /// Weight change per second, 18 decimals, signed.
    pub multipliers: Vec<I256>,
    pub last_update_time: u64,
    pub last_interpolation_time_possible: u64,
}

impl WeightSchedule {
    /// Weights at `timestamp`; interpolation stops at
    /// `last_interpolation_time_possible`.
    pub fn weights_at(&self, timestamp: u64) -> PoolResult<Vec<U256>> {
        if self.multipliers.len() != self.base_weights.len() {
            return Err(PoolError::MissingData("weight multipliers"));
        }
        let until = timestamp.min(self.last_interpolation_time_possible);
        let elapsed = I256::new(i128::from(until.saturating_sub(self.last_update_time)));
        self.base_weights
            .iter()
            .zip(&self.multipliers)
            .map(|(weight, multiplier)| -> PoolResult<U256> {
                let weight = to_signed(*weight)?.try_add(multiplier.try_mul(elapsed)?)?;
                Ok(to_unsigned(weight)?)
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantAmmCurve {
    weights: Vec<U256>,
    max_trade_size_ratio: U256,
}

impl QuantAmmCurve {
    /// Freezes the schedule at `timestamp`.
    pub fn at_timestamp(
        schedule: &WeightSchedule,
        max_trade_size_ratio: U256,
        timestamp: u64,
    ) -> PoolResult<Self> {
        let weights = schedule.weights_at(timestamp)?;
        if weights.iter().any(|w| w.is_zero()) {
            return Err(PoolError::MissingData("weights"));
        }
        Ok(Self {
            weights,
            max_trade_size_ratio,
        })
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

    fn check_trade_size(&self, amount: U256, balance: U256) -> PoolResult<()> {
        if amount > balance.mul_down(self.max_trade_size_ratio)? {
            return Err(PoolError::MaxTradeSizeRatio);
        }
        Ok(())
    }
}

impl PoolCurve for QuantAmmCurve {
    fn on_swap(&self, params: &SwapParams<'_>) -> PoolResult<U256> {
        let balance_in = params.balances_live_scaled18[params.index_in];
        let balance_out = params.balances_live_scaled18[params.index_out];
        let weight_in = self.weight(params.index_in)?;
        let weight_out = self.weight(params.index_out)?;
        let amount = params.amount_given_scaled18;
        match params.kind {
            SwapKind::GivenIn => {
                self.check_trade_size(amount, balance_in)?;
                let out = math::compute_out_given_exact_in(balance_in, weight_in, balance_out, weight_out, amount)?;
                self.check_trade_size(out, balance_out)?;
                Ok(out)
            }
            SwapKind::GivenOut => {
                self.check_trade_size(amount, balance_out)?;
                let amount_in =
                    math::compute_in_given_exact_out(balance_in, weight_in, balance_out, weight_out, amount)?;
                self.check_trade_size(amount_in, balance_in)?;
                Ok(amount_in)
            }
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
        let (balance, ratio) = match kind {
            SwapKind::GivenIn => (balances[index_in], math::MAX_IN_RATIO),
            SwapKind::GivenOut => (balances[index_out], math::MAX_OUT_RATIO),
        };
        let by_trade_size = balance.mul_down(self.max_trade_size_ratio)?;
        Ok(by_trade_size.min(balance.mul_down(ratio)?))
    }
}
