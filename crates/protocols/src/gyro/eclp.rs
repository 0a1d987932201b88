use crate::base_pool::{BasePool, find_pool_token};
use crate::error::{PoolError, PoolResult};
use crate::gyro::eclp_math::{self, DerivedEclpParams, EclpParams, Vector2};
use crate::legacy::{add_swap_fee, downscale_down, downscale_up, subtract_swap_fee, upscale, upscaled_balances};
use crate::vault::curve::{PoolCurve, SwapParams};
use ethnum::I256;
use primitive_types::U256;
use sor_domain::enums::{PoolType, Rounding, SwapKind};
use sor_domain::math::{FixedPoint, SignedFixedPoint};
use sor_domain::math::signed::{to_signed, to_unsigned};
use sor_domain::pool::{PoolToken, TokenPairLiquidity, lookup_pair_liquidity};
use sor_domain::token::Token;

pub const MIN_INVARIANT_RATIO: U256 = U256([600_000_000_000_000_000, 0, 0, 0]);
pub const MAX_INVARIANT_RATIO: U256 = U256([5_000_000_000_000_000_000, 0, 0, 0]);

/// Elliptic concentrated liquidity curve over two tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GyroEclpCurve {
    params: EclpParams,
    derived: DerivedEclpParams,
}

impl GyroEclpCurve {
    pub fn new(params: EclpParams, derived: DerivedEclpParams) -> Self {
        Self { params, derived }
    }

    /// `(invariant + 2 * error, invariant)`: an overestimate for the
    /// x-component, an underestimate for the y-component.
    fn swap_invariant(&self, balances: &[U256]) -> PoolResult<Vector2> {
        let (invariant, err) =
            eclp_math::calculate_invariant_with_error(balances, &self.params, &self.derived)?;
        Ok(Vector2::new(invariant.try_add(err.try_add(err)?)?, invariant))
    }

    fn quote(&self, kind: SwapKind, balances: &[U256], index_in: usize, amount: U256) -> PoolResult<U256> {
        let r = self.swap_invariant(balances)?;
        let token_in_is_token_0 = index_in == 0;
        match kind {
            SwapKind::GivenIn => {
                eclp_math::calc_out_given_in(balances, amount, token_in_is_token_0, &self.params, &self.derived, r)
            }
            SwapKind::GivenOut => {
                eclp_math::calc_in_given_out(balances, amount, token_in_is_token_0, &self.params, &self.derived, r)
            }
        }
    }

    fn limit(&self, kind: SwapKind, balances: &[U256], index_in: usize, index_out: usize) -> PoolResult<U256> {
        match kind {
            SwapKind::GivenOut => Ok(balances[index_out]),
            SwapKind::GivenIn => {
                let r = self.swap_invariant(balances)?;
                let max_in = if index_in == 0 {
                    eclp_math::max_balances_0(&self.params, &self.derived, r)?
                } else {
                    eclp_math::max_balances_1(&self.params, &self.derived, r)?
                };
                let max_in = to_unsigned(max_in.max(I256::ZERO))?;
                Ok(max_in.saturating_sub(balances[index_in]))
            }
        }
    }
}

impl PoolCurve for GyroEclpCurve {
    fn on_swap(&self, params: &SwapParams<'_>) -> PoolResult<U256> {
        self.quote(
            params.kind,
            params.balances_live_scaled18,
            params.index_in,
            params.amount_given_scaled18,
        )
    }

    fn compute_invariant(&self, balances: &[U256], rounding: Rounding) -> PoolResult<U256> {
        let (invariant, err) =
            eclp_math::calculate_invariant_with_error(balances, &self.params, &self.derived)?;
        let value = match rounding {
            Rounding::Down => invariant.try_sub(err)?,
            Rounding::Up => invariant.try_add(err)?,
        };
        Ok(to_unsigned(value.max(I256::ZERO))?)
    }

    fn compute_balance(
        &self,
        balances: &[U256],
        token_index: usize,
        invariant_ratio: U256,
    ) -> PoolResult<U256> {
        let (invariant, err) =
            eclp_math::calculate_invariant_with_error(balances, &self.params, &self.derived)?;
        let r = Vector2::new(
            to_signed(to_unsigned(invariant.try_add(err)?)?.mul_up(invariant_ratio)?)?,
            to_signed(to_unsigned(invariant.try_sub(err)?.max(I256::ZERO))?.mul_up(invariant_ratio)?)?,
        );
        let balance = if token_index == 0 {
            eclp_math::calc_x_given_y(to_signed(balances[1])?, &self.params, &self.derived, r)?
        } else {
            eclp_math::calc_y_given_x(to_signed(balances[0])?, &self.params, &self.derived, r)?
        };
        if balance < I256::ZERO {
            return Err(PoolError::AssetBoundsExceeded);
        }
        Ok(to_unsigned(balance)?)
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
        self.limit(kind, balances, index_in, index_out)
    }
}

/// Legacy elliptic pool: the same curve with fees charged on the raw
/// amount and balances upscaled by scaling factor and rate.
#[derive(Debug, Clone)]
pub struct LegacyGyroEclpPool {
    id: String,
    address: String,
    tokens: Vec<PoolToken>,
    curve: GyroEclpCurve,
    swap_fee: U256,
    pair_liquidity: Vec<TokenPairLiquidity>,
}

impl LegacyGyroEclpPool {
    pub fn new(
        id: impl Into<String>,
        address: &str,
        tokens: Vec<PoolToken>,
        curve: GyroEclpCurve,
        swap_fee: U256,
    ) -> PoolResult<Self> {
        if tokens.len() != 2 {
            return Err(PoolError::UnsupportedOperation("elliptic pools hold two tokens"));
        }
        Ok(Self {
            id: id.into(),
            address: address.to_ascii_lowercase(),
            tokens,
            curve,
            swap_fee,
            pair_liquidity: Vec::new(),
        })
    }

    #[must_use]
    pub fn with_pair_liquidity(mut self, pairs: Vec<TokenPairLiquidity>) -> Self {
        self.pair_liquidity = pairs;
        self
    }
}

impl BasePool for LegacyGyroEclpPool {
    fn id(&self) -> &str {
        &self.id
    }

    fn address(&self) -> &str {
        &self.address
    }

    fn pool_type(&self) -> PoolType {
        PoolType::GyroEclp
    }

    fn swap_fee(&self) -> U256 {
        self.swap_fee
    }

    fn tokens(&self) -> &[PoolToken] {
        &self.tokens
    }

    fn swap_given_in(&self, token_in: &Token, token_out: &Token, amount_in: U256) -> PoolResult<U256> {
        let tin = find_pool_token(&self.tokens, token_in)?;
        let tout = find_pool_token(&self.tokens, token_out)?;
        if amount_in.is_zero() {
            return Ok(U256::zero());
        }
        let balances = upscaled_balances(&self.tokens)?;
        let amount = upscale(subtract_swap_fee(amount_in, self.swap_fee)?, tin)?;
        let out = self.curve.quote(SwapKind::GivenIn, &balances, tin.index, amount)?;
        downscale_down(out, tout)
    }

    fn swap_given_out(
        &self,
        token_in: &Token,
        token_out: &Token,
        amount_out: U256,
    ) -> PoolResult<U256> {
        let tin = find_pool_token(&self.tokens, token_in)?;
        let tout = find_pool_token(&self.tokens, token_out)?;
        if amount_out.is_zero() {
            return Ok(U256::zero());
        }
        let balances = upscaled_balances(&self.tokens)?;
        let amount_in = self
            .curve
            .quote(SwapKind::GivenOut, &balances, tin.index, upscale(amount_out, tout)?)?;
        add_swap_fee(downscale_up(amount_in, tin)?, self.swap_fee)
    }

    fn get_limit_amount_swap(
        &self,
        token_in: &Token,
        token_out: &Token,
        kind: SwapKind,
    ) -> PoolResult<U256> {
        let tin = find_pool_token(&self.tokens, token_in)?;
        let tout = find_pool_token(&self.tokens, token_out)?;
        let balances = upscaled_balances(&self.tokens)?;
        let limit = self.curve.limit(kind, &balances, tin.index, tout.index)?;
        match kind {
            SwapKind::GivenIn => downscale_down(limit, tin),
            SwapKind::GivenOut => downscale_down(limit, tout),
        }
    }

    fn get_normalized_liquidity(&self, token_in: &Token, token_out: &Token) -> U256 {
        let from_snapshot =
            lookup_pair_liquidity(&self.pair_liquidity, &token_in.address, &token_out.address);
        if !from_snapshot.is_zero() {
            return from_snapshot;
        }
        find_pool_token(&self.tokens, token_out)
            .ok()
            .and_then(|t| upscale(t.balance, t).ok())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gyro::eclp_math::fixtures::params;
    use sor_domain::math::ONE;

    fn e18(v: u64) -> U256 {
        U256::from(v) * ONE
    }

    fn curve() -> GyroEclpCurve {
        let (p, d) = params();
        GyroEclpCurve::new(p, d)
    }

    #[test]
    fn test_invariant_rounding_brackets() {
        let balances = [e18(1000), e18(1000)];
        let down = curve().compute_invariant(&balances, Rounding::Down).unwrap();
        let up = curve().compute_invariant(&balances, Rounding::Up).unwrap();
        assert!(down < up);
    }

    #[test]
    fn test_limits() {
        let curve = curve();
        let balances = [e18(1000), e18(1000)];
        assert_eq!(curve.max_swap_amount(SwapKind::GivenOut, &balances, 0, 1).unwrap(), e18(1000));
        // the bounded curve can only absorb so much before leaving its price range
        let max_in = curve.max_swap_amount(SwapKind::GivenIn, &balances, 0, 1).unwrap();
        assert!(max_in > U256::zero());
        assert!(max_in < e18(10_000));
    }

    #[test]
    fn test_legacy_pool_charges_fee_on_input() {
        let a = Token::new(1, "0xa", 18);
        let b = Token::new(1, "0xb", 18);
        let tokens = vec![
            PoolToken::new(a.clone(), e18(1000), 0, ONE).unwrap(),
            PoolToken::new(b.clone(), e18(1000), 1, ONE).unwrap(),
        ];
        let free = LegacyGyroEclpPool::new("e", "0xe", tokens.clone(), curve(), U256::zero()).unwrap();
        let charged = LegacyGyroEclpPool::new("e", "0xe", tokens, curve(), ONE / 100).unwrap();

        let out_free = free.swap_given_in(&a, &b, e18(1)).unwrap();
        let out_charged = charged.swap_given_in(&a, &b, e18(1)).unwrap();
        // a 1% fee leaves 0.99 to trade
        assert!(out_charged < out_free);
        assert!(out_charged > e18(98) / 100);
    }
}
