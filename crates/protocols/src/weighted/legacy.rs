use crate::base_pool::{BasePool, find_pool_token};
use crate::error::{PoolError, PoolResult};
use crate::legacy::{add_swap_fee, downscale_down, downscale_up, subtract_swap_fee, upscale};
use crate::weighted::math;
use primitive_types::U256;
use sor_domain::enums::{PoolType, SwapKind};
use sor_domain::math::FixedPoint;
use sor_domain::pool::{PoolToken, TokenPairLiquidity, lookup_pair_liquidity};
use sor_domain::token::Token;

/// Weighted pool that settles directly, with raw-amount fees.
#[derive(Debug, Clone)]
pub struct LegacyWeightedPool {
    id: String,
    address: String,
    tokens: Vec<PoolToken>,
    weights: Vec<U256>,
    swap_fee: U256,
    pair_liquidity: Vec<TokenPairLiquidity>,
}

impl LegacyWeightedPool {
    pub fn new(
        id: impl Into<String>,
        address: &str,
        tokens: Vec<PoolToken>,
        weights: Vec<U256>,
        swap_fee: U256,
    ) -> PoolResult<Self> {
        if weights.len() != tokens.len() {
            return Err(PoolError::MissingData("weights"));
        }
        Ok(Self {
            id: id.into(),
            address: address.to_ascii_lowercase(),
            tokens,
            weights,
            swap_fee,
            pair_liquidity: Vec::new(),
        })
    }

    #[must_use]
    pub fn with_pair_liquidity(mut self, pairs: Vec<TokenPairLiquidity>) -> Self {
        self.pair_liquidity = pairs;
        self
    }

    fn sides(&self, token_in: &Token, token_out: &Token) -> PoolResult<(&PoolToken, &PoolToken)> {
        Ok((
            find_pool_token(&self.tokens, token_in)?,
            find_pool_token(&self.tokens, token_out)?,
        ))
    }
}

impl BasePool for LegacyWeightedPool {
    fn id(&self) -> &str {
        &self.id
    }

    fn address(&self) -> &str {
        &self.address
    }

    fn pool_type(&self) -> PoolType {
        PoolType::Weighted
    }

    fn swap_fee(&self) -> U256 {
        self.swap_fee
    }

    fn tokens(&self) -> &[PoolToken] {
        &self.tokens
    }

    fn swap_given_in(&self, token_in: &Token, token_out: &Token, amount_in: U256) -> PoolResult<U256> {
        let (tin, tout) = self.sides(token_in, token_out)?;
        if amount_in.is_zero() {
            return Ok(U256::zero());
        }
        let amount_in = upscale(subtract_swap_fee(amount_in, self.swap_fee)?, tin)?;
        let out = math::compute_out_given_exact_in(
            upscale(tin.balance, tin)?,
            self.weights[tin.index],
            upscale(tout.balance, tout)?,
            self.weights[tout.index],
            amount_in,
        )?;
        downscale_down(out, tout)
    }

    fn swap_given_out(
        &self,
        token_in: &Token,
        token_out: &Token,
        amount_out: U256,
    ) -> PoolResult<U256> {
        let (tin, tout) = self.sides(token_in, token_out)?;
        if amount_out.is_zero() {
            return Ok(U256::zero());
        }
        let amount_in = math::compute_in_given_exact_out(
            upscale(tin.balance, tin)?,
            self.weights[tin.index],
            upscale(tout.balance, tout)?,
            self.weights[tout.index],
            upscale(amount_out, tout)?,
        )?;
        add_swap_fee(downscale_up(amount_in, tin)?, self.swap_fee)
    }

    fn get_limit_amount_swap(
        &self,
        token_in: &Token,
        token_out: &Token,
        kind: SwapKind,
    ) -> PoolResult<U256> {
        let (tin, tout) = self.sides(token_in, token_out)?;
        Ok(match kind {
            SwapKind::GivenIn => tin.balance.mul_down(math::MAX_IN_RATIO)?,
            SwapKind::GivenOut => tout.balance.mul_down(math::MAX_OUT_RATIO)?,
        })
    }

    fn get_normalized_liquidity(&self, token_in: &Token, token_out: &Token) -> U256 {
        let from_snapshot =
            lookup_pair_liquidity(&self.pair_liquidity, &token_in.address, &token_out.address);
        if !from_snapshot.is_zero() {
            return from_snapshot;
        }
        match self.sides(token_in, token_out) {
            Ok((_, tout)) => upscale(tout.balance, tout).unwrap_or_default(),
            Err(_) => U256::zero(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sor_domain::math::ONE;

    fn e18(v: u64) -> U256 {
        U256::from(v) * ONE
    }

    fn pool(fee: U256) -> LegacyWeightedPool {
        let tokens = vec![
            PoolToken::new(Token::new(1, "0xa", 18), e18(1000), 0, ONE).unwrap(),
            PoolToken::new(Token::new(1, "0xb", 18), e18(1000), 1, ONE).unwrap(),
        ];
        LegacyWeightedPool::new("legacy", "0xl", tokens, vec![ONE / 2, ONE / 2], fee).unwrap()
    }

    #[test]
    fn test_swap_given_in_matches_weighted_math() {
        // 1000 * (1 - 1000 / 1010) = 9.900990099009900990
        let out = pool(U256::zero())
            .swap_given_in(&Token::new(1, "0xa", 18), &Token::new(1, "0xb", 18), e18(10))
            .unwrap();
        let expected = U256::from(9_900_990_099_009_900_990u64);
        assert!(out <= expected);
        assert!(expected - out < U256::from(1_000_000u64));
    }

    #[test]
    fn test_fee_is_charged_on_input() {
        let a = Token::new(1, "0xa", 18);
        let b = Token::new(1, "0xb", 18);
        let with_fee = pool(ONE / 100).swap_given_in(&a, &b, e18(10)).unwrap();
        let net_input = pool(U256::zero()).swap_given_in(&a, &b, e18(10) - e18(1) / 10).unwrap();
        assert_eq!(with_fee, net_input);

        let gross = pool(ONE / 100).swap_given_out(&a, &b, e18(5)).unwrap();
        let net = pool(U256::zero()).swap_given_out(&a, &b, e18(5)).unwrap();
        assert_eq!(gross, net.div_up(ONE - ONE / 100).unwrap());
    }

    #[test]
    fn test_limits_are_raw_thirty_percent() {
        let pool = pool(U256::zero());
        let limit = pool
            .get_limit_amount_swap(&Token::new(1, "0xa", 18), &Token::new(1, "0xb", 18), SwapKind::GivenOut)
            .unwrap();
        assert_eq!(limit, e18(300));
    }
}
