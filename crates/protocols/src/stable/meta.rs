use crate::base_pool::{BasePool, find_pool_token};
use crate::error::{PoolError, PoolResult};
use crate::legacy::{upscale, upscaled_balances};
use crate::stable::{legacy_limit, legacy_swap};
use primitive_types::U256;
use sor_domain::enums::{PoolType, SwapKind};
use sor_domain::pool::{PoolToken, TokenPairLiquidity, lookup_pair_liquidity};
use sor_domain::token::Token;

/// Legacy two-token stable pool over rate-scaled balances.
#[derive(Debug, Clone)]
pub struct MetaStablePool {
    id: String,
    address: String,
    tokens: Vec<PoolToken>,
    amp: U256,
    swap_fee: U256,
    pair_liquidity: Vec<TokenPairLiquidity>,
}

impl MetaStablePool {
    pub fn new(
        id: impl Into<String>,
        address: &str,
        tokens: Vec<PoolToken>,
        amp: U256,
        swap_fee: U256,
    ) -> PoolResult<Self> {
        if tokens.len() != 2 {
            return Err(PoolError::UnsupportedOperation("meta stable pools hold two tokens"));
        }
        Ok(Self {
            id: id.into(),
            address: address.to_ascii_lowercase(),
            tokens,
            amp,
            swap_fee,
            pair_liquidity: Vec::new(),
        })
    }

    #[must_use]
    pub fn with_pair_liquidity(mut self, pairs: Vec<TokenPairLiquidity>) -> Self {
        self.pair_liquidity = pairs;
        self
    }

    fn swap(&self, kind: SwapKind, token_in: &Token, token_out: &Token, amount: U256) -> PoolResult<U256> {
        let tin = find_pool_token(&self.tokens, token_in)?;
        let tout = find_pool_token(&self.tokens, token_out)?;
        let balances = upscaled_balances(&self.tokens)?;
        legacy_swap(
            self.amp,
            &balances,
            (tin, tin.index),
            (tout, tout.index),
            kind,
            amount,
            self.swap_fee,
        )
    }
}

impl BasePool for MetaStablePool {
    fn id(&self) -> &str {
        &self.id
    }

    fn address(&self) -> &str {
        &self.address
    }

    fn pool_type(&self) -> PoolType {
        PoolType::MetaStable
    }

    fn swap_fee(&self) -> U256 {
        self.swap_fee
    }

    fn tokens(&self) -> &[PoolToken] {
        &self.tokens
    }

    fn swap_given_in(&self, token_in: &Token, token_out: &Token, amount_in: U256) -> PoolResult<U256> {
        self.swap(SwapKind::GivenIn, token_in, token_out, amount_in)
    }

    fn swap_given_out(
        &self,
        token_in: &Token,
        token_out: &Token,
        amount_out: U256,
    ) -> PoolResult<U256> {
        self.swap(SwapKind::GivenOut, token_in, token_out, amount_out)
    }

    fn get_limit_amount_swap(
        &self,
        token_in: &Token,
        token_out: &Token,
        kind: SwapKind,
    ) -> PoolResult<U256> {
        legacy_limit(
            find_pool_token(&self.tokens, token_in)?,
            find_pool_token(&self.tokens, token_out)?,
            kind,
        )
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
    use sor_domain::math::ONE;

    fn e18(v: u64) -> U256 {
        U256::from(v) * ONE
    }

    #[test]
    fn test_rate_scaled_swap() {
        let weth = Token::new(1, "0xweth", 18);
        let wsteth = Token::new(1, "0xwsteth", 18);
        // wstETH at 1.1 ETH: 1000 wstETH is worth 1100 WETH
        let tokens = vec![
            PoolToken::new(weth.clone(), e18(1100), 0, ONE).unwrap(),
            PoolToken::new(wsteth.clone(), e18(1000), 1, ONE + ONE / 10).unwrap(),
        ];
        let pool = MetaStablePool::new("meta", "0xm", tokens, U256::from(50_000u64), U256::zero()).unwrap();

        // 11 WETH buys a bit under 10 wstETH
        let out = pool.swap_given_in(&weth, &wsteth, e18(11)).unwrap();
        assert!(out < e18(10));
        assert!(out > e18(10) - e18(1) / 100);

        let limit = pool.get_limit_amount_swap(&weth, &wsteth, SwapKind::GivenOut).unwrap();
        assert_eq!(limit, e18(990));
    }

    #[test]
    fn test_requires_two_tokens() {
        let t = PoolToken::new(Token::new(1, "0xa", 18), e18(1), 0, ONE).unwrap();
        assert!(MetaStablePool::new("meta", "0xm", vec![t], U256::from(50_000u64), U256::zero()).is_err());
    }
}
