use crate::error::MathResult;
use crate::math::scaling::{
    scaling_factor, to_scaled18_apply_rate_round_down, to_scaled18_apply_rate_round_up,
};
use crate::math::ONE;
use crate::token::Token;
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// A token held by a pool together with its balance and price scaling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolToken {
    pub token: Token,
    /// Raw balance in token-native decimals.
    pub balance: U256,
    /// Position in the pool's token list.
    pub index: usize,
    /// `10^(18 - decimals)`.
    pub scaling_factor: U256,
    /// 18-decimal rate versus the token's canonical unit.
    pub rate: U256,
}

impl PoolToken {
    pub fn new(token: Token, balance: U256, index: usize, rate: U256) -> MathResult<Self> {
        let scaling_factor = scaling_factor(token.decimals)?;
        Ok(Self {
            token,
            balance,
            index,
            scaling_factor,
            rate,
        })
    }

    /// Synthetic entry for a pool's own share token: 18 decimals, rate one.
    pub fn bpt(chain_id: u64, pool_address: &str, total_shares: U256, index: usize) -> Self {
        Self {
            token: Token::new(chain_id, pool_address, 18),
            balance: total_shares,
            index,
            scaling_factor: U256::one(),
            rate: ONE,
        }
    }

    pub fn live_balance_round_down(&self) -> MathResult<U256> {
        to_scaled18_apply_rate_round_down(self.balance, self.scaling_factor, self.rate)
    }

    pub fn live_balance_round_up(&self) -> MathResult<U256> {
        to_scaled18_apply_rate_round_up(self.balance, self.scaling_factor, self.rate)
    }
}

/// Ranking liquidity for an unordered token pair within one pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPairLiquidity {
    pub token_a: String,
    pub token_b: String,
    pub normalized_liquidity: U256,
}

impl TokenPairLiquidity {
    pub fn matches(&self, a: &str, b: &str) -> bool {
        (self.token_a.eq_ignore_ascii_case(a) && self.token_b.eq_ignore_ascii_case(b))
            || (self.token_a.eq_ignore_ascii_case(b) && self.token_b.eq_ignore_ascii_case(a))
    }
}

/// Looks up the ranking liquidity of a pair in either order; zero if unknown.
pub fn lookup_pair_liquidity(pairs: &[TokenPairLiquidity], a: &str, b: &str) -> U256 {
    pairs
        .iter()
        .find(|pair| pair.matches(a, b))
        .map(|pair| pair.normalized_liquidity)
        .unwrap_or_default()
}
