//! Settlement state shared by every vault pool.

use primitive_types::U256;
use serde::Serialize;
use sor_domain::enums::PoolType;
use sor_domain::error::MathResult;
use sor_domain::hooks::HookType;
use sor_domain::pool::PoolToken;

/// Everything the settlement engine needs to price one pool, index-aligned
/// with the pool's token list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolState {
    pub pool_type: PoolType,
    pub tokens: Vec<String>,
    pub scaling_factors: Vec<U256>,
    pub token_rates: Vec<U256>,
    pub balances_live_scaled18: Vec<U256>,
    pub swap_fee: U256,
    pub aggregate_swap_fee: U256,
    pub total_supply: U256,
    pub supports_unbalanced_liquidity: bool,
    pub hook_type: Option<HookType>,
}

impl PoolState {
    /// Derives the per-token arrays from index-ordered pool tokens.
    pub fn from_pool_tokens(
        pool_type: PoolType,
        tokens: &[PoolToken],
        swap_fee: U256,
        total_supply: U256,
    ) -> MathResult<Self> {
        let balances_live_scaled18 = tokens
            .iter()
            .map(PoolToken::live_balance_round_down)
            .collect::<MathResult<Vec<_>>>()?;
        Ok(Self {
            pool_type,
            tokens: tokens.iter().map(|t| t.token.address.clone()).collect(),
            scaling_factors: tokens.iter().map(|t| t.scaling_factor).collect(),
            token_rates: tokens.iter().map(|t| t.rate).collect(),
            balances_live_scaled18,
            swap_fee,
            aggregate_swap_fee: U256::zero(),
            total_supply,
            supports_unbalanced_liquidity: true,
            hook_type: None,
        })
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }
}
