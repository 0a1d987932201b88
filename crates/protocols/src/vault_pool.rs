//! A vault-settled pool: one [`PoolCurve`] behind the [`Vault`].
//!
//! Besides token-to-token swaps a vault pool prices its own share token:
//! buying BPT is a liquidity add, selling BPT is a liquidity removal.

use crate::base_pool::{BasePool, find_pool_token};
use crate::error::{PoolError, PoolResult};
use crate::vault::{
    AddLiquidityInput, AddLiquidityKind, PoolCurve, PoolHook, PoolState, RemoveLiquidityInput,
    RemoveLiquidityKind, SwapInput, Vault,
};
use primitive_types::U256;
use sor_domain::enums::{PoolType, SwapKind};
use sor_domain::hooks::{HookState, HookType};
use sor_domain::pool::{PoolToken, TokenPairLiquidity, lookup_pair_liquidity};
use sor_domain::token::Token;

/// How a token pair maps onto vault operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Leg {
    Swap { index_in: usize, index_out: usize },
    /// token -> BPT
    Add { index_in: usize },
    /// BPT -> token
    Remove { index_out: usize },
}

#[derive(Debug, Clone)]
pub struct VaultPool<C: PoolCurve> {
    id: String,
    address: String,
    pool_type: PoolType,
    tokens: Vec<PoolToken>,
    bpt: PoolToken,
    state: PoolState,
    curve: C,
    hook_state: Option<HookState>,
    pair_liquidity: Vec<TokenPairLiquidity>,
    vault: Vault,
}

impl<C: PoolCurve> VaultPool<C> {
    /// `tokens` must be in pool index order; `total_supply` is the BPT
    /// supply, 18 decimals.
    pub fn new(
        id: impl Into<String>,
        address: &str,
        pool_type: PoolType,
        tokens: Vec<PoolToken>,
        swap_fee: U256,
        total_supply: U256,
        curve: C,
    ) -> PoolResult<Self> {
        let chain_id = tokens
            .first()
            .map(|t| t.token.chain_id)
            .ok_or(PoolError::MissingData("tokens"))?;
        let state = PoolState::from_pool_tokens(pool_type, &tokens, swap_fee, total_supply)?;
        let bpt = PoolToken::bpt(chain_id, address, total_supply, tokens.len());
        Ok(Self {
            id: id.into(),
            address: address.to_ascii_lowercase(),
            pool_type,
            tokens,
            bpt,
            state,
            curve,
            hook_state: None,
            pair_liquidity: Vec::new(),
            vault: Vault::new(),
        })
    }

    #[must_use]
    pub fn with_hook(mut self, hook_type: Option<HookType>, hook_state: Option<HookState>) -> Self {
        self.state.hook_type = hook_type;
        self.hook_state = hook_state;
        self
    }

    #[must_use]
    pub fn with_pair_liquidity(mut self, pairs: Vec<TokenPairLiquidity>) -> Self {
        self.pair_liquidity = pairs;
        self
    }

    #[must_use]
    pub fn with_aggregate_swap_fee(mut self, fee: U256) -> Self {
        self.state.aggregate_swap_fee = fee;
        self
    }

    #[must_use]
    pub fn with_unbalanced_liquidity(mut self, supported: bool) -> Self {
        self.state.supports_unbalanced_liquidity = supported;
        self
    }

    pub fn curve(&self) -> &C {
        &self.curve
    }

    pub fn state(&self) -> &PoolState {
        &self.state
    }

    fn hook(&self) -> PoolHook<'_> {
        PoolHook::new(self.state.hook_type, self.hook_state.as_ref())
    }

    fn is_bpt(&self, token: &Token) -> bool {
        token.is_address(&self.address)
    }

    fn index_of(&self, token: &Token) -> PoolResult<usize> {
        Ok(find_pool_token(&self.tokens, token)?.index)
    }

    fn leg(&self, token_in: &Token, token_out: &Token) -> PoolResult<Leg> {
        match (self.is_bpt(token_in), self.is_bpt(token_out)) {
            (false, false) => Ok(Leg::Swap {
                index_in: self.index_of(token_in)?,
                index_out: self.index_of(token_out)?,
            }),
            (false, true) => Ok(Leg::Add {
                index_in: self.index_of(token_in)?,
            }),
            (true, false) => Ok(Leg::Remove {
                index_out: self.index_of(token_out)?,
            }),
            (true, true) => Err(PoolError::TokenNotInPool(token_out.address.clone())),
        }
    }

    fn one_hot(&self, index: usize, amount: U256) -> Vec<U256> {
        let mut amounts = vec![U256::zero(); self.tokens.len()];
        amounts[index] = amount;
        amounts
    }

    fn swap(&self, kind: SwapKind, token_in: &Token, token_out: &Token, amount: U256) -> PoolResult<U256> {
        let leg = self.leg(token_in, token_out)?;
        if amount.is_zero() {
            return Ok(U256::zero());
        }
        let hook = self.hook();

        match leg {
            Leg::Swap {
                index_in,
                index_out,
            } => self.vault.swap(
                &SwapInput {
                    kind,
                    amount_raw: amount,
                    index_in,
                    index_out,
                },
                &self.state,
                &self.curve,
                hook,
            ),
            Leg::Add { .. } | Leg::Remove { .. } if !self.state.supports_unbalanced_liquidity => {
                Ok(U256::zero())
            }
            Leg::Add { index_in } => {
                let input = match kind {
                    SwapKind::GivenIn => AddLiquidityInput {
                        kind: AddLiquidityKind::Unbalanced,
                        max_amounts_in_raw: self.one_hot(index_in, amount),
                        min_bpt_amount_out_raw: U256::zero(),
                    },
                    SwapKind::GivenOut => AddLiquidityInput {
                        kind: AddLiquidityKind::SingleTokenExactOut,
                        max_amounts_in_raw: self.one_hot(index_in, U256::one()),
                        min_bpt_amount_out_raw: amount,
                    },
                };
                let result = self.vault.add_liquidity(&input, &self.state, &self.curve, hook)?;
                Ok(match kind {
                    SwapKind::GivenIn => result.bpt_amount_out_raw,
                    SwapKind::GivenOut => result.amounts_in_raw[index_in],
                })
            }
            Leg::Remove { index_out } => {
                let input = match kind {
                    SwapKind::GivenIn => RemoveLiquidityInput {
                        kind: RemoveLiquidityKind::SingleTokenExactIn,
                        max_bpt_amount_in_raw: amount,
                        min_amounts_out_raw: self.one_hot(index_out, U256::one()),
                    },
                    SwapKind::GivenOut => RemoveLiquidityInput {
                        kind: RemoveLiquidityKind::SingleTokenExactOut,
                        max_bpt_amount_in_raw: U256::MAX,
                        min_amounts_out_raw: self.one_hot(index_out, amount),
                    },
                };
                let result = self.vault.remove_liquidity(&input, &self.state, &self.curve, hook)?;
                Ok(match kind {
                    SwapKind::GivenIn => result.amounts_out_raw[index_out],
                    SwapKind::GivenOut => result.bpt_amount_in_raw,
                })
            }
        }
    }
}

impl<C: PoolCurve> BasePool for VaultPool<C> {
    fn id(&self) -> &str {
        &self.id
    }

    fn address(&self) -> &str {
        &self.address
    }

    fn pool_type(&self) -> PoolType {
        self.pool_type
    }

    fn swap_fee(&self) -> U256 {
        self.state.swap_fee
    }

    fn tokens(&self) -> &[PoolToken] {
        &self.tokens
    }

    fn bpt_token(&self) -> Option<Token> {
        Some(self.bpt.token.clone())
    }

    fn get_pool_tokens(
        &self,
        token_in: &Token,
        token_out: &Token,
    ) -> PoolResult<(PoolToken, PoolToken)> {
        let resolve = |token: &Token| -> PoolResult<PoolToken> {
            if self.is_bpt(token) {
                Ok(self.bpt.clone())
            } else {
                find_pool_token(&self.tokens, token).cloned()
            }
        };
        Ok((resolve(token_in)?, resolve(token_out)?))
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
        let leg = self.leg(token_in, token_out)?;
        match leg {
            Leg::Swap {
                index_in,
                index_out,
            } => self
                .vault
                .max_swap_amount(kind, index_in, index_out, &self.state, &self.curve),
            Leg::Add { .. } | Leg::Remove { .. } if !self.state.supports_unbalanced_liquidity => {
                Ok(U256::zero())
            }
            Leg::Add { index_in } => Ok(match kind {
                SwapKind::GivenIn => self.tokens[index_in].balance,
                SwapKind::GivenOut => self.state.total_supply,
            }),
            Leg::Remove { index_out } => match kind {
                SwapKind::GivenIn => self.vault.max_single_sided_exit(&self.state, &self.curve),
                SwapKind::GivenOut => Ok(self.tokens[index_out].balance / 2),
            },
        }
    }

    fn get_normalized_liquidity(&self, token_in: &Token, token_out: &Token) -> U256 {
        let from_snapshot =
            lookup_pair_liquidity(&self.pair_liquidity, &token_in.address, &token_out.address);
        if !from_snapshot.is_zero() {
            return from_snapshot;
        }
        // without a snapshot figure, rank by the output side's live balance
        match self.leg(token_in, token_out) {
            Ok(Leg::Swap { index_out, .. }) => self.state.balances_live_scaled18[index_out],
            Ok(Leg::Add { .. }) => self.state.total_supply,
            Ok(Leg::Remove { index_out }) => self.state.balances_live_scaled18[index_out],
            Err(_) => U256::zero(),
        }
    }

    fn get_pool_state(&self, hook_type: Option<HookType>) -> Option<PoolState> {
        let mut state = self.state.clone();
        if hook_type.is_some() {
            state.hook_type = hook_type;
        }
        Some(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weighted::WeightedCurve;
    use proptest::prelude::*;
    use sor_domain::math::ONE;

    fn e18(v: u64) -> U256 {
        U256::from(v) * ONE
    }

    fn token_a() -> Token {
        Token::new(1, "0xa", 18)
    }

    fn token_b() -> Token {
        Token::new(1, "0xb", 6)
    }

    fn bpt() -> Token {
        Token::new(1, "0xpool", 18)
    }

    fn pool(swap_fee: U256) -> VaultPool<WeightedCurve> {
        let tokens = vec![
            PoolToken::new(token_a(), e18(1000), 0, ONE).unwrap(),
            PoolToken::new(token_b(), U256::from(1_000_000_000u64), 1, ONE).unwrap(),
        ];
        let curve = WeightedCurve::new(vec![ONE / 2, ONE / 2]).unwrap();
        VaultPool::new("pool-1", "0xPool", PoolType::Weighted, tokens, swap_fee, e18(2000), curve)
            .unwrap()
    }

    #[test]
    fn test_swap_across_decimals() {
        // 1000 * (1 - 1000 / 1010) = 9.900990 in 6 decimals, rounded down
        let out = pool(U256::zero())
            .swap_given_in(&token_a(), &token_b(), e18(10))
            .unwrap();
        assert_eq!(out, U256::from(9_900_990u64));
    }

    #[test]
    fn test_unknown_token() {
        let err = pool(U256::zero())
            .swap_given_in(&token_a(), &Token::new(1, "0xc", 18), e18(1))
            .unwrap_err();
        assert_eq!(err, PoolError::TokenNotInPool("0xc".to_string()));
    }

    #[test]
    fn test_bpt_legs() {
        let pool = pool(ONE / 1000);
        let (_, out) = pool.get_pool_tokens(&token_a(), &bpt()).unwrap();
        assert_eq!(out.balance, e18(2000));

        let bpt_out = pool.swap_given_in(&token_a(), &bpt(), e18(10)).unwrap();
        assert!(bpt_out > e18(9) && bpt_out < e18(10));

        let cost = pool.swap_given_out(&token_a(), &bpt(), bpt_out).unwrap();
        assert!(cost > e18(9));

        let back = pool.swap_given_in(&bpt(), &token_a(), bpt_out).unwrap();
        assert!(back < e18(10));

        let burned = pool.swap_given_out(&bpt(), &token_a(), e18(5)).unwrap();
        assert!(burned > e18(4));
    }

    #[test]
    fn test_unbalanced_disabled_bpt_legs_are_zero() {
        let pool = pool(U256::zero()).with_unbalanced_liquidity(false);
        assert_eq!(pool.swap_given_in(&token_a(), &bpt(), e18(10)).unwrap(), U256::zero());
        assert_eq!(
            pool.get_limit_amount_swap(&token_a(), &bpt(), SwapKind::GivenIn).unwrap(),
            U256::zero()
        );
        // plain swaps are unaffected
        assert!(!pool.swap_given_in(&token_a(), &token_b(), e18(1)).unwrap().is_zero());
    }

    #[test]
    fn test_limits() {
        let pool = pool(U256::zero());
        assert_eq!(
            pool.get_limit_amount_swap(&token_a(), &token_b(), SwapKind::GivenIn).unwrap(),
            e18(300)
        );
        assert_eq!(
            pool.get_limit_amount_swap(&token_a(), &token_b(), SwapKind::GivenOut).unwrap(),
            U256::from(300_000_000u64)
        );
        // 2000 supply, 70% floor: 2000 * 0.3 / 2
        assert_eq!(
            pool.get_limit_amount_swap(&bpt(), &token_a(), SwapKind::GivenIn).unwrap(),
            e18(300)
        );
    }

    #[test]
    fn test_normalized_liquidity_prefers_snapshot() {
        let pool = pool(U256::zero()).with_pair_liquidity(vec![TokenPairLiquidity {
            token_a: "0xa".to_string(),
            token_b: "0xb".to_string(),
            normalized_liquidity: U256::from(42u64),
        }]);
        assert_eq!(pool.get_normalized_liquidity(&token_b(), &token_a()), U256::from(42u64));
        assert_eq!(pool.get_normalized_liquidity(&bpt(), &token_a()), e18(1000));
    }

    #[test]
    fn test_pool_state_hook_tag() {
        let plain = pool(U256::zero());
        assert_eq!(plain.get_pool_state(None).unwrap().hook_type, None);
        let tagged = plain.get_pool_state(Some(HookType::StableSurge)).unwrap();
        assert_eq!(tagged.hook_type, Some(HookType::StableSurge));
        assert_eq!(tagged.balances_live_scaled18, plain.get_pool_state(None).unwrap().balances_live_scaled18);

        // the pool's own tag survives a call without one
        let hooked = pool(U256::zero()).with_hook(Some(HookType::ExitFee), None);
        assert_eq!(hooked.get_pool_state(None).unwrap().hook_type, Some(HookType::ExitFee));
        assert_eq!(
            hooked.get_pool_state(Some(HookType::MevTax)).unwrap().hook_type,
            Some(HookType::MevTax)
        );
    }

    proptest! {
        #[test]
        fn prop_round_trip_favours_pool(units in 1u64..200, fee_bps in 0u64..500) {
            let pool = pool(U256::from(fee_bps) * U256::exp10(14));
            let amount_in = e18(units);
            let out = pool.swap_given_in(&token_a(), &token_b(), amount_in).unwrap();
            let back = pool.swap_given_out(&token_a(), &token_b(), out).unwrap();
            // output is floored to 6 decimals, so the inverse may ask for up
            // to one output unit's worth less
            prop_assert!(back <= amount_in);
            prop_assert!(back + U256::exp10(13) >= amount_in);
        }

        #[test]
        fn prop_fee_monotonic(units in 1u64..200, fee_bps in 1u64..500) {
            let low = pool(U256::from(fee_bps) * U256::exp10(14));
            let high = pool(U256::from(fee_bps + 10) * U256::exp10(14));
            let out_low = low.swap_given_in(&token_a(), &token_b(), e18(units)).unwrap();
            let out_high = high.swap_given_in(&token_a(), &token_b(), e18(units)).unwrap();
            prop_assert!(out_high < out_low);

            let in_low = low.swap_given_out(&token_a(), &token_b(), U256::from(units) * U256::exp10(6)).unwrap();
            let in_high = high.swap_given_out(&token_a(), &token_b(), U256::from(units) * U256::exp10(6)).unwrap();
            prop_assert!(in_high > in_low);
        }
    }
}
