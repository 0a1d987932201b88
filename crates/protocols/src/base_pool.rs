//! The swap contract every pool model implements.

use crate::error::{PoolError, PoolResult};
use crate::vault::PoolState;
use primitive_types::U256;
use sor_domain::enums::{PoolType, SwapKind};
use sor_domain::hooks::HookType;
use sor_domain::pool::PoolToken;
use sor_domain::token::Token;
use std::fmt;

/// A priceable pool.
///
/// Amounts are raw, in the decimals of the token they are denominated in.
/// Implementations are immutable snapshots: pricing a swap never changes
/// the pool.
pub trait BasePool: Send + Sync + fmt::Debug {
    fn id(&self) -> &str;

    fn address(&self) -> &str;

    fn pool_type(&self) -> PoolType;

    fn swap_fee(&self) -> U256;

    /// Pool tokens in index order. Legacy pools whose share token sits in
    /// the token list include it; vault pools expose it via [`bpt_token`].
    ///
    /// [`bpt_token`]: BasePool::bpt_token
    fn tokens(&self) -> &[PoolToken];

    /// The pool's share token when it is tradable but not part of
    /// [`tokens`](BasePool::tokens).
    fn bpt_token(&self) -> Option<Token> {
        None
    }

    /// Resolves both sides of a swap.
    fn get_pool_tokens(
        &self,
        token_in: &Token,
        token_out: &Token,
    ) -> PoolResult<(PoolToken, PoolToken)> {
        let tin = find_pool_token(self.tokens(), token_in)?;
        let tout = find_pool_token(self.tokens(), token_out)?;
        Ok((tin.clone(), tout.clone()))
    }

    fn swap_given_in(&self, token_in: &Token, token_out: &Token, amount_in: U256)
    -> PoolResult<U256>;

    fn swap_given_out(
        &self,
        token_in: &Token,
        token_out: &Token,
        amount_out: U256,
    ) -> PoolResult<U256>;

    /// Largest amount this pool accepts for the pair: an input amount for
    /// `GivenIn`, an output amount for `GivenOut`.
    fn get_limit_amount_swap(
        &self,
        token_in: &Token,
        token_out: &Token,
        kind: SwapKind,
    ) -> PoolResult<U256>;

    /// Ranking liquidity for the pair, zero when unknown.
    fn get_normalized_liquidity(&self, token_in: &Token, token_out: &Token) -> U256;

    /// Settlement state for pools priced by the vault. A `hook_type`
    /// replaces the pool's own hook tag in the returned state.
    fn get_pool_state(&self, _hook_type: Option<HookType>) -> Option<PoolState> {
        None
    }
}

/// Looks a token up by address within a pool's token list.
pub fn find_pool_token<'a>(tokens: &'a [PoolToken], token: &Token) -> PoolResult<&'a PoolToken> {
    tokens
        .iter()
        .find(|t| t.token.is_address(&token.address))
        .ok_or_else(|| PoolError::TokenNotInPool(token.address.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sor_domain::math::ONE;

    #[test]
    fn test_find_pool_token() {
        let tokens = vec![
            PoolToken::new(Token::new(1, "0xA", 18), ONE, 0, ONE).unwrap(),
            PoolToken::new(Token::new(1, "0xB", 6), U256::from(5u64), 1, ONE).unwrap(),
        ];
        let found = find_pool_token(&tokens, &Token::new(1, "0xb", 6)).unwrap();
        assert_eq!(found.index, 1);

        let err = find_pool_token(&tokens, &Token::new(1, "0xc", 18)).unwrap_err();
        assert_eq!(err, PoolError::TokenNotInPool("0xc".to_string()));
    }
}
