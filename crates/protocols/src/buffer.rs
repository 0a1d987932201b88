//! Synthetic pool routing through an ERC4626 wrapper.

use crate::base_pool::{BasePool, find_pool_token};
use crate::error::{PoolError, PoolResult};
use crate::vault::{PoolState, Vault, WrappingDirection};
use primitive_types::U256;
use sor_domain::enums::{PoolType, SwapKind};
use sor_domain::hooks::HookType;
use sor_domain::math::ONE;
use sor_domain::pool::PoolToken;
use sor_domain::token::Token;

/// Wrapped token and its underlying asset at a fixed share rate. The
/// buffer has no capacity limit of its own.
#[derive(Debug, Clone)]
pub struct BufferPool {
    id: String,
    address: String,
    tokens: Vec<PoolToken>,
    state: PoolState,
    vault: Vault,
}

impl BufferPool {
    /// `rate` is underlying assets per wrapped share, 18 decimals.
    pub fn new(wrapped: Token, underlying: Token, rate: U256) -> PoolResult<Self> {
        if rate.is_zero() {
            return Err(PoolError::MissingData("buffer rate"));
        }
        let address = wrapped.address.clone();
        // balances are not tracked; the buffer never runs dry
        let tokens = vec![
            PoolToken::new(wrapped, U256::zero(), 0, rate)?,
            PoolToken::new(underlying, U256::zero(), 1, ONE)?,
        ];
        let state = PoolState::from_pool_tokens(PoolType::Buffer, &tokens, U256::zero(), U256::zero())?;
        Ok(Self {
            id: address.clone(),
            address,
            tokens,
            state,
            vault: Vault::new(),
        })
    }

    pub fn rate(&self) -> U256 {
        self.state.token_rates[0]
    }

    fn direction(&self, token_in: &Token, token_out: &Token) -> PoolResult<WrappingDirection> {
        let tin = find_pool_token(&self.tokens, token_in)?;
        find_pool_token(&self.tokens, token_out)?;
        if token_in == token_out {
            return Err(PoolError::UnsupportedOperation("buffer leg between the same token"));
        }
        Ok(if tin.index == 1 {
            WrappingDirection::Wrap
        } else {
            WrappingDirection::Unwrap
        })
    }
}

impl BasePool for BufferPool {
    fn id(&self) -> &str {
        &self.id
    }

    fn address(&self) -> &str {
        &self.address
    }

    fn pool_type(&self) -> PoolType {
        PoolType::Buffer
    }

    fn swap_fee(&self) -> U256 {
        U256::zero()
    }

    fn tokens(&self) -> &[PoolToken] {
        &self.tokens
    }

    fn swap_given_in(&self, token_in: &Token, token_out: &Token, amount_in: U256) -> PoolResult<U256> {
        let direction = self.direction(token_in, token_out)?;
        self.vault
            .erc4626_buffer_wrap_or_unwrap(SwapKind::GivenIn, direction, amount_in, &self.state)
    }

    fn swap_given_out(
        &self,
        token_in: &Token,
        token_out: &Token,
        amount_out: U256,
    ) -> PoolResult<U256> {
        let direction = self.direction(token_in, token_out)?;
        self.vault
            .erc4626_buffer_wrap_or_unwrap(SwapKind::GivenOut, direction, amount_out, &self.state)
    }

    fn get_limit_amount_swap(&self, token_in: &Token, token_out: &Token, _: SwapKind) -> PoolResult<U256> {
        self.direction(token_in, token_out)?;
        Ok(U256::MAX)
    }

    fn get_normalized_liquidity(&self, _: &Token, _: &Token) -> U256 {
        U256::MAX
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

    fn wrapped() -> Token {
        Token::new(1, "0xwusdc", 18)
    }

    fn usdc() -> Token {
        Token::new(1, "0xusdc", 6)
    }

    fn buffer() -> BufferPool {
        // one share redeems for 1.25 USDC
        BufferPool::new(wrapped(), usdc(), ONE + ONE / 4).unwrap()
    }

    #[test]
    fn test_wrap_and_unwrap() {
        let buffer = buffer();
        // 125 USDC deposits into 100 shares
        let shares = buffer.swap_given_in(&usdc(), &wrapped(), U256::from(125_000_000u64)).unwrap();
        assert_eq!(shares, U256::from(100u64) * ONE);
        // 100 shares redeem for 125 USDC
        let assets = buffer.swap_given_in(&wrapped(), &usdc(), U256::from(100u64) * ONE).unwrap();
        assert_eq!(assets, U256::from(125_000_000u64));
    }

    #[test]
    fn test_exact_out_rounds_against_the_user() {
        let buffer = buffer();
        // 1 wei of shares needs 1.25e-18 USDC, rounded up to one raw unit
        let assets_in = buffer.swap_given_out(&usdc(), &wrapped(), U256::one()).unwrap();
        assert_eq!(assets_in, U256::one());
        // 1 USDC out burns 0.8 shares
        let shares_in = buffer.swap_given_out(&wrapped(), &usdc(), U256::from(1_000_000u64)).unwrap();
        assert_eq!(shares_in, ONE * 4 / 5);
    }

    #[test]
    fn test_unbounded_limits() {
        let buffer = buffer();
        assert_eq!(buffer.get_limit_amount_swap(&usdc(), &wrapped(), SwapKind::GivenIn).unwrap(), U256::MAX);
        assert_eq!(buffer.get_normalized_liquidity(&usdc(), &wrapped()), U256::MAX);
        assert_eq!(buffer.id(), "0xwusdc");
        assert!(buffer.get_pool_state(None).unwrap().hook_type.is_none());
        let stranger = Token::new(1, "0xdai", 18);
        assert!(buffer.get_limit_amount_swap(&stranger, &wrapped(), SwapKind::GivenIn).is_err());
    }
}
