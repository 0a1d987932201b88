use crate::error::MathResult;
use crate::math::scaling::{decimal_to_fixed, fixed_to_decimal, scaling_factor};
use crate::math::FixedPoint;
use primitive_types::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// An ERC20 token on a given chain.
///
/// Identity is `(chain_id, address)`; the address is stored lowercase so
/// checksummed and plain spellings compare equal. `symbol` is display only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub chain_id: u64,
    pub address: String,
    pub decimals: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

impl Token {
    pub fn new(chain_id: u64, address: impl AsRef<str>, decimals: u8) -> Self {
        Self {
            chain_id,
            address: address.as_ref().to_lowercase(),
            decimals,
            symbol: None,
        }
    }

    #[must_use]
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// True if `address` names this token, ignoring case.
    pub fn is_address(&self, address: &str) -> bool {
        self.address.eq_ignore_ascii_case(address)
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.chain_id == other.chain_id && self.address == other.address
    }
}

impl Eq for Token {}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.chain_id.hash(state);
        self.address.hash(state);
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.symbol {
            Some(symbol) => write!(f, "{symbol}"),
            None => write!(f, "{}", self.address),
        }
    }
}

/// A raw token-native amount of a specific token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAmount {
    pub token: Token,
    pub amount: U256,
}

impl TokenAmount {
    pub fn from_raw(token: Token, amount: impl Into<U256>) -> Self {
        Self {
            token,
            amount: amount.into(),
        }
    }

    /// Builds an amount from a human-readable value, e.g. `1.5` WETH.
    pub fn from_human(token: Token, value: Decimal) -> MathResult<Self> {
        let amount = decimal_to_fixed(value, u32::from(token.decimals))?;
        Ok(Self { token, amount })
    }

    pub fn zero(token: Token) -> Self {
        Self {
            token,
            amount: U256::zero(),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Human-readable value, if it fits a `Decimal`.
    pub fn to_human(&self) -> Option<Decimal> {
        fixed_to_decimal(self.amount, u32::from(self.token.decimals))
    }

    /// The amount expressed with 18 decimals (no rate applied).
    pub fn scale18(&self) -> MathResult<U256> {
        self.amount.try_mul(scaling_factor(self.token.decimals)?)
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_human() {
            Some(value) => write!(f, "{} {}", value, self.token),
            None => write!(f, "{} wei {}", self.amount, self.token),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashSet;

    #[test]
    fn test_identity_ignores_case_and_symbol() {
        let a = Token::new(1, "0xABCDEF", 18).with_symbol("WETH");
        let b = Token::new(1, "0xabcdef", 18);
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));

        let other_chain = Token::new(10, "0xabcdef", 18);
        assert_ne!(b, other_chain);
    }

    #[test]
    fn test_amount_human_conversions() {
        let usdc = Token::new(1, "0xa0b8", 6).with_symbol("USDC");
        let amount = TokenAmount::from_human(usdc, dec!(12.5)).unwrap();
        assert_eq!(amount.amount, U256::from(12_500_000u64));
        assert_eq!(amount.to_human().unwrap(), dec!(12.5));
        // 12.5 * 1e18
        assert_eq!(amount.scale18().unwrap(), U256::from(12_500_000_000_000_000_000u128));
        assert_eq!(amount.to_string(), "12.5 USDC");
    }
}
