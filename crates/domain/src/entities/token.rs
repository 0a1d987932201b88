use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A token entry of a pool record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolTokenRecord {
    pub address: String,
    pub decimals: u8,
    pub index: usize,
    /// Human-readable balance, e.g. `1000.5`.
    pub balance: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    /// Rate versus the canonical unit; `1` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_rate: Option<Decimal>,
    /// Normalized weight, weighted-family pools only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<Decimal>,
    /// Yield-bearing ERC4626 wrapper with a buffer in the vault.
    #[serde(default)]
    pub is_erc4626: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underlying_token: Option<UnderlyingTokenRecord>,
}

/// The asset an ERC4626 token wraps, and the wrapper's share price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnderlyingTokenRecord {
    pub address: String,
    pub decimals: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    /// Underlying assets per wrapped share.
    pub unwrap_rate: Decimal,
}
