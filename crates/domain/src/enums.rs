use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of a swap is fixed by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwapKind {
    /// Exact input amount, output is computed.
    GivenIn,
    /// Exact output amount, input is computed.
    GivenOut,
}

impl fmt::Display for SwapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwapKind::GivenIn => write!(f, "given-in"),
            SwapKind::GivenOut => write!(f, "given-out"),
        }
    }
}

/// Rounding direction requested from an invariant computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    Down,
    Up,
}

/// Curve families the router can price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PoolType {
    Weighted,
    Stable,
    Gyro2Clp,
    GyroEclp,
    QuantAmm,
    ReClamm,
    ComposableStable,
    MetaStable,
    Buffer,
}

impl PoolType {
    /// Parses the snapshot tag, e.g. `WEIGHTED` or `COMPOSABLE_STABLE`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_uppercase().as_str() {
            "WEIGHTED" => Some(PoolType::Weighted),
            "STABLE" => Some(PoolType::Stable),
            "GYRO" | "GYRO2" | "GYRO_2CLP" => Some(PoolType::Gyro2Clp),
            "GYROE" | "GYRO_ECLP" => Some(PoolType::GyroEclp),
            "QUANT_AMM_WEIGHTED" | "QUANT_AMM" => Some(PoolType::QuantAmm),
            "RECLAMM" => Some(PoolType::ReClamm),
            "COMPOSABLE_STABLE" => Some(PoolType::ComposableStable),
            "META_STABLE" => Some(PoolType::MetaStable),
            "BUFFER" => Some(PoolType::Buffer),
            _ => None,
        }
    }

    pub fn as_tag(&self) -> &'static str {
        match self {
            PoolType::Weighted => "WEIGHTED",
            PoolType::Stable => "STABLE",
            PoolType::Gyro2Clp => "GYRO",
            PoolType::GyroEclp => "GYROE",
            PoolType::QuantAmm => "QUANT_AMM_WEIGHTED",
            PoolType::ReClamm => "RECLAMM",
            PoolType::ComposableStable => "COMPOSABLE_STABLE",
            PoolType::MetaStable => "META_STABLE",
            PoolType::Buffer => "BUFFER",
        }
    }
}

impl fmt::Display for PoolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_tag())
    }
}
