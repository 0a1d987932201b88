use crate::entities::hook::HookRecord;
use crate::entities::token::PoolTokenRecord;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A pool as persisted by the ingestion layer.
///
/// Numbers are human-readable decimals; the engine converts them to fixed
/// point when it builds the pool model. Curve parameters only appear for the
/// pool types that use them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolRecord {
    pub id: String,
    pub address: String,
    pub chain_id: u64,
    /// Type tag, e.g. `WEIGHTED`; see `PoolType::from_tag`.
    pub pool_type: String,
    /// 2 for legacy pools, 3 for pools settled through the vault.
    pub protocol_version: u8,
    pub swap_fee: Decimal,
    #[serde(default)]
    pub aggregate_swap_fee: Decimal,
    pub total_shares: Decimal,
    pub tokens: Vec<PoolTokenRecord>,
    #[serde(default)]
    pub pair_liquidity: Vec<PairLiquidityRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hook: Option<HookRecord>,
    #[serde(default)]
    pub liquidity_management: LiquidityManagement,

    // Stable family
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amp: Option<Decimal>,

    // Concentrated liquidity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gyro_2clp: Option<Gyro2ClpParams>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gyro_eclp: Option<GyroEclpParams>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reclamm: Option<ReClammParams>,

    // Time-varying weights
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quant_amm: Option<QuantAmmParams>,
}

/// Pre-sampled ranking liquidity for one token pair of the pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairLiquidityRecord {
    pub token_a: String,
    pub token_b: String,
    pub normalized_liquidity: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LiquidityManagement {
    #[serde(default)]
    pub disable_unbalanced_liquidity: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gyro2ClpParams {
    pub sqrt_alpha: Decimal,
    pub sqrt_beta: Decimal,
}

/// Elliptical concentrated liquidity parameters.
///
/// `alpha`, `beta`, `c`, `s` and `lambda` have 18 decimals. The derived
/// geometry is persisted as signed 38-decimal integers in string form since
/// it does not fit a `Decimal`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GyroEclpParams {
    pub alpha: Decimal,
    pub beta: Decimal,
    pub c: Decimal,
    pub s: Decimal,
    pub lambda: Decimal,
    pub tau_alpha_x: String,
    pub tau_alpha_y: String,
    pub tau_beta_x: String,
    pub tau_beta_y: String,
    pub u: String,
    pub v: String,
    pub w: String,
    pub z: String,
    pub d_sq: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReClammParams {
    /// Virtual balances as of `last_timestamp`, live 18-decimal units.
    pub last_virtual_balances: Vec<Decimal>,
    pub daily_price_shift_base: Decimal,
    pub last_timestamp: u64,
    pub centeredness_margin: Decimal,
    pub start_fourth_root_price_ratio: Decimal,
    pub end_fourth_root_price_ratio: Decimal,
    pub price_ratio_update_start_time: u64,
    pub price_ratio_update_end_time: u64,
}

/// Weight schedule of a time-varying weighted pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantAmmParams {
    /// Per-token weight change per second, signed.
    pub multipliers: Vec<Decimal>,
    pub last_update_time: u64,
    pub last_interpolation_time_possible: u64,
    pub max_trade_size_ratio: Decimal,
}
