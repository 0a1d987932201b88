//! Hook types and the resolver that turns persisted hook data into the
//! parameter record the settlement engine consumes.

use crate::entities::{HookRecord, PoolRecord, parse_fixed, parse_fixed18};
use crate::error::DomainError;
use primitive_types::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Hooks the router knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HookType {
    ExitFee,
    DirectionalFee,
    StableSurge,
    Akron,
    FeeTaking,
    MevTax,
    Lottery,
    VeBalDiscount,
    ReClamm,
}

impl HookType {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_uppercase().as_str() {
            "EXIT_FEE" => Some(HookType::ExitFee),
            "DIRECTIONAL_FEE" => Some(HookType::DirectionalFee),
            "STABLE_SURGE" => Some(HookType::StableSurge),
            "AKRON" => Some(HookType::Akron),
            "FEE_TAKING" => Some(HookType::FeeTaking),
            "MEV_TAX" => Some(HookType::MevTax),
            "LOTTERY" => Some(HookType::Lottery),
            "VEBAL_DISCOUNT" => Some(HookType::VeBalDiscount),
            "RECLAMM" => Some(HookType::ReClamm),
            _ => None,
        }
    }

    pub fn from_record(record: &HookRecord) -> Option<Self> {
        Self::from_tag(&record.hook_type)
    }
}

/// Normalized hook parameters, 18-decimal fractions unless noted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HookState {
    ExitFee {
        remove_liquidity_fee: U256,
    },
    StableSurge {
        /// Amplification with 3 decimals.
        amp: U256,
        surge_threshold: U256,
        max_surge_fee: U256,
    },
    Akron {
        weights: Vec<U256>,
        minimum_swap_fee: U256,
    },
    FeeTaking {
        swap_fee: U256,
        add_liquidity_fee: U256,
        remove_liquidity_fee: U256,
    },
}

/// Resolves the hook state of a pool record.
///
/// Returns `None` when the pool has no hook, when the hook's effect lives in
/// the curve itself or has no pricing effect, and for unknown hook types
/// (logged, never fatal). A known hook missing a parameter it needs is an
/// error for that pool.
pub fn resolve_hook_state(pool: &PoolRecord) -> Result<Option<HookState>, DomainError> {
    let Some(hook) = &pool.hook else {
        return Ok(None);
    };
    let Some(hook_type) = HookType::from_record(hook) else {
        warn!(pool = %pool.id, hook_type = %hook.hook_type, "Unknown hook type, ignoring hook");
        return Ok(None);
    };

    let params = &hook.params;
    let state = match hook_type {
        HookType::ExitFee => Some(HookState::ExitFee {
            remove_liquidity_fee: required_fraction(
                pool,
                "remove_liquidity_fee_percentage",
                params.remove_liquidity_fee_percentage,
            )?,
        }),
        HookType::StableSurge => {
            let amp = params.amp.or(pool.amp).ok_or_else(|| missing(pool, "amp"))?;
            Some(HookState::StableSurge {
                amp: parse_fixed("amp", amp, 3)?,
                surge_threshold: required_fraction(
                    pool,
                    "surge_threshold_percentage",
                    params.surge_threshold_percentage,
                )?,
                max_surge_fee: required_fraction(
                    pool,
                    "max_surge_fee_percentage",
                    params.max_surge_fee_percentage,
                )?,
            })
        }
        HookType::Akron => {
            let weights = pool
                .tokens
                .iter()
                .map(|token| {
                    let weight = token.weight.ok_or_else(|| missing(pool, "weight"))?;
                    parse_fixed18("weight", weight)
                })
                .collect::<Result<Vec<_>, _>>()?;
            let minimum = params.minimum_swap_fee_percentage.unwrap_or(pool.swap_fee);
            Some(HookState::Akron {
                weights,
                minimum_swap_fee: parse_fixed18("minimum_swap_fee_percentage", minimum)?,
            })
        }
        HookType::FeeTaking => Some(HookState::FeeTaking {
            swap_fee: required_fraction(pool, "swap_fee_percentage", params.swap_fee_percentage)?,
            add_liquidity_fee: required_fraction(
                pool,
                "add_liquidity_fee_percentage",
                params.add_liquidity_fee_percentage,
            )?,
            remove_liquidity_fee: required_fraction(
                pool,
                "remove_liquidity_fee_percentage",
                params.remove_liquidity_fee_percentage,
            )?,
        }),
        HookType::DirectionalFee
        | HookType::MevTax
        | HookType::Lottery
        | HookType::VeBalDiscount
        | HookType::ReClamm => None,
    };
    Ok(state)
}

fn required_fraction(
    pool: &PoolRecord,
    field: &'static str,
    value: Option<Decimal>,
) -> Result<U256, DomainError> {
    let value = value.ok_or_else(|| missing(pool, field))?;
    parse_fixed18(field, value)
}

fn missing(pool: &PoolRecord, field: &'static str) -> DomainError {
    DomainError::MissingPoolData {
        pool: pool.id.clone(),
        field,
    }
}
