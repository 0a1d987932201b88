//! Builds pool models from snapshot records.
//!
//! Records carry human-readable decimals; every number is converted exactly
//! to fixed point here. Time-dependent curves (QuantAMM weights, ReClamm
//! virtual balances) are frozen at the request timestamp.

use crate::error::{SorError, SorResult};
use ethnum::I256;
use primitive_types::U256;
use rust_decimal::Decimal;
use sor_domain::entities::{PoolRecord, PoolTokenRecord, parse_fixed, parse_fixed18};
use sor_domain::enums::PoolType;
use sor_domain::error::DomainError;
use sor_domain::hooks::{HookType, resolve_hook_state};
use sor_domain::math::ONE;
use sor_domain::math::signed::to_signed;
use sor_domain::pool::{PoolToken, TokenPairLiquidity};
use sor_domain::token::Token;
use sor_protocols::base_pool::BasePool;
use sor_protocols::buffer::BufferPool;
use sor_protocols::gyro::{DerivedEclpParams, EclpParams, Gyro2ClpCurve, GyroEclpCurve, LegacyGyroEclpPool, Vector2};
use sor_protocols::quant_amm::{QuantAmmCurve, WeightSchedule};
use sor_protocols::reclamm::{ReClammCurve, ReClammState};
use sor_protocols::stable::{ComposableStablePool, MetaStablePool, StableCurve};
use sor_protocols::vault::PoolCurve;
use sor_protocols::vault_pool::VaultPool;
use sor_protocols::weighted::{LegacyWeightedPool, WeightedCurve};
use std::sync::Arc;

fn missing(record: &PoolRecord, field: &'static str) -> DomainError {
    DomainError::MissingPoolData {
        pool: record.id.clone(),
        field,
    }
}

/// Token records in index order.
fn sorted_tokens(record: &PoolRecord) -> Vec<&PoolTokenRecord> {
    let mut tokens: Vec<&PoolTokenRecord> = record.tokens.iter().collect();
    tokens.sort_by_key(|t| t.index);
    tokens
}

fn token(chain_id: u64, address: &str, decimals: u8, symbol: Option<&String>) -> Token {
    let token = Token::new(chain_id, address, decimals);
    match symbol {
        Some(symbol) => token.with_symbol(symbol.clone()),
        None => token,
    }
}

fn pool_tokens(record: &PoolRecord) -> SorResult<Vec<PoolToken>> {
    sorted_tokens(record)
        .into_iter()
        .map(|t| {
            let balance = parse_fixed("balance", t.balance, u32::from(t.decimals))?;
            let rate = match t.price_rate {
                Some(rate) => parse_fixed18("price_rate", rate)?,
                None => ONE,
            };
            let token = token(record.chain_id, &t.address, t.decimals, t.symbol.as_ref());
            Ok(PoolToken::new(token, balance, t.index, rate).map_err(DomainError::from)?)
        })
        .collect()
}

fn weights(record: &PoolRecord) -> SorResult<Vec<U256>> {
    sorted_tokens(record)
        .into_iter()
        .map(|t| {
            let weight = t.weight.ok_or_else(|| missing(record, "weight"))?;
            Ok(parse_fixed18("weight", weight)?)
        })
        .collect()
}

fn pair_liquidity(record: &PoolRecord) -> SorResult<Vec<TokenPairLiquidity>> {
    record
        .pair_liquidity
        .iter()
        .map(|pair| {
            Ok(TokenPairLiquidity {
                token_a: pair.token_a.to_lowercase(),
                token_b: pair.token_b.to_lowercase(),
                normalized_liquidity: parse_fixed18("normalized_liquidity", pair.normalized_liquidity)?,
            })
        })
        .collect()
}

fn amp(record: &PoolRecord) -> SorResult<U256> {
    let amp = record.amp.ok_or_else(|| missing(record, "amp"))?;
    Ok(parse_fixed("amp", amp, 3)?)
}

/// 18-decimal signed value.
fn parse_signed18(field: &'static str, value: Decimal) -> SorResult<I256> {
    let magnitude = to_signed(parse_fixed18(field, value.abs())?).map_err(DomainError::from)?;
    Ok(if value.is_sign_negative() { -magnitude } else { magnitude })
}

/// Raw signed integer persisted as a decimal string.
fn parse_i256(field: &'static str, value: &str) -> SorResult<I256> {
    I256::from_str_radix(value.trim(), 10).map_err(|_| {
        SorError::Domain(DomainError::InvalidNumber {
            field,
            value: value.to_string(),
        })
    })
}

fn eclp_curve(record: &PoolRecord) -> SorResult<GyroEclpCurve> {
    let p = record.gyro_eclp.as_ref().ok_or_else(|| missing(record, "gyro_eclp"))?;
    let params = EclpParams {
        alpha: parse_signed18("alpha", p.alpha)?,
        beta: parse_signed18("beta", p.beta)?,
        c: parse_signed18("c", p.c)?,
        s: parse_signed18("s", p.s)?,
        lambda: parse_signed18("lambda", p.lambda)?,
    };
    let derived = DerivedEclpParams {
        tau_alpha: Vector2::new(parse_i256("tau_alpha_x", &p.tau_alpha_x)?, parse_i256("tau_alpha_y", &p.tau_alpha_y)?),
        tau_beta: Vector2::new(parse_i256("tau_beta_x", &p.tau_beta_x)?, parse_i256("tau_beta_y", &p.tau_beta_y)?),
        u: parse_i256("u", &p.u)?,
        v: parse_i256("v", &p.v)?,
        w: parse_i256("w", &p.w)?,
        z: parse_i256("z", &p.z)?,
        d_sq: parse_i256("d_sq", &p.d_sq)?,
    };
    Ok(GyroEclpCurve::new(params, derived))
}

fn gyro_2clp_curve(record: &PoolRecord) -> SorResult<Gyro2ClpCurve> {
    let p = record.gyro_2clp.as_ref().ok_or_else(|| missing(record, "gyro_2clp"))?;
    Ok(Gyro2ClpCurve::new(
        parse_fixed18("sqrt_alpha", p.sqrt_alpha)?,
        parse_fixed18("sqrt_beta", p.sqrt_beta)?,
    )?)
}

fn quant_amm_curve(record: &PoolRecord, timestamp: u64) -> SorResult<QuantAmmCurve> {
    let p = record.quant_amm.as_ref().ok_or_else(|| missing(record, "quant_amm"))?;
    let schedule = WeightSchedule {
        base_weights: weights(record)?,
        multipliers: p
            .multipliers
            .iter()
            .map(|m| parse_signed18("multiplier", *m))
            .collect::<SorResult<_>>()?,
        last_update_time: p.last_update_time,
        last_interpolation_time_possible: p.last_interpolation_time_possible,
    };
    let ratio = parse_fixed18("max_trade_size_ratio", p.max_trade_size_ratio)?;
    Ok(QuantAmmCurve::at_timestamp(&schedule, ratio, timestamp)?)
}

fn reclamm_curve(record: &PoolRecord, tokens: &[PoolToken], timestamp: u64) -> SorResult<ReClammCurve> {
    let p = record.reclamm.as_ref().ok_or_else(|| missing(record, "reclamm"))?;
    let [v0, v1] = p.last_virtual_balances.as_slice() else {
        return Err(missing(record, "last_virtual_balances").into());
    };
    let state = ReClammState {
        last_virtual_balances: [
            parse_fixed18("last_virtual_balances", *v0)?,
            parse_fixed18("last_virtual_balances", *v1)?,
        ],
        daily_price_shift_base: parse_fixed18("daily_price_shift_base", p.daily_price_shift_base)?,
        last_timestamp: p.last_timestamp,
        centeredness_margin: parse_fixed18("centeredness_margin", p.centeredness_margin)?,
        start_fourth_root_price_ratio: parse_fixed18(
            "start_fourth_root_price_ratio",
            p.start_fourth_root_price_ratio,
        )?,
        end_fourth_root_price_ratio: parse_fixed18("end_fourth_root_price_ratio", p.end_fourth_root_price_ratio)?,
        price_ratio_update_start_time: p.price_ratio_update_start_time,
        price_ratio_update_end_time: p.price_ratio_update_end_time,
    };
    let balances = tokens
        .iter()
        .map(PoolToken::live_balance_round_down)
        .collect::<Result<Vec<_>, _>>()
        .map_err(DomainError::from)?;
    Ok(ReClammCurve::at_timestamp(&state, &balances, timestamp)?)
}

/// A vault-settled pool with the record's hook, fees and liquidity flags.
fn vault_pool<C: PoolCurve + 'static>(
    record: &PoolRecord,
    pool_type: PoolType,
    tokens: Vec<PoolToken>,
    curve: C,
    unbalanced_liquidity: bool,
) -> SorResult<Arc<dyn BasePool>> {
    let hook_type = record.hook.as_ref().and_then(HookType::from_record);
    let hook_state = resolve_hook_state(record)?;
    let pool = VaultPool::new(
        record.id.clone(),
        &record.address,
        pool_type,
        tokens,
        parse_fixed18("swap_fee", record.swap_fee)?,
        parse_fixed18("total_shares", record.total_shares)?,
        curve,
    )?
    .with_hook(hook_type, hook_state)
    .with_pair_liquidity(pair_liquidity(record)?)
    .with_aggregate_swap_fee(parse_fixed18("aggregate_swap_fee", record.aggregate_swap_fee)?)
    .with_unbalanced_liquidity(unbalanced_liquidity);
    Ok(Arc::new(pool))
}

fn buffer_from_record(record: &PoolRecord) -> SorResult<Arc<dyn BasePool>> {
    let tokens = sorted_tokens(record);
    let [wrapped, underlying] = tokens.as_slice() else {
        return Err(missing(record, "wrapped and underlying token").into());
    };
    let rate = wrapped.price_rate.ok_or_else(|| missing(record, "price_rate"))?;
    let pool = BufferPool::new(
        token(record.chain_id, &wrapped.address, wrapped.decimals, wrapped.symbol.as_ref()),
        token(record.chain_id, &underlying.address, underlying.decimals, underlying.symbol.as_ref()),
        parse_fixed18("price_rate", rate)?,
    )?;
    Ok(Arc::new(pool))
}

/// Builds the model of one pool record as of `timestamp`.
///
/// Records with `protocol_version` below 3 are legacy pools with their own
/// fee and scaling rules; the rest settle through the vault.
///
/// # Errors
/// Unknown pool types, missing or malformed parameters, and parameter sets
/// the curve rejects.
pub fn build_pool(record: &PoolRecord, timestamp: u64) -> SorResult<Arc<dyn BasePool>> {
    let pool_type = PoolType::from_tag(&record.pool_type)
        .ok_or_else(|| DomainError::UnsupportedPoolType(record.pool_type.clone()))?;
    let legacy = record.protocol_version < 3;
    let unbalanced = !record.liquidity_management.disable_unbalanced_liquidity;

    if pool_type == PoolType::Buffer {
        return buffer_from_record(record);
    }
    let tokens = pool_tokens(record)?;
    let swap_fee = parse_fixed18("swap_fee", record.swap_fee)?;

    Ok(match pool_type {
        PoolType::Weighted if legacy => Arc::new(
            LegacyWeightedPool::new(record.id.clone(), &record.address, tokens, weights(record)?, swap_fee)?
                .with_pair_liquidity(pair_liquidity(record)?),
        ),
        PoolType::Weighted => {
            let curve = WeightedCurve::new(weights(record)?)?;
            vault_pool(record, pool_type, tokens, curve, unbalanced)?
        }
        PoolType::Stable if !legacy => vault_pool(record, pool_type, tokens, StableCurve::new(amp(record)?), unbalanced)?,
        PoolType::Stable | PoolType::MetaStable => Arc::new(
            MetaStablePool::new(record.id.clone(), &record.address, tokens, amp(record)?, swap_fee)?
                .with_pair_liquidity(pair_liquidity(record)?),
        ),
        PoolType::ComposableStable => Arc::new(
            ComposableStablePool::new(
                record.id.clone(),
                &record.address,
                tokens,
                amp(record)?,
                swap_fee,
                parse_fixed18("total_shares", record.total_shares)?,
            )?
            .with_pair_liquidity(pair_liquidity(record)?),
        ),
        PoolType::Gyro2Clp if legacy => {
            return Err(DomainError::UnsupportedPoolType(format!("{} v{}", record.pool_type, record.protocol_version)).into());
        }
        PoolType::Gyro2Clp => vault_pool(record, pool_type, tokens, gyro_2clp_curve(record)?, unbalanced)?,
        PoolType::GyroEclp if legacy => Arc::new(
            LegacyGyroEclpPool::new(record.id.clone(), &record.address, tokens, eclp_curve(record)?, swap_fee)?
                .with_pair_liquidity(pair_liquidity(record)?),
        ),
        PoolType::GyroEclp => vault_pool(record, pool_type, tokens, eclp_curve(record)?, unbalanced)?,
        PoolType::QuantAmm => {
            let curve = quant_amm_curve(record, timestamp)?;
            vault_pool(record, pool_type, tokens, curve, unbalanced)?
        }
        PoolType::ReClamm => {
            let curve = reclamm_curve(record, &tokens, timestamp)?;
            // liquidity only enters proportionally
            vault_pool(record, pool_type, tokens, curve, false)?
        }
        PoolType::Buffer => buffer_from_record(record)?,
    })
}

/// One buffer per ERC4626 token held by a vault pool, keyed by the wrapped
/// token's address.
pub fn build_buffers(record: &PoolRecord) -> SorResult<Vec<(String, Arc<dyn BasePool>)>> {
    if record.protocol_version < 3 {
        return Ok(Vec::new());
    }
    record
        .tokens
        .iter()
        .filter(|t| t.is_erc4626)
        .map(|t| {
            let underlying = t
                .underlying_token
                .as_ref()
                .ok_or_else(|| missing(record, "underlying_token"))?;
            let pool = BufferPool::new(
                token(record.chain_id, &t.address, t.decimals, t.symbol.as_ref()),
                token(record.chain_id, &underlying.address, underlying.decimals, underlying.symbol.as_ref()),
                parse_fixed18("unwrap_rate", underlying.unwrap_rate)?,
            )?;
            let pool: Arc<dyn BasePool> = Arc::new(pool);
            Ok((t.address.to_lowercase(), pool))
        })
        .collect()
}
