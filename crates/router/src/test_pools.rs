//! Pool fixtures shared by the router tests.

use primitive_types::U256;
use sor_domain::enums::PoolType;
use sor_domain::math::ONE;
use sor_domain::pool::PoolToken;
use sor_domain::token::Token;
use sor_protocols::base_pool::BasePool;
use sor_protocols::buffer::BufferPool;
use sor_protocols::gyro::Gyro2ClpCurve;
use sor_protocols::reclamm::{ReClammCurve, ReClammState};
use sor_protocols::vault_pool::VaultPool;
use sor_protocols::weighted::WeightedCurve;
use sor_protocols::{Gyro2ClpPool, ReClammPool, WeightedPool};
use std::sync::Arc;

pub fn token(address: &str) -> Token {
    Token::new(1, address, 18)
}

pub fn e18(v: u64) -> U256 {
    U256::from(v) * ONE
}

/// Equal-weight pool without fees; balances in whole tokens.
pub fn weighted(id: &str, address: &str, balances: &[(&str, u64)]) -> Arc<dyn BasePool> {
    weighted_pool(id, address, balances, U256::zero())
}

pub fn weighted_pool(id: &str, address: &str, balances: &[(&str, u64)], swap_fee: U256) -> Arc<dyn BasePool> {
    let tokens: Vec<PoolToken> = balances
        .iter()
        .enumerate()
        .map(|(i, (address, balance))| PoolToken::new(token(address), e18(*balance), i, ONE).unwrap())
        .collect();
    let weight = ONE / U256::from(balances.len());
    let curve = WeightedCurve::new(vec![weight; balances.len()]).unwrap();
    let total: u64 = balances.iter().map(|(_, b)| b).sum();
    let pool: WeightedPool =
        VaultPool::new(id, address, PoolType::Weighted, tokens, swap_fee, e18(total), curve).unwrap();
    Arc::new(pool)
}

fn pair(a: &str, b: &str, balance: u64) -> Vec<PoolToken> {
    vec![
        PoolToken::new(token(a), e18(balance), 0, ONE).unwrap(),
        PoolToken::new(token(b), e18(balance), 1, ONE).unwrap(),
    ]
}

/// Concentrated pool over the price range [0.81, 1.21], balanced.
pub fn gyro_2clp(id: &str, address: &str, a: &str, b: &str, balance: u64) -> Arc<dyn BasePool> {
    let curve = Gyro2ClpCurve::new(U256::from(900_000_000_000_000_000u64), U256::from(1_100_000_000_000_000_000u64))
        .unwrap();
    let pool: Gyro2ClpPool =
        VaultPool::new(id, address, PoolType::Gyro2Clp, pair(a, b, balance), U256::zero(), e18(2 * balance), curve)
            .unwrap();
    Arc::new(pool)
}

/// Centred readjusting pool whose virtual balances equal its real ones.
pub fn reclamm(id: &str, address: &str, a: &str, b: &str, balance: u64) -> Arc<dyn BasePool> {
    let state = ReClammState {
        last_virtual_balances: [e18(balance), e18(balance)],
        daily_price_shift_base: U256::from(999_900_000_000_000_000u64),
        last_timestamp: 0,
        centeredness_margin: ONE / 5,
        start_fourth_root_price_ratio: ONE * 2,
        end_fourth_root_price_ratio: ONE * 2,
        price_ratio_update_start_time: 0,
        price_ratio_update_end_time: 0,
    };
    let curve = ReClammCurve::at_timestamp(&state, &[e18(balance), e18(balance)], 0).unwrap();
    let pool: ReClammPool =
        VaultPool::new(id, address, PoolType::ReClamm, pair(a, b, balance), U256::zero(), e18(2 * balance), curve)
            .unwrap();
    Arc::new(pool)
}

/// `rate` underlying per wrapped share, in tenths.
pub fn buffer(wrapped: &str, underlying: &str, rate_tenths: u64) -> Arc<dyn BasePool> {
    Arc::new(BufferPool::new(token(wrapped), token(underlying), U256::from(rate_tenths) * ONE / 10).unwrap())
}
