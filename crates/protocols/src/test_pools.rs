//! One pool of every model over the same two 18-decimal tokens, near par.

use crate::base_pool::BasePool;
use crate::buffer::BufferPool;
use crate::gyro::eclp_math::fixtures::params;
use crate::gyro::{Gyro2ClpCurve, GyroEclpCurve, LegacyGyroEclpPool};
use crate::quant_amm::{QuantAmmCurve, WeightSchedule};
use crate::reclamm::{ReClammCurve, ReClammState};
use crate::stable::{ComposableStablePool, MetaStablePool, StableCurve};
use crate::vault::PoolCurve;
use crate::vault_pool::VaultPool;
use crate::weighted::LegacyWeightedPool;
use ethnum::I256;
use primitive_types::U256;
use sor_domain::enums::{PoolType, SwapKind};
use sor_domain::math::ONE;
use sor_domain::pool::PoolToken;
use sor_domain::token::Token;

pub fn e18(v: u64) -> U256 {
    U256::from(v) * ONE
}

pub fn token_a() -> Token {
    Token::new(1, "0xa", 18)
}

pub fn token_b() -> Token {
    Token::new(1, "0xb", 18)
}

fn pair(balance_a: u64, balance_b: u64, rate_b: U256) -> Vec<PoolToken> {
    vec![
        PoolToken::new(token_a(), e18(balance_a), 0, ONE).unwrap(),
        PoolToken::new(token_b(), e18(balance_b), 1, rate_b).unwrap(),
    ]
}

fn vault<C: PoolCurve + 'static>(pool_type: PoolType, swap_fee: U256, curve: C) -> Box<dyn BasePool> {
    let address = format!("0x{pool_type}");
    Box::new(
        VaultPool::new(
            pool_type.to_string(),
            &address,
            pool_type,
            pair(1000, 1000, ONE),
            swap_fee,
            e18(2000),
            curve,
        )
        .unwrap(),
    )
}

fn reclamm_curve() -> ReClammCurve {
    // centred, sqrt price ratio (2000 * 2000) / (1000 * 1000) = 4
    let state = ReClammState {
        last_virtual_balances: [e18(1000), e18(1000)],
        daily_price_shift_base: U256::from(999_900_000_000_000_000u64),
        last_timestamp: 1_000,
        centeredness_margin: ONE / 5,
        start_fourth_root_price_ratio: ONE * 2,
        end_fourth_root_price_ratio: ONE * 2,
        price_ratio_update_start_time: 0,
        price_ratio_update_end_time: 0,
    };
    ReClammCurve::at_timestamp(&state, &[e18(1000), e18(1000)], 1_000).unwrap()
}

fn quant_amm_curve() -> QuantAmmCurve {
    // 50s after the update the weights sit at 0.55 / 0.45
    let step = I256::new(1_000_000_000_000_000);
    let schedule = WeightSchedule {
        base_weights: vec![ONE / 2, ONE / 2],
        multipliers: vec![step, -step],
        last_update_time: 1_000,
        last_interpolation_time_possible: 1_100,
    };
    QuantAmmCurve::at_timestamp(&schedule, ONE / 10, 1_050).unwrap()
}

fn composable_stable(swap_fee: U256) -> Box<dyn BasePool> {
    let tokens = vec![
        PoolToken::new(token_a(), e18(1000), 0, ONE).unwrap(),
        PoolToken::new(Token::new(1, "0xcs", 18), e18(1_000_000_000), 1, ONE).unwrap(),
        PoolToken::new(token_b(), e18(1000), 2, ONE).unwrap(),
    ];
    Box::new(ComposableStablePool::new("cs", "0xcs", tokens, U256::from(500_000u64), swap_fee, e18(2000)).unwrap())
}

/// Every model, named, charging `swap_fee` where it charges fees at all.
pub fn every_model(swap_fee: U256) -> Vec<(&'static str, Box<dyn BasePool>)> {
    let (p, d) = params();
    let one_point_one = ONE + ONE / 10;
    vec![
        ("stable", vault(PoolType::Stable, swap_fee, StableCurve::new(U256::from(200_000u64)))),
        (
            "gyro 2clp",
            vault(
                PoolType::Gyro2Clp,
                swap_fee,
                Gyro2ClpCurve::new(U256::from(900_000_000_000_000_000u64), one_point_one).unwrap(),
            ),
        ),
        ("gyro eclp", vault(PoolType::GyroEclp, swap_fee, GyroEclpCurve::new(p, d))),
        ("quant amm", vault(PoolType::QuantAmm, swap_fee, quant_amm_curve())),
        ("reclamm", vault(PoolType::ReClamm, swap_fee, reclamm_curve())),
        ("buffer", Box::new(BufferPool::new(token_a(), token_b(), ONE + ONE / 4).unwrap())),
        ("composable stable", composable_stable(swap_fee)),
        (
            "meta stable",
            Box::new(
                MetaStablePool::new("ms", "0xms", pair(1100, 1000, one_point_one), U256::from(50_000u64), swap_fee)
                    .unwrap(),
            ),
        ),
        (
            "legacy weighted",
            Box::new(LegacyWeightedPool::new("lw", "0xlw", pair(1000, 1000, ONE), vec![ONE / 2, ONE / 2], swap_fee).unwrap()),
        ),
        (
            "legacy gyro eclp",
            Box::new(LegacyGyroEclpPool::new("le", "0xle", pair(1000, 1000, ONE), GyroEclpCurve::new(p, d), swap_fee).unwrap()),
        ),
    ]
}

/// `per_mille` of half of what the pool takes in either direction, at
/// most 100 tokens.
pub fn trade_size(pool: &dyn BasePool, per_mille: u64) -> U256 {
    let forward = pool.get_limit_amount_swap(&token_a(), &token_b(), SwapKind::GivenIn).unwrap();
    let backward = pool.get_limit_amount_swap(&token_b(), &token_a(), SwapKind::GivenIn).unwrap();
    forward.min(backward).min(e18(200)) / 2 * U256::from(per_mille) / 1000
}

mod props {
    use super::*;
    use proptest::prelude::*;

    fn fee(bps: u64) -> U256 {
        U256::from(bps) * U256::exp10(14)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_round_trip_favours_pool_on_every_curve(per_mille in 1u64..=1000, fee_bps in 0u64..300) {
            let (a, b) = (token_a(), token_b());
            for (name, pool) in every_model(fee(fee_bps)) {
                let amount_in = trade_size(pool.as_ref(), per_mille);
                if amount_in.is_zero() {
                    continue;
                }
                let out = pool.swap_given_in(&a, &b, amount_in).unwrap();
                prop_assert!(!out.is_zero(), "{}: nothing out", name);

                // selling the proceeds back against the same state never
                // returns more than went in, up to a few wei of rounding on
                // the flattest curves
                let back = pool.swap_given_in(&b, &a, out).unwrap();
                prop_assert!(back <= amount_in + U256::from(100u64), "{}: {} back for {}", name, back, amount_in);

                // asking for exactly the proceeds costs about the same input
                let slack = amount_in / 1_000_000 + U256::exp10(12);
                let needed = pool.swap_given_out(&a, &b, out).unwrap();
                prop_assert!(needed <= amount_in + slack, "{}: {} needed for {}", name, needed, amount_in);
                prop_assert!(needed + slack >= amount_in, "{}: {} needed for {}", name, needed, amount_in);
            }
        }

        #[test]
        fn prop_fee_monotonic_on_every_curve(per_mille in 1u64..=1000, fee_bps in 1u64..300) {
            let (a, b) = (token_a(), token_b());
            let low = every_model(fee(fee_bps));
            let high = every_model(fee(fee_bps + 10));
            for ((name, low), (_, high)) in low.into_iter().zip(high) {
                if low.pool_type() == PoolType::Buffer {
                    continue;
                }
                let amount = trade_size(low.as_ref(), per_mille);
                if amount.is_zero() {
                    continue;
                }
                let out_low = low.swap_given_in(&a, &b, amount).unwrap();
                let out_high = high.swap_given_in(&a, &b, amount).unwrap();
                prop_assert!(out_high < out_low, "{}: {} vs {}", name, out_high, out_low);

                let wanted = amount / 2;
                let in_low = low.swap_given_out(&a, &b, wanted).unwrap();
                let in_high = high.swap_given_out(&a, &b, wanted).unwrap();
                prop_assert!(in_high > in_low, "{}: {} vs {}", name, in_high, in_low);
            }
        }
    }
}
