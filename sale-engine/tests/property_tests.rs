//! Property-based tests for sale engine invariants
//!
//! - Leadin boundary prices: floor × start multiple at the start, floor at the end
//! - Leadin price never increases as blocks advance
//! - Phases only move forward
//! - Renewal price never decreases with missed cycles

use proptest::prelude::*;
use rust_decimal::Decimal;
use sale_engine::{
    current_phase, renewal_price, LinearLeadin, Phase, PriceEngine, SaleBoundaries, SaleConfig,
    SaleInfo,
};

/// Strategy for start multiples in [1, 100] with up to two decimal places
fn multiple_strategy() -> impl Strategy<Value = Decimal> {
    (100u64..=10_000).prop_map(|hundredths| Decimal::new(hundredths as i64, 2))
}

/// Strategy for sales with a non-empty leadin
fn sale_strategy() -> impl Strategy<Value = (SaleInfo, SaleConfig)> {
    (
        0u32..1_000_000,
        1u32..10_000,
        0u32..1_000,
        1u128..100_000_000_000_000_000, // keeps floor × 100 within u64
    )
        .prop_map(|(sale_start, leadin_length, interlude_length, floor_price)| {
            let info = SaleInfo {
                sale_start,
                leadin_length,
                floor_price,
                region_begin: 100,
                region_end: 200,
                first_core: 0,
                ideal_cores_sold: 5,
                cores_offered: 10,
                cores_sold: 0,
                sellout_price: None,
                previous_sellout_price: None,
            };
            let config = SaleConfig {
                interlude_length,
                leadin_length,
                region_length: 5_040,
                renewal_bump: Decimal::new(3, 2),
            };
            (info, config)
        })
}

fn phase_rank(phase: Phase) -> u8 {
    match phase {
        Phase::Interlude => 0,
        Phase::Leadin => 1,
        Phase::Regular => 2,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: the leadin starts at floor × multiple and ends exactly at the floor
    #[test]
    fn prop_leadin_boundaries(multiple in multiple_strategy(), (info, _) in sale_strategy()) {
        let engine = PriceEngine::new(LinearLeadin::new(multiple).unwrap());

        let start = engine.leadin_price(info.floor_price, Decimal::ZERO).unwrap();
        let expected = (Decimal::from(info.floor_price as u64) * multiple).trunc();
        prop_assert_eq!(Decimal::from(start as u64), expected);

        let end = engine.leadin_price(info.floor_price, Decimal::ONE).unwrap();
        prop_assert_eq!(end, info.floor_price);
    }

    /// Property: leadin price is non-increasing in the block number
    #[test]
    fn prop_leadin_non_increasing(
        (info, config) in sale_strategy(),
        a in 0u32..20_000,
        b in 0u32..20_000,
    ) {
        let engine = PriceEngine::new(LinearLeadin::new(Decimal::from(10)).unwrap());
        let boundaries = SaleBoundaries::derive(&info, &config, 40).unwrap();
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let lo = boundaries.interlude_end + lo;
        let hi = boundaries.interlude_end + hi;

        let price_lo = engine.leadin_price(info.floor_price, boundaries.leadin_progress(lo)).unwrap();
        let price_hi = engine.leadin_price(info.floor_price, boundaries.leadin_progress(hi)).unwrap();
        prop_assert!(price_hi <= price_lo);
        prop_assert!(price_hi >= info.floor_price);
    }

    /// Property: phases only advance
    #[test]
    fn prop_phase_monotonic((info, config) in sale_strategy(), a in 0u32..2_000_000, b in 0u32..2_000_000) {
        let boundaries = SaleBoundaries::derive(&info, &config, 40).unwrap();
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(phase_rank(current_phase(&boundaries, lo)) <= phase_rank(current_phase(&boundaries, hi)));
    }

    /// Property: renewal price never decreases as cycles are missed
    #[test]
    fn prop_renewal_monotonic(base in 0u128..1_000_000_000_000, bump_bps in 0i64..5_000, cycles in 0u32..30) {
        let bump = Decimal::new(bump_bps, 4);
        let now = renewal_price(base, bump, cycles).unwrap();
        let later = renewal_price(base, bump, cycles + 1).unwrap();
        prop_assert!(later >= now);
        prop_assert!(now >= base);
    }
}
