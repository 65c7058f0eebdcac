//! Property tests for the analytics pipeline over randomly generated chains.

use approx::assert_relative_eq;
use gex_analytics::exposure::{compute_exposure, ExposureKind};
use gex_analytics::levels::{atm_strike, detect_key_levels, flip_point};
use gex_analytics::quant_power::{compute_quant_power, QuantPowerParams};
use gex_core::chain::{ChainSnapshot, SideQuote, StrikeRow};
use gex_core::types::Date;
use proptest::prelude::*;

type Leg = (u64, Option<f64>, Option<f64>, Option<f64>, Option<f64>, f64);

fn leg_strategy(delta_sign: f64) -> impl Strategy<Value = Leg> {
    (
        0u64..20_000,
        prop::option::of(0.0..1.0_f64),
        prop::option::of(0.0..0.01_f64),
        prop::option::of(-2.0..2.0_f64),
        prop::option::of(-0.05..0.05_f64),
        5.0..40.0_f64,
    )
        .prop_map(move |(oi, d, g, v, c, iv)| (oi, d.map(|d| d * delta_sign), g, v, c, iv))
}

fn quote((oi, delta, gamma, vanna, charm, iv): Leg) -> SideQuote {
    SideQuote::new(oi)
        .with_delta(delta)
        .with_gamma(gamma)
        .with_vanna(vanna)
        .with_charm(charm)
        .with_iv(iv)
}

/// Chains of 1..40 strikes on a 50-point ladder with spot inside the ladder.
fn chain_strategy() -> impl Strategy<Value = ChainSnapshot> {
    prop::collection::vec((leg_strategy(1.0), leg_strategy(-1.0)), 1..40).prop_flat_map(|legs| {
        let n = legs.len();
        let top = 20_000.0 + 50.0 * (n as f64 - 1.0);
        (Just(legs), 19_990.0..=top + 10.0)
    })
    .prop_map(|(legs, spot)| {
        let rows = legs
            .into_iter()
            .enumerate()
            .map(|(i, (c, p))| StrikeRow::new(20_000.0 + 50.0 * i as f64, quote(c), quote(p)))
            .collect();
        ChainSnapshot::new(spot, expiry(), rows).unwrap()
    })
}

fn expiry() -> Date {
    Date::from_ymd(2025, 1, 30).unwrap()
}

fn valuation() -> Date {
    Date::from_ymd(2025, 1, 20).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn test_exposure_row_identities(snapshot in chain_strategy(), lot in 1u32..100) {
        for kind in ExposureKind::ALL {
            let table = compute_exposure(&snapshot, lot, kind).unwrap();
            prop_assert_eq!(table.rows().len(), snapshot.len());
            for row in table.rows() {
                prop_assert_eq!(row.total, row.call + row.put);
                prop_assert_eq!(row.abs, row.total.abs());
            }
        }
    }

    #[test]
    fn test_exposure_is_idempotent(snapshot in chain_strategy()) {
        let a = compute_exposure(&snapshot, 75, ExposureKind::Gamma).unwrap();
        let b = compute_exposure(&snapshot, 75, ExposureKind::Gamma).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn test_flip_point_is_a_strike(snapshot in chain_strategy()) {
        let gex = compute_exposure(&snapshot, 75, ExposureKind::Gamma).unwrap();
        let flip = flip_point(&gex);
        prop_assert!(snapshot.strikes().contains(&flip));
    }

    #[test]
    fn test_atm_minimizes_distance(snapshot in chain_strategy()) {
        let atm = atm_strike(&snapshot);
        let best = (atm - snapshot.spot()).abs();
        for k in snapshot.strikes() {
            prop_assert!(best <= (k - snapshot.spot()).abs());
        }
    }

    #[test]
    fn test_key_level_partition(snapshot in chain_strategy(), width in 0u32..10, top_n in 0usize..6) {
        let gex = compute_exposure(&snapshot, 75, ExposureKind::Gamma).unwrap();
        let levels = detect_key_levels(&gex, width, top_n).unwrap();
        prop_assert_eq!(levels.cage.strikes.len() + levels.vacuum.len(), snapshot.len());
        prop_assert!(levels.cage.strikes.contains(&levels.atm_strike));
        prop_assert_eq!(levels.power_zones.len(), top_n.min(snapshot.len()));
    }

    #[test]
    fn test_quant_power_within_strike_range(snapshot in chain_strategy()) {
        let params = QuantPowerParams::new(75, valuation());
        let result = compute_quant_power(&snapshot, &params).unwrap();
        let strikes = snapshot.strikes();

        prop_assert!(strikes.contains(&result.quant_power_strike));
        prop_assert!(strikes.contains(&result.power_zone_lower));
        prop_assert!(strikes.contains(&result.power_zone_upper));
        prop_assert!(result.power_zone_lower <= result.power_zone_upper);
        if let Some(crossing) = result.crossing {
            prop_assert!(crossing >= strikes[0] && crossing <= strikes[strikes.len() - 1]);
        }
    }

    #[test]
    fn test_monotone_crossing_snaps_to_closer_strike(
        below in 1u64..1_000,
        above in 1u64..1_000,
        n in 3usize..12,
        cross_at in 0usize..10,
    ) {
        // Strike 0 carries a short-delta block, strikes after carry long
        // dealer delta, so the cumulative series is strictly increasing.
        let cross_at = cross_at.min(n - 2);
        let rows: Vec<StrikeRow> = (0..n)
            .map(|i| {
                let (call, put) = if i == 0 {
                    (SideQuote::new(below * (cross_at as u64 + 1) * 2).with_delta(0.5), SideQuote::new(0).with_delta(-0.5))
                } else {
                    (SideQuote::new(0).with_delta(0.5), SideQuote::new(above).with_delta(-0.5))
                };
                StrikeRow::new(100.0 + 10.0 * i as f64, call, put)
            })
            .collect();
        let snapshot = ChainSnapshot::new(100.0, expiry(), rows).unwrap();
        let result = compute_quant_power(&snapshot, &QuantPowerParams::new(1, valuation())).unwrap();

        let cum: Vec<f64> = result.points.iter().map(|p| p.cumulative_delta).collect();
        prop_assert!(cum.windows(2).all(|w| w[1] > w[0]));

        match cum.windows(2).position(|w| w[0] < 0.0 && w[1] > 0.0) {
            Some(i) => {
                let (s0, s1) = (result.points[i].strike, result.points[i + 1].strike);
                let x = s0 + (s1 - s0) * (-cum[i]) / (cum[i + 1] - cum[i]);
                assert_relative_eq!(result.crossing.unwrap(), x, epsilon = 1e-9);
                let expected = if (x - s0).abs() <= (s1 - x).abs() { s0 } else { s1 };
                prop_assert_eq!(result.quant_power_strike, expected);
            }
            None => prop_assert!(snapshot.strikes().contains(&result.quant_power_strike)),
        }
    }
}
