//! Criterion benchmarks for the analytics pipeline.
//!
//! Benchmarks cover:
//! - Exposure Calculator across chain sizes
//! - Key Level Detector on a precomputed GEX table
//! - Quant Power Model (Black-Scholes recompute per leg)
//! - Flow Classifier on a snapshot pair

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gex_analytics::exposure::{compute_exposure, ExposureKind};
use gex_analytics::flow::classify_flow;
use gex_analytics::levels::{detect_key_levels_with, KeyLevelConfig};
use gex_analytics::quant_power::{compute_quant_power, QuantPowerParams};
use gex_core::chain::{ChainSnapshot, SideQuote, StrikeRow};
use gex_core::greeks::bs_greeks;
use gex_core::types::{Date, OptionSide};

fn synthetic_chain(n_strikes: usize, spot: f64, volume_bump: u64) -> ChainSnapshot {
    let t = 7.0 / 365.0;
    let first = spot - 50.0 * (n_strikes / 2) as f64;
    let rows = (0..n_strikes)
        .map(|i| {
            let k = (first + 50.0 * i as f64).round();
            let call = bs_greeks(spot, k, t, 0.05, 0.13, OptionSide::Call);
            let put = bs_greeks(spot, k, t, 0.05, 0.15, OptionSide::Put);
            let oi = 1_000 + (i as u64 * 37) % 5_000;
            StrikeRow::new(
                k,
                SideQuote::new(oi)
                    .with_iv(13.0)
                    .with_delta(call.delta)
                    .with_gamma(call.gamma)
                    .with_volume(Some(10_000 + volume_bump * i as u64))
                    .with_ltp(100.0),
                SideQuote::new(6_000 - oi)
                    .with_iv(15.0)
                    .with_delta(put.delta)
                    .with_gamma(put.gamma)
                    .with_volume(Some(8_000 + volume_bump))
                    .with_ltp(80.0),
            )
        })
        .collect();
    let expiry = Date::from_ymd(2025, 1, 30).unwrap();
    ChainSnapshot::new(spot, expiry, rows).unwrap()
}

fn valuation() -> Date {
    Date::from_ymd(2025, 1, 23).unwrap()
}

fn bench_exposure(c: &mut Criterion) {
    let mut group = c.benchmark_group("exposure");

    for n in [21, 81, 201] {
        let chain = synthetic_chain(n, 24_060.0, 0);
        for kind in [ExposureKind::Gamma, ExposureKind::Delta] {
            group.bench_with_input(BenchmarkId::new(kind.code(), n), &chain, |b, chain| {
                b.iter(|| black_box(compute_exposure(chain, 75, kind).unwrap()))
            });
        }
    }

    group.finish();
}

fn bench_key_levels(c: &mut Criterion) {
    let mut group = c.benchmark_group("key_levels");
    let config = KeyLevelConfig::default();

    for n in [21, 81, 201] {
        let gex = compute_exposure(&synthetic_chain(n, 24_060.0, 0), 75, ExposureKind::Gamma).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(n), &gex, |b, gex| {
            b.iter(|| black_box(detect_key_levels_with(gex, &config).unwrap()))
        });
    }

    group.finish();
}

fn bench_quant_power(c: &mut Criterion) {
    let mut group = c.benchmark_group("quant_power");
    let params = QuantPowerParams::new(75, valuation());

    for n in [21, 81, 201] {
        let chain = synthetic_chain(n, 24_060.0, 0);
        group.bench_with_input(BenchmarkId::from_parameter(n), &chain, |b, chain| {
            b.iter(|| black_box(compute_quant_power(chain, &params).unwrap()))
        });
    }

    group.finish();
}

fn bench_flow(c: &mut Criterion) {
    let mut group = c.benchmark_group("flow");

    for n in [21, 81, 201] {
        let prev = synthetic_chain(n, 24_060.0, 0);
        let now = synthetic_chain(n, 24_060.0, 40);
        group.bench_with_input(
            BenchmarkId::from_parameter(n),
            &(now, prev),
            |b, (now, prev)| b.iter(|| black_box(classify_flow(now, prev, 75).unwrap())),
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_exposure,
    bench_key_levels,
    bench_quant_power,
    bench_flow
);
criterion_main!(benches);
