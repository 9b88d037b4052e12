//! Criterion benchmarks for order generation hot paths.
//!
//! Benchmarks:
//! 1. Indicator feed (SMA ratio, momentum)
//! 2. Constrained order scan
//! 3. Full strategies (oracle, rule-based)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use orderlab_core::domain::{PriceSeries, SignalSeries, TradingIndex};
use orderlab_core::indicators::{Indicator, Momentum, SmaRatio};
use orderlab_core::strategy::{constrain, OracleStrategy, RuleBasedStrategy, Strategy};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_index(n: usize) -> TradingIndex {
    let base = chrono::NaiveDate::from_ymd_opt(2000, 1, 3).unwrap();
    TradingIndex::new((0..n).map(|i| base + chrono::Duration::days(i as i64)).collect()).unwrap()
}

fn make_prices(n: usize) -> PriceSeries {
    let values = (0..n)
        .map(|i| 100.0 + (i as f64 * 0.1).sin() * 10.0 + (i as f64 * 0.013).cos() * 5.0)
        .collect();
    PriceSeries::new(make_index(n), values).unwrap()
}

fn make_signals(n: usize) -> SignalSeries {
    let values: Vec<i64> = (0..n).map(|i| ((i * 7919) % 3) as i64 - 1).collect();
    SignalSeries::from_values(make_index(n), &values).unwrap()
}

// ── 1. Indicators ────────────────────────────────────────────────────

fn bench_indicators(c: &mut Criterion) {
    let prices = make_prices(5_000);
    let mut group = c.benchmark_group("indicators");
    group.bench_function("sma_ratio_30", |b| {
        let ind = SmaRatio::new(30);
        b.iter(|| ind.compute(black_box(prices.values())))
    });
    group.bench_function("momentum_40", |b| {
        let ind = Momentum::new(40);
        b.iter(|| ind.compute(black_box(prices.values())))
    });
    group.finish();
}

// ── 2. Constrained scan ──────────────────────────────────────────────

fn bench_constrain(c: &mut Criterion) {
    let mut group = c.benchmark_group("constrain");
    for n in [1_000, 10_000, 100_000] {
        let signals = make_signals(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &signals, |b, s| {
            b.iter(|| constrain(black_box(s)))
        });
    }
    group.finish();
}

// ── 3. Strategies ────────────────────────────────────────────────────

fn bench_strategies(c: &mut Criterion) {
    let prices = make_prices(10_000);
    let mut group = c.benchmark_group("strategy");
    group.bench_function("oracle", |b| {
        let s = OracleStrategy::new();
        b.iter(|| s.generate(black_box(&prices)))
    });
    group.bench_function("rule_based", |b| {
        let s = RuleBasedStrategy::default_params();
        b.iter(|| s.generate(black_box(&prices)))
    });
    group.finish();
}

criterion_group!(benches, bench_indicators, bench_constrain, bench_strategies);
criterion_main!(benches);
