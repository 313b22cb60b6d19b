//! Criterion benchmarks for PriceLab hot paths.
//!
//! Benchmarks:
//! 1. Price series cleaning (default config, and with outlier removal)
//! 2. Indicator batch (SMA, EMA, RSI, ATR, Bollinger, MACD, Supertrend)
//! 3. Full pipeline (clean, then every indicator the factory knows)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;

use pricelab_core::cleaning::{CleanerConfig, DataCleaner, NullObserver};
use pricelab_core::domain::{Column, IndexValue, TimeSeriesTable};
use pricelab_core::indicators::{
    apply_all, create_indicator, Atr, Bollinger, Ema, Indicator, IndicatorConfig, Macd, Rsi, Sma,
    Supertrend, INDICATOR_KINDS,
};
use pricelab_core::pipeline::Pipeline;

// ── Helpers ──────────────────────────────────────────────────────────

/// Raw bars with the usual supplier problems mixed in: every 50th row is
/// duplicated, every 37th close is missing and every 97th bar is inverted.
fn make_raw_table(n: usize) -> TimeSeriesTable {
    let base_date = chrono::NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
    let mut index = Vec::with_capacity(n);
    let (mut open, mut high, mut low, mut close, mut volume) = (vec![], vec![], vec![], vec![], vec![]);
    for i in 0..n {
        let day = if i % 50 == 49 { i - 1 } else { i };
        let c = 100.0 + (i as f64 * 0.1).sin() * 10.0;
        let (mut h, mut l) = (c + 1.5, c - 1.5);
        if i % 97 == 96 {
            std::mem::swap(&mut h, &mut l);
        }
        index.push(IndexValue::from(
            (base_date + chrono::Duration::days(day as i64)).to_string(),
        ));
        open.push(c - 0.3);
        high.push(h);
        low.push(l);
        close.push(if i % 37 == 36 { f64::NAN } else { c });
        volume.push(1_000_000.0 + (i % 500) as f64 * 1000.0);
    }
    TimeSeriesTable::new(
        index,
        vec![
            Column::from_f64("Open", open),
            Column::from_f64("High", high),
            Column::from_f64("Low", low),
            Column::from_f64("Close", close),
            Column::from_f64("Volume", volume),
        ],
    )
    .unwrap()
}

fn cleaner(config: CleanerConfig) -> DataCleaner {
    DataCleaner::new(config)
        .unwrap()
        .with_observer(Arc::new(NullObserver))
}

// ── 1. Cleaning ──────────────────────────────────────────────────────

fn bench_cleaning(c: &mut Criterion) {
    let mut group = c.benchmark_group("clean_price_series");
    let default_cleaner = cleaner(CleanerConfig::default());
    let outlier_cleaner = cleaner(CleanerConfig {
        remove_outliers: true,
        ..CleanerConfig::default()
    });

    for n in [252, 1260, 5040] {
        let raw = make_raw_table(n);
        group.bench_with_input(BenchmarkId::new("default", n), &raw, |b, raw| {
            b.iter(|| default_cleaner.clean_price_series(black_box(raw), None).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("remove_outliers", n), &raw, |b, raw| {
            b.iter(|| outlier_cleaner.clean_price_series(black_box(raw), None).unwrap())
        });
    }
    group.finish();
}

// ── 2. Indicator batch ───────────────────────────────────────────────

fn bench_indicators(c: &mut Criterion) {
    let mut group = c.benchmark_group("indicator_batch");
    let indicators: Vec<Box<dyn Indicator>> = vec![
        Box::new(Sma::new(20)),
        Box::new(Ema::new(20)),
        Box::new(Rsi::new(14)),
        Box::new(Atr::new(14)),
        Box::new(Bollinger::new(20, 2.0)),
        Box::new(Macd::default_params()),
        Box::new(Supertrend::default_params()),
    ];

    for n in [1260, 5040] {
        let (table, _) = cleaner(CleanerConfig::default())
            .clean_price_series(&make_raw_table(n), None)
            .unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(n), &table, |b, table| {
            b.iter(|| apply_all(black_box(table), &indicators).unwrap())
        });
    }
    group.finish();
}

// ── 3. Full pipeline ─────────────────────────────────────────────────

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    let indicators = INDICATOR_KINDS
        .iter()
        .map(|kind| create_indicator(&IndicatorConfig::new(*kind)).unwrap())
        .collect();
    let pipeline = Pipeline::new(cleaner(CleanerConfig::default()), indicators);
    let raw = make_raw_table(1260);

    group.bench_function("all_indicators_1260_bars", |b| {
        b.iter(|| pipeline.run(black_box(&raw), Some("BENCH")).unwrap())
    });
    group.finish();
}

criterion_group!(benches, bench_cleaning, bench_indicators, bench_pipeline);
criterion_main!(benches);
