//! Indicator library.
//!
//! Every indicator is a pure transformation over a `TimeSeriesTable`: it reads
//! the columns it needs, computes one or more output series from the table's
//! own history, and `apply` returns a copy of the table with those series
//! appended. Inputs are never mutated, and indicators share no state, so they
//! compose in any order.
//!
//! Missing inputs are `NaN` inside the kernels and null cells in the output.

pub mod accumulation_distribution;
pub mod adaptive_ma;
pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod factory;
pub mod fractals;
pub mod hma;
pub mod ichimoku;
pub mod ma_series;
pub mod macd;
pub mod mfi;
pub mod parabolic_sar;
pub mod pivot_points;
pub mod profile;
pub mod rsi;
pub mod series;
pub mod sma;
pub mod stoch_rsi;
pub mod support_resistance;
pub mod supertrend;
pub mod volume_stats;
pub mod vwap;
pub mod wyckoff;

pub use accumulation_distribution::AccumulationDistribution;
pub use adaptive_ma::AdaptiveMa;
pub use adx::Adx;
pub use atr::Atr;
pub use bollinger::Bollinger;
pub use ema::Ema;
pub use factory::{create_indicator, FactoryError, IndicatorConfig, INDICATOR_KINDS};
pub use fractals::Fractals;
pub use hma::Hma;
pub use ichimoku::Ichimoku;
pub use ma_series::{MaKind, MaSeries};
pub use macd::Macd;
pub use mfi::Mfi;
pub use parabolic_sar::ParabolicSar;
pub use pivot_points::PivotPoints;
pub use profile::{MarketProfile, VolumeProfile};
pub use rsi::Rsi;
pub use sma::Sma;
pub use stoch_rsi::StochRsi;
pub use support_resistance::SupportResistance;
pub use supertrend::Supertrend;
pub use volume_stats::VolumeStats;
pub use vwap::Vwap;
pub use wyckoff::Wyckoff;

use crate::domain::{Column, TableError, TimeSeriesTable};

/// Errors raised by indicators.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IndicatorError {
    #[error("{indicator}: missing required column '{column}'")]
    MissingColumn { indicator: String, column: String },

    #[error("{indicator}: invalid parameter: {reason}")]
    InvalidParameter { indicator: String, reason: String },

    #[error("{indicator} requires a timestamp index")]
    TemporalIndexRequired { indicator: String },

    #[error(transparent)]
    Table(#[from] TableError),
}

/// Trait for indicators.
///
/// `compute` returns the new columns only; `apply` appends them to a copy of
/// the table. Output columns replace existing columns of the same name.
///
/// # Look-ahead
/// Values at row t depend only on rows up to t, except for the explicitly
/// forward-looking outputs (`ichimoku_chikou` and the centred swing windows of
/// fractals and support/resistance).
pub trait Indicator: Send + Sync {
    /// Identifying name (e.g., "sma_20", "bollinger_20").
    fn name(&self) -> &str;

    /// Rows needed before the primary output becomes valid.
    fn lookback(&self) -> usize;

    /// Canonical names of the input columns.
    fn required_columns(&self) -> Vec<&str>;

    fn compute(&self, table: &TimeSeriesTable) -> Result<Vec<Column>, IndicatorError>;

    fn apply(&self, table: &TimeSeriesTable) -> Result<TimeSeriesTable, IndicatorError> {
        let mut out = table.clone();
        for column in self.compute(table)? {
            out.insert_column(column)?;
        }
        Ok(out)
    }
}

/// Apply indicators in order, each one seeing the previous one's output.
pub fn apply_all(
    table: &TimeSeriesTable,
    indicators: &[Box<dyn Indicator>],
) -> Result<TimeSeriesTable, IndicatorError> {
    indicators
        .iter()
        .try_fold(table.clone(), |acc, indicator| indicator.apply(&acc))
}

/// Numeric input series, with the error naming the indicator and column.
pub(crate) fn input(
    table: &TimeSeriesTable,
    indicator: &str,
    column: &str,
) -> Result<Vec<f64>, IndicatorError> {
    table
        .numeric(column)
        .map_err(|_| IndicatorError::MissingColumn {
            indicator: indicator.to_string(),
            column: column.to_string(),
        })
}

/// Fetch several inputs at once, in order.
pub(crate) fn inputs<const N: usize>(
    table: &TimeSeriesTable,
    indicator: &str,
    columns: [&str; N],
) -> Result<[Vec<f64>; N], IndicatorError> {
    let mut out: [Vec<f64>; N] = std::array::from_fn(|_| Vec::new());
    for (slot, column) in out.iter_mut().zip(columns) {
        *slot = input(table, indicator, column)?;
    }
    Ok(out)
}

/// Typical price: (high + low + close) / 3.
pub(crate) fn typical_price(high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    high.iter()
        .zip(low)
        .zip(close)
        .map(|((h, l), c)| (h + l + c) / 3.0)
        .collect()
}

/// Table with synthetic OHLCV bars built from close prices, for tests.
///
/// open = prev close (or close for the first bar), high = max(open, close) + 1,
/// low = min(open, close) - 1, volume = 1000. Daily index from 2024-01-02.
#[cfg(test)]
pub fn make_table(closes: &[f64]) -> TimeSeriesTable {
    let rows: Vec<(f64, f64, f64, f64, f64)> = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            (open, open.max(close) + 1.0, open.min(close) - 1.0, close, 1000.0)
        })
        .collect();
    make_ohlcv_table(&rows)
}

/// Table from explicit (open, high, low, close) rows with volume 1000.
#[cfg(test)]
pub fn make_ohlc_table(rows: &[(f64, f64, f64, f64)]) -> TimeSeriesTable {
    let rows: Vec<_> = rows.iter().map(|&(o, h, l, c)| (o, h, l, c, 1000.0)).collect();
    make_ohlcv_table(&rows)
}

/// Table from explicit (open, high, low, close, volume) rows.
#[cfg(test)]
pub fn make_ohlcv_table(rows: &[(f64, f64, f64, f64, f64)]) -> TimeSeriesTable {
    use crate::domain::IndexValue;
    let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let index = (0..rows.len())
        .map(|i| IndexValue::from(base + chrono::Duration::days(i as i64)))
        .collect();
    TimeSeriesTable::new(
        index,
        vec![
            Column::from_f64("open", rows.iter().map(|r| r.0).collect()),
            Column::from_f64("high", rows.iter().map(|r| r.1).collect()),
            Column::from_f64("low", rows.iter().map(|r| r.2).collect()),
            Column::from_f64("close", rows.iter().map(|r| r.3).collect()),
            Column::from_f64("volume", rows.iter().map(|r| r.4).collect()),
        ],
    )
    .unwrap()
}

/// Numeric values of a computed output column, for tests.
#[cfg(test)]
pub fn output(columns: &[Column], name: &str) -> Vec<f64> {
    columns
        .iter()
        .find(|c| c.name() == name)
        .unwrap_or_else(|| panic!("no output column {name}"))
        .to_f64()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
