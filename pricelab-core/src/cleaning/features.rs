//! Derived price columns appended at the end of price cleaning.

use crate::domain::{Column, TableError, TimeSeriesTable, CLOSE};
use crate::indicators::series::{diff, finite_or_nan, pct_change, rolling_std};

pub const RETURNS: &str = "returns";
pub const LOG_RETURNS: &str = "log_returns";
pub const PRICE_CHANGE: &str = "price_change";
pub const PCT_CHANGE: &str = "pct_change";
pub const VOLATILITY_20: &str = "volatility_20";

/// Every column this module writes.
pub const DERIVED_COLUMNS: [&str; 5] = [RETURNS, LOG_RETURNS, PRICE_CHANGE, PCT_CHANGE, VOLATILITY_20];

const VOLATILITY_WINDOW: usize = 20;
const TRADING_DAYS: f64 = 252.0;

/// Append returns, log returns, price change, percent change and 20-bar
/// annualized volatility computed from `close`.
///
/// Existing derived columns are overwritten. Non-finite results (e.g. a zero
/// previous close) are stored as nulls.
pub fn add_price_features(table: &TimeSeriesTable) -> Result<TimeSeriesTable, TableError> {
    let close = table.numeric(CLOSE)?;

    let returns = pct_change(&close);
    let log_returns: Vec<f64> = (0..close.len())
        .map(|i| {
            if i == 0 {
                f64::NAN
            } else {
                finite_or_nan((close[i] / close[i - 1]).ln())
            }
        })
        .collect();
    let price_change = diff(&close);
    let pct: Vec<f64> = returns.iter().map(|r| r * 100.0).collect();
    let volatility: Vec<f64> = rolling_std(&returns, VOLATILITY_WINDOW, VOLATILITY_WINDOW)
        .into_iter()
        .map(|s| s * TRADING_DAYS.sqrt())
        .collect();

    table
        .clone()
        .with_column(Column::from_f64(RETURNS, returns))?
        .with_column(Column::from_f64(LOG_RETURNS, log_returns))?
        .with_column(Column::from_f64(PRICE_CHANGE, price_change))?
        .with_column(Column::from_f64(PCT_CHANGE, pct))?
        .with_column(Column::from_f64(VOLATILITY_20, volatility))
}

/// Remove previously derived columns so they can be recomputed from scratch.
pub(crate) fn strip_derived(table: &TimeSeriesTable) -> TimeSeriesTable {
    let mut out = table.clone();
    out.retain_columns(|c| !DERIVED_COLUMNS.contains(&c.name()));
    out
}
