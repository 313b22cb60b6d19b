//! Row-level checks: OHLC consistency, z-score outliers, fundamental ratios.

use crate::domain::{FundamentalRecord, TableError, TimeSeriesTable, CLOSE, HIGH, LOW, OPEN};

/// Ratios that should never be negative.
pub const NON_NEGATIVE_RATIOS: [&str; 5] =
    ["pe_ratio", "price_to_book", "price_to_sales", "roe", "roa"];

/// Percentages that may arrive as fractions (0.25) or as percent (25.0).
pub const PERCENTAGE_FIELDS: [&str; 3] = ["dividend_yield", "payout_ratio", "profit_margin"];

/// Percent value above which a percentage field is suspicious.
pub const MAX_PLAUSIBLE_PERCENT: f64 = 1000.0;

/// Flag rows whose prices break `low <= {open, close} <= high`.
///
/// A row with any missing price is not flagged; missing values are the fill
/// step's concern.
pub fn invalid_ohlc_mask(table: &TimeSeriesTable) -> Result<Vec<bool>, TableError> {
    let open = table.numeric(OPEN)?;
    let high = table.numeric(HIGH)?;
    let low = table.numeric(LOW)?;
    let close = table.numeric(CLOSE)?;

    Ok((0..table.len())
        .map(|i| is_invalid_bar(open[i], high[i], low[i], close[i]))
        .collect())
}

/// NaN comparisons are false, so incomplete bars never count as invalid.
fn is_invalid_bar(open: f64, high: f64, low: f64, close: f64) -> bool {
    let bad_high = high < open || high < close;
    let bad_low = low > open || low > close;
    let bad_close = close < low || close > high;
    bad_high || bad_low || bad_close
}

/// Flag rows where any of `fields` sits more than `threshold` sample
/// standard deviations from its column mean.
///
/// Columns with fewer than two values, or with zero spread, flag nothing.
/// Missing columns are skipped.
pub fn outlier_mask(table: &TimeSeriesTable, fields: &[&str], threshold: f64) -> Vec<bool> {
    let mut mask = vec![false; table.len()];
    for field in fields {
        let Ok(values) = table.numeric(field) else {
            continue;
        };
        let Some((mean, std)) = mean_and_std(&values) else {
            continue;
        };
        for (flag, v) in mask.iter_mut().zip(&values) {
            if ((v - mean) / std).abs() > threshold {
                *flag = true;
            }
        }
    }
    mask
}

/// Mean and sample (n - 1) standard deviation over the non-NaN values.
fn mean_and_std(values: &[f64]) -> Option<(f64, f64)> {
    let valid: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if valid.len() < 2 {
        return None;
    }
    let n = valid.len() as f64;
    let mean = valid.iter().sum::<f64>() / n;
    let var = valid.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let std = var.sqrt();
    (std.is_finite() && std > 0.0).then_some((mean, std))
}

/// Soft checks on well-known fundamental ratios. Returns one warning per
/// suspicious value; non-numeric values are not checked.
pub fn fundamental_ratio_warnings(record: &FundamentalRecord) -> Vec<String> {
    let mut warnings = Vec::new();

    for key in NON_NEGATIVE_RATIOS {
        if let Some(v) = record.get(key).and_then(|v| v.as_f64()) {
            if v < 0.0 {
                warnings.push(format!("Negative {key}: {v}"));
            }
        }
    }

    for key in PERCENTAGE_FIELDS {
        if let Some(v) = record.get(key).and_then(|v| v.as_f64()) {
            let percent = if v < 1.0 { v * 100.0 } else { v };
            if percent > MAX_PLAUSIBLE_PERCENT {
                warnings.push(format!("Implausible {key}: {percent}%"));
            }
        }
    }

    warnings
}
