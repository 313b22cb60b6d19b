//! Relative Strength Index (RSI).
//!
//! Uses Wilder smoothing of average gains and average losses.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Lookback: period.
//! Edge cases: avg_loss == 0 → RSI = 100; avg_gain == 0 → RSI = 0;
//! both zero → 50.
//! Output: `rsi_{period}`.

use super::series::{diff, wilder_smooth};
use super::{input, Indicator, IndicatorError};
use crate::domain::{Column, TimeSeriesTable, CLOSE};

#[derive(Debug, Clone)]
pub struct Rsi {
    column: String,
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            column: CLOSE.to_string(),
            period,
            name: format!("rsi_{period}"),
        }
    }

    pub fn on(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }
}

/// RSI of a raw series. Shared with StochRSI.
pub fn rsi_series(values: &[f64], period: usize) -> Vec<f64> {
    let changes = diff(values);
    let gains: Vec<f64> = changes
        .iter()
        .map(|&ch| if ch.is_nan() { f64::NAN } else { ch.max(0.0) })
        .collect();
    let losses: Vec<f64> = changes
        .iter()
        .map(|&ch| if ch.is_nan() { f64::NAN } else { (-ch).max(0.0) })
        .collect();

    let avg_gain = wilder_smooth(&gains, period);
    let avg_loss = wilder_smooth(&losses, period);

    avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(&g, &l)| {
            if g.is_nan() || l.is_nan() {
                f64::NAN
            } else {
                compute_rsi(g, l)
            }
        })
        .collect()
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 && avg_gain == 0.0 {
        50.0 // no movement
    } else if avg_loss == 0.0 {
        100.0
    } else if avg_gain == 0.0 {
        0.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn required_columns(&self) -> Vec<&str> {
        vec![&self.column]
    }

    fn compute(&self, table: &TimeSeriesTable) -> Result<Vec<Column>, IndicatorError> {
        let values = input(table, &self.name, &self.column)?;
        Ok(vec![Column::from_f64(
            self.name.clone(),
            rsi_series(&values, self.period),
        )])
    }
}
