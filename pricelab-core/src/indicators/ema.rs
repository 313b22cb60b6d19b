//! Exponential Moving Average (EMA).
//!
//! Span-based, non-adjusted: alpha = 2 / (period + 1),
//! EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1], seeded with the first
//! valid value. Gaps repeat the previous average.
//! Output: `ema_{period}`.

use super::series::ema;
use super::{input, Indicator, IndicatorError};
use crate::domain::{Column, TimeSeriesTable, CLOSE};

#[derive(Debug, Clone)]
pub struct Ema {
    column: String,
    period: usize,
    name: String,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "EMA period must be >= 1");
        Self {
            column: CLOSE.to_string(),
            period,
            name: format!("ema_{period}"),
        }
    }

    /// Smooth `column` instead of `close`.
    pub fn on(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn required_columns(&self) -> Vec<&str> {
        vec![&self.column]
    }

    fn compute(&self, table: &TimeSeriesTable) -> Result<Vec<Column>, IndicatorError> {
        let values = input(table, &self.name, &self.column)?;
        Ok(vec![Column::from_f64(self.name.clone(), ema(&values, self.period))])
    }
}
