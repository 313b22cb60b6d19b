//! Hull Moving Average (HMA).
//!
//! HMA = WMA(2 * WMA(x, period / 2) - WMA(x, period), floor(sqrt(period)))
//! Lookback: period - 1 + floor(sqrt(period)) - 1.
//! Output: `hma_{period}`.

use super::series::wma;
use super::{input, Indicator, IndicatorError};
use crate::domain::{Column, TimeSeriesTable, CLOSE};

#[derive(Debug, Clone)]
pub struct Hma {
    column: String,
    period: usize,
    name: String,
}

impl Hma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 2, "HMA period must be >= 2");
        Self {
            column: CLOSE.to_string(),
            period,
            name: format!("hma_{period}"),
        }
    }

    pub fn on(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }

    fn half(&self) -> usize {
        (self.period / 2).max(1)
    }

    fn root(&self) -> usize {
        ((self.period as f64).sqrt() as usize).max(1)
    }
}

impl Indicator for Hma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1 + self.root() - 1
    }

    fn required_columns(&self) -> Vec<&str> {
        vec![&self.column]
    }

    fn compute(&self, table: &TimeSeriesTable) -> Result<Vec<Column>, IndicatorError> {
        let values = input(table, &self.name, &self.column)?;
        let fast = wma(&values, self.half());
        let slow = wma(&values, self.period);
        let raw: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| 2.0 * f - s).collect();
        Ok(vec![Column::from_f64(self.name.clone(), wma(&raw, self.root()))])
    }
}
