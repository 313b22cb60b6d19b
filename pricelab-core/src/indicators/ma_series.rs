//! Moving-average ribbons: one SMA or EMA per period.
//!
//! Output: `{sma|ema}_{period}` for each period (default 8, 18, 40).

use super::series::{ema, rolling_mean};
use super::{input, Indicator, IndicatorError};
use crate::domain::{Column, TimeSeriesTable, CLOSE};

pub const DEFAULT_MA_PERIODS: [usize; 3] = [8, 18, 40];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaKind {
    Sma,
    Ema,
}

impl MaKind {
    fn prefix(self) -> &'static str {
        match self {
            MaKind::Sma => "sma",
            MaKind::Ema => "ema",
        }
    }
}

#[derive(Debug, Clone)]
pub struct MaSeries {
    kind: MaKind,
    column: String,
    periods: Vec<usize>,
    name: String,
}

impl MaSeries {
    pub fn new(kind: MaKind, periods: Vec<usize>) -> Self {
        assert!(!periods.is_empty(), "MA series needs at least one period");
        assert!(periods.iter().all(|&p| p >= 1), "MA periods must be >= 1");
        let joined = periods
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join("_");
        Self {
            kind,
            column: CLOSE.to_string(),
            name: format!("{}_series_{joined}", kind.prefix()),
            periods,
        }
    }

    /// 8/18/40 ribbon.
    pub fn default_periods(kind: MaKind) -> Self {
        Self::new(kind, DEFAULT_MA_PERIODS.to_vec())
    }

    pub fn on(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }
}

impl Indicator for MaSeries {
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
        Ok(self
            .periods
            .iter()
            .map(|&p| {
                let series = match self.kind {
                    MaKind::Sma => rolling_mean(&values, p, 1),
                    MaKind::Ema => ema(&values, p),
                };
                Column::from_f64(format!("{}_{p}", self.kind.prefix()), series)
            })
            .collect())
    }
}
