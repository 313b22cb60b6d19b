//! Simple Moving Average (SMA).
//!
//! Rolling mean of a column (default `close`) over a trailing window.
//! Partial windows at the start are averaged over the rows available, so the
//! first value equals the first input.
//! Output: `sma_{period}`.

use super::series::rolling_mean;
use super::{input, Indicator, IndicatorError};
use crate::domain::{Column, TimeSeriesTable, CLOSE};

#[derive(Debug, Clone)]
pub struct Sma {
    column: String,
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            column: CLOSE.to_string(),
            period,
            name: format!("sma_{period}"),
        }
    }

    /// Average `column` instead of `close`.
    pub fn on(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }
}

impl Indicator for Sma {
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
        Ok(vec![Column::from_f64(
            self.name.clone(),
            rolling_mean(&values, self.period, 1),
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_table, output, DEFAULT_EPSILON};

    #[test]
    fn sma_basic() {
        let table = make_table(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let out = Sma::new(3).compute(&table).unwrap();
        let sma = output(&out, "sma_3");
        assert_approx(sma[0], 10.0, DEFAULT_EPSILON);
        assert_approx(sma[1], 10.5, DEFAULT_EPSILON);
        assert_approx(sma[2], 11.0, DEFAULT_EPSILON);
        assert_approx(sma[4], 13.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_period_1_is_identity() {
        let closes = [5.0, 7.0, 6.0];
        let out = Sma::new(1).compute(&make_table(&closes)).unwrap();
        assert_eq!(output(&out, "sma_1"), closes.to_vec());
    }

    #[test]
    fn sma_on_other_column() {
        let out = Sma::new(2).on("volume").compute(&make_table(&[1.0, 2.0])).unwrap();
        assert_eq!(output(&out, "sma_2"), vec![1000.0, 1000.0]);
    }

    #[test]
    fn sma_nan_is_skipped_in_window() {
        let mut closes = vec![10.0, 11.0, 12.0];
        closes[1] = f64::NAN;
        let out = Sma::new(3).compute(&make_table(&closes)).unwrap();
        assert_approx(output(&out, "sma_3")[2], 11.0, DEFAULT_EPSILON);
    }

    #[test]
    #[should_panic(expected = "SMA period must be >= 1")]
    fn sma_zero_period_panics() {
        Sma::new(0);
    }
}
