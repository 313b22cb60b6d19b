//! Bollinger Bands — moving average +/- standard deviation multiplier.
//!
//! - Middle: SMA(x, period)
//! - Upper: middle + mult * stddev(x, period)
//! - Lower: middle - mult * stddev(x, period)
//! - Width: upper - lower
//! - %B: (x - lower) / (upper - lower), NaN when the bands collapse
//!
//! Uses sample stddev (divide by N - 1) over the rows available, so the
//! middle band starts at row 0 and the outer bands at row 1.
//! Output: `bb_{period}_upper|middle|lower|width|percent_b`.

use super::series::{finite_or_nan, rolling_mean, rolling_std};
use super::{input, Indicator, IndicatorError};
use crate::domain::{Column, TimeSeriesTable, CLOSE};

#[derive(Debug, Clone)]
pub struct Bollinger {
    column: String,
    period: usize,
    multiplier: f64,
    name: String,
}

impl Bollinger {
    pub fn new(period: usize, multiplier: f64) -> Self {
        assert!(period >= 2, "Bollinger period must be >= 2");
        assert!(multiplier > 0.0, "Bollinger multiplier must be > 0");
        Self {
            column: CLOSE.to_string(),
            period,
            multiplier,
            name: format!("bollinger_{period}"),
        }
    }

    pub fn on(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }
}

impl Indicator for Bollinger {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        1
    }

    fn required_columns(&self) -> Vec<&str> {
        vec![&self.column]
    }

    fn compute(&self, table: &TimeSeriesTable) -> Result<Vec<Column>, IndicatorError> {
        let x = input(table, &self.name, &self.column)?;
        let middle = rolling_mean(&x, self.period, 1);
        let std = rolling_std(&x, self.period, 1);

        let n = x.len();
        let mut upper = vec![f64::NAN; n];
        let mut lower = vec![f64::NAN; n];
        let mut width = vec![f64::NAN; n];
        let mut percent_b = vec![f64::NAN; n];
        for i in 0..n {
            upper[i] = middle[i] + self.multiplier * std[i];
            lower[i] = middle[i] - self.multiplier * std[i];
            width[i] = upper[i] - lower[i];
            percent_b[i] = finite_or_nan((x[i] - lower[i]) / width[i]);
        }

        let p = self.period;
        Ok(vec![
            Column::from_f64(format!("bb_{p}_upper"), upper),
            Column::from_f64(format!("bb_{p}_middle"), middle),
            Column::from_f64(format!("bb_{p}_lower"), lower),
            Column::from_f64(format!("bb_{p}_width"), width),
            Column::from_f64(format!("bb_{p}_percent_b"), percent_b),
        ])
    }
}
