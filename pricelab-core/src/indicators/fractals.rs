//! Williams fractals — strict local extremes.
//!
//! `fractal_up[t]`: low[t] is strictly below every other low within
//! `period` bars on each side. `fractal_down[t]`: high[t] is strictly above
//! every other high in that window. The first and last `period` rows, and
//! windows containing a missing value, are never fractals.
//!
//! Forward-looking: confirming a fractal needs `period` later bars.

use super::{inputs, Indicator, IndicatorError};
use crate::domain::{Column, TimeSeriesTable, HIGH, LOW};

#[derive(Debug, Clone)]
pub struct Fractals {
    period: usize,
    name: String,
}

impl Fractals {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "Fractal period must be >= 1");
        Self {
            period,
            name: format!("fractals_{period}"),
        }
    }
}

impl Default for Fractals {
    fn default() -> Self {
        Self::new(2)
    }
}

/// True where `values[i]` beats every neighbour within `half` rows under `beats`.
fn strict_extremes(values: &[f64], half: usize, beats: impl Fn(f64, f64) -> bool) -> Vec<bool> {
    let n = values.len();
    (0..n)
        .map(|i| {
            if i < half || i + half >= n || values[i].is_nan() {
                return false;
            }
            (i - half..=i + half)
                .filter(|&j| j != i)
                .all(|j| !values[j].is_nan() && beats(values[i], values[j]))
        })
        .collect()
}

impl Indicator for Fractals {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn required_columns(&self) -> Vec<&str> {
        vec![HIGH, LOW]
    }

    fn compute(&self, table: &TimeSeriesTable) -> Result<Vec<Column>, IndicatorError> {
        let [high, low] = inputs(table, &self.name, [HIGH, LOW])?;
        Ok(vec![
            Column::from_bool("fractal_up", strict_extremes(&low, self.period, |x, other| x < other)),
            Column::from_bool(
                "fractal_down",
                strict_extremes(&high, self.period, |x, other| x > other),
            ),
        ])
    }
}
