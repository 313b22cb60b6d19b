//! Classic floor pivot points from the previous bar.
//!
//! PP = (H + L + C) / 3 of the previous bar; R1 = 2PP - L, S1 = 2PP - H,
//! R2 = PP + (H - L), S2 = PP - (H - L).
//! Lookback: 1.
//! Output: `pivot_pp|r1|s1|r2|s2`.

use super::series::shift;
use super::{inputs, typical_price, Indicator, IndicatorError};
use crate::domain::{Column, TimeSeriesTable, CLOSE, HIGH, LOW};

#[derive(Debug, Clone, Default)]
pub struct PivotPoints;

impl Indicator for PivotPoints {
    fn name(&self) -> &str {
        "pivot_points"
    }

    fn lookback(&self) -> usize {
        1
    }

    fn required_columns(&self) -> Vec<&str> {
        vec![HIGH, LOW, CLOSE]
    }

    fn compute(&self, table: &TimeSeriesTable) -> Result<Vec<Column>, IndicatorError> {
        let [high, low, close] = inputs(table, self.name(), [HIGH, LOW, CLOSE])?;
        let (high, low, close) = (shift(&high, 1), shift(&low, 1), shift(&close, 1));
        let pp = typical_price(&high, &low, &close);

        let n = pp.len();
        let (mut r1, mut s1, mut r2, mut s2) =
            (vec![0.0; n], vec![0.0; n], vec![0.0; n], vec![0.0; n]);
        for i in 0..n {
            let range = high[i] - low[i];
            r1[i] = 2.0 * pp[i] - low[i];
            s1[i] = 2.0 * pp[i] - high[i];
            r2[i] = pp[i] + range;
            s2[i] = pp[i] - range;
        }

        Ok(vec![
            Column::from_f64("pivot_pp", pp),
            Column::from_f64("pivot_r1", r1),
            Column::from_f64("pivot_s1", s1),
            Column::from_f64("pivot_r2", r2),
            Column::from_f64("pivot_s2", s2),
        ])
    }
}
