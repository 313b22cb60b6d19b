//! ADX — Average Directional Index (Wilder).
//!
//! Steps:
//! 1. Compute +DM and -DM from consecutive bars
//! 2. Smooth +DM, -DM, and TR using Wilder smoothing (alpha = 1/period)
//! 3. +DI = 100 * smoothed(+DM) / smoothed(TR)
//! 4. -DI = 100 * smoothed(-DM) / smoothed(TR)
//! 5. DX = 100 * |+DI - -DI| / (+DI + -DI)
//! 6. ADX = Wilder-smoothed DX
//!
//! Lookback: 2 * period - 1 (period for DI smoothing, then period - 1 more
//! DX values for the ADX seed).
//! Output: `adx`, `adx_plus_di`, `adx_minus_di`.

use super::atr::true_range;
use super::series::wilder_smooth;
use super::{inputs, Indicator, IndicatorError};
use crate::domain::{Column, TimeSeriesTable, CLOSE, HIGH, LOW};

#[derive(Debug, Clone)]
pub struct Adx {
    period: usize,
    name: String,
}

impl Adx {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ADX period must be >= 1");
        Self {
            period,
            name: format!("adx_{period}"),
        }
    }
}

/// (+DM, -DM) series. Index 0 has no previous bar and is NaN.
fn directional_movement(high: &[f64], low: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let n = high.len();
    let mut plus_dm = vec![f64::NAN; n];
    let mut minus_dm = vec![f64::NAN; n];

    for i in 1..n {
        if high[i].is_nan() || low[i].is_nan() || high[i - 1].is_nan() || low[i - 1].is_nan() {
            continue;
        }
        let up = high[i] - high[i - 1];
        let down = low[i - 1] - low[i];
        plus_dm[i] = if up > down && up > 0.0 { up } else { 0.0 };
        minus_dm[i] = if down > up && down > 0.0 { down } else { 0.0 };
    }
    (plus_dm, minus_dm)
}

impl Indicator for Adx {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        2 * self.period - 1
    }

    fn required_columns(&self) -> Vec<&str> {
        vec![HIGH, LOW, CLOSE]
    }

    fn compute(&self, table: &TimeSeriesTable) -> Result<Vec<Column>, IndicatorError> {
        let [high, low, close] = inputs(table, &self.name, [HIGH, LOW, CLOSE])?;
        let n = high.len();

        let (plus_dm, minus_dm) = directional_movement(&high, &low);
        let mut tr = true_range(&high, &low, &close);
        if let Some(first) = tr.first_mut() {
            *first = f64::NAN;
        }

        let smooth_tr = wilder_smooth(&tr, self.period);
        let smooth_plus = wilder_smooth(&plus_dm, self.period);
        let smooth_minus = wilder_smooth(&minus_dm, self.period);

        let mut plus_di = vec![f64::NAN; n];
        let mut minus_di = vec![f64::NAN; n];
        let mut dx = vec![f64::NAN; n];
        for i in 0..n {
            if smooth_tr[i].is_nan()
                || smooth_plus[i].is_nan()
                || smooth_minus[i].is_nan()
                || smooth_tr[i] == 0.0
            {
                continue;
            }
            plus_di[i] = 100.0 * smooth_plus[i] / smooth_tr[i];
            minus_di[i] = 100.0 * smooth_minus[i] / smooth_tr[i];
            let di_sum = plus_di[i] + minus_di[i];
            dx[i] = if di_sum == 0.0 {
                0.0
            } else {
                100.0 * (plus_di[i] - minus_di[i]).abs() / di_sum
            };
        }

        let adx = wilder_smooth(&dx, self.period);

        Ok(vec![
            Column::from_f64("adx", adx),
            Column::from_f64("adx_plus_di", plus_di),
            Column::from_f64("adx_minus_di", minus_di),
        ])
    }
}
