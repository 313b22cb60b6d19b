//! Supertrend — ATR-based directional indicator.
//!
//! Inherently sequential/stateful: direction flips between support and resistance
//! based on close vs band comparisons.
//!
//! Lookback: period (same as ATR lookback since it depends on ATR).
//!
//! Output: `supertrend`, the active band value (the lower band while trending
//! up, the upper band while trending down), and `supertrend_trend`, +1 for up
//! and -1 for down.

use super::atr::atr_series;
use super::{inputs, Indicator, IndicatorError};
use crate::domain::{Column, TimeSeriesTable, CLOSE, HIGH, LOW};

#[derive(Debug, Clone)]
pub struct Supertrend {
    period: usize,
    multiplier: f64,
    name: String,
}

impl Supertrend {
    pub fn new(period: usize, multiplier: f64) -> Self {
        assert!(period >= 1, "Supertrend period must be >= 1");
        assert!(multiplier > 0.0, "Supertrend multiplier must be > 0");
        Self {
            period,
            multiplier,
            name: format!("supertrend_{period}_{multiplier}"),
        }
    }

    /// Default parameters: 10, 3.0
    pub fn default_params() -> Self {
        Self::new(10, 3.0)
    }
}

impl Indicator for Supertrend {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn required_columns(&self) -> Vec<&str> {
        vec![HIGH, LOW, CLOSE]
    }

    fn compute(&self, table: &TimeSeriesTable) -> Result<Vec<Column>, IndicatorError> {
        let [high, low, close] = inputs(table, &self.name, [HIGH, LOW, CLOSE])?;
        let n = close.len();
        let mut band = vec![f64::NAN; n];
        let mut trend = vec![f64::NAN; n];

        let atr = atr_series(&high, &low, &close, self.period);
        let Some(start) = atr.iter().position(|v| !v.is_nan()) else {
            return Ok(outputs(band, trend));
        };

        let hl2 = (high[start] + low[start]) / 2.0;
        let mut upper_band = hl2 + self.multiplier * atr[start];
        let mut lower_band = hl2 - self.multiplier * atr[start];
        let mut trending_up = true;
        band[start] = lower_band;
        trend[start] = 1.0;

        for i in (start + 1)..n {
            if atr[i].is_nan() || close[i].is_nan() || high[i].is_nan() || low[i].is_nan() {
                continue;
            }

            let hl2 = (high[i] + low[i]) / 2.0;
            let basic_upper = hl2 + self.multiplier * atr[i];
            let basic_lower = hl2 - self.multiplier * atr[i];

            // Upper band only tightens while price stays below it
            let prev_close = close[i - 1];
            upper_band = if !prev_close.is_nan() && prev_close <= upper_band {
                basic_upper.min(upper_band)
            } else {
                basic_upper
            };
            lower_band = if !prev_close.is_nan() && prev_close >= lower_band {
                basic_lower.max(lower_band)
            } else {
                basic_lower
            };

            if trending_up && close[i] < lower_band {
                trending_up = false;
            } else if !trending_up && close[i] > upper_band {
                trending_up = true;
            }

            band[i] = if trending_up { lower_band } else { upper_band };
            trend[i] = if trending_up { 1.0 } else { -1.0 };
        }

        Ok(outputs(band, trend))
    }
}

fn outputs(band: Vec<f64>, trend: Vec<f64>) -> Vec<Column> {
    vec![
        Column::from_f64("supertrend", band),
        Column::from_f64("supertrend_trend", trend),
    ]
}
