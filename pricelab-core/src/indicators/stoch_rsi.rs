//! Stochastic RSI.
//!
//! raw %K[t] = 100 * (RSI[t] - min(RSI, stoch_period)) / (max - min),
//! 50 when the window is flat. %K is the `k_period` SMA of raw %K and %D is
//! the `d_period` SMA of %K (both over the values available).
//! Output: `stoch_rsi_k`, `stoch_rsi_d`.

use super::rsi::rsi_series;
use super::series::rolling_mean;
use super::{input, Indicator, IndicatorError};
use crate::domain::{Column, TimeSeriesTable, CLOSE};

#[derive(Debug, Clone)]
pub struct StochRsi {
    rsi_period: usize,
    stoch_period: usize,
    k_period: usize,
    d_period: usize,
    name: String,
}

impl StochRsi {
    pub fn new(rsi_period: usize, stoch_period: usize, k_period: usize, d_period: usize) -> Self {
        assert!(rsi_period >= 1, "StochRSI rsi_period must be >= 1");
        assert!(stoch_period >= 1, "StochRSI stoch_period must be >= 1");
        assert!(k_period >= 1, "StochRSI k_period must be >= 1");
        assert!(d_period >= 1, "StochRSI d_period must be >= 1");
        Self {
            rsi_period,
            stoch_period,
            k_period,
            d_period,
            name: format!("stoch_rsi_{rsi_period}_{stoch_period}_{k_period}_{d_period}"),
        }
    }

    /// 14 / 14 / 3 / 3.
    pub fn default_params() -> Self {
        Self::new(14, 14, 3, 3)
    }
}

fn stochastic(values: &[f64], window: usize) -> Vec<f64> {
    (0..values.len())
        .map(|i| {
            if i + 1 < window || values[i].is_nan() {
                return f64::NAN;
            }
            let slice = &values[i + 1 - window..=i];
            let valid = slice.iter().copied().filter(|v| !v.is_nan());
            let (lo, hi) = valid.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
            if hi == lo {
                50.0
            } else {
                100.0 * (values[i] - lo) / (hi - lo)
            }
        })
        .collect()
}

impl Indicator for StochRsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.rsi_period + self.stoch_period - 1
    }

    fn required_columns(&self) -> Vec<&str> {
        vec![CLOSE]
    }

    fn compute(&self, table: &TimeSeriesTable) -> Result<Vec<Column>, IndicatorError> {
        let close = input(table, &self.name, CLOSE)?;
        let rsi = rsi_series(&close, self.rsi_period);
        let raw_k = stochastic(&rsi, self.stoch_period);
        let k = rolling_mean(&raw_k, self.k_period, 1);
        let d = rolling_mean(&k, self.d_period, 1);
        Ok(vec![
            Column::from_f64("stoch_rsi_k", k),
            Column::from_f64("stoch_rsi_d", d),
        ])
    }
}
