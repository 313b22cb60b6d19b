//! Volatility-adaptive moving average.
//!
//! The EMA period shrinks toward `fast` when ATR runs above its own average
//! and stretches toward `slow` when it runs below:
//!
//! - ratio = ATR / SMA(ATR, period), clipped to [0.5, 2.0] (1.0 when undefined)
//! - effective period = slow / ratio, clipped to [fast, slow]
//! - MA[t] = a * close[t] + (1 - a) * MA[t-1], a = 2 / (effective + 1)
//!
//! Seeded with the first close. Output: `adaptive_ma`.

use super::atr::atr_series;
use super::series::rolling_mean;
use super::{inputs, Indicator, IndicatorError};
use crate::domain::{Column, TimeSeriesTable, CLOSE, HIGH, LOW};

#[derive(Debug, Clone)]
pub struct AdaptiveMa {
    period: usize,
    fast: usize,
    slow: usize,
    name: String,
}

impl AdaptiveMa {
    pub fn new(period: usize, fast: usize, slow: usize) -> Self {
        assert!(period >= 1, "Adaptive MA ATR period must be >= 1");
        assert!(fast >= 1, "Adaptive MA fast period must be >= 1");
        assert!(slow >= fast, "Adaptive MA slow period must be >= fast period");
        Self {
            period,
            fast,
            slow,
            name: format!("adaptive_ma_{period}_{fast}_{slow}"),
        }
    }

    /// Default parameters: 14, 2, 30
    pub fn default_params() -> Self {
        Self::new(14, 2, 30)
    }

    fn effective_periods(&self, atr: &[f64]) -> Vec<f64> {
        let avg = rolling_mean(atr, self.period, 1);
        atr.iter()
            .zip(&avg)
            .map(|(a, m)| {
                let ratio = a / m;
                let ratio = if ratio.is_finite() { ratio.clamp(0.5, 2.0) } else { 1.0 };
                (self.slow as f64 / ratio).clamp(self.fast as f64, self.slow as f64)
            })
            .collect()
    }
}

impl Indicator for AdaptiveMa {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn required_columns(&self) -> Vec<&str> {
        vec![HIGH, LOW, CLOSE]
    }

    fn compute(&self, table: &TimeSeriesTable) -> Result<Vec<Column>, IndicatorError> {
        let [high, low, close] = inputs(table, &self.name, [HIGH, LOW, CLOSE])?;
        let atr = atr_series(&high, &low, &close, self.period);
        let periods = self.effective_periods(&atr);

        let mut out = vec![f64::NAN; close.len()];
        let mut prev: Option<f64> = None;
        for i in 0..close.len() {
            let next = match (prev, close[i].is_nan()) {
                (None, true) => None,
                (None, false) => Some(close[i]),
                (Some(p), true) => Some(p),
                (Some(p), false) => {
                    let alpha = 2.0 / (periods[i] + 1.0);
                    Some(alpha * close[i] + (1.0 - alpha) * p)
                }
            };
            if let Some(v) = next {
                out[i] = v;
            }
            prev = next;
        }

        Ok(vec![Column::from_f64("adaptive_ma", out)])
    }
}
