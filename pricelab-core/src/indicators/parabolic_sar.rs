//! Parabolic SAR — Wilder's acceleration factor system.
//!
//! Inherently sequential/stateful: maintains direction, extreme point (EP),
//! and acceleration factor (AF).
//!
//! Parameters: af_start (default 0.02), af_step (default 0.02), af_max (default 0.20).
//! Lookback: 1 (needs at least 2 bars to start).
//! Output: `parabolic_sar`.

use super::{inputs, Indicator, IndicatorError};
use crate::domain::{Column, TimeSeriesTable, CLOSE, HIGH, LOW};

#[derive(Debug, Clone)]
pub struct ParabolicSar {
    af_start: f64,
    af_step: f64,
    af_max: f64,
    name: String,
}

impl ParabolicSar {
    pub fn new(af_start: f64, af_step: f64, af_max: f64) -> Self {
        assert!(af_start > 0.0, "AF start must be > 0");
        assert!(af_step > 0.0, "AF step must be > 0");
        assert!(af_max >= af_start, "AF max must be >= AF start");
        Self {
            af_start,
            af_step,
            af_max,
            name: format!("psar_{af_start}_{af_step}_{af_max}"),
        }
    }

    /// Default parameters: 0.02, 0.02, 0.20
    pub fn default_params() -> Self {
        Self::new(0.02, 0.02, 0.20)
    }

    fn series(&self, high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
        let n = high.len();
        let mut result = vec![f64::NAN; n];
        if n < 2 || high[..2].iter().chain(&low[..2]).any(|v| v.is_nan()) {
            return result;
        }

        // Initial direction from the first two closes
        let mut is_long = close[1] >= close[0];
        let mut af = self.af_start;
        let (mut sar, mut ep) = if is_long {
            (low[0], high[1])
        } else {
            (high[0], low[1])
        };
        result[1] = sar;

        for i in 2..n {
            if high[i].is_nan() || low[i].is_nan() || close[i].is_nan() {
                continue;
            }

            let mut new_sar = sar + af * (ep - sar);

            if is_long {
                // SAR must not be above the two previous lows
                for prev in [low[i - 1], low[i - 2]] {
                    if !prev.is_nan() {
                        new_sar = new_sar.min(prev);
                    }
                }
                if low[i] < new_sar {
                    is_long = false;
                    new_sar = ep;
                    ep = low[i];
                    af = self.af_start;
                } else if high[i] > ep {
                    ep = high[i];
                    af = (af + self.af_step).min(self.af_max);
                }
            } else {
                for prev in [high[i - 1], high[i - 2]] {
                    if !prev.is_nan() {
                        new_sar = new_sar.max(prev);
                    }
                }
                if high[i] > new_sar {
                    is_long = true;
                    new_sar = ep;
                    ep = high[i];
                    af = self.af_start;
                } else if low[i] < ep {
                    ep = low[i];
                    af = (af + self.af_step).min(self.af_max);
                }
            }

            sar = new_sar;
            result[i] = sar;
        }

        result
    }
}

impl Indicator for ParabolicSar {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        1
    }

    fn required_columns(&self) -> Vec<&str> {
        vec![HIGH, LOW, CLOSE]
    }

    fn compute(&self, table: &TimeSeriesTable) -> Result<Vec<Column>, IndicatorError> {
        let [high, low, close] = inputs(table, &self.name, [HIGH, LOW, CLOSE])?;
        Ok(vec![Column::from_f64(
            "parabolic_sar",
            self.series(&high, &low, &close),
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{make_ohlc_table, output};

    fn psar(table: &TimeSeriesTable, indicator: &ParabolicSar) -> Vec<f64> {
        output(&indicator.compute(table).unwrap(), "parabolic_sar")
    }

    #[test]
    fn uptrend_below_price() {
        let data: Vec<_> = (0..10)
            .map(|i| {
                let base = 100.0 + i as f64 * 3.0;
                (base, base + 2.0, base - 1.0, base + 1.5)
            })
            .collect();
        let table = make_ohlc_table(&data);
        let result = psar(&table, &ParabolicSar::default_params());
        let low = table.numeric("low").unwrap();

        for i in 2..10 {
            assert!(result[i] < low[i], "PSAR {} should be below low {} at {i}", result[i], low[i]);
        }
    }

    #[test]
    fn downtrend_above_price() {
        let data: Vec<_> = (0..10)
            .map(|i| {
                let base = 200.0 - i as f64 * 3.0;
                (base, base + 1.0, base - 2.0, base - 1.5)
            })
            .collect();
        let table = make_ohlc_table(&data);
        let result = psar(&table, &ParabolicSar::default_params());
        let high = table.numeric("high").unwrap();

        assert!((2..10).any(|i| result[i] > high[i]));
    }

    #[test]
    fn reversal_occurs() {
        let table = make_ohlc_table(&[
            (100.0, 105.0, 98.0, 103.0),
            (103.0, 108.0, 101.0, 107.0),
            (107.0, 112.0, 105.0, 111.0),
            (111.0, 115.0, 109.0, 114.0),
            // Sharp reversal
            (114.0, 114.5, 100.0, 101.0),
            (101.0, 102.0, 95.0, 96.0),
            (96.0, 97.0, 90.0, 91.0),
        ]);
        let result = psar(&table, &ParabolicSar::default_params());
        let close = table.numeric("close").unwrap();

        let mut below = false;
        let mut above_after_below = false;
        for i in 1..7 {
            if result[i] < close[i] {
                below = true;
            }
            if below && result[i] > close[i] {
                above_after_below = true;
            }
        }
        assert!(above_after_below, "PSAR should flip direction after reversal");
    }

    #[test]
    fn too_few_bars() {
        let table = make_ohlc_table(&[(100.0, 105.0, 95.0, 102.0)]);
        assert!(psar(&table, &ParabolicSar::default_params())
            .iter()
            .all(|v| v.is_nan()));
    }

    #[test]
    fn long_trend_stays_valid_with_capped_af() {
        let data: Vec<_> = (0..30)
            .map(|i| {
                let base = 100.0 + i as f64;
                (base, base + 1.0, base - 0.5, base + 0.8)
            })
            .collect();
        let result = psar(&make_ohlc_table(&data), &ParabolicSar::new(0.02, 0.02, 0.10));
        assert!(result.iter().filter(|v| !v.is_nan()).count() > 20);
    }

    #[test]
    #[should_panic(expected = "AF max must be >= AF start")]
    fn rejects_inverted_bounds() {
        ParabolicSar::new(0.2, 0.02, 0.1);
    }
}
