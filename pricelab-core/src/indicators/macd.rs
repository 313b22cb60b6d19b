//! Moving Average Convergence Divergence.
//!
//! - Line: EMA(close, fast) - EMA(close, slow)
//! - Signal: EMA(line, signal)
//! - Histogram: line - signal
//!
//! All EMAs are span-based and seeded with the first value, so every output
//! starts at row 0.
//! Output: `macd_line|signal|histogram`.

use super::series::ema;
use super::{input, Indicator, IndicatorError};
use crate::domain::{Column, TimeSeriesTable, CLOSE};

#[derive(Debug, Clone)]
pub struct Macd {
    column: String,
    fast: usize,
    slow: usize,
    signal: usize,
    name: String,
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Self {
        assert!(fast >= 1, "MACD fast period must be >= 1");
        assert!(slow > fast, "MACD slow period must be > fast period");
        assert!(signal >= 1, "MACD signal period must be >= 1");
        Self {
            column: CLOSE.to_string(),
            fast,
            slow,
            signal,
            name: format!("macd_{fast}_{slow}_{signal}"),
        }
    }

    /// Default parameters: 12, 26, 9
    pub fn default_params() -> Self {
        Self::new(12, 26, 9)
    }

    pub fn on(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }
}

impl Indicator for Macd {
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
        let x = input(table, &self.name, &self.column)?;
        let fast = ema(&x, self.fast);
        let slow = ema(&x, self.slow);
        let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        let signal = ema(&line, self.signal);
        let histogram = line.iter().zip(&signal).map(|(l, s)| l - s).collect();

        Ok(vec![
            Column::from_f64("macd_line", line),
            Column::from_f64("macd_signal", signal),
            Column::from_f64("macd_histogram", histogram),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_table, output, DEFAULT_EPSILON};

    #[test]
    fn flat_series_is_zero() {
        let out = Macd::default_params().compute(&make_table(&[50.0; 40])).unwrap();
        for name in ["macd_line", "macd_signal", "macd_histogram"] {
            assert!(output(&out, name).iter().all(|v| v.abs() < DEFAULT_EPSILON));
        }
    }

    #[test]
    fn histogram_is_line_minus_signal() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0).collect();
        let out = Macd::default_params().compute(&make_table(&closes)).unwrap();
        let (line, signal, hist) = (
            output(&out, "macd_line"),
            output(&out, "macd_signal"),
            output(&out, "macd_histogram"),
        );
        for i in 0..60 {
            assert_approx(hist[i], line[i] - signal[i], DEFAULT_EPSILON);
        }
    }

    #[test]
    fn rising_prices_have_positive_line() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let line = output(&Macd::default_params().compute(&make_table(&closes)).unwrap(), "macd_line");
        assert_approx(line[0], 0.0, DEFAULT_EPSILON);
        assert!(line[1..].iter().all(|v| *v > 0.0));
    }

    #[test]
    #[should_panic(expected = "MACD slow period must be > fast period")]
    fn rejects_inverted_periods() {
        Macd::new(26, 12, 9);
    }
}
