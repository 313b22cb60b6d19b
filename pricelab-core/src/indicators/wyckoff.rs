//! Heuristic Wyckoff phase labels.
//!
//! Per row, from the close-to-close change, volume relative to its 20-bar
//! average, and the 14-bar average range relative to its own 20-bar average:
//!
//! | phase        | change      | volume ratio | volatility ratio |
//! |--------------|-------------|--------------|------------------|
//! | Markup       | > 1%        | > 1.2        | < 1.0            |
//! | Markdown     | < -1%       | > 1.2        | < 1.0            |
//! | Accumulation | abs < 0.5%  | > 1.1        | < 0.9            |
//! | Distribution | abs < 0.5%  | > 1.1        | < 0.9            |
//!
//! A quiet high-volume bar is Accumulation when the close sits in the lower
//! half of the 20-bar high/low range and Distribution otherwise. The first
//! 20 rows, and rows matching nothing, are Unknown.
//!
//! Output: `wyckoff_phase` (text).

use std::fmt;

use super::series::{pct_change, rolling_max, rolling_min, rolling_mean};
use super::{inputs, Indicator, IndicatorError};
use crate::domain::{Column, TimeSeriesTable, CLOSE, HIGH, LOW, VOLUME};

const WARMUP: usize = 20;
const VOLUME_WINDOW: usize = 20;
const RANGE_WINDOW: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WyckoffPhase {
    Accumulation,
    Markup,
    Distribution,
    Markdown,
    Unknown,
}

impl fmt::Display for WyckoffPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WyckoffPhase::Accumulation => "Accumulation",
            WyckoffPhase::Markup => "Markup",
            WyckoffPhase::Distribution => "Distribution",
            WyckoffPhase::Markdown => "Markdown",
            WyckoffPhase::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Wyckoff;

fn ratio(values: &[f64], averages: &[f64]) -> Vec<f64> {
    values.iter().zip(averages).map(|(v, a)| v / a).collect()
}

fn classify(change: f64, volume_ratio: f64, volatility_ratio: f64, in_lower_half: bool) -> WyckoffPhase {
    if change > 0.01 && volume_ratio > 1.2 && volatility_ratio < 1.0 {
        WyckoffPhase::Markup
    } else if change < -0.01 && volume_ratio > 1.2 && volatility_ratio < 1.0 {
        WyckoffPhase::Markdown
    } else if change.abs() < 0.005 && volume_ratio > 1.1 && volatility_ratio < 0.9 {
        if in_lower_half {
            WyckoffPhase::Accumulation
        } else {
            WyckoffPhase::Distribution
        }
    } else {
        WyckoffPhase::Unknown
    }
}

impl Indicator for Wyckoff {
    fn name(&self) -> &str {
        "wyckoff"
    }

    fn lookback(&self) -> usize {
        WARMUP
    }

    fn required_columns(&self) -> Vec<&str> {
        vec![HIGH, LOW, CLOSE, VOLUME]
    }

    fn compute(&self, table: &TimeSeriesTable) -> Result<Vec<Column>, IndicatorError> {
        let [high, low, close, volume] = inputs(table, self.name(), [HIGH, LOW, CLOSE, VOLUME])?;
        let change = pct_change(&close);
        let volume_ratio = ratio(&volume, &rolling_mean(&volume, VOLUME_WINDOW, 1));
        let range: Vec<f64> = high.iter().zip(&low).map(|(h, l)| h - l).collect();
        let volatility = rolling_mean(&range, RANGE_WINDOW, 1);
        let volatility_ratio = ratio(&volatility, &rolling_mean(&volatility, VOLUME_WINDOW, 1));
        let top = rolling_max(&high, WARMUP, 1);
        let bottom = rolling_min(&low, WARMUP, 1);

        let phases: Vec<String> = (0..close.len())
            .map(|i| {
                if i < WARMUP {
                    return WyckoffPhase::Unknown.to_string();
                }
                let midpoint = (top[i] + bottom[i]) / 2.0;
                classify(change[i], volume_ratio[i], volatility_ratio[i], close[i] <= midpoint)
                    .to_string()
            })
            .collect();

        Ok(vec![Column::from_text("wyckoff_phase", phases)])
    }
}
