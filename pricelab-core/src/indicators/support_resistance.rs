//! Swing-based support and resistance levels.
//!
//! A swing high is a bar whose high equals the maximum of the centred window
//! of `2 * lookback + 1` highs; a swing low likewise for lows. Resistance is
//! the most recent swing high carried forward, support the most recent swing
//! low.
//!
//! Output: `sr_swing_high`, `sr_swing_low` (flags), `sr_resistance`,
//! `sr_support`.

use super::series::{centered_max, centered_min};
use super::{inputs, Indicator, IndicatorError};
use crate::domain::{Column, TimeSeriesTable, HIGH, LOW};

#[derive(Debug, Clone)]
pub struct SupportResistance {
    lookback: usize,
    name: String,
}

impl SupportResistance {
    pub fn new(lookback: usize) -> Self {
        assert!(lookback >= 1, "Support/resistance lookback must be >= 1");
        Self {
            lookback,
            name: format!("support_resistance_{lookback}"),
        }
    }
}

impl Default for SupportResistance {
    fn default() -> Self {
        Self::new(2)
    }
}

fn carry_forward(values: &[f64], flags: &[bool]) -> Vec<f64> {
    let mut last = f64::NAN;
    values
        .iter()
        .zip(flags)
        .map(|(&v, &flag)| {
            if flag {
                last = v;
            }
            last
        })
        .collect()
}

impl Indicator for SupportResistance {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.lookback
    }

    fn required_columns(&self) -> Vec<&str> {
        vec![HIGH, LOW]
    }

    fn compute(&self, table: &TimeSeriesTable) -> Result<Vec<Column>, IndicatorError> {
        let [high, low] = inputs(table, &self.name, [HIGH, LOW])?;
        let swing_high: Vec<bool> = centered_max(&high, self.lookback)
            .iter()
            .zip(&high)
            .map(|(m, h)| m == h)
            .collect();
        let swing_low: Vec<bool> = centered_min(&low, self.lookback)
            .iter()
            .zip(&low)
            .map(|(m, l)| m == l)
            .collect();

        let resistance = carry_forward(&high, &swing_high);
        let support = carry_forward(&low, &swing_low);
        Ok(vec![
            Column::from_bool("sr_swing_high", swing_high),
            Column::from_bool("sr_swing_low", swing_low),
            Column::from_f64("sr_resistance", resistance),
            Column::from_f64("sr_support", support),
        ])
    }
}
