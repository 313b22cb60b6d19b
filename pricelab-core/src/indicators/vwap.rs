//! Volume Weighted Average Price, reset each calendar day.
//!
//! VWAP[t] = Σ(typical_price * volume) / Σ(volume) over the rows of t's
//! calendar date up to t. Requires a timestamp index.
//! Output: `vwap`.

use std::collections::HashMap;

use super::{inputs, typical_price, Indicator, IndicatorError};
use crate::domain::{Column, TimeSeriesTable, CLOSE, HIGH, LOW, VOLUME};

#[derive(Debug, Clone)]
pub struct Vwap {
    name: String,
}

impl Vwap {
    pub fn new() -> Self {
        Self {
            name: "vwap".to_string(),
        }
    }
}

impl Default for Vwap {
    fn default() -> Self {
        Self::new()
    }
}

impl Indicator for Vwap {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn required_columns(&self) -> Vec<&str> {
        vec![HIGH, LOW, CLOSE, VOLUME]
    }

    fn compute(&self, table: &TimeSeriesTable) -> Result<Vec<Column>, IndicatorError> {
        let [high, low, close, volume] = inputs(table, &self.name, [HIGH, LOW, CLOSE, VOLUME])?;
        let dates = table
            .index()
            .iter()
            .map(|ix| ix.naive().map(|ts| ts.date()))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| IndicatorError::TemporalIndexRequired {
                indicator: self.name.clone(),
            })?;

        let tp = typical_price(&high, &low, &close);
        let mut running: HashMap<_, (f64, f64)> = HashMap::new();
        let vwap = dates
            .iter()
            .enumerate()
            .map(|(i, date)| {
                let pv = tp[i] * volume[i];
                if pv.is_nan() {
                    return f64::NAN;
                }
                let (sum_pv, sum_v) = running.entry(*date).or_insert((0.0, 0.0));
                *sum_pv += pv;
                *sum_v += volume[i];
                if *sum_v == 0.0 {
                    f64::NAN
                } else {
                    *sum_pv / *sum_v
                }
            })
            .collect();

        Ok(vec![Column::from_f64("vwap", vwap)])
    }
}
