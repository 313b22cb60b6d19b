//! Basic volume statistics.
//!
//! - `volume_sma_{period}`: rolling mean of volume (partial windows allowed)
//! - `volume_ratio`: volume / volume SMA
//! - `volume_change`: fractional change from the previous bar

use super::series::{finite_or_nan, pct_change, rolling_mean};
use super::{input, Indicator, IndicatorError};
use crate::domain::{Column, TimeSeriesTable, VOLUME};

#[derive(Debug, Clone)]
pub struct VolumeStats {
    period: usize,
    name: String,
}

impl VolumeStats {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "Volume SMA period must be >= 1");
        Self {
            period,
            name: format!("volume_stats_{period}"),
        }
    }
}

impl Default for VolumeStats {
    fn default() -> Self {
        Self::new(20)
    }
}

impl Indicator for VolumeStats {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn required_columns(&self) -> Vec<&str> {
        vec![VOLUME]
    }

    fn compute(&self, table: &TimeSeriesTable) -> Result<Vec<Column>, IndicatorError> {
        let volume = input(table, &self.name, VOLUME)?;
        let sma = rolling_mean(&volume, self.period, 1);
        let ratio = volume
            .iter()
            .zip(&sma)
            .map(|(v, s)| finite_or_nan(v / s))
            .collect();
        Ok(vec![
            Column::from_f64(format!("volume_sma_{}", self.period), sma),
            Column::from_f64("volume_ratio", ratio),
            Column::from_f64("volume_change", pct_change(&volume)),
        ])
    }
}
