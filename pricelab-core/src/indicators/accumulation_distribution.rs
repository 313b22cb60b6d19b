//! Accumulation/Distribution line.
//!
//! multiplier = ((close - low) - (high - close)) / (high - low), 0 when the
//! bar has no range; A/D = running sum of multiplier * volume.
//! Output: `ad`.

use super::{inputs, Indicator, IndicatorError};
use crate::domain::{Column, TimeSeriesTable, CLOSE, HIGH, LOW, VOLUME};

#[derive(Debug, Clone, Default)]
pub struct AccumulationDistribution;

impl Indicator for AccumulationDistribution {
    fn name(&self) -> &str {
        "ad"
    }

    fn lookback(&self) -> usize {
        0
    }

    fn required_columns(&self) -> Vec<&str> {
        vec![HIGH, LOW, CLOSE, VOLUME]
    }

    fn compute(&self, table: &TimeSeriesTable) -> Result<Vec<Column>, IndicatorError> {
        let [high, low, close, volume] = inputs(table, self.name(), [HIGH, LOW, CLOSE, VOLUME])?;
        let mut total = 0.0;
        let ad = (0..high.len())
            .map(|i| {
                let range = high[i] - low[i];
                let multiplier = ((close[i] - low[i]) - (high[i] - close[i])) / range;
                let multiplier = if multiplier.is_finite() { multiplier } else { 0.0 };
                let flow = multiplier * volume[i];
                if flow.is_nan() {
                    return f64::NAN;
                }
                total += flow;
                total
            })
            .collect();
        Ok(vec![Column::from_f64("ad", ad)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_ohlcv_table, output, DEFAULT_EPSILON};

    #[test]
    fn accumulates_money_flow() {
        let table = make_ohlcv_table(&[
            (10.0, 12.0, 8.0, 12.0, 100.0), // close at high → +1
            (10.0, 12.0, 8.0, 8.0, 50.0),   // close at low → -1
            (10.0, 10.0, 10.0, 10.0, 70.0), // no range → 0
            (10.0, 12.0, 8.0, 11.0, 40.0),  // (3 - 1) / 4 = 0.5
        ]);
        let ad = output(&AccumulationDistribution.compute(&table).unwrap(), "ad");
        assert_approx(ad[0], 100.0, DEFAULT_EPSILON);
        assert_approx(ad[1], 50.0, DEFAULT_EPSILON);
        assert_approx(ad[2], 50.0, DEFAULT_EPSILON);
        assert_approx(ad[3], 70.0, DEFAULT_EPSILON);
    }
}
