//! Money Flow Index (MFI) — a volume-weighted RSI.
//!
//! raw money flow = typical_price * volume, split into positive and negative
//! flow by the sign of the typical price change. Both sides are Wilder
//! smoothed; MFI = 100 - 100 / (1 + positive / negative).
//! Lookback: period.
//! Output: `mfi_{period}`.

use super::series::{diff, wilder_smooth};
use super::{inputs, typical_price, Indicator, IndicatorError};
use crate::domain::{Column, TimeSeriesTable, CLOSE, HIGH, LOW, VOLUME};

#[derive(Debug, Clone)]
pub struct Mfi {
    period: usize,
    name: String,
}

impl Mfi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "MFI period must be >= 1");
        Self {
            period,
            name: format!("mfi_{period}"),
        }
    }
}

impl Indicator for Mfi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn required_columns(&self) -> Vec<&str> {
        vec![HIGH, LOW, CLOSE, VOLUME]
    }

    fn compute(&self, table: &TimeSeriesTable) -> Result<Vec<Column>, IndicatorError> {
        let [high, low, close, volume] = inputs(table, &self.name, [HIGH, LOW, CLOSE, VOLUME])?;
        let tp = typical_price(&high, &low, &close);
        let change = diff(&tp);

        let n = tp.len();
        let mut positive = vec![f64::NAN; n];
        let mut negative = vec![f64::NAN; n];
        for i in 0..n {
            let flow = tp[i] * volume[i];
            if change[i].is_nan() || flow.is_nan() {
                continue;
            }
            positive[i] = if change[i] > 0.0 { flow } else { 0.0 };
            negative[i] = if change[i] < 0.0 { flow } else { 0.0 };
        }

        let pos = wilder_smooth(&positive, self.period);
        let neg = wilder_smooth(&negative, self.period);
        let mfi = pos
            .iter()
            .zip(&neg)
            .map(|(&p, &q)| {
                if p.is_nan() || q.is_nan() {
                    f64::NAN
                } else if p == 0.0 && q == 0.0 {
                    50.0
                } else if q == 0.0 {
                    100.0
                } else {
                    100.0 - 100.0 / (1.0 + p / q)
                }
            })
            .collect();

        Ok(vec![Column::from_f64(self.name.clone(), mfi)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_ohlcv_table, make_table, output, DEFAULT_EPSILON};

    #[test]
    fn rising_prices_saturate() {
        let closes: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
        let mfi = output(&Mfi::new(3).compute(&make_table(&closes)).unwrap(), "mfi_3");
        assert!(mfi[2].is_nan());
        assert_approx(mfi[3], 100.0, DEFAULT_EPSILON);
    }

    #[test]
    fn balanced_flow() {
        // tp: 10, 12, 10 with equal volume → +120*v, -100*v
        let table = make_ohlcv_table(&[
            (10.0, 10.0, 10.0, 10.0, 1.0),
            (12.0, 12.0, 12.0, 12.0, 1.0),
            (10.0, 10.0, 10.0, 10.0, 1.0),
        ]);
        let mfi = output(&Mfi::new(2).compute(&table).unwrap(), "mfi_2");
        // pos avg = (12 + 0) / 2 = 6, neg avg = (0 + 10) / 2 = 5
        assert_approx(mfi[2], 100.0 - 100.0 / (1.0 + 6.0 / 5.0), DEFAULT_EPSILON);
    }
}
