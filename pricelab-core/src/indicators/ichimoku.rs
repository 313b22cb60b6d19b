//! Ichimoku Kinko Hyo.
//!
//! Midpoints are (rolling max high + rolling min low) / 2 over partial
//! windows:
//! - Tenkan-sen: midpoint over `tenkan` bars (default 9)
//! - Kijun-sen: midpoint over `kijun` bars (default 26)
//! - Senkou A: (tenkan + kijun) / 2, displaced `displacement` bars later
//! - Senkou B: midpoint over `senkou_b` bars (default 52), displaced likewise
//! - Chikou: close taken from `displacement` bars ahead (forward-looking)
//! - Cloud top/bottom: max/min of the two displaced spans
//!
//! Output: `ichimoku_tenkan|kijun|senkou_a|senkou_b|chikou|cloud_top|cloud_bottom`.

use super::series::{rolling_max, rolling_min, shift};
use super::{inputs, Indicator, IndicatorError};
use crate::domain::{Column, TimeSeriesTable, CLOSE, HIGH, LOW};

#[derive(Debug, Clone)]
pub struct Ichimoku {
    tenkan: usize,
    kijun: usize,
    senkou_b: usize,
    displacement: usize,
    name: String,
}

impl Ichimoku {
    pub fn new(tenkan: usize, kijun: usize, senkou_b: usize, displacement: usize) -> Self {
        assert!(tenkan >= 1, "Tenkan period must be >= 1");
        assert!(kijun >= 1, "Kijun period must be >= 1");
        assert!(senkou_b >= 1, "Senkou B period must be >= 1");
        Self {
            tenkan,
            kijun,
            senkou_b,
            displacement,
            name: format!("ichimoku_{tenkan}_{kijun}_{senkou_b}"),
        }
    }

    /// Default parameters: 9, 26, 52, 26
    pub fn default_params() -> Self {
        Self::new(9, 26, 52, 26)
    }
}

fn midpoint(high: &[f64], low: &[f64], window: usize) -> Vec<f64> {
    rolling_max(high, window, 1)
        .iter()
        .zip(rolling_min(low, window, 1))
        .map(|(h, l)| (h + l) / 2.0)
        .collect()
}

/// Element-wise reduction that ignores a NaN on one side.
fn pairwise(a: &[f64], b: &[f64], pick: fn(f64, f64) -> f64) -> Vec<f64> {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| match (x.is_nan(), y.is_nan()) {
            (true, true) => f64::NAN,
            (true, false) => y,
            (false, true) => x,
            (false, false) => pick(x, y),
        })
        .collect()
}

impl Indicator for Ichimoku {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.displacement
    }

    fn required_columns(&self) -> Vec<&str> {
        vec![HIGH, LOW, CLOSE]
    }

    fn compute(&self, table: &TimeSeriesTable) -> Result<Vec<Column>, IndicatorError> {
        let [high, low, close] = inputs(table, &self.name, [HIGH, LOW, CLOSE])?;
        let lag = self.displacement as isize;

        let tenkan = midpoint(&high, &low, self.tenkan);
        let kijun = midpoint(&high, &low, self.kijun);
        let span_a: Vec<f64> = tenkan.iter().zip(&kijun).map(|(t, k)| (t + k) / 2.0).collect();
        let senkou_a = shift(&span_a, lag);
        let senkou_b = shift(&midpoint(&high, &low, self.senkou_b), lag);
        let chikou = shift(&close, -lag);
        let cloud_top = pairwise(&senkou_a, &senkou_b, f64::max);
        let cloud_bottom = pairwise(&senkou_a, &senkou_b, f64::min);

        Ok(vec![
            Column::from_f64("ichimoku_tenkan", tenkan),
            Column::from_f64("ichimoku_kijun", kijun),
            Column::from_f64("ichimoku_senkou_a", senkou_a),
            Column::from_f64("ichimoku_senkou_b", senkou_b),
            Column::from_f64("ichimoku_chikou", chikou),
            Column::from_f64("ichimoku_cloud_top", cloud_top),
            Column::from_f64("ichimoku_cloud_bottom", cloud_bottom),
        ])
    }
}
