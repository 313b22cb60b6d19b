//! Market and volume profiles.
//!
//! The full price range of the table is split into `bins` equal-width bins.
//! For each row a histogram is built over a trailing window of
//! `min(window, len / 2)` rows (at least one; shorter at the start):
//!
//! - Market profile: one count per close.
//! - Volume profile: typical price weighted by volume, over the high/low range.
//!
//! The Point of Control is the centre of the fullest bin (lowest on ties).
//! The Value Area grows outward from the POC one bin at a time, taking the
//! fuller neighbour, until it holds at least 70% of the window's activity.
//! Rows whose window has no activity are missing. A table whose prices never
//! move reports the first close everywhere and, for volume, a density of 1.
//!
//! Output: `{market|volume}_profile_poc|value_high|value_low`, plus
//! `volume_profile_volume_density`: share of the window's volume in the bin
//! holding the current close.

use super::{input, inputs, typical_price, Indicator, IndicatorError};
use crate::domain::{Column, TimeSeriesTable, CLOSE, HIGH, LOW, VOLUME};

pub const DEFAULT_BINS: usize = 30;
pub const DEFAULT_WINDOW: usize = 20;
const VALUE_AREA_SHARE: f64 = 0.70;

/// Equal-width price bins over `[min, max]`; the last bin is closed.
#[derive(Debug, Clone, Copy)]
struct Bins {
    min: f64,
    width: f64,
    count: usize,
}

impl Bins {
    fn over(values: &[f64], count: usize) -> Option<Self> {
        let finite = values.iter().copied().filter(|v| v.is_finite());
        let (min, max) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        if max <= min {
            return None;
        }
        Some(Self {
            min,
            width: (max - min) / count as f64,
            count,
        })
    }

    fn locate(&self, price: f64) -> Option<usize> {
        if !price.is_finite() {
            return None;
        }
        let raw = ((price - self.min) / self.width).floor();
        Some((raw.max(0.0) as usize).min(self.count - 1))
    }

    fn center(&self, bin: usize) -> f64 {
        self.min + (bin as f64 + 0.5) * self.width
    }
}

/// POC, value high and value low of one histogram, as bin indices.
fn value_area(hist: &[f64]) -> Option<(usize, usize, usize)> {
    let total: f64 = hist.iter().sum();
    if total <= 0.0 {
        return None;
    }
    let mut poc = 0;
    for (bin, &weight) in hist.iter().enumerate() {
        if weight > hist[poc] {
            poc = bin;
        }
    }

    let target = total * VALUE_AREA_SHARE;
    let (mut lo, mut hi) = (poc, poc);
    let mut covered = hist[poc];
    while covered < target {
        let below = lo.checked_sub(1).map(|b| hist[b]);
        let above = (hi + 1 < hist.len()).then(|| hist[hi + 1]);
        match (below, above) {
            (Some(b), Some(a)) if b > a => {
                lo -= 1;
                covered += b;
            }
            (_, Some(a)) => {
                hi += 1;
                covered += a;
            }
            (Some(b), None) => {
                lo -= 1;
                covered += b;
            }
            (None, None) => break,
        }
    }
    Some((poc, hi, lo))
}

fn window_size(rows: usize, cap: usize) -> usize {
    cap.min(rows / 2).max(1)
}

struct ProfileColumns {
    poc: Vec<f64>,
    value_high: Vec<f64>,
    value_low: Vec<f64>,
    density: Vec<f64>,
}

/// Rolling profile of `(price, weight)` samples. `current` is the price whose
/// bin density is reported per row.
fn rolling_profile(
    bins: Bins,
    prices: &[f64],
    weights: &[f64],
    current: &[f64],
    cap: usize,
) -> ProfileColumns {
    let n = prices.len();
    let window = window_size(n, cap);
    let mut out = ProfileColumns {
        poc: vec![f64::NAN; n],
        value_high: vec![f64::NAN; n],
        value_low: vec![f64::NAN; n],
        density: vec![f64::NAN; n],
    };

    let mut hist = vec![0.0; bins.count];
    for i in 0..n {
        hist.iter_mut().for_each(|h| *h = 0.0);
        let start = (i + 1).saturating_sub(window);
        for j in start..=i {
            if let Some(bin) = bins.locate(prices[j]) {
                if weights[j].is_finite() {
                    hist[bin] += weights[j];
                }
            }
        }

        let Some((poc, hi, lo)) = value_area(&hist) else {
            continue;
        };
        out.poc[i] = bins.center(poc);
        out.value_high[i] = bins.center(hi);
        out.value_low[i] = bins.center(lo);
        if let Some(bin) = bins.locate(current[i]) {
            let total: f64 = hist.iter().sum();
            out.density[i] = hist[bin] / total;
        }
    }
    out
}

fn constant(n: usize, value: f64) -> Vec<f64> {
    vec![value; n]
}

#[derive(Debug, Clone)]
pub struct MarketProfile {
    bins: usize,
    window: usize,
    name: String,
}

impl MarketProfile {
    pub fn new(bins: usize, window: usize) -> Self {
        assert!(bins >= 1, "Profile bins must be >= 1");
        assert!(window >= 1, "Profile window must be >= 1");
        Self {
            bins,
            window,
            name: format!("market_profile_{bins}"),
        }
    }
}

impl Default for MarketProfile {
    fn default() -> Self {
        Self::new(DEFAULT_BINS, DEFAULT_WINDOW)
    }
}

impl Indicator for MarketProfile {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn required_columns(&self) -> Vec<&str> {
        vec![CLOSE]
    }

    fn compute(&self, table: &TimeSeriesTable) -> Result<Vec<Column>, IndicatorError> {
        let close = input(table, &self.name, CLOSE)?;
        let n = close.len();
        let (poc, value_high, value_low) = match Bins::over(&close, self.bins) {
            Some(bins) => {
                let out = rolling_profile(bins, &close, &constant(n, 1.0), &close, self.window);
                (out.poc, out.value_high, out.value_low)
            }
            None => {
                let first = close.first().copied().unwrap_or(f64::NAN);
                (constant(n, first), constant(n, first), constant(n, first))
            }
        };
        Ok(vec![
            Column::from_f64("market_profile_poc", poc),
            Column::from_f64("market_profile_value_high", value_high),
            Column::from_f64("market_profile_value_low", value_low),
        ])
    }
}

#[derive(Debug, Clone)]
pub struct VolumeProfile {
    bins: usize,
    window: usize,
    name: String,
}

impl VolumeProfile {
    pub fn new(bins: usize, window: usize) -> Self {
        assert!(bins >= 1, "Profile bins must be >= 1");
        assert!(window >= 1, "Profile window must be >= 1");
        Self {
            bins,
            window,
            name: format!("volume_profile_{bins}"),
        }
    }
}

impl Default for VolumeProfile {
    fn default() -> Self {
        Self::new(DEFAULT_BINS, DEFAULT_WINDOW)
    }
}

impl Indicator for VolumeProfile {
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
        let n = close.len();
        let range: Vec<f64> = high.iter().chain(&low).copied().collect();

        let out = match Bins::over(&range, self.bins) {
            Some(bins) => {
                let tp = typical_price(&high, &low, &close);
                rolling_profile(bins, &tp, &volume, &close, self.window)
            }
            None => {
                let first = close.first().copied().unwrap_or(f64::NAN);
                ProfileColumns {
                    poc: constant(n, first),
                    value_high: constant(n, first),
                    value_low: constant(n, first),
                    density: constant(n, 1.0),
                }
            }
        };
        Ok(vec![
            Column::from_f64("volume_profile_poc", out.poc),
            Column::from_f64("volume_profile_value_high", out.value_high),
            Column::from_f64("volume_profile_value_low", out.value_low),
            Column::from_f64("volume_profile_volume_density", out.density),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_ohlcv_table, make_table, output, DEFAULT_EPSILON};

    #[test]
    fn value_area_grows_toward_fuller_side() {
        // poc = bin 2; neighbours 3 (above) and 1 (below)
        let hist = [1.0, 1.0, 10.0, 3.0, 0.0];
        // total 15, target 10.5: 10 → +3 (bin 3)
        assert_eq!(value_area(&hist), Some((2, 3, 2)));
        assert_eq!(value_area(&[0.0; 4]), None);
        assert_eq!(value_area(&[5.0]), Some((0, 0, 0)));
    }

    #[test]
    fn value_area_reaches_seventy_percent() {
        let hist = [2.0, 2.0, 2.0, 2.0, 2.0];
        let (_, hi, lo) = value_area(&hist).unwrap();
        let covered: f64 = hist[lo..=hi].iter().sum();
        assert!(covered >= 7.0);
    }

    #[test]
    fn flat_prices_report_first_close() {
        let table = make_ohlcv_table(&[(5.0, 5.0, 5.0, 5.0, 10.0); 6]);
        let market = MarketProfile::default().compute(&table).unwrap();
        assert!(output(&market, "market_profile_poc").iter().all(|v| *v == 5.0));
        let volume = VolumeProfile::default().compute(&table).unwrap();
        assert!(output(&volume, "volume_profile_value_low").iter().all(|v| *v == 5.0));
        assert!(output(&volume, "volume_profile_volume_density")
            .iter()
            .all(|v| *v == 1.0));
    }

    #[test]
    fn poc_tracks_the_crowded_price() {
        let mut closes = vec![100.0; 30];
        closes[0] = 90.0;
        closes[1] = 110.0;
        let table = make_table(&closes);
        let poc = output(&MarketProfile::new(10, 20).compute(&table).unwrap(), "market_profile_poc");
        // range 90..110 in 10 bins of width 2; 100 falls in bin 5 → centre 101
        assert_approx(poc[29], 101.0, DEFAULT_EPSILON);
    }

    #[test]
    fn density_is_share_of_window_volume() {
        let table = make_ohlcv_table(&[
            (10.0, 10.0, 10.0, 10.0, 100.0),
            (20.0, 20.0, 20.0, 20.0, 300.0),
            (10.0, 10.0, 10.0, 10.0, 100.0),
            (20.0, 20.0, 20.0, 20.0, 300.0),
        ]);
        let out = VolumeProfile::new(2, 20).compute(&table).unwrap();
        // window = min(20, 4 / 2) = 2 rows
        let density = output(&out, "volume_profile_volume_density");
        assert_approx(density[0], 1.0, DEFAULT_EPSILON);
        assert_approx(density[1], 0.75, DEFAULT_EPSILON);
        assert_approx(density[2], 0.25, DEFAULT_EPSILON);
        assert_approx(output(&out, "volume_profile_poc")[3], 17.5, DEFAULT_EPSILON);
    }
}
