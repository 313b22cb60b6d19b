//! Series kernels shared by the indicators and the cleaning engine.
//!
//! Everything works on `&[f64]` with `NaN` standing in for missing values and
//! returns a new vector of the same length.

/// Trailing rolling mean over up to `window` values.
///
/// Emits a value once the window holds at least `min_periods` non-NaN values;
/// NaNs inside the window are skipped.
pub fn rolling_mean(values: &[f64], window: usize, min_periods: usize) -> Vec<f64> {
    rolling_reduce(values, window, min_periods.max(1), |xs| {
        xs.iter().sum::<f64>() / xs.len() as f64
    })
}

/// Trailing rolling sample standard deviation (n - 1 denominator).
pub fn rolling_std(values: &[f64], window: usize, min_periods: usize) -> Vec<f64> {
    rolling_reduce(values, window, min_periods.max(2), sample_std)
}

pub fn rolling_max(values: &[f64], window: usize, min_periods: usize) -> Vec<f64> {
    rolling_reduce(values, window, min_periods.max(1), |xs| {
        xs.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    })
}

pub fn rolling_min(values: &[f64], window: usize, min_periods: usize) -> Vec<f64> {
    rolling_reduce(values, window, min_periods.max(1), |xs| {
        xs.iter().copied().fold(f64::INFINITY, f64::min)
    })
}

fn rolling_reduce(
    values: &[f64],
    window: usize,
    min_periods: usize,
    reduce: impl Fn(&[f64]) -> f64,
) -> Vec<f64> {
    let window = window.max(1);
    let mut buf = Vec::with_capacity(window);
    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            buf.clear();
            buf.extend(values[start..=i].iter().copied().filter(|v| !v.is_nan()));
            if buf.len() >= min_periods {
                reduce(&buf)
            } else {
                f64::NAN
            }
        })
        .collect()
}

/// Maximum over a window centred on each row (`2 * half + 1` values).
///
/// Edges where the window does not fit, and windows containing a NaN, are NaN.
pub fn centered_max(values: &[f64], half: usize) -> Vec<f64> {
    centered_reduce(values, half, |xs| xs.iter().copied().fold(f64::NEG_INFINITY, f64::max))
}

pub fn centered_min(values: &[f64], half: usize) -> Vec<f64> {
    centered_reduce(values, half, |xs| xs.iter().copied().fold(f64::INFINITY, f64::min))
}

fn centered_reduce(values: &[f64], half: usize, reduce: impl Fn(&[f64]) -> f64) -> Vec<f64> {
    let n = values.len();
    (0..n)
        .map(|i| {
            if i < half || i + half >= n {
                return f64::NAN;
            }
            let window = &values[i - half..=i + half];
            if window.iter().any(|v| v.is_nan()) {
                f64::NAN
            } else {
                reduce(window)
            }
        })
        .collect()
}

/// Span-based exponential moving average, non-adjusted.
///
/// Alpha = 2 / (span + 1). Seeded with the first valid value; a NaN input
/// repeats the previous average.
pub fn ema(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut out = vec![f64::NAN; values.len()];
    let mut prev: Option<f64> = None;
    for (slot, &x) in out.iter_mut().zip(values) {
        let next = match (prev, x.is_nan()) {
            (None, true) => None,
            (None, false) => Some(x),
            (Some(p), true) => Some(p),
            (Some(p), false) => Some(alpha * x + (1.0 - alpha) * p),
        };
        if let Some(v) = next {
            *slot = v;
        }
        prev = next;
    }
    out
}

/// Wilder smoothing. Alpha = 1/period.
///
/// Seed: mean of the first `period` consecutive valid values, written at the
/// last index of that run. After the seed, a NaN input ends the series.
pub fn wilder_smooth(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period {
        return result;
    }

    let mut run = 0;
    let mut seed_end = None;
    for (i, v) in values.iter().enumerate() {
        if v.is_nan() {
            run = 0;
            continue;
        }
        run += 1;
        if run == period {
            seed_end = Some(i + 1);
            break;
        }
    }
    let Some(seed_end) = seed_end else {
        return result;
    };

    let seed = values[seed_end - period..seed_end].iter().sum::<f64>() / period as f64;
    result[seed_end - 1] = seed;

    let p = period as f64;
    let mut prev = seed;
    for i in seed_end..n {
        if values[i].is_nan() {
            break;
        }
        prev = (prev * (p - 1.0) + values[i]) / p;
        result[i] = prev;
    }
    result
}

/// Linearly weighted moving average (weights 1..=window, newest heaviest).
/// Needs a full window; any NaN in the window yields NaN.
pub fn wma(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let denom = (window * (window + 1)) as f64 / 2.0;
    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                return f64::NAN;
            }
            let start = i + 1 - window;
            values[start..=i]
                .iter()
                .enumerate()
                .map(|(k, v)| v * (k + 1) as f64)
                .sum::<f64>()
                / denom
        })
        .collect()
}

/// First difference: `x[t] - x[t-1]`; the first value is NaN.
pub fn diff(values: &[f64]) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    for i in 1..values.len() {
        out[i] = values[i] - values[i - 1];
    }
    out
}

/// Fractional change: `x[t] / x[t-1] - 1`. Division by zero yields NaN.
pub fn pct_change(values: &[f64]) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    for i in 1..values.len() {
        out[i] = finite_or_nan(values[i] / values[i - 1] - 1.0);
    }
    out
}

/// Shift by `periods` rows: positive moves values later (lag), negative
/// moves them earlier (lead). Vacated slots are NaN.
pub fn shift(values: &[f64], periods: isize) -> Vec<f64> {
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    for (i, slot) in out.iter_mut().enumerate() {
        let src = i as isize - periods;
        if src >= 0 && (src as usize) < n {
            *slot = values[src as usize];
        }
    }
    out
}

/// Replace ±inf with NaN.
pub fn finite_or_nan(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        f64::NAN
    }
}

fn sample_std(xs: &[f64]) -> f64 {
    let n = xs.len() as f64;
    let mean = xs.iter().sum::<f64>() / n;
    let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
    var.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn rolling_mean_min_periods_one() {
        let out = rolling_mean(&[1.0, 2.0, 3.0, 4.0], 3, 1);
        assert_eq!(out, vec![1.0, 1.5, 2.0, 3.0]);
    }

    #[test]
    fn rolling_mean_full_window() {
        let out = rolling_mean(&[1.0, 2.0, 3.0, 4.0], 3, 3);
        assert!(out[0].is_nan() && out[1].is_nan());
        assert_eq!(out[2..], [2.0, 3.0]);
    }

    #[test]
    fn rolling_mean_skips_nan() {
        let out = rolling_mean(&[1.0, f64::NAN, 3.0], 3, 1);
        assert_eq!(out[2], 2.0);
    }

    #[test]
    fn rolling_std_is_sample() {
        let out = rolling_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0], 8, 8);
        // Sample variance of this set is 32/7.
        assert_approx(out[7], (32.0f64 / 7.0).sqrt(), DEFAULT_EPSILON);
        assert!(out[6].is_nan());
    }

    #[test]
    fn rolling_std_needs_two_values() {
        let out = rolling_std(&[5.0, 6.0], 20, 1);
        assert!(out[0].is_nan());
        assert_approx(out[1], 0.5f64.sqrt(), DEFAULT_EPSILON);
    }

    #[test]
    fn centered_extremes_leave_edges_empty() {
        let out = centered_max(&[1.0, 3.0, 2.0, 5.0, 4.0], 1);
        assert!(out[0].is_nan());
        assert_eq!(out[1..4], [3.0, 5.0, 5.0]);
        assert!(out[4].is_nan());
        let out = centered_min(&[1.0, 3.0, 2.0, 5.0, 4.0], 1);
        assert_eq!(out[1..4], [1.0, 2.0, 2.0]);
    }

    #[test]
    fn ema_seeds_with_first_value() {
        let out = ema(&[10.0, 20.0, 30.0], 3);
        // alpha = 0.5
        assert_eq!(out, vec![10.0, 15.0, 22.5]);
    }

    #[test]
    fn ema_carries_through_nan() {
        let out = ema(&[f64::NAN, 10.0, f64::NAN, 20.0], 3);
        assert!(out[0].is_nan());
        assert_eq!(out[1..], [10.0, 10.0, 15.0]);
    }

    #[test]
    fn wilder_seed_and_recursion() {
        let out = wilder_smooth(&[8.0, 9.0, 6.0, 6.0], 3);
        assert!(out[1].is_nan());
        assert_approx(out[2], 23.0 / 3.0, DEFAULT_EPSILON);
        assert_approx(out[3], 64.0 / 9.0, DEFAULT_EPSILON);
    }

    #[test]
    fn wilder_skips_leading_nan() {
        let out = wilder_smooth(&[f64::NAN, 8.0, 9.0, 6.0], 3);
        assert!(out[2].is_nan());
        assert_approx(out[3], 23.0 / 3.0, DEFAULT_EPSILON);
    }

    #[test]
    fn wma_weights_newest_heaviest() {
        let out = wma(&[1.0, 2.0, 3.0], 3);
        // (1*1 + 2*2 + 3*3) / 6
        assert_approx(out[2], 14.0 / 6.0, DEFAULT_EPSILON);
        assert!(out[1].is_nan());
    }

    #[test]
    fn shift_both_directions() {
        let lag = shift(&[1.0, 2.0, 3.0], 1);
        assert!(lag[0].is_nan());
        assert_eq!(lag[1..], [1.0, 2.0]);
        let lead = shift(&[1.0, 2.0, 3.0], -2);
        assert_eq!(lead[0], 3.0);
        assert!(lead[1].is_nan() && lead[2].is_nan());
    }

    #[test]
    fn pct_change_zero_base_is_nan() {
        let out = pct_change(&[0.0, 1.0, 2.0]);
        assert!(out[1].is_nan());
        assert_eq!(out[2], 1.0);
    }
}
