//! Factory system — converts `IndicatorConfig` into runtime trait objects.
//!
//! Constructors assert their invariants; the factory checks every parameter
//! first so that configuration mistakes surface as `FactoryError` instead of
//! a panic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ma_series::DEFAULT_MA_PERIODS;
use super::profile::{DEFAULT_BINS, DEFAULT_WINDOW};
use super::{
    AccumulationDistribution, AdaptiveMa, Adx, Atr, Bollinger, Ema, Fractals, Hma, Ichimoku,
    Indicator, MaKind, MaSeries, Macd, MarketProfile, Mfi, ParabolicSar, PivotPoints, Rsi, Sma,
    StochRsi, SupportResistance, Supertrend, VolumeProfile, VolumeStats, Vwap, Wyckoff,
};
use crate::domain::CLOSE;

/// Serializable description of one indicator.
///
/// ```toml
/// [[indicators]]
/// kind = "bollinger"
/// column = "close"
/// params = { period = 20, multiplier = 2.0 }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct IndicatorConfig {
    #[serde(alias = "type")]
    pub kind: String,
    /// Input column for single-series indicators; defaults to `close`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    /// Period list for `sma_series` / `ema_series`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub periods: Option<Vec<usize>>,
    #[serde(default)]
    pub params: BTreeMap<String, f64>,
}

impl IndicatorConfig {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: f64) -> Self {
        self.params.insert(name.into(), value);
        self
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn with_periods(mut self, periods: Vec<usize>) -> Self {
        self.periods = Some(periods);
        self
    }
}

// ─── Error type ──────────────────────────────────────────────────────

/// Errors that can occur during indicator construction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FactoryError {
    #[error("Unknown indicator type: {0}")]
    UnknownIndicator(String),
    #[error("Invalid parameter for {indicator}: {reason}")]
    InvalidParameter { indicator: String, reason: String },
}

// ─── Helpers ─────────────────────────────────────────────────────────

fn invalid(config: &IndicatorConfig, reason: impl Into<String>) -> FactoryError {
    FactoryError::InvalidParameter {
        indicator: config.kind.clone(),
        reason: reason.into(),
    }
}

/// Extract a named f64 parameter, falling back to `default`.
fn param(config: &IndicatorConfig, name: &str, default: f64) -> Result<f64, FactoryError> {
    match config.params.get(name).copied() {
        None => Ok(default),
        Some(v) if v.is_finite() => Ok(v),
        Some(v) => Err(invalid(config, format!("{name} must be finite, got {v}"))),
    }
}

/// Extract a named whole-number parameter no smaller than `min`.
fn param_usize(
    config: &IndicatorConfig,
    name: &str,
    default: usize,
    min: usize,
) -> Result<usize, FactoryError> {
    let value = match config.params.get(name).copied() {
        None => default,
        Some(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 => v as usize,
        Some(v) => {
            return Err(invalid(
                config,
                format!("{name} must be a whole number, got {v}"),
            ))
        }
    };
    if value < min {
        return Err(invalid(config, format!("{name} must be >= {min}, got {value}")));
    }
    Ok(value)
}

fn positive(config: &IndicatorConfig, name: &str, default: f64) -> Result<f64, FactoryError> {
    let value = param(config, name, default)?;
    if value <= 0.0 {
        return Err(invalid(config, format!("{name} must be > 0, got {value}")));
    }
    Ok(value)
}

/// Kinds that read a single configurable input column.
const COLUMN_KINDS: &[&str] = &[
    "sma",
    "ema",
    "hma",
    "sma_series",
    "ema_series",
    "rsi",
    "bollinger",
    "macd",
];

fn column(config: &IndicatorConfig) -> String {
    config.column.clone().unwrap_or_else(|| CLOSE.to_string())
}

fn periods(config: &IndicatorConfig) -> Result<Vec<usize>, FactoryError> {
    let periods = config
        .periods
        .clone()
        .unwrap_or_else(|| DEFAULT_MA_PERIODS.to_vec());
    if periods.is_empty() {
        return Err(invalid(config, "periods must not be empty"));
    }
    if let Some(p) = periods.iter().find(|&&p| p == 0) {
        return Err(invalid(config, format!("periods must be >= 1, got {p}")));
    }
    Ok(periods)
}

// ─── Indicator factory ───────────────────────────────────────────────

/// Create an indicator from an `IndicatorConfig`.
pub fn create_indicator(config: &IndicatorConfig) -> Result<Box<dyn Indicator>, FactoryError> {
    let kind = config.kind.as_str();
    if config.column.is_some() && !COLUMN_KINDS.contains(&kind) {
        return Err(invalid(config, "this indicator does not take an input column"));
    }
    if config.periods.is_some() && !matches!(kind, "sma_series" | "ema_series") {
        return Err(invalid(config, "only moving-average series take a period list"));
    }

    let indicator: Box<dyn Indicator> = match kind {
        // Trend
        "sma" => Box::new(Sma::new(param_usize(config, "period", 20, 1)?).on(column(config))),
        "ema" => Box::new(Ema::new(param_usize(config, "period", 20, 1)?).on(column(config))),
        "hma" => Box::new(Hma::new(param_usize(config, "period", 20, 2)?).on(column(config))),
        "sma_series" => Box::new(MaSeries::new(MaKind::Sma, periods(config)?).on(column(config))),
        "ema_series" => Box::new(MaSeries::new(MaKind::Ema, periods(config)?).on(column(config))),

        // Momentum
        "rsi" => Box::new(Rsi::new(param_usize(config, "period", 14, 1)?).on(column(config))),
        "adx" => Box::new(Adx::new(param_usize(config, "period", 14, 1)?)),
        "stoch_rsi" => Box::new(StochRsi::new(
            param_usize(config, "rsi_period", 14, 1)?,
            param_usize(config, "stoch_period", 14, 1)?,
            param_usize(config, "k_period", 3, 1)?,
            param_usize(config, "d_period", 3, 1)?,
        )),

        // Volatility
        "atr" => Box::new(Atr::new(param_usize(config, "period", 14, 1)?)),
        "bollinger" => Box::new(
            Bollinger::new(
                param_usize(config, "period", 20, 2)?,
                positive(config, "multiplier", 2.0)?,
            )
            .on(column(config)),
        ),

        // Volume
        "volume_stats" => Box::new(VolumeStats::new(param_usize(config, "period", 20, 1)?)),
        "vwap" => Box::new(Vwap::new()),
        "mfi" => Box::new(Mfi::new(param_usize(config, "period", 14, 1)?)),
        "ad" | "accumulation_distribution" => Box::new(AccumulationDistribution),

        // Price action
        "fractals" => Box::new(Fractals::new(param_usize(config, "period", 2, 1)?)),
        "support_resistance" => {
            Box::new(SupportResistance::new(param_usize(config, "lookback", 2, 1)?))
        }
        "pivot_points" => Box::new(PivotPoints),

        // Composite
        "macd" => {
            let fast = param_usize(config, "fast_period", 12, 1)?;
            let slow = param_usize(config, "slow_period", 26, 1)?;
            let signal = param_usize(config, "signal_period", 9, 1)?;
            if slow <= fast {
                return Err(invalid(config, format!("slow_period ({slow}) must exceed fast_period ({fast})")));
            }
            Box::new(Macd::new(fast, slow, signal).on(column(config)))
        }
        "ichimoku" => Box::new(Ichimoku::new(
            param_usize(config, "tenkan_period", 9, 1)?,
            param_usize(config, "kijun_period", 26, 1)?,
            param_usize(config, "senkou_b_period", 52, 1)?,
            param_usize(config, "displacement", 26, 0)?,
        )),
        "supertrend" => Box::new(Supertrend::new(
            param_usize(config, "period", 10, 1)?,
            positive(config, "multiplier", 3.0)?,
        )),
        "adaptive_ma" => {
            let period = param_usize(config, "period", 14, 1)?;
            let fast = param_usize(config, "fast_period", 2, 1)?;
            let slow = param_usize(config, "slow_period", 30, 1)?;
            if slow < fast {
                return Err(invalid(config, format!("slow_period ({slow}) must be >= fast_period ({fast})")));
            }
            Box::new(AdaptiveMa::new(period, fast, slow))
        }

        // Experimental
        "parabolic_sar" => {
            let af_start = positive(config, "af_start", 0.02)?;
            let af_step = positive(config, "af_step", 0.02)?;
            let af_max = positive(config, "af_max", 0.20)?;
            if af_max < af_start {
                return Err(invalid(config, format!("af_max ({af_max}) must be >= af_start ({af_start})")));
            }
            Box::new(ParabolicSar::new(af_start, af_step, af_max))
        }
        "market_profile" => Box::new(MarketProfile::new(
            param_usize(config, "bins", DEFAULT_BINS, 1)?,
            param_usize(config, "window", DEFAULT_WINDOW, 1)?,
        )),
        "volume_profile" => Box::new(VolumeProfile::new(
            param_usize(config, "bins", DEFAULT_BINS, 1)?,
            param_usize(config, "window", DEFAULT_WINDOW, 1)?,
        )),
        "wyckoff" => Box::new(Wyckoff),

        other => return Err(FactoryError::UnknownIndicator(other.to_string())),
    };
    Ok(indicator)
}

/// Every kind `create_indicator` accepts.
pub const INDICATOR_KINDS: &[&str] = &[
    "sma",
    "ema",
    "hma",
    "sma_series",
    "ema_series",
    "rsi",
    "adx",
    "stoch_rsi",
    "atr",
    "bollinger",
    "volume_stats",
    "vwap",
    "mfi",
    "ad",
    "fractals",
    "support_resistance",
    "pivot_points",
    "macd",
    "ichimoku",
    "supertrend",
    "adaptive_ma",
    "parabolic_sar",
    "market_profile",
    "volume_profile",
    "wyckoff",
];

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper: build an IndicatorConfig with given kind and params.
    fn config(kind: &str, params: &[(&str, f64)]) -> IndicatorConfig {
        params
            .iter()
            .fold(IndicatorConfig::new(kind), |c, &(k, v)| c.with_param(k, v))
    }

    fn bare(kind: &str) -> IndicatorConfig {
        config(kind, &[])
    }

    // ── param / param_usize helpers ──────────────────────────────

    #[test]
    fn param_returns_value_if_present() {
        let c = config("x", &[("multiplier", 2.5)]);
        assert_eq!(param(&c, "multiplier", 1.0), Ok(2.5));
    }

    #[test]
    fn param_returns_default_if_missing() {
        assert_eq!(param(&bare("x"), "multiplier", 1.0), Ok(1.0));
    }

    #[test]
    fn param_usize_returns_value_if_present() {
        let c = config("x", &[("period", 30.0)]);
        assert_eq!(param_usize(&c, "period", 14, 1), Ok(30));
    }

    #[test]
    fn param_usize_rejects_fractions_and_negatives() {
        assert!(param_usize(&config("x", &[("period", 2.5)]), "period", 14, 1).is_err());
        assert!(param_usize(&config("x", &[("period", -3.0)]), "period", 14, 1).is_err());
        assert!(param_usize(&config("x", &[("period", 0.0)]), "period", 14, 1).is_err());
    }

    // ── Indicator factory ────────────────────────────────────────

    #[test]
    fn every_listed_kind_builds_with_defaults() {
        for kind in INDICATOR_KINDS {
            let indicator = create_indicator(&bare(kind));
            assert!(indicator.is_ok(), "{kind} failed: {:?}", indicator.err());
        }
    }

    #[test]
    fn default_names() {
        assert_eq!(create_indicator(&bare("sma")).unwrap().name(), "sma_20");
        assert_eq!(create_indicator(&bare("rsi")).unwrap().name(), "rsi_14");
        assert_eq!(create_indicator(&bare("bollinger")).unwrap().name(), "bollinger_20");
        assert_eq!(create_indicator(&bare("ad")).unwrap().name(), "ad");
        assert_eq!(
            create_indicator(&bare("ema_series")).unwrap().name(),
            "ema_series_8_18_40"
        );
    }

    #[test]
    fn params_reach_the_indicator() {
        let c = config("atr", &[("period", 7.0)]);
        assert_eq!(create_indicator(&c).unwrap().name(), "atr_7");
        let c = bare("sma_series").with_periods(vec![5, 10]);
        assert_eq!(create_indicator(&c).unwrap().name(), "sma_series_5_10");
    }

    #[test]
    fn column_is_forwarded() {
        let c = bare("sma").with_column("volume");
        assert_eq!(create_indicator(&c).unwrap().required_columns(), vec!["volume"]);
    }

    #[test]
    fn unknown_returns_error() {
        match create_indicator(&bare("bogus")) {
            Err(FactoryError::UnknownIndicator(name)) => assert_eq!(name, "bogus"),
            other => panic!("expected UnknownIndicator, got {:?}", other.map(|i| i.name().to_string())),
        }
    }

    #[test]
    fn invalid_parameters_do_not_panic() {
        let cases = [
            config("hma", &[("period", 1.0)]),
            config("bollinger", &[("period", 1.0)]),
            config("bollinger", &[("multiplier", -1.0)]),
            config("macd", &[("fast_period", 30.0)]),
            config("parabolic_sar", &[("af_max", 0.01)]),
            config("adaptive_ma", &[("fast_period", 40.0)]),
            config("supertrend", &[("multiplier", f64::NAN)]),
            bare("sma_series").with_periods(vec![]),
            bare("ema_series").with_periods(vec![3, 0]),
            bare("atr").with_column("close"),
            bare("rsi").with_periods(vec![3]),
        ];
        for c in cases {
            assert!(
                matches!(create_indicator(&c), Err(FactoryError::InvalidParameter { .. })),
                "{c:?} should be rejected"
            );
        }
    }

    #[test]
    fn deserializes_from_toml() {
        let c: IndicatorConfig = toml::from_str(
            r#"
            kind = "bollinger"
            column = "close"
            params = { period = 10, multiplier = 1.5 }
            "#,
        )
        .unwrap();
        assert_eq!(c.params.get("period"), Some(&10.0));
        assert_eq!(create_indicator(&c).unwrap().name(), "bollinger_10");
    }
}
