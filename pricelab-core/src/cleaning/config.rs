//! Cleaner configuration, loadable from TOML.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Policy for missing values in a price series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillMethod {
    /// Carry the last valid value forward.
    #[default]
    Forward,
    /// Pull the next valid value backward.
    Backward,
    /// Linear interpolation weighted by elapsed time.
    Interpolate,
    /// Remove rows with a missing OHLCV field.
    Drop,
}

impl FromStr for FillMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forward" | "ffill" => Ok(FillMethod::Forward),
            "backward" | "bfill" => Ok(FillMethod::Backward),
            "interpolate" => Ok(FillMethod::Interpolate),
            "drop" => Ok(FillMethod::Drop),
            other => Err(ConfigError::InvalidFillMethod(other.to_string())),
        }
    }
}

impl fmt::Display for FillMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FillMethod::Forward => "forward",
            FillMethod::Backward => "backward",
            FillMethod::Interpolate => "interpolate",
            FillMethod::Drop => "drop",
        };
        f.write_str(s)
    }
}

/// Settings fixed for the lifetime of a `DataCleaner`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CleanerConfig {
    pub fill_method: FillMethod,
    pub remove_outliers: bool,
    /// Z-score above which a price is an outlier.
    pub outlier_threshold: f64,
    pub validate_ohlc: bool,
    pub normalize_column_names: bool,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            fill_method: FillMethod::Forward,
            remove_outliers: false,
            outlier_threshold: 3.0,
            validate_ohlc: true,
            normalize_column_names: true,
        }
    }
}

impl CleanerConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(format!("{}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.outlier_threshold.is_finite() || self.outlier_threshold <= 0.0 {
            return Err(ConfigError::InvalidThreshold(self.outlier_threshold));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid fill method: {0} (expected forward, backward, interpolate or drop)")]
    InvalidFillMethod(String),

    #[error("Outlier threshold must be a positive finite number, got {0}")]
    InvalidThreshold(f64),

    #[error("Failed to read config: {0}")]
    Read(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = CleanerConfig::default();
        assert_eq!(config.fill_method, FillMethod::Forward);
        assert!(!config.remove_outliers);
        assert_eq!(config.outlier_threshold, 3.0);
        assert!(config.validate_ohlc);
        assert!(config.normalize_column_names);
    }

    #[test]
    fn parses_partial_toml() {
        let config = CleanerConfig::from_toml(
            r#"
            fill_method = "interpolate"
            remove_outliers = true
            "#,
        )
        .unwrap();
        assert_eq!(config.fill_method, FillMethod::Interpolate);
        assert!(config.remove_outliers);
        assert_eq!(config.outlier_threshold, 3.0);
    }

    #[test]
    fn rejects_unknown_fill_method() {
        let err = CleanerConfig::from_toml(r#"fill_method = "median""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        let err = "median".parse::<FillMethod>().unwrap_err();
        assert_eq!(err, ConfigError::InvalidFillMethod("median".into()));
    }

    #[test]
    fn rejects_bad_threshold() {
        let err = CleanerConfig::from_toml("outlier_threshold = -1.0").unwrap_err();
        assert_eq!(err, ConfigError::InvalidThreshold(-1.0));
    }

    #[test]
    fn fill_method_display_roundtrips() {
        for method in [
            FillMethod::Forward,
            FillMethod::Backward,
            FillMethod::Interpolate,
            FillMethod::Drop,
        ] {
            assert_eq!(method.to_string().parse::<FillMethod>().unwrap(), method);
        }
    }
}
