//! Clean-then-analyze pipeline.
//!
//! A `Pipeline` owns a `DataCleaner` and an ordered list of indicators built
//! from a `PipelineConfig`:
//!
//! ```toml
//! [cleaner]
//! fill_method = "interpolate"
//!
//! [[indicators]]
//! kind = "rsi"
//! params = { period = 14 }
//!
//! [[indicators]]
//! kind = "sma_series"
//! periods = [10, 50]
//! ```

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cleaning::{
    CleanerConfig, CleaningError, CleaningObserver, CleaningReport, ConfigError, DataCleaner,
};
use crate::domain::TimeSeriesTable;
use crate::indicators::{create_indicator, FactoryError, Indicator, IndicatorConfig, IndicatorError};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Failed to read pipeline config: {0}")]
    Read(String),

    #[error("Failed to parse pipeline config: {0}")]
    Parse(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("indicator #{position}: {source}")]
    Factory {
        position: usize,
        #[source]
        source: FactoryError,
    },

    #[error(transparent)]
    Cleaning(#[from] CleaningError),

    #[error(transparent)]
    Indicator(#[from] IndicatorError),
}

/// Serializable pipeline description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub cleaner: CleanerConfig,
    pub indicators: Vec<IndicatorConfig>,
}

impl PipelineConfig {
    /// Load a pipeline from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, PipelineError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::Read(format!("{}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    /// Parse a pipeline from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, PipelineError> {
        let config: Self =
            toml::from_str(content).map_err(|e| PipelineError::Parse(e.to_string()))?;
        config.cleaner.validate()?;
        Ok(config)
    }
}

/// Result of one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub table: TimeSeriesTable,
    pub report: CleaningReport,
    /// Names of the indicators applied, in order.
    pub indicators: Vec<String>,
}

pub struct Pipeline {
    cleaner: DataCleaner,
    indicators: Vec<Box<dyn Indicator>>,
}

impl Pipeline {
    pub fn new(cleaner: DataCleaner, indicators: Vec<Box<dyn Indicator>>) -> Self {
        Self {
            cleaner,
            indicators,
        }
    }

    /// Build the cleaner and every indicator; the first bad entry aborts.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, PipelineError> {
        let cleaner = DataCleaner::new(config.cleaner.clone())?;
        let indicators = config
            .indicators
            .iter()
            .enumerate()
            .map(|(position, ic)| {
                create_indicator(ic).map_err(|source| PipelineError::Factory { position, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(cleaner, indicators))
    }

    pub fn with_observer(mut self, observer: Arc<dyn CleaningObserver>) -> Self {
        self.cleaner = self.cleaner.with_observer(observer);
        self
    }

    pub fn cleaner(&self) -> &DataCleaner {
        &self.cleaner
    }

    pub fn indicator_names(&self) -> Vec<String> {
        self.indicators.iter().map(|i| i.name().to_string()).collect()
    }

    /// Clean `table`, then apply every indicator in order.
    pub fn run(
        &self,
        table: &TimeSeriesTable,
        symbol: Option<&str>,
    ) -> Result<PipelineOutput, PipelineError> {
        let (mut table, report) = self.cleaner.clean_price_series(table, symbol)?;
        for indicator in &self.indicators {
            table = indicator.apply(&table)?;
            tracing::debug!(indicator = indicator.name(), columns = table.width(), "applied indicator");
        }
        Ok(PipelineOutput {
            table,
            report,
            indicators: self.indicator_names(),
        })
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("cleaner", &self.cleaner)
            .field("indicators", &self.indicator_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaning::{FillMethod, NullObserver};
    use crate::indicators::make_table;

    const CONFIG: &str = r#"
        [cleaner]
        fill_method = "interpolate"

        [[indicators]]
        kind = "sma"
        params = { period = 3 }

        [[indicators]]
        kind = "ema_series"
        periods = [2, 4]
    "#;

    #[test]
    fn parses_cleaner_and_indicators() {
        let config = PipelineConfig::from_toml(CONFIG).unwrap();
        assert_eq!(config.cleaner.fill_method, FillMethod::Interpolate);
        assert_eq!(config.indicators.len(), 2);
        assert_eq!(config.indicators[1].periods, Some(vec![2, 4]));
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = PipelineConfig::from_toml("").unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn rejects_unknown_sections() {
        assert!(matches!(
            PipelineConfig::from_toml("[reporting]\nformat = 'json'"),
            Err(PipelineError::Parse(_))
        ));
    }

    #[test]
    fn bad_indicator_reports_position() {
        let mut config = PipelineConfig::from_toml(CONFIG).unwrap();
        config.indicators.push(IndicatorConfig::new("nope"));
        match Pipeline::from_config(&config) {
            Err(PipelineError::Factory { position, source }) => {
                assert_eq!(position, 2);
                assert_eq!(source, FactoryError::UnknownIndicator("nope".into()));
            }
            other => panic!("expected factory error, got {other:?}"),
        }
    }

    #[test]
    fn run_cleans_then_applies_in_order() {
        let pipeline = Pipeline::from_config(&PipelineConfig::from_toml(CONFIG).unwrap())
            .unwrap()
            .with_observer(Arc::new(NullObserver));
        let out = pipeline
            .run(&make_table(&[10.0, 11.0, 12.0, 13.0, 14.0]), Some("TEST"))
            .unwrap();

        assert_eq!(out.indicators, vec!["sma_3", "ema_series_2_4"]);
        for column in ["returns", "sma_3", "ema_2", "ema_4"] {
            assert!(out.table.has_column(column), "missing {column}");
        }
        assert_eq!(out.report.subject(), "price series TEST");
    }
}
