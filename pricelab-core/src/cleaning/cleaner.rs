//! DataCleaner — price series cleaning pipeline.
//!
//! Data-quality problems (duplicates, broken bars, gaps, outliers) are fixed
//! and recorded in the report. Only contract violations, such as a missing
//! price column, abort a call.

use std::sync::Arc;

use super::config::{CleanerConfig, ConfigError};
use super::features::{add_price_features, strip_derived};
use super::fill;
use super::observer::{CleaningObserver, TracingObserver};
use super::report::{CleaningReport, ReportBuilder};
use super::validate::{invalid_ohlc_mask, outlier_mask};
use crate::domain::{
    coerce_index, IndexValue, TableError, TimeSeriesTable, UnsupportedStatementKind,
    OHLCV_FIELDS, PRICE_FIELDS,
};

/// Contract violations raised by the cleaning engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CleaningError {
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error(transparent)]
    UnsupportedStatementKind(#[from] UnsupportedStatementKind),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<TableError> for CleaningError {
    fn from(e: TableError) -> Self {
        match e {
            TableError::MissingColumn(c) => CleaningError::MissingColumn(c),
            other => CleaningError::MalformedInput(other.to_string()),
        }
    }
}

/// Validates and normalizes raw price, fundamental and statement data.
///
/// Configuration is fixed at construction. Every call takes its input by
/// reference and returns a new owned result plus a `CleaningReport`.
#[derive(Clone)]
pub struct DataCleaner {
    config: CleanerConfig,
    observer: Arc<dyn CleaningObserver>,
}

impl std::fmt::Debug for DataCleaner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataCleaner")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for DataCleaner {
    fn default() -> Self {
        Self {
            config: CleanerConfig::default(),
            observer: Arc::new(TracingObserver),
        }
    }
}

impl DataCleaner {
    /// Build a cleaner that reports through `tracing`.
    pub fn new(config: CleanerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            observer: Arc::new(TracingObserver),
        })
    }

    /// Replace the event sink.
    pub fn with_observer(mut self, observer: Arc<dyn CleaningObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &CleanerConfig {
        &self.config
    }

    pub(crate) fn start_report(
        &self,
        subject: impl Into<String>,
        shape: (usize, usize),
    ) -> ReportBuilder<'_> {
        ReportBuilder::start(self.observer.as_ref(), subject, shape)
    }

    /// Clean a raw OHLCV table.
    ///
    /// Requires `open`, `high`, `low` and `close` (matched case-insensitively);
    /// `volume` is optional. `symbol` only labels the report.
    pub fn clean_price_series(
        &self,
        table: &TimeSeriesTable,
        symbol: Option<&str>,
    ) -> Result<(TimeSeriesTable, CleaningReport), CleaningError> {
        for field in PRICE_FIELDS {
            if table.resolve(field).is_none() {
                return Err(CleaningError::MissingColumn(field.to_string()));
            }
        }

        let subject = match symbol {
            Some(s) => format!("price series {s}"),
            None => "price series".to_string(),
        };
        let mut report = self.start_report(subject, table.shape());
        let mut cleaned = table.clone();

        // 1. Field names
        if self.config.normalize_column_names {
            cleaned = normalize_column_names(&cleaned, &mut report);
            report.transformation("normalized_column_names");
        }

        // 2. Index to timestamps
        if !cleaned.index_is_temporal() {
            match coerce_index(cleaned.index()) {
                Ok(index) => {
                    cleaned.set_index(index);
                    report.transformation("coerced_index_to_timestamps");
                }
                Err(reason) => {
                    report.warn(format!("Could not convert index to timestamps: {reason}"));
                }
            }
        }

        // 3-4. Order and uniqueness
        cleaned = cleaned.sorted_by_index();
        report.transformation("sorted_by_timestamp");

        let (deduped, duplicates) = drop_duplicate_labels(&cleaned);
        cleaned = deduped;
        report.duplicates_removed = duplicates;
        if duplicates > 0 {
            report.transformation("removed_duplicate_timestamps");
        }

        // 5. Bar consistency
        if self.config.validate_ohlc {
            cleaned = self.drop_invalid_bars(&cleaned, &mut report)?;
        }

        // 6. Missing values
        cleaned = strip_derived(&cleaned);
        let required = present_fields(&cleaned);
        cleaned = self.fill_missing(&cleaned, &required, &mut report);

        // 7. Numeric types
        let nulls_before = numeric_nulls(&cleaned, &required);
        cleaned = coerce_fields(&cleaned, &required);
        report.transformation("coerced_numeric_fields");
        let nulls_after = numeric_nulls(&cleaned, &required);
        let unparseable = nulls_after.saturating_sub(nulls_before);
        if unparseable > 0 {
            report.warn(format!(
                "{unparseable} unparseable values in numeric fields treated as missing"
            ));
        }
        // Interpolation skips text columns, so gaps in a field that only
        // became numeric here still need a pass.
        if nulls_after > 0 {
            cleaned = self.fill_missing(&cleaned, &required, &mut report);
        }
        if self.config.validate_ohlc {
            cleaned = self.drop_invalid_bars(&cleaned, &mut report)?;
        }

        // 8. Outliers
        if self.config.remove_outliers {
            let mask = outlier_mask(&cleaned, &PRICE_FIELDS, self.config.outlier_threshold);
            let outliers = mask.iter().filter(|m| **m).count();
            if outliers > 0 {
                cleaned = cleaned.without_rows(&mask);
                report.outliers_removed = outliers;
                report.transformation("removed_outliers");
            }
        }

        // 9. Derived columns
        cleaned = add_price_features(&cleaned)?;
        report.transformation("added_price_features");

        // 10. Naive timestamps
        if cleaned.index().iter().any(IndexValue::is_zoned) {
            let index = cleaned.index().iter().map(IndexValue::strip_timezone).collect();
            cleaned.set_index(index);
            report.transformation("stripped_timezone");
            if !is_strictly_increasing(cleaned.index()) {
                let (deduped, collisions) = drop_duplicate_labels(&cleaned.sorted_by_index());
                if collisions > 0 {
                    report.warn(format!(
                        "{collisions} rows collided after removing timezone offsets"
                    ));
                    report.duplicates_removed += collisions;
                }
                // Returns depend on row order, so recompute after re-sorting.
                cleaned = add_price_features(&deduped)?;
            }
        }

        // 11. Final accounting
        let report = report.finish(cleaned.shape());
        Ok((cleaned, report))
    }

    fn drop_invalid_bars(
        &self,
        table: &TimeSeriesTable,
        report: &mut ReportBuilder<'_>,
    ) -> Result<TimeSeriesTable, CleaningError> {
        let mask = invalid_ohlc_mask(table)?;
        let invalid = mask.iter().filter(|m| **m).count();
        if invalid == 0 {
            return Ok(table.clone());
        }
        report.invalid_ohlc_rows += invalid;
        report.warn(format!(
            "Removed {invalid} rows with invalid OHLC relationships"
        ));
        report.transformation("removed_invalid_ohlc_rows");
        Ok(table.without_rows(&mask))
    }

    fn fill_missing(
        &self,
        table: &TimeSeriesTable,
        required: &[String],
        report: &mut ReportBuilder<'_>,
    ) -> TimeSeriesTable {
        let method = self.config.fill_method;
        let outcome = fill::apply(method, table, required);
        report.null_values_filled += outcome.filled;
        report.null_values_removed += outcome.removed;
        if let Some(warning) = outcome.warning {
            report.warn(warning);
        }
        report.transformation(&format!("filled_nulls_{method}"));
        outcome.table
    }
}

/// Trim and lowercase every column name. When two names collide the first
/// column wins and the later one is dropped with a warning.
fn normalize_column_names(
    table: &TimeSeriesTable,
    report: &mut ReportBuilder<'_>,
) -> TimeSeriesTable {
    let mut out = table.clone();
    let mut seen: Vec<String> = Vec::with_capacity(out.width());
    let mut keep = Vec::with_capacity(out.width());
    for column in out.columns_mut() {
        let normalized = column.name().trim().to_lowercase();
        if seen.contains(&normalized) {
            report.warn(format!(
                "Column '{}' collides with '{normalized}' after normalization; dropped",
                column.name()
            ));
            report.column_removed(column.name());
            keep.push(false);
        } else {
            column.rename(normalized.clone());
            seen.push(normalized);
            keep.push(true);
        }
    }
    let mut flags = keep.into_iter();
    out.retain_columns(|_| flags.next().unwrap_or(true));
    out
}

/// Actual names of the OHLCV fields present in the table.
fn present_fields(table: &TimeSeriesTable) -> Vec<String> {
    OHLCV_FIELDS
        .iter()
        .filter_map(|f| table.resolve(f).map(|c| c.name().to_string()))
        .collect()
}

fn numeric_nulls(table: &TimeSeriesTable, fields: &[String]) -> usize {
    fields
        .iter()
        .filter_map(|f| table.column(f))
        .map(|c| c.null_count())
        .sum()
}

fn coerce_fields(table: &TimeSeriesTable, fields: &[String]) -> TimeSeriesTable {
    let mut out = table.clone();
    for column in out.columns_mut() {
        if fields.iter().any(|f| f == column.name()) {
            let coerced = column.values().iter().map(|v| v.coerce_numeric()).collect();
            *column.values_mut() = coerced;
        }
    }
    out
}

/// Drop rows whose label equals the previous row's. Expects a sorted table,
/// so the first occurrence is kept.
fn drop_duplicate_labels(table: &TimeSeriesTable) -> (TimeSeriesTable, usize) {
    let index = table.index();
    let mask: Vec<bool> = (0..index.len())
        .map(|i| i > 0 && index[i] == index[i - 1])
        .collect();
    let count = mask.iter().filter(|m| **m).count();
    if count == 0 {
        return (table.clone(), 0);
    }
    (table.without_rows(&mask), count)
}

fn is_strictly_increasing(index: &[IndexValue]) -> bool {
    index.windows(2).all(|w| w[0] < w[1])
}
