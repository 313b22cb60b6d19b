use polars::prelude::*;
use std::path::Path;

use super::frame::{column_values, dataframe_to_table};
use crate::domain::{StatementTable, TableError, TimeSeriesTable, Value};

/// Index column looked up when none is configured.
pub const DEFAULT_INDEX_COLUMN: &str = "date";

/// Data ingestor for CSV and Parquet files
#[derive(Debug, Clone)]
pub struct DataIngestor {
    index_column: String,
}

impl DataIngestor {
    pub fn new() -> Self {
        Self {
            index_column: DEFAULT_INDEX_COLUMN.to_string(),
        }
    }

    /// Use another column (matched case-insensitively) as the row index.
    pub fn with_index_column(mut self, column: impl Into<String>) -> Self {
        self.index_column = column.into();
        self
    }

    pub fn index_column(&self) -> &str {
        &self.index_column
    }

    /// Ingest CSV file
    ///
    /// The whole file is scanned for type inference so that a stray text
    /// cell late in a numeric column turns the column into text instead of
    /// failing the read; the cleaner coerces it afterwards.
    pub fn ingest_csv(&self, path: &Path) -> Result<LazyFrame, DataError> {
        LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(None)
            .finish()
            .map_err(|e| DataError::IngestFailed(e.to_string()))
    }

    /// Ingest Parquet file
    pub fn ingest_parquet(&self, path: &Path) -> Result<LazyFrame, DataError> {
        LazyFrame::scan_parquet(path, Default::default())
            .map_err(|e| DataError::IngestFailed(e.to_string()))
    }

    fn collect(&self, path: &Path) -> Result<DataFrame, DataError> {
        let lazy = match FileFormat::of(path)? {
            FileFormat::Csv => self.ingest_csv(path)?,
            FileFormat::Parquet => self.ingest_parquet(path)?,
        };
        lazy.collect()
            .map_err(|e| DataError::IngestFailed(format!("{}: {e}", path.display())))
    }

    /// Read a price file (CSV or Parquet, by extension) into a table indexed
    /// by the configured index column.
    pub fn read_prices(&self, path: &Path) -> Result<TimeSeriesTable, DataError> {
        let df = self.collect(path)?;
        let table = dataframe_to_table(&df, &self.index_column)?;
        tracing::debug!(
            path = %path.display(),
            rows = table.len(),
            columns = table.width(),
            "loaded price table"
        );
        Ok(table)
    }

    /// Read a financial statement: the first column holds line-item labels,
    /// every other header is a reporting period.
    pub fn read_statement(&self, path: &Path) -> Result<StatementTable, DataError> {
        let df = self.collect(path)?;
        let columns = df.get_columns();
        let Some((labels, periods)) = columns.split_first() else {
            return Err(DataError::ValidationFailed(format!(
                "{}: statement file has no columns",
                path.display()
            )));
        };

        let line_items: Vec<String> = column_values(labels)?
            .into_iter()
            .map(|v| v.to_string())
            .collect();
        let period_names = periods.iter().map(|c| c.name().to_string()).collect();

        let mut rows: Vec<Vec<Value>> = vec![Vec::with_capacity(periods.len()); line_items.len()];
        for column in periods {
            for (row, cell) in rows.iter_mut().zip(column_values(column)?) {
                row.push(cell);
            }
        }
        Ok(StatementTable::new(line_items, period_names, rows)?)
    }
}

impl Default for DataIngestor {
    fn default() -> Self {
        Self::new()
    }
}

/// Supported input formats, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Parquet,
}

impl FileFormat {
    pub fn of(path: &Path) -> Result<Self, DataError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("csv") => Ok(FileFormat::Csv),
            Some("parquet") | Some("pq") => Ok(FileFormat::Parquet),
            _ => Err(DataError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("Ingest failed: {0}")]
    IngestFailed(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Unsupported file format (expected .csv or .parquet): {0}")]
    UnsupportedFormat(String),

    #[error("Index column '{column}' not found (available: {available})")]
    MissingIndexColumn { column: String, available: String },

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error(transparent)]
    Table(#[from] TableError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ingestor_defaults_to_date_index() {
        assert_eq!(DataIngestor::new().index_column(), "date");
        assert_eq!(
            DataIngestor::new().with_index_column("Timestamp").index_column(),
            "Timestamp"
        );
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(FileFormat::of(Path::new("a/b.CSV")).unwrap(), FileFormat::Csv);
        assert_eq!(FileFormat::of(Path::new("x.parquet")).unwrap(), FileFormat::Parquet);
        assert!(matches!(
            FileFormat::of(Path::new("x.xlsx")),
            Err(DataError::UnsupportedFormat(_))
        ));
    }

    // Reading real files is covered by tests/ingest_test.rs.
}
