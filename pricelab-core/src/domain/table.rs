//! TimeSeriesTable — the unit of data exchanged between cleaning and indicators.
//!
//! A table is an index of row labels plus an ordered list of named columns,
//! all of the same length. Every transform in this crate takes a table by
//! reference and hands back a new owned one; nothing is modified in place
//! behind the caller's back.

use super::index::IndexValue;
use super::value::Value;
use serde::{Deserialize, Serialize};

/// Errors raised when a table is structurally malformed or queried for a
/// column it does not have.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TableError {
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Column {column} has {actual} values but the index has {expected} rows")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("Duplicate column name: {0}")]
    DuplicateColumn(String),
}

/// A named column of cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    name: String,
    values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Build a float column; `NaN` entries become nulls.
    pub fn from_f64(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self::new(name, values.into_iter().map(Value::from_f64).collect())
    }

    pub fn from_bool(name: impl Into<String>, values: Vec<bool>) -> Self {
        Self::new(name, values.into_iter().map(Value::Bool).collect())
    }

    pub fn from_text<S: Into<String>>(name: impl Into<String>, values: Vec<S>) -> Self {
        Self::new(
            name,
            values.into_iter().map(|s| Value::Text(s.into())).collect(),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }

    /// Numeric view of the column with `NaN` for anything missing or unparseable.
    pub fn to_f64(&self) -> Vec<f64> {
        self.values.iter().map(Value::to_f64_or_nan).collect()
    }

    /// True when every non-null cell is a float.
    pub fn is_numeric(&self) -> bool {
        self.values.iter().all(|v| v.is_null() || v.is_float())
    }

    pub(crate) fn values_mut(&mut self) -> &mut Vec<Value> {
        &mut self.values
    }

    pub(crate) fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    fn take_rows(&self, rows: &[usize]) -> Column {
        Column {
            name: self.name.clone(),
            values: rows.iter().map(|&i| self.values[i].clone()).collect(),
        }
    }
}

/// An index-labelled table of named columns.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TimeSeriesTable {
    index: Vec<IndexValue>,
    columns: Vec<Column>,
}

impl TimeSeriesTable {
    /// Build a table, checking that every column matches the index length and
    /// that column names are unique.
    pub fn new(index: Vec<IndexValue>, columns: Vec<Column>) -> Result<Self, TableError> {
        let mut table = Self {
            index,
            columns: Vec::with_capacity(columns.len()),
        };
        for column in columns {
            if table.has_column(column.name()) {
                return Err(TableError::DuplicateColumn(column.name().to_string()));
            }
            table.check_length(&column)?;
            table.columns.push(column);
        }
        Ok(table)
    }

    pub fn index(&self) -> &[IndexValue] {
        &self.index
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name()).collect()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of columns (the index is not counted).
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.len(), self.width())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name() == name)
    }

    /// Exact-name lookup.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Lookup that falls back to a trimmed, case-insensitive match.
    pub fn resolve(&self, name: &str) -> Option<&Column> {
        self.column(name).or_else(|| {
            let wanted = name.trim();
            self.columns
                .iter()
                .find(|c| c.name().trim().eq_ignore_ascii_case(wanted))
        })
    }

    /// Cells of a column, resolved case-insensitively.
    pub fn values(&self, name: &str) -> Result<&[Value], TableError> {
        self.resolve(name)
            .map(Column::values)
            .ok_or_else(|| TableError::MissingColumn(name.to_string()))
    }

    /// Numeric series for a column with `NaN` for missing cells.
    pub fn numeric(&self, name: &str) -> Result<Vec<f64>, TableError> {
        self.resolve(name)
            .map(Column::to_f64)
            .ok_or_else(|| TableError::MissingColumn(name.to_string()))
    }

    /// True when every index label is a timestamp.
    pub fn index_is_temporal(&self) -> bool {
        self.index.iter().all(IndexValue::is_temporal)
    }

    /// Total null cells across all columns.
    pub fn null_count(&self) -> usize {
        self.columns.iter().map(Column::null_count).sum()
    }

    /// Insert a column, replacing any existing column with the same name.
    pub fn insert_column(&mut self, column: Column) -> Result<(), TableError> {
        self.check_length(&column)?;
        match self.columns.iter_mut().find(|c| c.name() == column.name()) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
        Ok(())
    }

    /// Builder-style [`TimeSeriesTable::insert_column`].
    pub fn with_column(mut self, column: Column) -> Result<Self, TableError> {
        self.insert_column(column)?;
        Ok(self)
    }

    /// Remove a column by exact name. Returns whether it existed.
    pub fn drop_column(&mut self, name: &str) -> bool {
        let before = self.columns.len();
        self.columns.retain(|c| c.name() != name);
        self.columns.len() != before
    }

    /// New table containing only the given rows, in the given order.
    pub fn take_rows(&self, rows: &[usize]) -> TimeSeriesTable {
        TimeSeriesTable {
            index: rows.iter().map(|&i| self.index[i].clone()).collect(),
            columns: self.columns.iter().map(|c| c.take_rows(rows)).collect(),
        }
    }

    /// New table without the rows flagged in `drop`.
    pub fn without_rows(&self, drop: &[bool]) -> TimeSeriesTable {
        let keep: Vec<usize> = (0..self.len())
            .filter(|&i| !drop.get(i).copied().unwrap_or(false))
            .collect();
        self.take_rows(&keep)
    }

    /// Stable sort of rows by index label.
    pub fn sorted_by_index(&self) -> TimeSeriesTable {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.sort_by(|&a, &b| self.index[a].cmp(&self.index[b]));
        self.take_rows(&order)
    }

    pub(crate) fn set_index(&mut self, index: Vec<IndexValue>) {
        debug_assert_eq!(index.len(), self.index.len());
        self.index = index;
    }

    pub(crate) fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    pub(crate) fn retain_columns(&mut self, keep: impl FnMut(&Column) -> bool) {
        self.columns.retain(keep);
    }

    fn check_length(&self, column: &Column) -> Result<(), TableError> {
        if column.len() != self.index.len() {
            return Err(TableError::LengthMismatch {
                column: column.name().to_string(),
                expected: self.index.len(),
                actual: column.len(),
            });
        }
        Ok(())
    }
}
