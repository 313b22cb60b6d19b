//! Conversion between polars `DataFrame`s and domain tables.
//!
//! Polars is only the file-format layer: frames are converted cell by cell
//! into [`Value`]s so that loosely typed supplier data (numbers stored as
//! text, mixed columns) reaches the cleaner untouched.

use std::fs;
use std::path::Path;

use polars::prelude::*;

use super::ingest::DataError;
use crate::domain::{parse_timestamp, Column as TableColumn, IndexValue, TimeSeriesTable, Value};

fn polars_err(context: &str) -> impl Fn(PolarsError) -> DataError + '_ {
    move |e| DataError::IngestFailed(format!("{context}: {e}"))
}

fn text_values(column: &Column) -> Result<Vec<Value>, DataError> {
    let text = column
        .cast(&DataType::String)
        .map_err(polars_err(column.name().as_str()))?;
    let ca = text.str().map_err(polars_err(column.name().as_str()))?;
    Ok(ca
        .into_iter()
        .map(|v| v.map_or(Value::Null, |s| Value::Text(s.to_string())))
        .collect())
}

/// Cells of one polars column.
///
/// Booleans stay booleans, text stays text, temporal columns become their
/// text rendering and everything else is read as `f64`.
pub(crate) fn column_values(column: &Column) -> Result<Vec<Value>, DataError> {
    let name = column.name().as_str();
    match column.dtype() {
        DataType::Boolean => {
            let ca = column.bool().map_err(polars_err(name))?;
            Ok(ca.into_iter().map(|v| v.map_or(Value::Null, Value::Bool)).collect())
        }
        DataType::String | DataType::Date | DataType::Datetime(..) | DataType::Time => {
            text_values(column)
        }
        _ => match column.cast(&DataType::Float64) {
            Ok(floats) => {
                let ca = floats.f64().map_err(polars_err(name))?;
                Ok(ca
                    .into_iter()
                    .map(|v| v.map_or(Value::Null, Value::from_f64))
                    .collect())
            }
            Err(_) => text_values(column),
        },
    }
}

/// Index labels from a polars column: timestamps where they parse, text
/// otherwise. Null cells come back as `None`.
fn index_values(column: &Column) -> Result<Vec<Option<IndexValue>>, DataError> {
    Ok(text_values(column)?
        .into_iter()
        .map(|cell| match cell {
            Value::Text(label) => Some(parse_timestamp(&label).unwrap_or(IndexValue::Text(label))),
            _ => None,
        })
        .collect())
}

/// Convert a frame into a table, using `index_column` (matched
/// case-insensitively) as the row index.
///
/// Rows with an empty index cell are skipped with a warning.
pub fn dataframe_to_table(df: &DataFrame, index_column: &str) -> Result<TimeSeriesTable, DataError> {
    let columns = df.get_columns();
    let index_pos = columns
        .iter()
        .position(|c| c.name().as_str() == index_column)
        .or_else(|| {
            columns
                .iter()
                .position(|c| c.name().as_str().eq_ignore_ascii_case(index_column))
        })
        .ok_or_else(|| DataError::MissingIndexColumn {
            column: index_column.to_string(),
            available: columns
                .iter()
                .map(|c| c.name().to_string())
                .collect::<Vec<_>>()
                .join(", "),
        })?;

    let labels = index_values(&columns[index_pos])?;
    let keep: Vec<bool> = labels.iter().map(Option::is_some).collect();
    let skipped = keep.iter().filter(|k| !**k).count();
    if skipped > 0 {
        tracing::warn!(
            column = %columns[index_pos].name(),
            skipped,
            "Skipped rows with an empty index value"
        );
    }
    let index: Vec<IndexValue> = labels.into_iter().flatten().collect();

    let mut table_columns = Vec::with_capacity(columns.len().saturating_sub(1));
    for (pos, column) in columns.iter().enumerate() {
        if pos == index_pos {
            continue;
        }
        let values = column_values(column)?
            .into_iter()
            .zip(&keep)
            .filter_map(|(v, k)| k.then_some(v))
            .collect();
        table_columns.push(TableColumn::new(column.name().as_str(), values));
    }
    Ok(TimeSeriesTable::new(index, table_columns)?)
}

/// Polars column for a table column: floats and booleans keep their type,
/// anything mixed is written as text.
fn to_polars_column(column: &TableColumn) -> Column {
    let name: PlSmallStr = column.name().into();
    let values = column.values();
    let present = || values.iter().filter(|v| !v.is_null());

    if present().all(|v| matches!(v, Value::Float(_))) {
        let floats: Vec<Option<f64>> = values.iter().map(Value::as_f64).collect();
        return Column::new(name, floats);
    }
    if present().all(|v| matches!(v, Value::Bool(_))) {
        let flags: Vec<Option<bool>> = values
            .iter()
            .map(|v| match v {
                Value::Bool(b) => Some(*b),
                _ => None,
            })
            .collect();
        return Column::new(name, flags);
    }
    let text: Vec<Option<String>> = values
        .iter()
        .map(|v| (!v.is_null()).then(|| v.to_string()))
        .collect();
    Column::new(name, text)
}

/// Convert a table into a frame whose first column, `index_name`, holds the
/// rendered index labels.
pub fn table_to_dataframe(table: &TimeSeriesTable, index_name: &str) -> Result<DataFrame, DataError> {
    let labels: Vec<String> = table.index().iter().map(|ix| ix.to_string()).collect();
    let mut columns = Vec::with_capacity(table.width() + 1);
    columns.push(Column::new(index_name.into(), labels));
    columns.extend(table.columns().iter().map(to_polars_column));
    DataFrame::new(columns).map_err(|e| DataError::WriteFailed(format!("dataframe creation: {e}")))
}

/// Write a table as CSV, index first.
pub fn write_csv(table: &TimeSeriesTable, path: &Path, index_name: &str) -> Result<(), DataError> {
    let mut df = table_to_dataframe(table, index_name)?;
    let mut file = fs::File::create(path)
        .map_err(|e| DataError::WriteFailed(format!("create {}: {e}", path.display())))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)
        .map_err(|e| DataError::WriteFailed(format!("write csv: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_to_table_parses_index_and_keeps_text() {
        let df = df!(
            "Date" => ["2024-01-02", "2024-01-03"],
            "Close" => [Some(1.5), None],
            "note" => ["a", "b"],
        )
        .unwrap();
        let table = dataframe_to_table(&df, "date").unwrap();

        assert!(table.index_is_temporal());
        assert_eq!(table.column_names(), vec!["Close", "note"]);
        assert_eq!(table.values("Close").unwrap(), &[Value::Float(1.5), Value::Null]);
        assert_eq!(table.values("note").unwrap()[0], Value::Text("a".into()));
    }

    #[test]
    fn unparseable_index_labels_stay_text() {
        let df = df!("date" => ["2024-01-02", "soon"], "close" => [1.0, 2.0]).unwrap();
        let table = dataframe_to_table(&df, "date").unwrap();
        assert_eq!(table.index()[1], IndexValue::Text("soon".into()));
        assert!(!table.index_is_temporal());
    }

    #[test]
    fn empty_index_cell_skips_only_that_row() {
        let df = df!(
            "date" => [Some("2024-01-02"), None, Some("2024-01-04")],
            "close" => [1.0, 2.0, 3.0],
        )
        .unwrap();
        let table = dataframe_to_table(&df, "date").unwrap();

        assert_eq!(table.len(), 2);
        assert!(table.index_is_temporal());
        assert_eq!(table.index()[1].to_string(), "2024-01-04");
        assert_eq!(table.numeric("close").unwrap(), vec![1.0, 3.0]);
    }

    #[test]
    fn missing_index_column_is_reported() {
        let df = df!("close" => [1.0]).unwrap();
        match dataframe_to_table(&df, "timestamp") {
            Err(DataError::MissingIndexColumn { column, available }) => {
                assert_eq!(column, "timestamp");
                assert_eq!(available, "close");
            }
            other => panic!("expected MissingIndexColumn, got {other:?}"),
        }
    }

    #[test]
    fn table_to_frame_types_columns() {
        let table = TimeSeriesTable::new(
            vec![IndexValue::from("x"), IndexValue::from("y")],
            vec![
                TableColumn::from_f64("close", vec![1.0, f64::NAN]),
                TableColumn::from_bool("flag", vec![true, false]),
                TableColumn::new("mixed", vec![Value::Float(1.0), Value::Text("n/a".into())]),
            ],
        )
        .unwrap();
        let df = table_to_dataframe(&table, "date").unwrap();

        assert_eq!(df.shape(), (2, 4));
        assert_eq!(df.column("close").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("close").unwrap().null_count(), 1);
        assert_eq!(df.column("flag").unwrap().dtype(), &DataType::Boolean);
        assert_eq!(df.column("mixed").unwrap().dtype(), &DataType::String);
    }
}
