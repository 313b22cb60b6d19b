//! Missing-value strategies, one function per `FillMethod` variant.
//!
//! Each strategy takes the table by reference and returns a new one. Nulls
//! are `Value::Null` or `Float(NaN)`; text and booleans are never treated as
//! missing.

use super::config::FillMethod;
use crate::domain::{Column, TimeSeriesTable, Value};

/// Outcome of a fill step.
#[derive(Debug, Clone)]
pub(crate) struct FillOutcome {
    pub table: TimeSeriesTable,
    /// Null cells that received a value.
    pub filled: usize,
    /// Null cells that disappeared with a dropped row.
    pub removed: usize,
    pub warning: Option<String>,
}

/// Dispatch to the strategy for `method`. `required` names the columns whose
/// nulls cause a row to be dropped under `FillMethod::Drop`.
pub(crate) fn apply(method: FillMethod, table: &TimeSeriesTable, required: &[String]) -> FillOutcome {
    match method {
        FillMethod::Forward => counted(table, forward_fill(table)),
        FillMethod::Backward => counted(table, backward_fill(table)),
        FillMethod::Interpolate => {
            let (filled, warning) = interpolate(table);
            FillOutcome {
                warning,
                ..counted(table, filled)
            }
        }
        FillMethod::Drop => {
            let (table, removed) = drop_missing(table, required);
            FillOutcome {
                table,
                filled: 0,
                removed,
                warning: None,
            }
        }
    }
}

fn counted(before: &TimeSeriesTable, after: TimeSeriesTable) -> FillOutcome {
    let filled = before.null_count().saturating_sub(after.null_count());
    FillOutcome {
        table: after,
        filled,
        removed: 0,
        warning: None,
    }
}

fn map_columns(table: &TimeSeriesTable, f: impl Fn(&[Value]) -> Vec<Value>) -> TimeSeriesTable {
    let mut out = table.clone();
    for column in out.columns_mut() {
        let filled = f(column.values());
        *column.values_mut() = filled;
    }
    out
}

/// Carry the last valid value forward. Leading nulls stay null.
pub(crate) fn forward_fill(table: &TimeSeriesTable) -> TimeSeriesTable {
    map_columns(table, |values| {
        let mut last: Option<&Value> = None;
        values
            .iter()
            .map(|v| {
                if v.is_null() {
                    last.cloned().unwrap_or(Value::Null)
                } else {
                    last = Some(v);
                    v.clone()
                }
            })
            .collect()
    })
}

/// Pull the next valid value backward. Trailing nulls stay null.
pub(crate) fn backward_fill(table: &TimeSeriesTable) -> TimeSeriesTable {
    map_columns(table, |values| {
        let mut next: Option<&Value> = None;
        let mut out: Vec<Value> = values
            .iter()
            .rev()
            .map(|v| {
                if v.is_null() {
                    next.cloned().unwrap_or(Value::Null)
                } else {
                    next = Some(v);
                    v.clone()
                }
            })
            .collect();
        out.reverse();
        out
    })
}

/// Linear interpolation of numeric columns, weighted by elapsed time.
///
/// Gaps between two valid points are interpolated; trailing gaps take the
/// last valid value and leading gaps stay null. Columns holding text are left
/// alone. Without a timestamp index, row position is used instead and a
/// warning is returned.
pub(crate) fn interpolate(table: &TimeSeriesTable) -> (TimeSeriesTable, Option<String>) {
    let times: Option<Vec<f64>> = table.index().iter().map(|ix| ix.epoch_seconds()).collect();
    let (xs, warning) = match times {
        Some(xs) => (xs, None),
        None => (
            (0..table.len()).map(|i| i as f64).collect(),
            Some("Index is not temporal; interpolated by row position".to_string()),
        ),
    };

    let mut out = table.clone();
    for column in out.columns_mut() {
        if !column.is_numeric() {
            continue;
        }
        let ys = interpolate_series(&xs, &column.to_f64());
        *column.values_mut() = ys.into_iter().map(Value::from_f64).collect();
    }
    (out, warning)
}

fn interpolate_series(xs: &[f64], ys: &[f64]) -> Vec<f64> {
    let mut out = ys.to_vec();
    let mut prev: Option<usize> = None;
    for i in 0..ys.len() {
        if ys[i].is_nan() {
            continue;
        }
        if let Some(p) = prev {
            if i > p + 1 {
                let span = xs[i] - xs[p];
                for (j, slot) in out.iter_mut().enumerate().take(i).skip(p + 1) {
                    let w = if span == 0.0 { 0.0 } else { (xs[j] - xs[p]) / span };
                    *slot = ys[p] + (ys[i] - ys[p]) * w;
                }
            }
        }
        prev = Some(i);
    }
    if let Some(p) = prev {
        for slot in out.iter_mut().skip(p + 1) {
            *slot = ys[p];
        }
    }
    out
}

/// Remove rows with a null in any of `required`. Returns the new table and
/// the number of null cells that went with those rows.
pub(crate) fn drop_missing(table: &TimeSeriesTable, required: &[String]) -> (TimeSeriesTable, usize) {
    let checked: Vec<&Column> = required.iter().filter_map(|name| table.resolve(name)).collect();
    let mut removed = 0;
    let mask: Vec<bool> = (0..table.len())
        .map(|row| {
            let nulls = checked
                .iter()
                .filter(|c| c.values()[row].is_null())
                .count();
            removed += nulls;
            nulls > 0
        })
        .collect();
    (table.without_rows(&mask), removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::IndexValue;
    use chrono::NaiveDate;

    fn day(d: u32) -> IndexValue {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap().into()
    }

    fn table(index: Vec<IndexValue>, close: Vec<f64>) -> TimeSeriesTable {
        TimeSeriesTable::new(index, vec![Column::from_f64("close", close)]).unwrap()
    }

    #[test]
    fn forward_fill_uses_prior_value() {
        let t = table(vec![day(1), day(2), day(3)], vec![f64::NAN, 10.0, f64::NAN]);
        let out = apply(FillMethod::Forward, &t, &[]);
        let close = out.table.numeric("close").unwrap();
        assert!(close[0].is_nan());
        assert_eq!(close[1..], [10.0, 10.0]);
        assert_eq!(out.filled, 1);
    }

    #[test]
    fn backward_fill_uses_later_value() {
        let t = table(vec![day(1), day(2), day(3)], vec![f64::NAN, 10.0, f64::NAN]);
        let out = apply(FillMethod::Backward, &t, &[]);
        let close = out.table.numeric("close").unwrap();
        assert_eq!(close[..2], [10.0, 10.0]);
        assert!(close[2].is_nan());
        assert_eq!(out.filled, 1);
    }

    #[test]
    fn interpolation_weights_by_elapsed_time() {
        // Jan 1 -> Jan 2 -> Jan 5: the gap at Jan 2 is one quarter of the way.
        let t = table(vec![day(1), day(2), day(5)], vec![10.0, f64::NAN, 14.0]);
        let out = apply(FillMethod::Interpolate, &t, &[]);
        let close = out.table.numeric("close").unwrap();
        assert!((close[1] - 11.0).abs() < 1e-12);
        assert_eq!(out.filled, 1);
        assert!(out.warning.is_none());
    }

    #[test]
    fn interpolation_falls_back_to_position() {
        let labels = ["a", "b", "c"].iter().map(|s| IndexValue::from(*s)).collect();
        let t = table(labels, vec![10.0, f64::NAN, 14.0]);
        let out = apply(FillMethod::Interpolate, &t, &[]);
        assert_eq!(out.table.numeric("close").unwrap()[1], 12.0);
        assert!(out.warning.is_some());
    }

    #[test]
    fn interpolation_skips_text_columns() {
        let t = TimeSeriesTable::new(
            vec![day(1), day(2)],
            vec![Column::new("note", vec![Value::from("x"), Value::Null])],
        )
        .unwrap();
        let out = apply(FillMethod::Interpolate, &t, &[]);
        assert_eq!(out.table.values("note").unwrap()[1], Value::Null);
        assert_eq!(out.filled, 0);
    }

    #[test]
    fn drop_removes_rows_with_missing_required_fields() {
        let t = TimeSeriesTable::new(
            vec![day(1), day(2), day(3)],
            vec![
                Column::from_f64("close", vec![1.0, f64::NAN, 3.0]),
                Column::from_f64("extra", vec![f64::NAN, 2.0, 3.0]),
            ],
        )
        .unwrap();
        let out = apply(FillMethod::Drop, &t, &["close".to_string()]);
        assert_eq!(out.table.len(), 2);
        assert_eq!(out.removed, 1);
        assert_eq!(out.filled, 0);
    }
}
