//! Financial statement cleaning.

use super::cleaner::{CleaningError, DataCleaner};
use super::report::CleaningReport;
use crate::domain::value::parse_number;
use crate::domain::{parse_timestamp, IndexValue, StatementKind, StatementTable, Value};

impl DataCleaner {
    /// Clean a statement table of line items × reporting periods.
    ///
    /// Missing cells become zero, numeric text is parsed, and line items that
    /// are zero in every period are removed.
    pub fn clean_financial_statement(
        &self,
        table: &StatementTable,
        kind: StatementKind,
    ) -> Result<(StatementTable, CleaningReport), CleaningError> {
        let mut report = self.start_report(format!("{kind} statement"), table.shape());
        let (mut line_items, periods, mut rows) = table.clone().into_parts();

        if self.config().normalize_column_names {
            for item in &mut line_items {
                *item = item.trim().to_lowercase();
            }
            report.transformation("normalized_line_items");
        }

        let (periods, rows_sorted) = match period_order(&periods) {
            Some(order) => {
                let periods: Vec<String> = order.iter().map(|&i| periods[i].clone()).collect();
                for row in &mut rows {
                    *row = order.iter().map(|&i| row[i].clone()).collect();
                }
                (periods, true)
            }
            None => (periods, false),
        };
        if rows_sorted {
            report.transformation("sorted_periods_descending");
        }

        let mut filled = 0;
        for cell in rows.iter_mut().flatten() {
            if cell.is_null() {
                *cell = Value::Float(0.0);
                filled += 1;
            }
        }
        report.null_values_filled = filled;
        report.transformation("filled_nulls_with_zero");

        for cell in rows.iter_mut().flatten() {
            if let Value::Text(s) = cell {
                if let Some(v) = parse_number(s) {
                    *cell = Value::Float(v);
                }
            }
        }
        report.transformation("coerced_numeric_cells");

        let before = rows.len();
        let (line_items, rows): (Vec<String>, Vec<Vec<Value>>) = line_items
            .into_iter()
            .zip(rows)
            .filter(|(_, row)| !is_all_zero(row))
            .unzip();
        let removed = before - rows.len();
        report.rows_removed = Some(removed);
        if removed > 0 {
            report.transformation("removed_empty_line_items");
        }

        let cleaned = StatementTable::from_parts_unchecked(line_items, periods, rows);
        let report = report.finish(cleaned.shape());
        Ok((cleaned, report))
    }

    /// Same as [`DataCleaner::clean_financial_statement`] with the kind given
    /// as text (`income`, `balance`, `cashflow`).
    pub fn clean_financial_statement_named(
        &self,
        table: &StatementTable,
        kind: &str,
    ) -> Result<(StatementTable, CleaningReport), CleaningError> {
        let kind: StatementKind = kind.parse()?;
        self.clean_financial_statement(table, kind)
    }
}

/// Column order putting the most recent period first, if every period label
/// is date-like. Best effort: any unparseable label keeps the input order.
fn period_order(periods: &[String]) -> Option<Vec<usize>> {
    if periods.is_empty() {
        return None;
    }
    let parsed: Vec<IndexValue> = periods
        .iter()
        .map(|p| parse_timestamp(p))
        .collect::<Option<_>>()?;
    let mut order: Vec<usize> = (0..periods.len()).collect();
    order.sort_by(|&a, &b| parsed[b].cmp(&parsed[a]));
    Some(order)
}

/// A row with no periods is not considered empty.
fn is_all_zero(row: &[Value]) -> bool {
    !row.is_empty() && row.iter().all(|v| matches!(v, Value::Float(x) if *x == 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaning::NullObserver;
    use std::sync::Arc;

    fn cleaner() -> DataCleaner {
        DataCleaner::default().with_observer(Arc::new(NullObserver))
    }

    fn statement() -> StatementTable {
        StatementTable::new(
            vec![" Total Revenue".into(), "Other Items".into(), "Net Income".into()],
            vec!["2022-12-31".into(), "2023-12-31".into()],
            vec![
                vec![Value::Float(90.0), Value::from("100")],
                vec![Value::Null, Value::Float(0.0)],
                vec![Value::Float(9.0), Value::Null],
            ],
        )
        .unwrap()
    }

    #[test]
    fn cleans_statement() {
        let (out, report) = cleaner()
            .clean_financial_statement(&statement(), StatementKind::Income)
            .unwrap();
        assert_eq!(out.line_items(), ["total revenue", "net income"]);
        assert_eq!(out.periods(), ["2023-12-31", "2022-12-31"]);
        assert_eq!(out.get("total revenue", "2023-12-31"), Some(&Value::Float(100.0)));
        assert_eq!(out.get("net income", "2023-12-31"), Some(&Value::Float(0.0)));
        assert_eq!(report.rows_removed(), 1);
        assert_eq!(report.null_values_filled(), 2);
        assert_eq!(report.subject(), "income statement");
        assert_eq!(report.final_shape(), (2, 2));
    }

    #[test]
    fn non_date_periods_keep_order() {
        let table = StatementTable::new(
            vec!["x".into()],
            vec!["FY-A".into(), "FY-B".into()],
            vec![vec![Value::Float(1.0), Value::Float(2.0)]],
        )
        .unwrap();
        let (out, report) = cleaner()
            .clean_financial_statement(&table, StatementKind::Balance)
            .unwrap();
        assert_eq!(out.periods(), ["FY-A", "FY-B"]);
        assert!(!report
            .transformations()
            .iter()
            .any(|t| t == "sorted_periods_descending"));
    }

    #[test]
    fn text_cells_survive() {
        let table = StatementTable::new(
            vec!["note".into()],
            vec!["2023".into()],
            vec![vec![Value::from("restated")]],
        )
        .unwrap();
        let (out, report) = cleaner()
            .clean_financial_statement(&table, StatementKind::CashFlow)
            .unwrap();
        assert_eq!(out.shape(), (1, 1));
        assert_eq!(report.rows_removed(), 0);
    }

    #[test]
    fn unsupported_kind_is_an_error() {
        let err = cleaner()
            .clean_financial_statement_named(&statement(), "equity")
            .unwrap_err();
        assert!(matches!(err, CleaningError::UnsupportedStatementKind(_)));
        assert!(err.to_string().contains("equity"));
    }
}
