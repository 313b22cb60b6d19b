//! Financial statement tables: line items down, reporting periods across.

use super::table::TableError;
use super::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which statement a table holds. Only used for labelling reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementKind {
    Income,
    Balance,
    #[serde(alias = "cash_flow")]
    CashFlow,
}

/// Statement kind text that is not one of `income`, `balance`, `cashflow`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported statement kind: {0} (expected income, balance or cashflow)")]
pub struct UnsupportedStatementKind(pub String);

impl FromStr for StatementKind {
    type Err = UnsupportedStatementKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(StatementKind::Income),
            "balance" => Ok(StatementKind::Balance),
            "cashflow" | "cash_flow" => Ok(StatementKind::CashFlow),
            other => Err(UnsupportedStatementKind(other.to_string())),
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StatementKind::Income => "income",
            StatementKind::Balance => "balance",
            StatementKind::CashFlow => "cashflow",
        };
        f.write_str(s)
    }
}

/// A row-major grid of statement cells.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StatementTable {
    line_items: Vec<String>,
    periods: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl StatementTable {
    pub fn new(
        line_items: Vec<String>,
        periods: Vec<String>,
        rows: Vec<Vec<Value>>,
    ) -> Result<Self, TableError> {
        if rows.len() != line_items.len() {
            return Err(TableError::LengthMismatch {
                column: "line items".into(),
                expected: line_items.len(),
                actual: rows.len(),
            });
        }
        for (item, row) in line_items.iter().zip(&rows) {
            if row.len() != periods.len() {
                return Err(TableError::LengthMismatch {
                    column: item.clone(),
                    expected: periods.len(),
                    actual: row.len(),
                });
            }
        }
        Ok(Self {
            line_items,
            periods,
            rows,
        })
    }

    pub fn line_items(&self) -> &[String] {
        &self.line_items
    }

    pub fn periods(&self) -> &[String] {
        &self.periods
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// `(line items, periods)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.line_items.len(), self.periods.len())
    }

    /// Cells for a line item, by exact label.
    pub fn row(&self, line_item: &str) -> Option<&[Value]> {
        self.line_items
            .iter()
            .position(|l| l == line_item)
            .map(|i| self.rows[i].as_slice())
    }

    pub fn get(&self, line_item: &str, period: &str) -> Option<&Value> {
        let col = self.periods.iter().position(|p| p == period)?;
        self.row(line_item).map(|r| &r[col])
    }

    pub fn null_count(&self) -> usize {
        self.rows.iter().flatten().filter(|v| v.is_null()).count()
    }

    pub(crate) fn into_parts(self) -> (Vec<String>, Vec<String>, Vec<Vec<Value>>) {
        (self.line_items, self.periods, self.rows)
    }

    pub(crate) fn from_parts_unchecked(
        line_items: Vec<String>,
        periods: Vec<String>,
        rows: Vec<Vec<Value>>,
    ) -> Self {
        Self {
            line_items,
            periods,
            rows,
        }
    }
}
