//! Fundamental records: flat metric name → scalar maps.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A cleaned fundamental metric.
///
/// `Absent` is the explicit marker for missing data; cleaned records never
/// drop a key just because its value was missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FundamentalValue {
    Absent,
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl FundamentalValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FundamentalValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, FundamentalValue::Absent)
    }
}

/// Cleaned record. `BTreeMap` keeps key order deterministic for output.
pub type FundamentalRecord = BTreeMap<String, FundamentalValue>;
