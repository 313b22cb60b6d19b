//! Row index labels and timestamp coercion.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A row label.
///
/// Raw tables usually arrive with text labels; cleaning coerces them to
/// timestamps. Ordering is total: all naive timestamps sort before zoned ones,
/// which sort before text labels. Zoned timestamps compare by instant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IndexValue {
    Naive(NaiveDateTime),
    Zoned(DateTime<FixedOffset>),
    Text(String),
}

impl IndexValue {
    pub fn is_temporal(&self) -> bool {
        !matches!(self, IndexValue::Text(_))
    }

    pub fn is_zoned(&self) -> bool {
        matches!(self, IndexValue::Zoned(_))
    }

    /// Wall-clock timestamp with any offset dropped.
    pub fn naive(&self) -> Option<NaiveDateTime> {
        match self {
            IndexValue::Naive(ts) => Some(*ts),
            IndexValue::Zoned(ts) => Some(ts.naive_local()),
            IndexValue::Text(_) => None,
        }
    }

    /// Seconds since the Unix epoch (by instant for zoned values).
    pub fn epoch_seconds(&self) -> Option<f64> {
        match self {
            IndexValue::Naive(ts) => Some(ts.and_utc().timestamp_millis() as f64 / 1000.0),
            IndexValue::Zoned(ts) => Some(ts.timestamp_millis() as f64 / 1000.0),
            IndexValue::Text(_) => None,
        }
    }

    /// Drop the offset, keeping local wall time.
    pub fn strip_timezone(&self) -> IndexValue {
        match self {
            IndexValue::Zoned(ts) => IndexValue::Naive(ts.naive_local()),
            other => other.clone(),
        }
    }

    /// Coerce a text label into a timestamp. Temporal labels pass through.
    pub fn to_timestamp(&self) -> Option<IndexValue> {
        match self {
            IndexValue::Text(raw) => parse_timestamp(raw),
            other => Some(other.clone()),
        }
    }
}

impl From<NaiveDate> for IndexValue {
    fn from(date: NaiveDate) -> Self {
        IndexValue::Naive(date.and_time(NaiveTime::MIN))
    }
}

impl From<NaiveDateTime> for IndexValue {
    fn from(ts: NaiveDateTime) -> Self {
        IndexValue::Naive(ts)
    }
}

impl From<DateTime<FixedOffset>> for IndexValue {
    fn from(ts: DateTime<FixedOffset>) -> Self {
        IndexValue::Zoned(ts)
    }
}

impl From<&str> for IndexValue {
    fn from(label: &str) -> Self {
        IndexValue::Text(label.to_string())
    }
}

impl From<String> for IndexValue {
    fn from(label: String) -> Self {
        IndexValue::Text(label)
    }
}

impl fmt::Display for IndexValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexValue::Naive(ts) if ts.time() == NaiveTime::MIN => {
                write!(f, "{}", ts.format("%Y-%m-%d"))
            }
            IndexValue::Naive(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S")),
            IndexValue::Zoned(ts) => write!(f, "{}", ts.to_rfc3339()),
            IndexValue::Text(label) => f.write_str(label),
        }
    }
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const ZONED_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%d %H:%M:%S%z"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parse a date-like label.
///
/// Accepts RFC 3339, ISO-like date-times with or without an offset, and plain
/// dates. Returns `None` when nothing matches.
pub fn parse_timestamp(raw: &str) -> Option<IndexValue> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(IndexValue::Zoned(ts));
    }
    for fmt in ZONED_FORMATS {
        if let Ok(ts) = DateTime::parse_from_str(s, fmt) {
            return Some(IndexValue::Zoned(ts));
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(IndexValue::Naive(ts));
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date.into());
        }
    }
    None
}

/// Coerce every label of an index to a timestamp.
///
/// All-or-nothing: the first label that cannot be parsed aborts the
/// conversion and is reported back.
pub fn coerce_index(index: &[IndexValue]) -> Result<Vec<IndexValue>, String> {
    index
        .iter()
        .enumerate()
        .map(|(row, label)| {
            label
                .to_timestamp()
                .ok_or_else(|| format!("row {row}: '{label}' is not a recognizable timestamp"))
        })
        .collect()
}
