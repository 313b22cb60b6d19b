//! Cell values held by tables.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single table cell.
///
/// Raw supplier data is loosely typed: prices can arrive as text, flags as
/// booleans, and gaps as nulls. `Float(NaN)` is treated exactly like `Null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Float(f64),
    Text(String),
}

impl Value {
    /// Build a float cell, mapping `NaN` to `Null`.
    pub fn from_f64(v: f64) -> Self {
        if v.is_nan() {
            Value::Null
        } else {
            Value::Float(v)
        }
    }

    /// True for `Null` and `Float(NaN)`.
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Float(v) => v.is_nan(),
            _ => false,
        }
    }

    /// Numeric interpretation of the cell.
    ///
    /// Text is trimmed and parsed; booleans map to 1.0 / 0.0.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Null => None,
            Value::Float(v) if v.is_nan() => None,
            Value::Float(v) => Some(*v),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Text(s) => parse_number(s),
        }
    }

    /// Same as [`Value::as_f64`] but with `NaN` standing in for missing.
    pub fn to_f64_or_nan(&self) -> f64 {
        self.as_f64().unwrap_or(f64::NAN)
    }

    /// Coerce to a float cell. Anything that does not parse becomes `Null`.
    pub fn coerce_numeric(&self) -> Value {
        match self.as_f64() {
            Some(v) => Value::Float(v),
            None => Value::Null,
        }
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Value::Float(v) if !v.is_nan())
    }
}

/// Parse a numeric string, tolerating surrounding whitespace and thousands
/// separators. Non-finite results are rejected.
pub(crate) fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let parsed = match trimmed.parse::<f64>() {
        Ok(v) => v,
        Err(_) => trimmed.replace(',', "").parse::<f64>().ok()?,
    };
    parsed.is_finite().then_some(parsed)
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::from_f64(v)
    }
}

impl From<Option<f64>> for Value {
    fn from(v: Option<f64>) -> Self {
        v.map_or(Value::Null, Value::from_f64)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Float(v) if v.is_nan() => Ok(()),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nan_float_is_null() {
        assert!(Value::Float(f64::NAN).is_null());
        assert!(Value::Null.is_null());
        assert!(!Value::Float(0.0).is_null());
        assert!(!Value::Text(String::new()).is_null());
    }

    #[test]
    fn text_parses_as_number() {
        assert_eq!(Value::from(" 101.5 ").as_f64(), Some(101.5));
        assert_eq!(Value::from("1,250.75").as_f64(), Some(1250.75));
        assert_eq!(Value::from("n/a").as_f64(), None);
        assert_eq!(Value::from("inf").as_f64(), None);
    }

    #[test]
    fn coerce_numeric_nulls_garbage() {
        assert_eq!(Value::from("abc").coerce_numeric(), Value::Null);
        assert_eq!(Value::from("42").coerce_numeric(), Value::Float(42.0));
        assert_eq!(Value::Bool(true).coerce_numeric(), Value::Float(1.0));
    }

    #[test]
    fn from_f64_maps_nan_to_null() {
        assert_eq!(Value::from_f64(f64::NAN), Value::Null);
        assert_eq!(Value::from(Some(2.0)), Value::Float(2.0));
    }

    #[test]
    fn json_roundtrip_is_untagged() {
        let cells = vec![Value::Null, Value::Float(1.5), Value::from("x"), Value::Bool(false)];
        let json = serde_json::to_string(&cells).unwrap();
        assert_eq!(json, r#"[null,1.5,"x",false]"#);
        let back: Vec<Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cells);
    }
}
