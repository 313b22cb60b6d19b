//! Fundamental record cleaning.

use serde_json::{Map, Value as JsonValue};

use super::cleaner::{CleaningError, DataCleaner};
use super::report::CleaningReport;
use super::validate::fundamental_ratio_warnings;
use crate::domain::{FundamentalRecord, FundamentalValue};

/// A raw metric-name → value mapping as delivered by a data supplier.
pub type RawRecord = Map<String, JsonValue>;

/// Text markers suppliers use for "no data".
const MISSING_MARKERS: [&str; 6] = ["", "nan", "none", "null", "n/a", "na"];

impl DataCleaner {
    /// Clean a flat fundamental record.
    ///
    /// Missing values are kept as `FundamentalValue::Absent` and counted in
    /// `null_values_filled`. Ratio checks only produce warnings.
    pub fn clean_fundamental_record(
        &self,
        record: &RawRecord,
    ) -> Result<(FundamentalRecord, CleaningReport), CleaningError> {
        let mut report = self.start_report("fundamental data", (record.len(), 1));
        let mut cleaned = FundamentalRecord::new();

        for (key, raw) in record {
            let key = if self.config().normalize_column_names {
                key.trim().to_lowercase()
            } else {
                key.clone()
            };
            let value = clean_value(raw);
            if value.is_absent() {
                report.null_values_filled += 1;
            }
            if cleaned.insert(key.clone(), value).is_some() {
                report.warn(format!(
                    "Duplicate key '{key}' after normalization; later value kept"
                ));
            }
        }
        report.transformation("normalized_fundamental_values");

        for warning in fundamental_ratio_warnings(&cleaned) {
            report.warn(warning);
        }
        report.transformation("validated_fundamental_ratios");

        let report = report.finish((cleaned.len(), 1));
        Ok((cleaned, report))
    }

    /// Clean a JSON document holding a fundamental record.
    ///
    /// Accepts an object, or an array holding exactly one object.
    pub fn clean_fundamental_json(
        &self,
        document: &JsonValue,
    ) -> Result<(FundamentalRecord, CleaningReport), CleaningError> {
        match document {
            JsonValue::Object(record) => self.clean_fundamental_record(record),
            JsonValue::Array(items) => match items.as_slice() {
                [JsonValue::Object(record)] => self.clean_fundamental_record(record),
                _ => Err(CleaningError::MalformedInput(format!(
                    "expected a single fundamental record, got an array of {}",
                    items.len()
                ))),
            },
            other => Err(CleaningError::MalformedInput(format!(
                "expected a JSON object, got {}",
                json_kind(other)
            ))),
        }
    }
}

fn clean_value(raw: &JsonValue) -> FundamentalValue {
    match raw {
        JsonValue::Null => FundamentalValue::Absent,
        // Booleans count as 1/0, as in `Value::as_f64`.
        JsonValue::Bool(b) => FundamentalValue::Number(if *b { 1.0 } else { 0.0 }),
        JsonValue::Number(n) => match n.as_f64() {
            Some(v) if v.is_finite() => FundamentalValue::Number(v),
            _ => FundamentalValue::Absent,
        },
        JsonValue::String(s) => {
            let trimmed = s.trim();
            if MISSING_MARKERS
                .iter()
                .any(|m| trimmed.eq_ignore_ascii_case(m))
            {
                FundamentalValue::Absent
            } else {
                FundamentalValue::Text(trimmed.to_string())
            }
        }
        other => FundamentalValue::Other(other.clone()),
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaning::NullObserver;
    use serde_json::json;
    use std::sync::Arc;

    fn cleaner() -> DataCleaner {
        DataCleaner::default().with_observer(Arc::new(NullObserver))
    }

    fn record(value: JsonValue) -> RawRecord {
        match value {
            JsonValue::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn negative_pe_is_warned_and_kept() {
        let (out, report) = cleaner()
            .clean_fundamental_record(&record(json!({"PE_Ratio": -5.0})))
            .unwrap();
        assert_eq!(out["pe_ratio"], FundamentalValue::Number(-5.0));
        assert_eq!(report.warnings().len(), 1);
        assert!(report.warnings()[0].contains("pe_ratio"));
    }

    #[test]
    fn missing_values_become_absent() {
        let (out, report) = cleaner()
            .clean_fundamental_record(&record(json!({
                "market_cap": null,
                "sector": "  Technology ",
                "beta": "N/A",
                "eps": 3
            })))
            .unwrap();
        assert!(out["market_cap"].is_absent());
        assert!(out["beta"].is_absent());
        assert_eq!(out["sector"], FundamentalValue::Text("Technology".into()));
        assert_eq!(out["eps"], FundamentalValue::Number(3.0));
        assert_eq!(report.null_values_filled(), 2);
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn non_scalars_pass_through() {
        let (out, _) = cleaner()
            .clean_fundamental_record(&record(json!({"flags": [1, 2], "meta": {"src": "x"}})))
            .unwrap();
        assert_eq!(out["flags"], FundamentalValue::Other(json!([1, 2])));
        assert_eq!(out["meta"], FundamentalValue::Other(json!({"src": "x"})));
    }

    #[test]
    fn booleans_become_numbers() {
        let (out, report) = cleaner()
            .clean_fundamental_record(&record(json!({"listed": true, "delisted": false})))
            .unwrap();
        assert_eq!(out["listed"], FundamentalValue::Number(1.0));
        assert_eq!(out["delisted"], FundamentalValue::Number(0.0));
        assert_eq!(report.null_values_filled(), 0);
    }

    #[test]
    fn key_collision_is_warned() {
        let (out, report) = cleaner()
            .clean_fundamental_record(&record(json!({"ROE": 0.1, "roe": 0.2})))
            .unwrap();
        assert_eq!(out.len(), 1);
        assert!(report.warnings()[0].contains("roe"));
    }

    #[test]
    fn json_documents() {
        let c = cleaner();
        assert!(c.clean_fundamental_json(&json!([{"roa": 0.1}])).is_ok());
        assert!(matches!(
            c.clean_fundamental_json(&json!(42)),
            Err(CleaningError::MalformedInput(_))
        ));
        assert!(matches!(
            c.clean_fundamental_json(&json!([{}, {}])),
            Err(CleaningError::MalformedInput(_))
        ));
    }
}
