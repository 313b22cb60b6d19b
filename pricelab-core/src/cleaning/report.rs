//! CleaningReport — the audit record returned by every cleaning call.

use super::observer::{CleaningEvent, CleaningObserver};
use serde::Serialize;
use std::fmt;

/// Immutable summary of one cleaning run.
///
/// Built once by the engine and handed to the caller; there are no setters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleaningReport {
    subject: String,
    original_shape: (usize, usize),
    final_shape: (usize, usize),
    rows_removed: usize,
    null_values_filled: usize,
    null_values_removed: usize,
    duplicates_removed: usize,
    outliers_removed: usize,
    invalid_ohlc_rows: usize,
    columns_removed: Vec<String>,
    warnings: Vec<String>,
    transformations: Vec<String>,
}

impl CleaningReport {
    /// What was cleaned, e.g. `price series AAPL`.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn original_shape(&self) -> (usize, usize) {
        self.original_shape
    }

    pub fn final_shape(&self) -> (usize, usize) {
        self.final_shape
    }

    pub fn rows_removed(&self) -> usize {
        self.rows_removed
    }

    pub fn null_values_filled(&self) -> usize {
        self.null_values_filled
    }

    pub fn null_values_removed(&self) -> usize {
        self.null_values_removed
    }

    pub fn duplicates_removed(&self) -> usize {
        self.duplicates_removed
    }

    pub fn outliers_removed(&self) -> usize {
        self.outliers_removed
    }

    pub fn invalid_ohlc_rows(&self) -> usize {
        self.invalid_ohlc_rows
    }

    /// Columns dropped during the run, by their original names.
    pub fn columns_removed(&self) -> &[String] {
        &self.columns_removed
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Transformation names in the order they were applied.
    pub fn transformations(&self) -> &[String] {
        &self.transformations
    }

    /// True when nothing was removed, filled or flagged.
    pub fn is_clean(&self) -> bool {
        self.rows_removed == 0
            && self.null_values_filled == 0
            && self.null_values_removed == 0
            && self.warnings.is_empty()
    }
}

impl fmt::Display for CleaningReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cleaning report: {}", self.subject)?;
        writeln!(
            f,
            "  shape: {}x{} -> {}x{}",
            self.original_shape.0, self.original_shape.1, self.final_shape.0, self.final_shape.1
        )?;
        writeln!(f, "  rows removed:        {}", self.rows_removed)?;
        writeln!(f, "  duplicates removed:  {}", self.duplicates_removed)?;
        writeln!(f, "  invalid OHLC rows:   {}", self.invalid_ohlc_rows)?;
        writeln!(f, "  outliers removed:    {}", self.outliers_removed)?;
        writeln!(f, "  null values filled:  {}", self.null_values_filled)?;
        writeln!(f, "  null values removed: {}", self.null_values_removed)?;
        if !self.columns_removed.is_empty() {
            writeln!(f, "  columns removed: {}", self.columns_removed.join(", "))?;
        }
        if !self.transformations.is_empty() {
            writeln!(f, "  transformations: {}", self.transformations.join(", "))?;
        }
        for warning in &self.warnings {
            writeln!(f, "  warning: {warning}")?;
        }
        Ok(())
    }
}

/// Accumulates counters during a run and forwards events to the observer.
pub(crate) struct ReportBuilder<'a> {
    observer: &'a dyn CleaningObserver,
    subject: String,
    original_shape: (usize, usize),
    pub(crate) null_values_filled: usize,
    pub(crate) null_values_removed: usize,
    pub(crate) duplicates_removed: usize,
    pub(crate) outliers_removed: usize,
    pub(crate) invalid_ohlc_rows: usize,
    pub(crate) rows_removed: Option<usize>,
    columns_removed: Vec<String>,
    warnings: Vec<String>,
    transformations: Vec<String>,
}

impl<'a> ReportBuilder<'a> {
    pub(crate) fn start(
        observer: &'a dyn CleaningObserver,
        subject: impl Into<String>,
        original_shape: (usize, usize),
    ) -> Self {
        let subject = subject.into();
        observer.on_event(&CleaningEvent::Started {
            subject: &subject,
            rows: original_shape.0,
        });
        Self {
            observer,
            subject,
            original_shape,
            null_values_filled: 0,
            null_values_removed: 0,
            duplicates_removed: 0,
            outliers_removed: 0,
            invalid_ohlc_rows: 0,
            rows_removed: None,
            columns_removed: Vec::new(),
            warnings: Vec::new(),
            transformations: Vec::new(),
        }
    }

    pub(crate) fn transformation(&mut self, name: &str) {
        self.observer.on_event(&CleaningEvent::Transformation {
            subject: &self.subject,
            name,
        });
        self.transformations.push(name.to_string());
    }

    pub(crate) fn column_removed(&mut self, name: impl Into<String>) {
        self.columns_removed.push(name.into());
    }

    pub(crate) fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.observer.on_event(&CleaningEvent::Warning {
            subject: &self.subject,
            message: &message,
        });
        self.warnings.push(message);
    }

    /// Seal the report. Unless set explicitly, `rows_removed` is the row
    /// count difference.
    pub(crate) fn finish(self, final_shape: (usize, usize)) -> CleaningReport {
        let rows_removed = self
            .rows_removed
            .unwrap_or_else(|| self.original_shape.0.saturating_sub(final_shape.0));
        self.observer.on_event(&CleaningEvent::Finished {
            subject: &self.subject,
            rows_before: self.original_shape.0,
            rows_after: final_shape.0,
        });
        CleaningReport {
            subject: self.subject,
            original_shape: self.original_shape,
            final_shape,
            rows_removed,
            null_values_filled: self.null_values_filled,
            null_values_removed: self.null_values_removed,
            duplicates_removed: self.duplicates_removed,
            outliers_removed: self.outliers_removed,
            invalid_ohlc_rows: self.invalid_ohlc_rows,
            columns_removed: self.columns_removed,
            warnings: self.warnings,
            transformations: self.transformations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl CleaningObserver for Recorder {
        fn on_event(&self, event: &CleaningEvent<'_>) {
            let line = match event {
                CleaningEvent::Started { rows, .. } => format!("start {rows}"),
                CleaningEvent::Transformation { name, .. } => format!("step {name}"),
                CleaningEvent::Warning { message, .. } => format!("warn {message}"),
                CleaningEvent::Finished { rows_after, .. } => format!("finish {rows_after}"),
            };
            self.0.lock().unwrap().push(line);
        }
    }

    #[test]
    fn builder_emits_events_in_order() {
        let recorder = Recorder::default();
        let mut builder = ReportBuilder::start(&recorder, "price series", (10, 5));
        builder.transformation("sorted_by_timestamp");
        builder.warn("something odd");
        let report = builder.finish((8, 10));

        assert_eq!(
            *recorder.0.lock().unwrap(),
            vec!["start 10", "step sorted_by_timestamp", "warn something odd", "finish 8"]
        );
        assert_eq!(report.rows_removed(), 2);
        assert_eq!(report.transformations(), ["sorted_by_timestamp"]);
        assert_eq!(report.warnings(), ["something odd"]);
    }

    #[test]
    fn explicit_rows_removed_wins() {
        let recorder = Recorder::default();
        let mut builder = ReportBuilder::start(&recorder, "income statement", (4, 3));
        builder.rows_removed = Some(1);
        let report = builder.finish((3, 3));
        assert_eq!(report.rows_removed(), 1);
        assert!(!report.is_clean());
    }

    #[test]
    fn display_lists_warnings() {
        let recorder = Recorder::default();
        let mut builder = ReportBuilder::start(&recorder, "fundamental data", (1, 2));
        builder.warn("Negative pe_ratio: -5");
        let text = builder.finish((1, 2)).to_string();
        assert!(text.contains("fundamental data"));
        assert!(text.contains("warning: Negative pe_ratio: -5"));
        assert!(!text.contains("columns removed"));
    }

    #[test]
    fn removed_columns_are_listed() {
        let recorder = Recorder::default();
        let mut builder = ReportBuilder::start(&recorder, "price series", (3, 6));
        builder.column_removed("Close ");
        let report = builder.finish((3, 5));
        assert_eq!(report.columns_removed(), ["Close "]);
        assert!(report.to_string().contains("columns removed: Close "));
        assert_eq!(
            serde_json::to_value(&report).unwrap()["columns_removed"],
            serde_json::json!(["Close "])
        );
    }
}
