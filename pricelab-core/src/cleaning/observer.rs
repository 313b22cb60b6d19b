//! Injected event sink for cleaning runs.
//!
//! The engine never talks to a global logger. It reports progress to the
//! `CleaningObserver` it was built with; the default forwards to `tracing`.

/// One observable moment of a cleaning run.
#[derive(Debug, Clone, PartialEq)]
pub enum CleaningEvent<'a> {
    Started { subject: &'a str, rows: usize },
    Transformation { subject: &'a str, name: &'a str },
    Warning { subject: &'a str, message: &'a str },
    Finished {
        subject: &'a str,
        rows_before: usize,
        rows_after: usize,
    },
}

pub trait CleaningObserver: Send + Sync {
    fn on_event(&self, event: &CleaningEvent<'_>);
}

/// Forwards events to `tracing` with structured fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl CleaningObserver for TracingObserver {
    fn on_event(&self, event: &CleaningEvent<'_>) {
        match *event {
            CleaningEvent::Started { subject, rows } => {
                tracing::info!(subject, rows, "cleaning started");
            }
            CleaningEvent::Transformation { subject, name } => {
                tracing::debug!(subject, transformation = name, "applied");
            }
            CleaningEvent::Warning { subject, message } => {
                tracing::warn!(subject, "{message}");
            }
            CleaningEvent::Finished {
                subject,
                rows_before,
                rows_after,
            } => {
                tracing::info!(subject, rows_before, rows_after, "cleaning finished");
            }
        }
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl CleaningObserver for NullObserver {
    fn on_event(&self, _event: &CleaningEvent<'_>) {}
}
