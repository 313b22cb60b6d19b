//! Validation and cleaning engine.
//!
//! `DataCleaner` turns raw supplier data into tables the indicator library
//! can trust:
//!
//! - price series: sorted, duplicate-free, OHLC-consistent, gap-filled, with
//!   derived return columns
//! - fundamental records: normalized keys, explicit absent markers
//! - financial statements: zero-filled, numeric, without empty line items
//!
//! Each call returns a `CleaningReport` describing what was changed.

pub mod cleaner;
pub mod config;
pub mod features;
pub(crate) mod fill;
pub mod fundamental;
pub mod observer;
pub mod report;
pub mod statement;
pub mod validate;

pub use cleaner::{CleaningError, DataCleaner};
pub use config::{CleanerConfig, ConfigError, FillMethod};
pub use features::DERIVED_COLUMNS;
pub use fundamental::RawRecord;
pub use observer::{CleaningEvent, CleaningObserver, NullObserver, TracingObserver};
pub use report::CleaningReport;
