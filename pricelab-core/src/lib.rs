//! PriceLab Core — domain tables, cleaning engine and technical indicators.
//!
//! This crate contains:
//! - Domain types (cells, index labels, time-series and statement tables,
//!   fundamental records)
//! - `DataCleaner`, which validates and normalizes price series, fundamental
//!   records and financial statements and reports every change it made
//! - An indicator library over OHLCV tables, built from config by a factory
//! - A clean-then-analyze `Pipeline` loaded from TOML
//! - Polars-backed CSV/Parquet ingestion and CSV export

pub mod cleaning;
pub mod data;
pub mod domain;
pub mod indicators;
pub mod pipeline;

pub use cleaning::{CleanerConfig, CleaningReport, DataCleaner, FillMethod};
pub use domain::{StatementKind, StatementTable, TimeSeriesTable};
pub use pipeline::{Pipeline, PipelineConfig};
