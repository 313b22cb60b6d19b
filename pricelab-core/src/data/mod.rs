//! File ingestion and export (polars-backed).

pub mod frame;
pub mod ingest;

pub use frame::{dataframe_to_table, table_to_dataframe, write_csv};
pub use ingest::{DataError, DataIngestor, FileFormat, DEFAULT_INDEX_COLUMN};
