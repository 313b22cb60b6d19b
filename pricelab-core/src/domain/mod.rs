//! Domain types: cells, index labels, tables, statements and fundamental records.

pub mod fundamental;
pub mod index;
pub mod statement;
pub mod table;
pub mod value;

pub use fundamental::{FundamentalRecord, FundamentalValue};
pub use index::{coerce_index, parse_timestamp, IndexValue};
pub use statement::{StatementKind, StatementTable, UnsupportedStatementKind};
pub use table::{Column, TableError, TimeSeriesTable};
pub use value::Value;

/// Canonical OHLCV field names.
pub const OPEN: &str = "open";
pub const HIGH: &str = "high";
pub const LOW: &str = "low";
pub const CLOSE: &str = "close";
pub const VOLUME: &str = "volume";

/// The four price fields every price table must carry.
pub const PRICE_FIELDS: [&str; 4] = [OPEN, HIGH, LOW, CLOSE];

/// Price fields plus volume.
pub const OHLCV_FIELDS: [&str; 5] = [OPEN, HIGH, LOW, CLOSE, VOLUME];
