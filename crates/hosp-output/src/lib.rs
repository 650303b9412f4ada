//! Sink for the hospital operations pipeline.
//!
//! Tables go to SQLite through [`persist`]; the final dataset and the metrics
//! report are also written as flat files.

pub mod database;
pub mod error;
pub mod export;

pub use database::{open_database, persist, table_row_count, test_connection};
pub use error::{OutputError, Result};
pub use export::{export_csv, write_metrics_json};
