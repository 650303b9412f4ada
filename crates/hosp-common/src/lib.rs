//! Shared utilities for the hospital operations workspace.
//!
//! This crate provides the Polars helpers every stage uses to read cells
//! without assuming the dtype CSV inference picked.

pub mod frame;
pub mod values;

// Re-export commonly used functions at crate root for convenience
pub use frame::{column_keys, column_names, has_column, row_fingerprint};
pub use values::{
    any_to_f64, any_to_flag, any_to_i64, any_to_key, any_to_string, date_to_days, days_to_date,
    format_numeric, parse_f64, parse_flag, parse_i64,
};
