//! Source loading for the hospital operations pipeline.
//!
//! Reads the four CSV extracts (admissions, diagnoses, documentation logs,
//! medications) into Polars DataFrames and reports their schema so later
//! stages can fail fast on missing columns.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use hosp_ingest::load_sources;
//!
//! let sources = load_sources(Path::new("data"))?;
//! println!("patients: {:?}", sources.admissions.shape());
//! ```

mod table;
mod error;
mod loader;

// === Error Types ===
pub use error::{IngestError, Result};

// === CSV Reading ===
pub use table::{
    CsvHeaders, MAX_CSV_FILE_SIZE, check_file_size, check_file_size_with_limit, read_csv_schema,
    read_csv_table, read_csv_table_with_text_columns, validate_encoding,
};

// === Source Tables ===
pub use loader::{
    SourceFrame, SourceFrames, check_source_schema, load_source, load_sources, source_path,
};
