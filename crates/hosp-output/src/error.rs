//! Error types for the sink.

use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised while persisting or exporting.
#[derive(Debug, Error)]
pub enum OutputError {
    /// The relational destination could not be opened or did not answer the
    /// connection test. Flat-file outputs can still be written.
    #[error("cannot connect to database {path}: {source}")]
    Connectivity {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("database write to table {table} failed: {source}")]
    Database {
        table: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("table {table} has no columns to persist")]
    EmptySchema { table: String },

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize metrics: {0}")]
    Json(#[from] serde_json::Error),

    #[error("DataFrame operation failed: {0}")]
    Polars(#[from] PolarsError),
}

impl OutputError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        OutputError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn database(table: &str, source: rusqlite::Error) -> Self {
        OutputError::Database {
            table: table.to_string(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, OutputError>;
