use hosp_model::SchemaError;
use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised by metric queries.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The frame lacks a column the query groups or aggregates on.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("DataFrame operation failed: {0}")]
    Polars(#[from] PolarsError),
}

pub type Result<T> = std::result::Result<T, ReportError>;
