//! Error types for the transform stages.

use hosp_model::SchemaError;
use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised by the normalizer, reconciliation and derivation stages.
///
/// Per-row problems (bad dates, implausible LOS, odd delay values) are never
/// errors; they are resolved by the stage's null/zero-fill/bucket policy.
#[derive(Debug, Error)]
pub enum TransformError {
    /// Required columns are absent. Aborts the run.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A frame operation failed.
    #[error("DataFrame operation failed: {0}")]
    Polars(#[from] PolarsError),
}

/// Result type for transform operations.
pub type Result<T> = std::result::Result<T, TransformError>;
