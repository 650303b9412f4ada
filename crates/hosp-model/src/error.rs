use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A source table lacks columns the pipeline cannot run without.
///
/// This is the only fatal transform-stage failure: it aborts the run before
/// any table is rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{table}: missing required column(s) {}", .columns.join(", "))]
pub struct SchemaError {
    pub table: String,
    pub columns: Vec<String>,
}

impl SchemaError {
    pub fn new(table: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            table: table.into(),
            columns,
        }
    }

    pub fn single(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::new(table, vec![column.into()])
    }

    /// Fails when any of `required` is absent from `present`.
    pub fn check<S: AsRef<str>>(
        table: &str,
        present: &[S],
        required: &[&str],
    ) -> Result<(), SchemaError> {
        let missing: Vec<String> = required
            .iter()
            .filter(|name| !present.iter().any(|p| p.as_ref() == **name))
            .map(|name| (*name).to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::new(table, missing))
        }
    }
}

/// A join's right side repeated a key that was assumed unique.
///
/// Non-fatal: the join still fans out, and the warning is logged and carried
/// in the stage result so operators can see where rows multiplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardinalityWarning {
    /// Join step that observed the duplicates (e.g. "diagnoses").
    pub join: String,
    /// Key column on the side that should have been unique.
    pub key: String,
    /// Number of distinct key values that occur more than once.
    pub duplicate_keys: usize,
    /// Rows added to the output by fan-out (zero when no left row matched).
    pub extra_rows: usize,
}

impl std::fmt::Display for CardinalityWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} join: {} duplicate '{}' value(s), {} extra row(s)",
            self.join, self.duplicate_keys, self.key, self.extra_rows
        )
    }
}
