//! Sink options.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How a persisted table treats prior contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistMode {
    /// Drop and recreate the table. Destructive, not versioned.
    #[default]
    Replace,
    /// Create the table if needed and insert after existing rows.
    Append,
}

/// Connection settings for the relational destination.
///
/// Always supplied by the caller (CLI flags or environment); nothing here is
/// read from process-wide state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database file.
    pub path: PathBuf,
    /// How long a write waits on a locked database.
    pub busy_timeout: Duration,
}

impl DatabaseConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout: Duration::from_secs(5),
        }
    }

    #[must_use]
    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }
}
