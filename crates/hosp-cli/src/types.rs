use std::path::PathBuf;
use std::time::Duration;

use hosp_model::{CardinalityWarning, DatabaseConfig, MetricsReport, PersistMode, SourceTable};
use hosp_transform::NormalizeStats;

use crate::cli::RunArgs;

/// Default database file name inside the output directory.
pub const DEFAULT_DB_FILE: &str = "hospital.db";

/// Resolved settings for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    /// `None` disables the relational store.
    pub database: Option<DatabaseConfig>,
    pub persist_mode: PersistMode,
    pub dry_run: bool,
}

impl PipelineConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        let output_dir = data_dir.join("output");
        Self {
            database: Some(DatabaseConfig::new(output_dir.join(DEFAULT_DB_FILE))),
            data_dir,
            output_dir,
            persist_mode: PersistMode::Replace,
            dry_run: false,
        }
    }

    pub fn from_args(args: &RunArgs) -> Self {
        let mut config = Self::new(&args.data_dir);
        if let Some(dir) = &args.output_dir {
            config.output_dir = dir.clone();
        }
        config.database = if args.no_db {
            None
        } else {
            let path = args
                .db_path
                .clone()
                .unwrap_or_else(|| config.output_dir.join(DEFAULT_DB_FILE));
            Some(
                DatabaseConfig::new(path)
                    .with_busy_timeout(Duration::from_millis(args.db_busy_timeout_ms)),
            )
        };
        if args.append {
            config.persist_mode = PersistMode::Append;
        }
        config.dry_run = args.dry_run;
        config
    }
}

/// Shape of one loaded source extract.
#[derive(Debug, Clone)]
pub struct SourceSummary {
    pub table: SourceTable,
    pub path: PathBuf,
    pub rows: usize,
    pub columns: usize,
    /// Rows written to the relational store, when it was written.
    pub persisted: Option<usize>,
}

#[derive(Debug)]
pub struct RunResult {
    pub output_dir: PathBuf,
    pub sources: Vec<SourceSummary>,
    pub normalize: NormalizeStats,
    pub encounters: usize,
    pub encounters_persisted: Option<usize>,
    pub warnings: Vec<CardinalityWarning>,
    pub report: MetricsReport,
    /// Files written by this run.
    pub outputs: Vec<PathBuf>,
    /// Set when the relational store could not be reached.
    pub database_error: Option<String>,
    pub dry_run: bool,
}

impl RunResult {
    pub fn has_errors(&self) -> bool {
        self.database_error.is_some()
    }
}
