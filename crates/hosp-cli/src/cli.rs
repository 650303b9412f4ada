//! CLI argument definitions for the hospital operations ETL.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "hosp-etl",
    version,
    about = "Hospital operations ETL - reconcile admissions, diagnoses, documentation and medications",
    long_about = "Load the four hospital operations extracts, reconcile them into one \
                  encounter-level dataset, derive length of stay and documentation \
                  delay metrics, and persist the results.\n\n\
                  Writes final_hospital_dataset.csv, metrics.json and, unless --no-db \
                  is given, a SQLite database."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow patient-level values (encounter ids) in trace logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the pipeline over a folder of source extracts.
    Run(RunArgs),

    /// List the expected source files and their required columns.
    Schema,
}

#[derive(Parser)]
pub struct RunArgs {
    /// Folder containing the four source CSV files.
    #[arg(value_name = "DATA_DIR")]
    pub data_dir: PathBuf,

    /// Output directory for generated files (default: <DATA_DIR>/output).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// SQLite database file (default: <OUTPUT_DIR>/hospital.db).
    #[arg(long = "db-path", value_name = "PATH", env = "HOSP_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// How long a write waits on a locked database, in milliseconds.
    #[arg(
        long = "db-busy-timeout-ms",
        value_name = "MS",
        env = "HOSP_DB_BUSY_TIMEOUT_MS",
        default_value_t = 5000
    )]
    pub db_busy_timeout_ms: u64,

    /// Skip the relational store; write only the flat files.
    #[arg(long = "no-db")]
    pub no_db: bool,

    /// Append to existing tables instead of replacing them.
    #[arg(long = "append")]
    pub append: bool,

    /// Run every stage and print the summary without writing anything.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
