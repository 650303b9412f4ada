//! Flat-file outputs: the final dataset CSV and the metrics JSON.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use polars::prelude::{CsvWriter, DataFrame, SerWriter};
use tracing::info;

use hosp_model::MetricsReport;

use crate::error::{OutputError, Result};

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| OutputError::io(parent, e))?;
    }
    Ok(())
}

/// Writes `frame` as a comma-separated file with a header row.
///
/// Overwrites any existing file. Column order and row order are kept.
pub fn export_csv(frame: &DataFrame, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    let file = File::create(path).map_err(|e| OutputError::io(path, e))?;
    let mut data = frame.clone();
    CsvWriter::new(BufWriter::new(file))
        .include_header(true)
        .with_separator(b',')
        .finish(&mut data)?;
    info!(path = %path.display(), rows = frame.height(), "wrote flat export");
    Ok(())
}

/// Writes the metrics report as pretty-printed JSON.
pub fn write_metrics_json(report: &MetricsReport, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json).map_err(|e| OutputError::io(path, e))?;
    info!(path = %path.display(), "wrote metrics report");
    Ok(())
}
