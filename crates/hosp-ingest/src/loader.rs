//! Loading the four source extracts from a data directory.

use std::path::{Path, PathBuf};
use std::time::Instant;

use polars::prelude::DataFrame;
use tracing::{debug, info_span};

use hosp_model::{SchemaError, SourceTable};

use crate::table::{
    CsvHeaders, check_file_size, read_csv_schema, read_csv_table_with_text_columns,
    validate_encoding,
};
use crate::error::{IngestError, Result};

/// One loaded source table with the schema it was read with.
#[derive(Debug, Clone)]
pub struct SourceFrame {
    pub table: SourceTable,
    pub path: PathBuf,
    pub headers: CsvHeaders,
    pub data: DataFrame,
}

impl SourceFrame {
    /// Rows × columns, as reported in the run summary.
    pub fn shape(&self) -> (usize, usize) {
        self.data.shape()
    }
}

/// All four source tables of one run.
#[derive(Debug, Clone)]
pub struct SourceFrames {
    pub admissions: SourceFrame,
    pub diagnoses: SourceFrame,
    pub documentation: SourceFrame,
    pub medications: SourceFrame,
}

impl SourceFrames {
    pub fn get(&self, table: SourceTable) -> &SourceFrame {
        match table {
            SourceTable::Admissions => &self.admissions,
            SourceTable::Diagnoses => &self.diagnoses,
            SourceTable::Documentation => &self.documentation,
            SourceTable::Medications => &self.medications,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceFrame> {
        SourceTable::ALL.into_iter().map(|table| self.get(table))
    }
}

/// Path of a source table inside `data_dir`.
pub fn source_path(data_dir: &Path, table: SourceTable) -> PathBuf {
    data_dir.join(table.file_name())
}

/// Checks a table's header row against its required columns.
pub fn check_source_schema(table: SourceTable, headers: &CsvHeaders) -> Result<()> {
    SchemaError::check(table.table_name(), &headers.columns, table.required_columns())?;
    Ok(())
}

/// Reads one source table, failing fast when its schema is incomplete.
pub fn load_source(data_dir: &Path, table: SourceTable) -> Result<SourceFrame> {
    let path = source_path(data_dir, table);
    let span = info_span!("load_source", table = %table, path = %path.display());
    let _guard = span.enter();
    let start = Instant::now();

    check_file_size(&path)?;
    validate_encoding(&path)?;
    let headers = read_csv_schema(&path)?;
    check_source_schema(table, &headers)?;

    let (data, headers) = read_csv_table_with_text_columns(&path, table.text_columns())?;
    debug!(
        rows = data.height(),
        columns = data.width(),
        duration_ms = start.elapsed().as_millis(),
        "source loaded"
    );
    Ok(SourceFrame {
        table,
        path,
        headers,
        data,
    })
}

/// Reads all four source tables.
///
/// Every header row is checked before any file body is parsed, so a schema
/// problem in the last table aborts the run as early as one in the first.
pub fn load_sources(data_dir: &Path) -> Result<SourceFrames> {
    if !data_dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: data_dir.to_path_buf(),
        });
    }
    for table in SourceTable::ALL {
        let headers = read_csv_schema(&source_path(data_dir, table))?;
        check_source_schema(table, &headers)?;
    }
    Ok(SourceFrames {
        admissions: load_source(data_dir, SourceTable::Admissions)?,
        diagnoses: load_source(data_dir, SourceTable::Diagnoses)?,
        documentation: load_source(data_dir, SourceTable::Documentation)?,
        medications: load_source(data_dir, SourceTable::Medications)?,
    })
}
