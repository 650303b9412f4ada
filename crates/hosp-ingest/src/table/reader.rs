//! CSV file reading.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use csv::ReaderBuilder;
use polars::prelude::*;

use crate::error::{IngestError, Result};

/// Maximum file size for CSV loading (500 MB default).
pub const MAX_CSV_FILE_SIZE: u64 = 500 * 1024 * 1024;

/// Column names of a CSV extract, as found in its header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvHeaders {
    /// Trimmed column names.
    pub columns: Vec<String>,
}

impl CsvHeaders {
    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if there are no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}

/// Check file size against the default limit.
pub fn check_file_size(path: &Path) -> Result<()> {
    check_file_size_with_limit(path, MAX_CSV_FILE_SIZE)
}

/// Check file size against a custom limit.
pub fn check_file_size_with_limit(path: &Path, max_size: u64) -> Result<()> {
    let metadata = std::fs::metadata(path).map_err(|e| IngestError::io(path, e))?;

    if metadata.len() > max_size {
        return Err(IngestError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max_size,
        });
    }

    Ok(())
}

/// Rejects UTF-16 files; UTF-8 with or without BOM is fine.
pub fn validate_encoding(path: &Path) -> Result<()> {
    let mut file = File::open(path).map_err(|e| IngestError::io(path, e))?;

    let mut buffer = [0u8; 4];
    let bytes_read = file
        .read(&mut buffer)
        .map_err(|e| IngestError::io(path, e))?;

    if bytes_read >= 2 {
        if buffer[0..2] == [0xFF, 0xFE] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 LE",
            });
        }
        if buffer[0..2] == [0xFE, 0xFF] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 BE",
            });
        }
    }

    Ok(())
}

fn normalize_header(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Reads only the header row.
///
/// Used to fail fast on missing columns before the whole file is parsed.
pub fn read_csv_schema(path: &Path) -> Result<CsvHeaders> {
    let file = File::open(path).map_err(|e| IngestError::io(path, e))?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut record = csv::StringRecord::new();
    let found = reader
        .read_record(&mut record)
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    if !found {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }

    let columns: Vec<String> = record.iter().map(normalize_header).collect();
    if columns.iter().all(String::is_empty) {
        return Err(IngestError::NoHeaderDetected {
            path: path.to_path_buf(),
        });
    }
    Ok(CsvHeaders { columns })
}

/// Reads a CSV file into a Polars DataFrame.
///
/// Dtypes are inferred over the whole file so a late placeholder in an
/// otherwise numeric column cannot abort the parse.
pub fn read_csv_table(path: &Path) -> Result<(DataFrame, CsvHeaders)> {
    read_csv_table_with_text_columns(path, &[])
}

/// Like [`read_csv_table`], but `text_columns` are always read as strings.
///
/// Date columns go through here so the normalizer sees the source text and
/// not an inferred integer. Names absent from the header are ignored.
pub fn read_csv_table_with_text_columns(
    path: &Path,
    text_columns: &[&str],
) -> Result<(DataFrame, CsvHeaders)> {
    let headers = read_csv_schema(path)?;

    let mut overwrite = Schema::default();
    for name in text_columns {
        if headers.contains(name) {
            overwrite.with_column((*name).into(), DataType::String);
        }
    }
    let overwrite = (!overwrite.is_empty()).then(|| Arc::new(overwrite));

    let mut df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .with_schema_overwrite(overwrite)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .finish()
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    // Polars keeps header whitespace; the rest of the pipeline matches on trimmed names.
    let raw_names: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect();
    for (raw, clean) in raw_names.iter().zip(headers.columns.iter()) {
        if raw != clean {
            df.rename(raw, clean.as_str().into())?;
        }
    }

    Ok((df, headers))
}
