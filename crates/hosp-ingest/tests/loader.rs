//! Integration tests for loading the source extracts.

use std::fs;
use std::path::Path;

use hosp_ingest::{IngestError, load_source, load_sources};
use hosp_model::SourceTable;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).expect("write csv");
}

fn data_dir() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    write(
        dir.path(),
        "patient_admissions.csv",
        "encounter_id,patient_id,admission_date,discharge_date,primary_diagnosis_code\n\
         E1,P1,2024-01-01,2024-01-05,D1\n\
         E2,P2,2024-02-01,,D2\n",
    );
    write(
        dir.path(),
        "diagnoses.csv",
        "diagnosis_code,diagnosis_category,description\nD1,Cardiac,Heart failure\n",
    );
    write(
        dir.path(),
        "documentation_logs.csv",
        "encounter_id,discharge_summary_delay_hours,missing_progress_note,missing_discharge_summary\n\
         E2,30,0,1\n",
    );
    write(
        dir.path(),
        "medications.csv",
        "encounter_id,therapeutic_class,drug_name\nE1,Beta blocker,Metoprolol\nE1,Diuretic,Furosemide\n",
    );
    dir
}

#[test]
fn loads_all_sources() {
    let dir = data_dir();
    let sources = load_sources(dir.path()).expect("load sources");

    assert_eq!(sources.admissions.shape(), (2, 5));
    assert_eq!(sources.diagnoses.shape(), (1, 3));
    assert_eq!(sources.documentation.shape(), (1, 4));
    assert_eq!(sources.medications.shape(), (2, 3));
    let tables: Vec<SourceTable> = sources.iter().map(|source| source.table).collect();
    assert_eq!(tables, SourceTable::ALL.to_vec());
}

#[test]
fn missing_required_column_fails_fast() {
    let dir = data_dir();
    write(
        dir.path(),
        "medications.csv",
        "order_id,therapeutic_class\n1,Diuretic\n",
    );

    let err = load_sources(dir.path()).unwrap_err();
    match err {
        IngestError::Schema(schema) => {
            assert_eq!(schema.table, "medications");
            assert_eq!(schema.columns, vec!["encounter_id"]);
        }
        other => panic!("expected schema error, got {other}"),
    }
}

#[test]
fn missing_file_is_reported() {
    let dir = data_dir();
    fs::remove_file(dir.path().join("diagnoses.csv")).expect("remove");

    let err = load_source(dir.path(), SourceTable::Diagnoses).unwrap_err();
    assert!(matches!(err, IngestError::FileNotFound { .. }));
}

#[test]
fn missing_directory_is_reported() {
    let dir = data_dir();
    let err = load_sources(&dir.path().join("nope")).unwrap_err();
    assert!(matches!(err, IngestError::DirectoryNotFound { .. }));
}
