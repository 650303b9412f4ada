//! End-to-end runs of the pipeline over temporary data directories.

use std::fs;
use std::path::Path;

use rusqlite::Connection;
use tempfile::TempDir;

use hosp_cli::commands::run_pipeline;
use hosp_cli::types::PipelineConfig;
use hosp_model::{
    DatabaseConfig, FINAL_DATASET_FILE, METRICS_REPORT_FILE, MetricsReport, PersistMode,
};

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
         E2,P2,2024-02-01,,D2\n\
         E3,P3,2024-03-10,2024-03-05,D1\n\
         E3,P3,2024-03-10,2024-03-05,D1\n",
    );
    write(
        dir.path(),
        "diagnoses.csv",
        "diagnosis_code,diagnosis_category,description\n\
         D1,Cardiac,Heart failure\n\
         D2,?,Unknown\n",
    );
    write(
        dir.path(),
        "documentation_logs.csv",
        "encounter_id,discharge_summary_delay_hours,missing_progress_note,missing_discharge_summary\n\
         E2,30,0,1\n\
         E3,200,1,0\n",
    );
    write(
        dir.path(),
        "medications.csv",
        "encounter_id,therapeutic_class,drug_name\n\
         E1,Beta blocker,Metoprolol\n\
         E1,Diuretic,Furosemide\n",
    );
    dir
}

fn csv_rows(path: &Path) -> Vec<Vec<String>> {
    let text = fs::read_to_string(path).expect("read export");
    text.lines()
        .map(|line| line.split(',').map(String::from).collect())
        .collect()
}

fn column<'a>(rows: &'a [Vec<String>], name: &str) -> Vec<&'a str> {
    let idx = rows[0]
        .iter()
        .position(|header| header == name)
        .expect("column present");
    rows[1..]
        .iter()
        .map(|row| row[idx].trim_matches('"'))
        .collect()
}

#[test]
fn full_run_writes_every_output() {
    let dir = data_dir();
    let config = PipelineConfig::new(dir.path());
    let result = run_pipeline(&config).expect("pipeline run");

    assert!(!result.has_errors());
    assert_eq!(result.encounters, 3);
    assert_eq!(result.normalize.duplicates_removed, 1);
    assert_eq!(result.encounters_persisted, Some(3));

    let rows = csv_rows(&config.output_dir.join(FINAL_DATASET_FILE));
    assert_eq!(column(&rows, "encounter_id"), vec!["E1", "E2", "E3"]);
    assert_eq!(column(&rows, "LOS"), vec!["4", "0", "0"]);
    assert_eq!(column(&rows, "diagnosis_category"), vec!["Cardiac", "", "Cardiac"]);
    assert_eq!(column(&rows, "med_count"), vec!["2", "0", "0"]);
    assert_eq!(column(&rows, "delay_bucket"), vec!["unbucketed", "24-72h", ">7d"]);

    let metrics: MetricsReport = serde_json::from_str(
        &fs::read_to_string(config.output_dir.join(METRICS_REPORT_FILE)).expect("read metrics"),
    )
    .expect("parse metrics");
    assert_eq!(metrics.los.count, 2);
    assert_eq!(metrics.missing_documentation.distinct_encounters, 3);

    let db = Connection::open(config.output_dir.join("hospital.db")).expect("open db");
    for (table, expected) in [
        ("patients", 3i64),
        ("diagnoses", 2),
        ("documentation_log", 2),
        ("medications", 2),
        ("encounters", 3),
    ] {
        let count: i64 = db
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
            .expect("count rows");
        assert_eq!(count, expected, "{table}");
    }
}

#[test]
fn unreachable_database_still_exports() {
    let dir = data_dir();
    let mut config = PipelineConfig::new(dir.path());
    config.database = Some(DatabaseConfig::new(
        dir.path().join("missing").join("hospital.db"),
    ));
    let result = run_pipeline(&config).expect("pipeline run");

    assert!(result.has_errors());
    assert!(result.database_error.is_some());
    assert_eq!(result.encounters_persisted, None);
    assert!(config.output_dir.join(FINAL_DATASET_FILE).exists());
    assert!(config.output_dir.join(METRICS_REPORT_FILE).exists());
}

#[test]
fn rejected_table_write_still_exports() {
    let dir = data_dir();
    let mut config = PipelineConfig::new(dir.path());
    config.persist_mode = PersistMode::Append;
    fs::create_dir_all(&config.output_dir).expect("output dir");
    Connection::open(config.output_dir.join("hospital.db"))
        .expect("open db")
        .execute_batch("CREATE TABLE patients (legacy TEXT)")
        .expect("legacy table");

    let result = run_pipeline(&config).expect("pipeline run");

    assert!(result.has_errors());
    let error = result.database_error.as_deref().expect("database error");
    assert!(error.contains("patients"), "{error}");
    assert!(result.sources.iter().all(|source| source.persisted.is_none()));
    assert_eq!(result.encounters_persisted, None);
    assert!(config.output_dir.join(FINAL_DATASET_FILE).exists());
    assert!(config.output_dir.join(METRICS_REPORT_FILE).exists());
    assert_eq!(result.outputs.len(), 2);
}

#[test]
fn dry_run_writes_nothing() {
    let dir = data_dir();
    let mut config = PipelineConfig::new(dir.path());
    config.dry_run = true;
    let result = run_pipeline(&config).expect("pipeline run");

    assert!(result.outputs.is_empty());
    assert!(!config.output_dir.exists());
    assert_eq!(result.report.los_by_therapeutic_class.len(), 2);
}

#[test]
fn missing_column_aborts_before_output() {
    let dir = data_dir();
    write(
        dir.path(),
        "documentation_logs.csv",
        "visit,discharge_summary_delay_hours\nE2,30\n",
    );
    let mut config = PipelineConfig::new(dir.path());
    config.database = None;
    let error = run_pipeline(&config).unwrap_err();

    assert!(format!("{error:#}").contains("documentation_log"));
    assert!(!config.output_dir.exists());
}
