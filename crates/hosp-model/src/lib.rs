//! Data model shared across the hospital operations pipeline.

pub mod bucket;
pub mod columns;
pub mod error;
pub mod options;
pub mod report;
pub mod source;

pub use bucket::DelayBucket;
pub use error::{CardinalityWarning, SchemaError};
pub use options::{DatabaseConfig, PersistMode};
pub use report::{GroupOrder, GroupStats, LosSummary, MetricsReport, MissingDocumentation};
pub use source::{
    ENCOUNTERS_TABLE, FINAL_DATASET_FILE, METRICS_REPORT_FILE, SourceTable,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_tables_report_missing_columns() {
        let present = ["encounter_id", "admission_date", "patient_id"];
        assert_eq!(
            SourceTable::Admissions.missing_columns(&present),
            vec!["discharge_date", "primary_diagnosis_code"]
        );
        assert!(SourceTable::Medications.missing_columns(&present).is_empty());
        assert_eq!(
            SourceTable::Diagnoses.missing_columns(&present),
            vec!["diagnosis_code"]
        );
    }

    #[test]
    fn source_table_names() {
        assert_eq!(SourceTable::Admissions.file_name(), "patient_admissions.csv");
        assert_eq!(SourceTable::Documentation.table_name(), "documentation_log");
        assert_eq!(SourceTable::Medications.to_string(), "medications");
    }

    #[test]
    fn report_serializes() {
        let report = MetricsReport {
            los_by_delay_bucket: vec![GroupStats {
                key: DelayBucket::OverWeek.label().to_string(),
                mean: Some(4.0),
                median: Some(4.0),
                count: 1,
            }],
            ..MetricsReport::default()
        };
        let json = serde_json::to_string(&report).expect("serialize report");
        let round: MetricsReport = serde_json::from_str(&json).expect("deserialize report");
        assert_eq!(round, report);
        assert!(json.contains(">7d"));
    }

    #[test]
    fn persist_mode_defaults_to_replace() {
        assert_eq!(PersistMode::default(), PersistMode::Replace);
    }
}
