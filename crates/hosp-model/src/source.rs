//! Source table descriptors.
//!
//! Each pipeline run reads exactly four extracts. A [`SourceTable`] ties an
//! extract to its file name on disk, the table name it is persisted under and
//! the columns the transform stages cannot run without.

use serde::{Deserialize, Serialize};

use crate::columns::{
    ADMISSION_DATE, DIAGNOSIS_CODE, DISCHARGE_DATE, ENCOUNTER_ID, PRIMARY_DIAGNOSIS_CODE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTable {
    Admissions,
    Diagnoses,
    Documentation,
    Medications,
}

impl SourceTable {
    /// All source tables in load order.
    pub const ALL: [SourceTable; 4] = [
        SourceTable::Admissions,
        SourceTable::Diagnoses,
        SourceTable::Documentation,
        SourceTable::Medications,
    ];

    /// CSV file name inside the data directory.
    pub fn file_name(self) -> &'static str {
        match self {
            SourceTable::Admissions => "patient_admissions.csv",
            SourceTable::Diagnoses => "diagnoses.csv",
            SourceTable::Documentation => "documentation_logs.csv",
            SourceTable::Medications => "medications.csv",
        }
    }

    /// Table name used by the relational sink.
    pub fn table_name(self) -> &'static str {
        match self {
            SourceTable::Admissions => "patients",
            SourceTable::Diagnoses => "diagnoses",
            SourceTable::Documentation => "documentation_log",
            SourceTable::Medications => "medications",
        }
    }

    /// Human-readable label for summaries and log fields.
    pub fn label(self) -> &'static str {
        match self {
            SourceTable::Admissions => "Patients",
            SourceTable::Diagnoses => "Diagnoses",
            SourceTable::Documentation => "Documentation logs",
            SourceTable::Medications => "Medications",
        }
    }

    /// Columns that must be present before any transform runs.
    pub fn required_columns(self) -> &'static [&'static str] {
        match self {
            SourceTable::Admissions => &[
                ENCOUNTER_ID,
                ADMISSION_DATE,
                DISCHARGE_DATE,
                PRIMARY_DIAGNOSIS_CODE,
            ],
            SourceTable::Diagnoses => &[DIAGNOSIS_CODE],
            SourceTable::Documentation | SourceTable::Medications => &[ENCOUNTER_ID],
        }
    }

    /// Columns read as text regardless of what their values look like.
    ///
    /// Compact `YYYYMMDD` dates would otherwise load as integers.
    pub fn text_columns(self) -> &'static [&'static str] {
        match self {
            SourceTable::Admissions => &[ADMISSION_DATE, DISCHARGE_DATE],
            SourceTable::Diagnoses | SourceTable::Documentation | SourceTable::Medications => &[],
        }
    }

    /// Returns the required columns missing from `columns`, in declaration order.
    pub fn missing_columns<S: AsRef<str>>(self, columns: &[S]) -> Vec<&'static str> {
        self.required_columns()
            .iter()
            .copied()
            .filter(|required| !columns.iter().any(|c| c.as_ref() == *required))
            .collect()
    }
}

impl std::fmt::Display for SourceTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table_name())
    }
}

/// Table name of the derived encounter record in the relational store.
pub const ENCOUNTERS_TABLE: &str = "encounters";

/// File name of the flat export.
pub const FINAL_DATASET_FILE: &str = "final_hospital_dataset.csv";

/// File name of the serialized metrics report.
pub const METRICS_REPORT_FILE: &str = "metrics.json";
