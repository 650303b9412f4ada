//! Column names shared by the source tables and the encounter record.

pub const ENCOUNTER_ID: &str = "encounter_id";
pub const PATIENT_ID: &str = "patient_id";
pub const ADMISSION_DATE: &str = "admission_date";
pub const DISCHARGE_DATE: &str = "discharge_date";
pub const PRIMARY_DIAGNOSIS_CODE: &str = "primary_diagnosis_code";
/// Length of stay in whole days, derived by the normalizer.
pub const LOS: &str = "LOS";

pub const DIAGNOSIS_CODE: &str = "diagnosis_code";
pub const DIAGNOSIS_CATEGORY: &str = "diagnosis_category";

pub const DISCHARGE_SUMMARY_DELAY_HOURS: &str = "discharge_summary_delay_hours";
pub const MISSING_PROGRESS_NOTE: &str = "missing_progress_note";
pub const MISSING_DISCHARGE_SUMMARY: &str = "missing_discharge_summary";

pub const THERAPEUTIC_CLASS: &str = "therapeutic_class";

pub const MED_COUNT: &str = "med_count";
pub const DELAY_BUCKET: &str = "delay_bucket";

/// Suffix appended to right-hand columns whose names collide during a join.
pub const JOIN_SUFFIX: &str = "_right";

/// Literal text treated as a missing-value marker in the source extracts.
pub const PLACEHOLDER_VALUE: &str = "?";
