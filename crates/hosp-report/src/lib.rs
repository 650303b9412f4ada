//! Metrics over reconciled hospital encounters.
//!
//! Every query is a pure function of its input frame and returns plain
//! structs from `hosp-model`, ready to print or serialize.

pub mod error;
pub mod metrics;
pub mod stats;

pub use error::{ReportError, Result};
pub use metrics::{
    build_report, grouped_los, los_by_delay_bucket, los_by_delay_hours, los_by_diagnosis_category,
    los_by_therapeutic_class, los_summary, missing_documentation,
};
