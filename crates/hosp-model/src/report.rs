//! Structured results returned by the metrics reporter.

use serde::{Deserialize, Serialize};

/// Distribution of non-null length-of-stay values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LosSummary {
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation (n - 1); `None` below two values.
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub p25: Option<f64>,
    pub median: Option<f64>,
    pub p75: Option<f64>,
    pub max: Option<f64>,
}

/// Mean/median/count of LOS within one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    pub key: String,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    /// Rows in the group with a non-null LOS.
    pub count: usize,
}

/// Ordering applied to grouped LOS results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupOrder {
    /// Highest mean first; groups without a mean go last.
    #[default]
    MeanDescending,
    /// Group keys ascending (numeric keys compare numerically).
    KeyAscending,
    /// Delay-bucket reporting order.
    DelayBucket,
}

/// Missing-documentation totals.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MissingDocumentation {
    pub missing_progress_note: usize,
    pub missing_discharge_summary: usize,
    pub distinct_encounters: usize,
    pub missing_progress_note_pct: f64,
    pub missing_discharge_summary_pct: f64,
}

/// Everything the reporter produces for one run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricsReport {
    pub los: LosSummary,
    pub los_by_diagnosis_category: Vec<GroupStats>,
    pub los_by_delay_bucket: Vec<GroupStats>,
    pub los_by_delay_hours: Vec<GroupStats>,
    pub los_by_therapeutic_class: Vec<GroupStats>,
    pub missing_documentation: MissingDocumentation,
}
