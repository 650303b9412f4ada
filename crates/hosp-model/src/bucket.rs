//! Documentation-delay buckets.

use serde::{Deserialize, Serialize};

/// Categorical grouping of `discharge_summary_delay_hours`.
///
/// Intervals are closed on the right: `(-1, 0]`, `(0, 24]`, `(24, 72]`,
/// `(72, 168]` and `(168, 10000]`. Every other value, including a missing
/// one, lands in [`DelayBucket::Unbucketed`] so no row is ever dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DelayBucket {
    #[serde(rename = "No delay")]
    NoDelay,
    #[serde(rename = "0-24h")]
    UpToDay,
    #[serde(rename = "24-72h")]
    UpToThreeDays,
    #[serde(rename = "3-7d")]
    UpToWeek,
    #[serde(rename = ">7d")]
    OverWeek,
    #[serde(rename = "unbucketed")]
    Unbucketed,
}

/// Bucket edges; bucket `i` covers `(EDGES[i], EDGES[i + 1]]`.
const EDGES: [f64; 6] = [-1.0, 0.0, 24.0, 72.0, 168.0, 10_000.0];

impl DelayBucket {
    /// All buckets in reporting order.
    pub const ALL: [DelayBucket; 6] = [
        DelayBucket::NoDelay,
        DelayBucket::UpToDay,
        DelayBucket::UpToThreeDays,
        DelayBucket::UpToWeek,
        DelayBucket::OverWeek,
        DelayBucket::Unbucketed,
    ];

    const BOUNDED: [DelayBucket; 5] = [
        DelayBucket::NoDelay,
        DelayBucket::UpToDay,
        DelayBucket::UpToThreeDays,
        DelayBucket::UpToWeek,
        DelayBucket::OverWeek,
    ];

    pub fn from_hours(hours: Option<f64>) -> Self {
        let Some(hours) = hours else {
            return DelayBucket::Unbucketed;
        };
        if hours.is_nan() {
            return DelayBucket::Unbucketed;
        }
        for (idx, bucket) in Self::BOUNDED.iter().enumerate() {
            if hours > EDGES[idx] && hours <= EDGES[idx + 1] {
                return *bucket;
            }
        }
        DelayBucket::Unbucketed
    }

    pub fn label(self) -> &'static str {
        match self {
            DelayBucket::NoDelay => "No delay",
            DelayBucket::UpToDay => "0-24h",
            DelayBucket::UpToThreeDays => "24-72h",
            DelayBucket::UpToWeek => "3-7d",
            DelayBucket::OverWeek => ">7d",
            DelayBucket::Unbucketed => "unbucketed",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|bucket| bucket.label() == label)
    }

    /// Position in reporting order.
    pub fn rank(self) -> usize {
        Self::ALL
            .iter()
            .position(|bucket| *bucket == self)
            .unwrap_or(Self::ALL.len())
    }
}

impl std::fmt::Display for DelayBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
