//! Transform stages of the hospital operations pipeline.
//!
//! The stages run in order and each returns a new frame:
//!
//! 1. [`normalize`] deduplicates admissions, types their dates and derives LOS.
//! 2. [`reconcile`] joins admissions with diagnoses, documentation logs and
//!    medication counts into one encounter-level table.
//! 3. [`derive`] adds the documentation delay bucket and sanitizes nulls for
//!    export.

pub mod dates;
pub mod derive;
pub mod error;
pub mod join;
pub mod normalize;
pub mod reconcile;

pub use dates::{DateCell, parse_date};
pub use derive::{add_delay_buckets, derive, sanitize};
pub use error::{Result, TransformError};
pub use join::{JoinOutput, JoinPlan, JoinSide, RightKey, left_join, plan_left_join};
pub use normalize::{
    LosOutcome, MIN_PLAUSIBLE_LOS, NormalizeStats, NormalizedAdmissions, length_of_stay, normalize,
};
pub use reconcile::{Reconciled, aggregate_medications, reconcile, reconcile_with_orders};
