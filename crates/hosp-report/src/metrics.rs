//! Grouped LOS and documentation queries.
//!
//! All queries read the reconciled encounter frame before sanitization, so a
//! missing LOS is still null and is ignored rather than counted as zero.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::time::Instant;

use polars::prelude::DataFrame;
use tracing::{debug, info_span};

use hosp_common::{any_to_f64, any_to_flag, any_to_key, column_keys, column_names, parse_f64};
use hosp_model::columns::{
    DELAY_BUCKET, DIAGNOSIS_CATEGORY, DISCHARGE_SUMMARY_DELAY_HOURS, ENCOUNTER_ID, LOS,
    MISSING_DISCHARGE_SUMMARY, MISSING_PROGRESS_NOTE, PLACEHOLDER_VALUE, THERAPEUTIC_CLASS,
};
use hosp_model::{
    DelayBucket, ENCOUNTERS_TABLE, GroupOrder, GroupStats, LosSummary, MetricsReport,
    MissingDocumentation, SchemaError,
};

use crate::error::Result;
use crate::stats::{mean, median, quantile_sorted, sample_std};

fn require(frame: &DataFrame, columns: &[&str]) -> Result<()> {
    SchemaError::check(ENCOUNTERS_TABLE, &column_names(frame), columns)?;
    Ok(())
}

/// Non-null, non-NaN LOS values by row; `None` where LOS is missing.
fn los_values(frame: &DataFrame) -> Result<Vec<Option<f64>>> {
    let column = frame.column(LOS)?;
    let mut values = Vec::with_capacity(frame.height());
    for idx in 0..frame.height() {
        values.push(any_to_f64(column.get(idx)?).filter(|v| !v.is_nan()));
    }
    Ok(values)
}

/// Distribution of LOS over rows where it is known.
pub fn los_summary(frame: &DataFrame) -> Result<LosSummary> {
    require(frame, &[LOS])?;
    let mut values: Vec<f64> = los_values(frame)?.into_iter().flatten().collect();
    values.sort_by(f64::total_cmp);

    Ok(LosSummary {
        count: values.len(),
        mean: mean(&values),
        std: sample_std(&values),
        min: values.first().copied(),
        p25: quantile_sorted(&values, 0.25),
        median: quantile_sorted(&values, 0.5),
        p75: quantile_sorted(&values, 0.75),
        max: values.last().copied(),
    })
}

/// Mean, median and count of LOS per distinct value of `column`.
///
/// Rows whose group key is null, blank or the `?` placeholder are dropped.
/// A group whose rows all lack LOS is still reported, with count 0.
pub fn grouped_los(frame: &DataFrame, column: &str, order: GroupOrder) -> Result<Vec<GroupStats>> {
    require(frame, &[column, LOS])?;
    let keys = column_keys(frame, column)?;
    let los = los_values(frame)?;

    let mut first_seen: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<f64>> = HashMap::new();
    for (key, value) in keys.into_iter().zip(los) {
        let Some(key) = key.filter(|k| k != PLACEHOLDER_VALUE) else {
            continue;
        };
        let values = groups.entry(key.clone()).or_insert_with(|| {
            first_seen.push(key);
            Vec::new()
        });
        values.extend(value);
    }

    let mut stats: Vec<GroupStats> = first_seen
        .into_iter()
        .map(|key| {
            let values = groups.remove(&key).unwrap_or_default();
            GroupStats {
                mean: mean(&values),
                median: median(&values),
                count: values.len(),
                key,
            }
        })
        .collect();
    sort_groups(&mut stats, order);
    Ok(stats)
}

fn sort_groups(stats: &mut [GroupStats], order: GroupOrder) {
    match order {
        GroupOrder::MeanDescending => stats.sort_by(|a, b| match (a.mean, b.mean) {
            (Some(x), Some(y)) => y.total_cmp(&x).then_with(|| a.key.cmp(&b.key)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.key.cmp(&b.key),
        }),
        GroupOrder::KeyAscending => stats.sort_by(|a, b| compare_keys(&a.key, &b.key)),
        GroupOrder::DelayBucket => stats.sort_by_key(|group| {
            DelayBucket::from_label(&group.key).map_or(usize::MAX, DelayBucket::rank)
        }),
    }
}

/// Numeric keys compare numerically and sort before text keys.
fn compare_keys(a: &str, b: &str) -> Ordering {
    match (parse_f64(a), parse_f64(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

pub fn los_by_diagnosis_category(frame: &DataFrame) -> Result<Vec<GroupStats>> {
    grouped_los(frame, DIAGNOSIS_CATEGORY, GroupOrder::MeanDescending)
}

pub fn los_by_delay_bucket(frame: &DataFrame) -> Result<Vec<GroupStats>> {
    grouped_los(frame, DELAY_BUCKET, GroupOrder::DelayBucket)
}

pub fn los_by_delay_hours(frame: &DataFrame) -> Result<Vec<GroupStats>> {
    grouped_los(frame, DISCHARGE_SUMMARY_DELAY_HOURS, GroupOrder::KeyAscending)
}

/// Expects the one-row-per-order view from `reconcile_with_orders`.
pub fn los_by_therapeutic_class(orders: &DataFrame) -> Result<Vec<GroupStats>> {
    grouped_los(orders, THERAPEUTIC_CLASS, GroupOrder::MeanDescending)
}

/// Totals of the two missing-documentation flags.
///
/// Percentages are relative to the number of distinct encounters, so fan-out
/// rows count once per row in the totals but not in the denominator.
pub fn missing_documentation(frame: &DataFrame) -> Result<MissingDocumentation> {
    require(
        frame,
        &[ENCOUNTER_ID, MISSING_PROGRESS_NOTE, MISSING_DISCHARGE_SUMMARY],
    )?;
    let progress = frame.column(MISSING_PROGRESS_NOTE)?;
    let summary = frame.column(MISSING_DISCHARGE_SUMMARY)?;
    let ids = frame.column(ENCOUNTER_ID)?;

    let mut encounters = HashSet::new();
    let mut missing_progress_note = 0usize;
    let mut missing_discharge_summary = 0usize;
    for idx in 0..frame.height() {
        if any_to_flag(progress.get(idx)?) == Some(true) {
            missing_progress_note += 1;
        }
        if any_to_flag(summary.get(idx)?) == Some(true) {
            missing_discharge_summary += 1;
        }
        if let Some(id) = any_to_key(ids.get(idx)?) {
            encounters.insert(id);
        }
    }

    let distinct_encounters = encounters.len();
    let pct = |count: usize| {
        if distinct_encounters == 0 {
            0.0
        } else {
            count as f64 / distinct_encounters as f64 * 100.0
        }
    };
    Ok(MissingDocumentation {
        missing_progress_note,
        missing_discharge_summary,
        distinct_encounters,
        missing_progress_note_pct: pct(missing_progress_note),
        missing_discharge_summary_pct: pct(missing_discharge_summary),
    })
}

/// Runs every query.
///
/// `encounters` is the reconciled frame with delay buckets but before
/// sanitization; `orders` is the per-order view.
pub fn build_report(encounters: &DataFrame, orders: &DataFrame) -> Result<MetricsReport> {
    let span = info_span!("report", rows = encounters.height());
    let _guard = span.enter();
    let start = Instant::now();

    let report = MetricsReport {
        los: los_summary(encounters)?,
        los_by_diagnosis_category: los_by_diagnosis_category(encounters)?,
        los_by_delay_bucket: los_by_delay_bucket(encounters)?,
        los_by_delay_hours: los_by_delay_hours(encounters)?,
        los_by_therapeutic_class: los_by_therapeutic_class(orders)?,
        missing_documentation: missing_documentation(encounters)?,
    };

    debug!(
        los_count = report.los.count,
        categories = report.los_by_diagnosis_category.len(),
        therapeutic_classes = report.los_by_therapeutic_class.len(),
        duration_ms = start.elapsed().as_millis(),
        "metrics computed"
    );
    Ok(report)
}
