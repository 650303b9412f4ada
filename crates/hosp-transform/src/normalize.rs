//! Patient/admission normalization.
//!
//! Types the admission extract's date columns, derives length of stay (LOS)
//! and then removes rows that are exact duplicates of an earlier row. The
//! policy for odd rows is lopsided and kept as the business owners set it:
//!
//! - a missing admission or discharge date yields `LOS = 0`;
//! - a date that is present but unreadable yields a null LOS;
//! - a computed LOS below -1 is voided to null, while -1 itself is kept.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use polars::prelude::{
    BooleanChunked, Column, DataFrame, DataType, NamedFrom, NewChunkedArray, Series,
};
use tracing::{debug, info_span, warn};

use hosp_common::{any_to_i64, any_to_key, column_names, date_to_days, has_column, row_fingerprint};
use hosp_model::columns::{ADMISSION_DATE, DISCHARGE_DATE, ENCOUNTER_ID, LOS};
use hosp_model::{CardinalityWarning, SchemaError, SourceTable};

use crate::dates::DateCell;
use crate::error::Result;

/// LOS values below this are treated as data-entry errors.
pub const MIN_PLAUSIBLE_LOS: i64 = -1;

/// How one row's LOS was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LosOutcome {
    /// Both dates present; value is discharge minus admission in days.
    Computed(i64),
    /// A date was missing; zero-filled.
    ZeroFilled,
    /// Computed value fell below [`MIN_PLAUSIBLE_LOS`]; voided.
    Voided(i64),
    /// A date could not be parsed.
    Unparseable,
}

impl LosOutcome {
    pub fn value(self) -> Option<i64> {
        match self {
            LosOutcome::Computed(days) => Some(days),
            LosOutcome::ZeroFilled => Some(0),
            LosOutcome::Voided(_) | LosOutcome::Unparseable => None,
        }
    }
}

/// Resolves LOS for one pair of date cells.
pub fn length_of_stay(admission: DateCell, discharge: DateCell) -> LosOutcome {
    match (admission, discharge) {
        (DateCell::Invalid, _) | (_, DateCell::Invalid) => LosOutcome::Unparseable,
        (DateCell::Valid(admitted), DateCell::Valid(discharged)) => {
            let days = (discharged - admitted).num_days();
            if days < MIN_PLAUSIBLE_LOS {
                LosOutcome::Voided(days)
            } else {
                LosOutcome::Computed(days)
            }
        }
        _ => LosOutcome::ZeroFilled,
    }
}

/// Counters describing what normalization changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    pub input_rows: usize,
    pub output_rows: usize,
    pub duplicates_removed: usize,
    pub unparseable_dates: usize,
    pub zero_filled: usize,
    pub voided: usize,
}

/// The normalized admission table.
#[derive(Debug, Clone)]
pub struct NormalizedAdmissions {
    pub data: DataFrame,
    pub stats: NormalizeStats,
    /// Set when `encounter_id` is still repeated after exact-duplicate removal.
    pub warning: Option<CardinalityWarning>,
}

/// Normalizes the raw admission table.
///
/// Returns a new frame; `raw` is left untouched. Fails only when one of the
/// required admission columns is absent.
pub fn normalize(raw: &DataFrame) -> Result<NormalizedAdmissions> {
    let span = info_span!("normalize", rows = raw.height());
    let _guard = span.enter();
    let start = Instant::now();

    let table = SourceTable::Admissions;
    SchemaError::check(
        table.table_name(),
        &column_names(raw),
        table.required_columns(),
    )?;

    let admissions = classify_dates(raw, ADMISSION_DATE)?;
    let discharges = classify_dates(raw, DISCHARGE_DATE)?;
    let outcomes: Vec<LosOutcome> = admissions
        .iter()
        .zip(discharges.iter())
        .map(|(admission, discharge)| length_of_stay(*admission, *discharge))
        .collect();

    let mut typed = raw.clone();
    typed.with_column(date_column(ADMISSION_DATE, &admissions)?)?;
    typed.with_column(date_column(DISCHARGE_DATE, &discharges)?)?;
    typed.with_column(Column::new(
        LOS.into(),
        outcomes.iter().map(|outcome| outcome.value()).collect::<Vec<_>>(),
    ))?;

    // Rows that only differ in how a date was spelled collapse here.
    let keep = first_occurrences(&typed)?;
    let duplicates_removed = keep.iter().filter(|kept| !**kept).count();
    let mut stats = NormalizeStats {
        input_rows: raw.height(),
        output_rows: raw.height() - duplicates_removed,
        duplicates_removed,
        ..NormalizeStats::default()
    };
    for (outcome, _) in outcomes.iter().zip(&keep).filter(|(_, kept)| **kept) {
        match outcome {
            LosOutcome::ZeroFilled => stats.zero_filled += 1,
            LosOutcome::Voided(_) => stats.voided += 1,
            LosOutcome::Unparseable => stats.unparseable_dates += 1,
            LosOutcome::Computed(_) => {}
        }
    }

    let df = if duplicates_removed == 0 {
        typed
    } else {
        typed.filter(&BooleanChunked::from_slice("dedupe".into(), &keep))?
    };

    let warning = duplicate_encounters(&df)?;

    debug!(
        input_rows = stats.input_rows,
        output_rows = stats.output_rows,
        duplicates_removed = stats.duplicates_removed,
        unparseable_dates = stats.unparseable_dates,
        zero_filled = stats.zero_filled,
        voided = stats.voided,
        duration_ms = start.elapsed().as_millis(),
        "normalization complete"
    );

    Ok(NormalizedAdmissions {
        data: df,
        stats,
        warning,
    })
}

/// `true` for the first row of each group of rows equal in every column.
fn first_occurrences(df: &DataFrame) -> Result<Vec<bool>> {
    let mut seen = HashSet::with_capacity(df.height());
    let mut keep = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        keep.push(seen.insert(row_fingerprint(df, idx)?));
    }
    Ok(keep)
}

/// Classifies every cell of a date column.
///
/// A frame that has already been through [`normalize`] carries typed date
/// columns, where an unreadable source date shows up as null. Such a row
/// also carries a null LOS, and that is what keeps it voided on a second
/// pass instead of being mistaken for a missing date.
fn classify_dates(df: &DataFrame, name: &str) -> Result<Vec<DateCell>> {
    let column = df.column(name)?;
    let typed = matches!(column.dtype(), DataType::Date);
    let prior_los = if typed && has_column(df, LOS) {
        Some(df.column(LOS)?)
    } else {
        None
    };

    let mut cells = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let mut cell = DateCell::from_any(column.get(idx)?);
        if cell == DateCell::Missing {
            if let Some(prior) = prior_los {
                if any_to_i64(prior.get(idx)?).is_none() {
                    cell = DateCell::Invalid;
                }
            }
        }
        cells.push(cell);
    }
    Ok(cells)
}

fn date_column(name: &str, cells: &[DateCell]) -> Result<Column> {
    let days: Vec<Option<i32>> = cells
        .iter()
        .map(|cell| cell.date().map(date_to_days))
        .collect();
    let series = Series::new(name.into(), days).cast(&DataType::Date)?;
    Ok(series.into())
}

fn duplicate_encounters(df: &DataFrame) -> Result<Option<CardinalityWarning>> {
    let column = df.column(ENCOUNTER_ID)?;
    let mut counts: HashMap<String, usize> = HashMap::new();
    for idx in 0..df.height() {
        if let Some(key) = any_to_key(column.get(idx)?) {
            *counts.entry(key).or_default() += 1;
        }
    }
    let duplicate_keys = counts.values().filter(|count| **count > 1).count();
    if duplicate_keys == 0 {
        return Ok(None);
    }
    let extra_rows = counts.values().map(|count| count - 1).sum();
    warn!(
        duplicate_keys,
        extra_rows, "encounter_id repeated after removing exact duplicates"
    );
    Ok(Some(CardinalityWarning {
        join: "admissions".to_string(),
        key: ENCOUNTER_ID.to_string(),
        duplicate_keys,
        extra_rows,
    }))
}
