//! Encounter-level reconciliation.
//!
//! Joins normalized admissions with the diagnosis catalog, documentation logs
//! and medication counts. Every join is a left join, so no admission is ever
//! dropped; fan-out from duplicate right keys is kept and reported.

use std::collections::HashMap;
use std::time::Instant;

use polars::prelude::{Column, DataFrame};
use tracing::{debug, info_span};

use hosp_common::{any_to_i64, column_keys, column_names};
use hosp_model::columns::{DIAGNOSIS_CODE, ENCOUNTER_ID, MED_COUNT, PRIMARY_DIAGNOSIS_CODE};
use hosp_model::{CardinalityWarning, ENCOUNTERS_TABLE, SchemaError, SourceTable};

use crate::error::Result;
use crate::join::{JoinSide, RightKey, left_join};

/// Output of the reconciliation joins.
#[derive(Debug, Clone)]
pub struct Reconciled {
    pub data: DataFrame,
    pub warnings: Vec<CardinalityWarning>,
}

/// Counts medication orders per encounter.
///
/// Output has one row per distinct non-blank `encounter_id`, in order of first
/// appearance, with `med_count` as Int64. Orders without an encounter are
/// skipped.
pub fn aggregate_medications(medications: &DataFrame) -> Result<DataFrame> {
    let table = SourceTable::Medications;
    SchemaError::check(table.table_name(), &column_names(medications), &[ENCOUNTER_ID])?;

    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, i64> = HashMap::new();
    for key in column_keys(medications, ENCOUNTER_ID)?.into_iter().flatten() {
        let count = counts.entry(key.clone()).or_insert_with(|| {
            order.push(key);
            0
        });
        *count += 1;
    }

    let med_counts: Vec<i64> = order
        .iter()
        .map(|key| counts.get(key).copied().unwrap_or_default())
        .collect();
    let df = DataFrame::new(vec![
        Column::new(ENCOUNTER_ID.into(), order),
        Column::new(MED_COUNT.into(), med_counts),
    ])?;
    debug!(
        orders = medications.height(),
        encounters = df.height(),
        "aggregated medication orders"
    );
    Ok(df)
}

/// Builds the encounter-level table.
///
/// `med_counts` is the output of [`aggregate_medications`]. Encounters with
/// no medication orders get `med_count = 0`.
pub fn reconcile(
    admissions: &DataFrame,
    diagnoses: &DataFrame,
    documentation: &DataFrame,
    med_counts: &DataFrame,
) -> Result<Reconciled> {
    let span = info_span!("reconcile", admissions = admissions.height());
    let _guard = span.enter();
    let start = Instant::now();

    let mut warnings = Vec::new();
    let with_docs = join_diagnoses_and_docs(admissions, diagnoses, documentation, &mut warnings)?;

    let joined = left_join(
        "medication_counts",
        JoinSide::new(ENCOUNTERS_TABLE, &with_docs, ENCOUNTER_ID),
        JoinSide::new(SourceTable::Medications.table_name(), med_counts, ENCOUNTER_ID),
        RightKey::Drop,
    )?;
    warnings.extend(joined.warning);
    let mut data = joined.data;
    fill_med_count(&mut data)?;

    debug!(
        rows = data.height(),
        columns = data.width(),
        warnings = warnings.len(),
        duration_ms = start.elapsed().as_millis(),
        "reconciliation complete"
    );
    Ok(Reconciled { data, warnings })
}

/// Joins admissions with diagnoses, documentation and the raw medication
/// orders.
///
/// One row per order (or one row with null order fields for an encounter
/// without orders), keeping `therapeutic_class` for reporting.
pub fn reconcile_with_orders(
    admissions: &DataFrame,
    diagnoses: &DataFrame,
    documentation: &DataFrame,
    medications: &DataFrame,
) -> Result<Reconciled> {
    let span = info_span!("reconcile_with_orders", admissions = admissions.height());
    let _guard = span.enter();

    let mut warnings = Vec::new();
    let with_docs = join_diagnoses_and_docs(admissions, diagnoses, documentation, &mut warnings)?;

    let joined = left_join(
        "medication_orders",
        JoinSide::new(ENCOUNTERS_TABLE, &with_docs, ENCOUNTER_ID),
        JoinSide::new(SourceTable::Medications.table_name(), medications, ENCOUNTER_ID),
        RightKey::Drop,
    )?;
    // Many orders per encounter is the expected shape here, not a hazard.
    debug!(rows = joined.data.height(), "joined raw medication orders");
    Ok(Reconciled {
        data: joined.data,
        warnings,
    })
}

fn join_diagnoses_and_docs(
    admissions: &DataFrame,
    diagnoses: &DataFrame,
    documentation: &DataFrame,
    warnings: &mut Vec<CardinalityWarning>,
) -> Result<DataFrame> {
    let with_diagnoses = left_join(
        "diagnoses",
        JoinSide::new(
            SourceTable::Admissions.table_name(),
            admissions,
            PRIMARY_DIAGNOSIS_CODE,
        ),
        JoinSide::new(SourceTable::Diagnoses.table_name(), diagnoses, DIAGNOSIS_CODE),
        RightKey::Keep,
    )?;
    warnings.extend(with_diagnoses.warning);

    let with_docs = left_join(
        "documentation",
        JoinSide::new(ENCOUNTERS_TABLE, &with_diagnoses.data, ENCOUNTER_ID),
        JoinSide::new(
            SourceTable::Documentation.table_name(),
            documentation,
            ENCOUNTER_ID,
        ),
        RightKey::Drop,
    )?;
    warnings.extend(with_docs.warning);
    Ok(with_docs.data)
}

fn fill_med_count(df: &mut DataFrame) -> Result<()> {
    let column = df.column(MED_COUNT)?;
    let mut filled = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        filled.push(any_to_i64(column.get(idx)?).unwrap_or(0));
    }
    df.with_column(Column::new(MED_COUNT.into(), filled))?;
    Ok(())
}
