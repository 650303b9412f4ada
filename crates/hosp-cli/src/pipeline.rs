//! Hospital operations pipeline with explicit stages.
//!
//! The pipeline follows these stages in order:
//! 1. **Ingest**: read the four source extracts, checking headers first
//! 2. **Transform**: normalize admissions, reconcile, bucket delays
//! 3. **Report**: LOS and documentation metrics
//! 4. **Derive**: sanitize the encounter table for export
//! 5. **Persist**: write tables to the relational store
//! 6. **Export**: write the flat dataset and the metrics report
//!
//! Each stage takes the output of the previous stage and returns typed results.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use polars::prelude::DataFrame;
use tracing::{debug, info, info_span, trace, warn};

use hosp_common::{any_to_key, has_column};
use hosp_ingest::{SourceFrames, load_sources};
use hosp_model::columns::{DIAGNOSIS_CODE, ENCOUNTER_ID};
use hosp_model::{
    CardinalityWarning, DatabaseConfig, ENCOUNTERS_TABLE, FINAL_DATASET_FILE, METRICS_REPORT_FILE,
    MetricsReport, PersistMode, SourceTable,
};
use hosp_output::{export_csv, open_database, persist, write_metrics_json};
use hosp_report::build_report;
use hosp_transform::{
    NormalizedAdmissions, add_delay_buckets, aggregate_medications, normalize, reconcile,
    reconcile_with_orders, sanitize,
};

use crate::logging::redact_value;

// ============================================================================
// Stage 1: Ingest
// ============================================================================

/// Load every source table from `data_dir`.
pub fn ingest(data_dir: &Path) -> Result<SourceFrames> {
    let span = info_span!("ingest", data_dir = %data_dir.display());
    let _guard = span.enter();
    let start = Instant::now();

    let sources = load_sources(data_dir)
        .with_context(|| format!("load sources from {}", data_dir.display()))?;
    for source in sources.iter() {
        let (rows, columns) = source.shape();
        info!(table = %source.table, rows, columns, "source table loaded");
    }
    debug!(duration_ms = start.elapsed().as_millis(), "ingest complete");
    Ok(sources)
}

// ============================================================================
// Stage 2: Transform
// ============================================================================

/// Frames produced by the transform stage.
#[derive(Debug)]
pub struct TransformResult {
    pub normalized: NormalizedAdmissions,
    /// Encounter-level table with delay buckets, before sanitization.
    pub encounters: DataFrame,
    /// One row per medication order, for per-class metrics.
    pub orders: DataFrame,
    pub warnings: Vec<CardinalityWarning>,
}

/// Normalize admissions and reconcile them with the other sources.
pub fn transform(sources: &SourceFrames) -> Result<TransformResult> {
    let span = info_span!("transform");
    let _guard = span.enter();

    let normalized = normalize(&sources.admissions.data).context("normalize admissions")?;
    let mut warnings: Vec<CardinalityWarning> = normalized.warning.iter().cloned().collect();

    let med_counts =
        aggregate_medications(&sources.medications.data).context("aggregate medications")?;
    let reconciled = reconcile(
        &normalized.data,
        &sources.diagnoses.data,
        &sources.documentation.data,
        &med_counts,
    )
    .context("reconcile encounters")?;
    warnings.extend(reconciled.warnings);

    let orders = reconcile_with_orders(
        &normalized.data,
        &sources.diagnoses.data,
        &sources.documentation.data,
        &sources.medications.data,
    )
    .context("join medication orders")?;

    let encounters = add_delay_buckets(&reconciled.data).context("bucket delays")?;
    trace_unmatched_diagnoses(&encounters)?;

    info!(
        admissions = normalized.data.height(),
        encounters = encounters.height(),
        warnings = warnings.len(),
        "transform complete"
    );
    Ok(TransformResult {
        normalized,
        encounters,
        orders: orders.data,
        warnings,
    })
}

fn trace_unmatched_diagnoses(encounters: &DataFrame) -> Result<()> {
    if !tracing::enabled!(tracing::Level::TRACE) || !has_column(encounters, DIAGNOSIS_CODE) {
        return Ok(());
    }
    let ids = encounters.column(ENCOUNTER_ID)?;
    let codes = encounters.column(DIAGNOSIS_CODE)?;
    for idx in 0..encounters.height() {
        if any_to_key(codes.get(idx)?).is_none() {
            let id = any_to_key(ids.get(idx)?).unwrap_or_default();
            trace!(encounter_id = redact_value(&id), "no diagnosis catalog entry");
        }
    }
    Ok(())
}

// ============================================================================
// Stage 3: Report
// ============================================================================

pub fn report(transformed: &TransformResult) -> Result<MetricsReport> {
    build_report(&transformed.encounters, &transformed.orders).context("compute metrics")
}

// ============================================================================
// Stage 4: Derive
// ============================================================================

/// Sanitized encounter table, ready for persistence and export.
pub fn finalize(transformed: &TransformResult) -> Result<DataFrame> {
    let span = info_span!("derive", rows = transformed.encounters.height());
    let _guard = span.enter();
    sanitize(&transformed.encounters).context("sanitize encounters")
}

// ============================================================================
// Stage 5: Persist
// ============================================================================

/// Rows written per table by the persist stage.
#[derive(Debug, Default)]
pub struct PersistResult {
    pub tables: Vec<(String, usize)>,
    /// Sink failure; the flat-file outputs are still written.
    pub database_error: Option<String>,
}

impl PersistResult {
    pub fn rows_for(&self, table: &str) -> Option<usize> {
        self.tables
            .iter()
            .find(|(name, _)| name == table)
            .map(|(_, rows)| *rows)
    }
}

/// Write the four source tables and the encounter table.
///
/// The admission table is stored in its normalized form. A sink failure,
/// whether the database cannot be reached or a table write is rejected, is
/// reported in the result rather than failing the run; tables written before
/// the failure stay committed and later ones are skipped.
pub fn persist_tables(
    database: &DatabaseConfig,
    mode: PersistMode,
    sources: &SourceFrames,
    normalized: &DataFrame,
    encounters: &DataFrame,
) -> PersistResult {
    let span = info_span!("persist", path = %database.path.display());
    let _guard = span.enter();

    let mut result = PersistResult::default();
    let mut conn = match open_database(database) {
        Ok(conn) => conn,
        Err(error) => {
            warn!(%error, "relational store unavailable; continuing with flat-file outputs");
            result.database_error = Some(error.to_string());
            return result;
        }
    };

    let tables = SourceTable::ALL
        .into_iter()
        .map(|table| {
            let frame = match table {
                SourceTable::Admissions => normalized,
                other => &sources.get(other).data,
            };
            (table.table_name(), frame)
        })
        .chain(std::iter::once((ENCOUNTERS_TABLE, encounters)));
    for (table, frame) in tables {
        match persist(&mut conn, frame, table, mode) {
            Ok(rows) => result.tables.push((table.to_string(), rows)),
            Err(error) => {
                warn!(table, %error, "table write failed; skipping remaining tables");
                result.database_error = Some(error.to_string());
                break;
            }
        }
    }
    result
}

// ============================================================================
// Stage 6: Export
// ============================================================================

/// Write the flat dataset and the metrics report; returns the paths written.
pub fn export(
    output_dir: &Path,
    encounters: &DataFrame,
    report: &MetricsReport,
) -> Result<Vec<PathBuf>> {
    let span = info_span!("export", output_dir = %output_dir.display());
    let _guard = span.enter();

    let dataset = output_dir.join(FINAL_DATASET_FILE);
    export_csv(encounters, &dataset).context("write final dataset")?;
    let metrics = output_dir.join(METRICS_REPORT_FILE);
    write_metrics_json(report, &metrics).context("write metrics report")?;
    Ok(vec![dataset, metrics])
}
