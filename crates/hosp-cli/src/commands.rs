use anyhow::{Context, Result};
use comfy_table::Table;
use tracing::{info, info_span};

use hosp_model::SourceTable;

use crate::pipeline::{export, finalize, ingest, persist_tables, report, transform};
use crate::summary::apply_table_style;
use crate::types::{PipelineConfig, RunResult, SourceSummary};

/// Print the expected source files and their required columns.
pub fn run_schema() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["Table", "File", "Required columns"]);
    apply_table_style(&mut table);
    for source in SourceTable::ALL {
        table.add_row(vec![
            source.table_name().to_string(),
            source.file_name().to_string(),
            source.required_columns().join(", "),
        ]);
    }
    println!("{table}");
    Ok(())
}

/// Run every stage for one data directory.
pub fn run_pipeline(config: &PipelineConfig) -> Result<RunResult> {
    let span = info_span!("run", data_dir = %config.data_dir.display(), dry_run = config.dry_run);
    let _guard = span.enter();

    // =========================================================================
    // Stage 1-4: Load, transform, measure, sanitize
    // =========================================================================
    let sources = ingest(&config.data_dir)?;
    let transformed = transform(&sources)?;
    let metrics = report(&transformed)?;
    let encounters = finalize(&transformed)?;

    let mut result = RunResult {
        output_dir: config.output_dir.clone(),
        sources: sources
            .iter()
            .map(|source| {
                let (rows, columns) = source.shape();
                SourceSummary {
                    table: source.table,
                    path: source.path.clone(),
                    rows,
                    columns,
                    persisted: None,
                }
            })
            .collect(),
        normalize: transformed.normalized.stats,
        encounters: encounters.height(),
        encounters_persisted: None,
        warnings: transformed.warnings.clone(),
        report: metrics,
        outputs: Vec::new(),
        database_error: None,
        dry_run: config.dry_run,
    };

    if config.dry_run {
        info!("dry run: skipping persistence and export");
        return Ok(result);
    }

    // =========================================================================
    // Stage 5: Persist
    // =========================================================================
    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("create {}", config.output_dir.display()))?;
    if let Some(database) = &config.database {
        let persisted = persist_tables(
            database,
            config.persist_mode,
            &sources,
            &transformed.normalized.data,
            &encounters,
        );
        for source in &mut result.sources {
            source.persisted = persisted.rows_for(source.table.table_name());
        }
        result.encounters_persisted = persisted.rows_for(hosp_model::ENCOUNTERS_TABLE);
        result.database_error = persisted.database_error;
    }

    // =========================================================================
    // Stage 6: Export
    // =========================================================================
    result.outputs = export(&config.output_dir, &encounters, &result.report)?;
    Ok(result)
}
