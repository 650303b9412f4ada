use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use hosp_common::format_numeric;
use hosp_model::GroupStats;

use crate::types::RunResult;

pub fn print_summary(result: &RunResult) {
    if result.dry_run {
        println!("Dry run: nothing was written");
    } else {
        println!("Output: {}", result.output_dir.display());
        for path in &result.outputs {
            println!("  {}", path.display());
        }
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Table"),
        header_cell("Source"),
        header_cell("Rows"),
        header_cell("Columns"),
        header_cell("Persisted"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    for source in &result.sources {
        table.add_row(vec![
            Cell::new(source.table.table_name())
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(source.table.file_name()),
            Cell::new(source.rows),
            Cell::new(source.columns),
            persisted_cell(source.persisted),
        ]);
    }
    table.add_row(vec![
        Cell::new(hosp_model::ENCOUNTERS_TABLE)
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("derived"),
        Cell::new(result.encounters).add_attribute(Attribute::Bold),
        dim_cell("-"),
        persisted_cell(result.encounters_persisted),
    ]);
    println!("{table}");

    let stats = &result.normalize;
    println!(
        "Admissions: {} in, {} duplicates removed, {} zero-filled LOS, {} unparseable dates, {} implausible LOS voided",
        stats.input_rows,
        stats.duplicates_removed,
        stats.zero_filled,
        stats.unparseable_dates,
        stats.voided
    );
    let missing = &result.report.missing_documentation;
    println!(
        "Missing documentation: progress notes {} ({:.1}%), discharge summaries {} ({:.1}%) across {} encounters",
        missing.missing_progress_note,
        missing.missing_progress_note_pct,
        missing.missing_discharge_summary,
        missing.missing_discharge_summary_pct,
        missing.distinct_encounters
    );

    print_group_table("LOS by diagnosis category", &result.report.los_by_diagnosis_category);
    print_group_table("LOS by documentation delay", &result.report.los_by_delay_bucket);
    print_warnings(result);

    if let Some(error) = &result.database_error {
        eprintln!("Database error: {error}");
    }
}

fn print_group_table(title: &str, groups: &[GroupStats]) {
    if groups.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Group"),
        header_cell("Mean LOS"),
        header_cell("Median LOS"),
        header_cell("Count"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for group in groups {
        table.add_row(vec![
            Cell::new(&group.key),
            stat_cell(group.mean),
            stat_cell(group.median),
            Cell::new(group.count),
        ]);
    }
    println!();
    println!("{title}:");
    println!("{table}");
}

fn print_warnings(result: &RunResult) {
    if result.warnings.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Join"),
        header_cell("Key"),
        header_cell("Duplicate keys"),
        header_cell("Extra rows"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for warning in &result.warnings {
        table.add_row(vec![
            Cell::new(&warning.join).fg(Color::Yellow),
            Cell::new(&warning.key),
            Cell::new(warning.duplicate_keys).fg(Color::Yellow),
            count_cell(warning.extra_rows, Color::Yellow),
        ]);
    }
    println!();
    println!("Warnings:");
    println!("{table}");
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn persisted_cell(rows: Option<usize>) -> Cell {
    match rows {
        Some(rows) => Cell::new(rows).fg(Color::Green),
        None => dim_cell("-"),
    }
}

fn stat_cell(value: Option<f64>) -> Cell {
    match value {
        Some(value) => Cell::new(format_numeric((value * 100.0).round() / 100.0)),
        None => dim_cell("-"),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
