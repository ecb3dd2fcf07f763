use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use mpow_layout::MeasureColumn;
use mpow_model::IntegrityIssue;
use mpow_output::Manifest;

use mpow_cli::types::{InspectResult, IntegrityResult, NormalizeResult};

pub fn print_normalize(result: &NormalizeResult) {
    println!("Sheet: {}", result.sheet.display());
    match &result.manifest {
        Some(_) => println!("Output: {}", result.output_dir.display()),
        None => println!("Output: {} (dry run, nothing written)", result.output_dir.display()),
    }

    let mut table = Table::new();
    table.set_header(vec![header_cell("Measure"), header_cell("Value")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    table.add_row(vec![Cell::new("Subject-days"), Cell::new(result.rows)]);
    table.add_row(vec![Cell::new("Subjects"), Cell::new(result.subjects)]);
    table.add_row(vec![Cell::new("Intraday slots"), Cell::new(result.slots)]);
    table.add_row(vec![Cell::new("Measurements"), Cell::new(result.measurements)]);
    table.add_row(vec![
        Cell::new("Empty cells"),
        count_cell(result.missing, Color::Yellow),
    ]);
    table.add_row(vec![Cell::new("Daily rows"), Cell::new(result.daily_rows)]);
    table.add_row(vec![
        Cell::new("Detail rows"),
        result.detail_rows.map_or_else(|| dim_cell("-"), Cell::new),
    ]);
    table.add_row(vec![
        Cell::new("Integrity issues"),
        count_cell(result.integrity.len(), Color::Yellow),
    ]);
    println!("{table}");

    if let Some(manifest) = &result.manifest {
        print_manifest(manifest);
    }
    print_integrity_issues(&result.integrity);
}

pub fn print_inspect(result: &InspectResult) {
    let schema = &result.schema;
    println!("Sheet: {}", result.sheet.display());
    println!(
        "Subject column: {} | Date column: {} | Rows: {}",
        schema.subject_name, schema.date_name, result.rows
    );
    if !schema.ignored_columns.is_empty() {
        println!("Ignored: {}", schema.ignored_columns.join(", "));
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Column"),
        header_cell("Type"),
        header_cell("Slot"),
        header_cell("Unit"),
        header_cell("Range"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Center);
    for column in &schema.measure_columns {
        table.add_row(vec![
            Cell::new(column.index + 1),
            Cell::new(&column.name),
            Cell::new(column.measurement_type.as_str()),
            Cell::new(column.slot),
            Cell::new(&column.unit),
            range_cell(column),
        ]);
    }
    println!("{table}");
    println!(
        "{} measurements per subject-day",
        schema.cells_per_row()
    );
}

pub fn print_integrity(result: &IntegrityResult) {
    println!("Sheet: {}", result.sheet.display());
    if result.issues.is_empty() {
        println!(
            "All {} subjects have matching pain and dose day counts.",
            result.subjects
        );
        return;
    }
    print_integrity_issues(&result.issues);
}

fn print_manifest(manifest: &Manifest) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Table"),
        header_cell("File"),
        header_cell("Rows"),
        header_cell("SHA-256"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for entry in &manifest.tables {
        table.add_row(vec![
            Cell::new(&entry.name).add_attribute(Attribute::Bold),
            Cell::new(&entry.file),
            Cell::new(entry.rows),
            dim_cell(&entry.sha256[..entry.sha256.len().min(12)]),
        ]);
    }
    println!();
    println!("Tables:");
    println!("{table}");
}

fn print_integrity_issues(issues: &[IntegrityIssue]) {
    if issues.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Subject"),
        header_cell("Pain days"),
        header_cell("Dose days"),
        header_cell("Difference"),
    ]);
    apply_table_style(&mut table);
    for column in 1..4 {
        align_column(&mut table, column, CellAlignment::Right);
    }
    for issue in issues {
        table.add_row(vec![
            Cell::new(issue.subject_id.as_str()).add_attribute(Attribute::Bold),
            Cell::new(issue.pain_days),
            Cell::new(issue.dose_days),
            Cell::new(format!("{:+}", issue.difference())).fg(Color::Yellow),
        ]);
    }
    println!();
    println!("Integrity issues:");
    println!("{table}");
}

fn range_cell(column: &MeasureColumn) -> Cell {
    match (column.min, column.max) {
        (Some(min), Some(max)) => Cell::new(format!("{min} to {max}")),
        (Some(min), None) => Cell::new(format!(">= {min}")),
        (None, Some(max)) => Cell::new(format!("<= {max}")),
        (None, None) => dim_cell("-"),
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value.to_string()).add_attribute(Attribute::Dim)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn apply_table_style(table: &mut Table) {
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
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(80);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}
