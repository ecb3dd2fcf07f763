//! Pivoted sheet to long-form measurements.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::Instant;

use chrono::NaiveDate;
use mpow_ingest::{RawRow, RawSheet};
use mpow_layout::{MeasureColumn, SheetLayout, SheetSchema};
use mpow_model::{Measurement, SubjectId};
use tracing::{debug, info, info_span};

use crate::error::{NormalizeError, ParseError, ParseErrorKind, Result};
use crate::parse::{NumericCell, parse_date, parse_numeric};

/// Long-form contents of one pivoted sheet.
#[derive(Debug, Clone)]
pub struct NormalizedSheet {
    pub schema: SheetSchema,
    /// Data rows read from the sheet (one per subject-day).
    pub row_count: usize,
    /// One record per row and measure column, in output order.
    pub measurements: Vec<Measurement>,
}

impl NormalizedSheet {
    /// Measurements whose source cell was empty.
    pub fn missing_count(&self) -> usize {
        self.measurements.iter().filter(|m| m.is_missing()).count()
    }

    /// Distinct subjects in first-appearance order.
    pub fn subjects(&self) -> Vec<&SubjectId> {
        let mut seen = BTreeSet::new();
        self.measurements
            .iter()
            .map(|m| &m.subject_id)
            .filter(|subject| seen.insert(*subject))
            .collect()
    }
}

/// Normalize a pivoted sheet into measurement records.
///
/// The header is resolved against `layout` first; any row problem aborts
/// the whole sheet so a partial table is never produced.
pub fn normalize_sheet(sheet: &RawSheet, layout: &SheetLayout) -> Result<NormalizedSheet> {
    let span = info_span!("normalize", path = %sheet.path.display());
    let _guard = span.enter();
    let start = Instant::now();

    let schema = SheetSchema::resolve(layout, &sheet.headers)?;

    let measurements = normalize_rows(&schema, &sheet.rows)?;
    info!(
        rows = sheet.row_count(),
        measurements = measurements.len(),
        duration_ms = start.elapsed().as_millis(),
        "normalized sheet"
    );

    Ok(NormalizedSheet {
        schema,
        row_count: sheet.row_count(),
        measurements,
    })
}

/// Normalize rows against an already resolved schema.
///
/// Emits exactly `rows.len() * schema.cells_per_row()` records. Empty cells
/// become records with a null value.
pub fn normalize_rows(schema: &SheetSchema, rows: &[RawRow]) -> Result<Vec<Measurement>> {
    let parsed = rows
        .iter()
        .map(|row| parse_row(schema, row))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    check_duplicates(&parsed)?;
    let day_numbers = number_days(&parsed);

    let mut measurements = Vec::with_capacity(parsed.len() * schema.cells_per_row());
    for row in &parsed {
        let day_num = day_numbers
            .get(&(&row.subject, row.date))
            .copied()
            .unwrap_or(1);
        for (column, value) in schema.measure_columns.iter().zip(&row.values) {
            measurements.push(Measurement {
                subject_id: row.subject.clone(),
                date: row.date,
                day_num,
                slot: column.slot,
                measurement_type: column.measurement_type,
                value: *value,
                unit: column.unit.clone(),
            });
        }
    }
    Ok(measurements)
}

struct ParsedRow {
    line: u64,
    subject: SubjectId,
    date: NaiveDate,
    /// Parallel to `SheetSchema::measure_columns`.
    values: Vec<Option<f64>>,
}

fn parse_row(schema: &SheetSchema, row: &RawRow) -> std::result::Result<ParsedRow, ParseError> {
    if let Some((index, cell)) = row
        .cells
        .iter()
        .enumerate()
        .skip(schema.width)
        .find(|(_, cell)| !cell.is_empty())
    {
        return Err(cell_error(
            row,
            &format!("<column {}>", index + 1),
            cell,
            ParseErrorKind::ExtraCells,
        ));
    }

    let subject_cell = row.cell(schema.subject_index);
    let subject = SubjectId::new(subject_cell).map_err(|_| {
        cell_error(
            row,
            &schema.subject_name,
            subject_cell,
            ParseErrorKind::MissingSubject,
        )
    })?;

    let date_cell = row.cell(schema.date_index);
    if date_cell.is_empty() {
        return Err(cell_error(
            row,
            &schema.date_name,
            date_cell,
            ParseErrorKind::MissingDate,
        ));
    }
    let date = parse_date(date_cell).ok_or_else(|| {
        cell_error(row, &schema.date_name, date_cell, ParseErrorKind::InvalidDate)
    })?;

    let values = schema
        .measure_columns
        .iter()
        .map(|column| parse_measure(row, column))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(ParsedRow {
        line: row.line,
        subject,
        date,
        values,
    })
}

fn parse_measure(
    row: &RawRow,
    column: &MeasureColumn,
) -> std::result::Result<Option<f64>, ParseError> {
    let cell = row.cell(column.index);
    match parse_numeric(cell) {
        NumericCell::Missing => Ok(None),
        NumericCell::Value(value) if column.accepts(value) => Ok(Some(value)),
        NumericCell::Value(_) => Err(cell_error(
            row,
            &column.name,
            cell,
            ParseErrorKind::OutOfRange {
                min: column.min,
                max: column.max,
            },
        )),
        NumericCell::Invalid => Err(cell_error(
            row,
            &column.name,
            cell,
            ParseErrorKind::InvalidNumber,
        )),
    }
}

fn cell_error(row: &RawRow, column: &str, value: &str, kind: ParseErrorKind) -> ParseError {
    ParseError {
        line: row.line,
        column: column.to_string(),
        value: value.to_string(),
        kind,
    }
}

fn check_duplicates(rows: &[ParsedRow]) -> Result<()> {
    let mut first_seen: HashMap<(&SubjectId, NaiveDate), u64> = HashMap::new();
    for row in rows {
        if let Some(first_line) = first_seen.insert((&row.subject, row.date), row.line) {
            return Err(NormalizeError::DuplicateSubjectDay {
                line: row.line,
                first_line,
                subject: row.subject.to_string(),
                date: row.date,
            });
        }
    }
    Ok(())
}

/// Dense 1-based rank of each date within its subject.
fn number_days(rows: &[ParsedRow]) -> HashMap<(&SubjectId, NaiveDate), u32> {
    let mut dates: BTreeMap<&SubjectId, BTreeSet<NaiveDate>> = BTreeMap::new();
    for row in rows {
        dates.entry(&row.subject).or_default().insert(row.date);
    }

    debug!(subjects = dates.len(), "numbering subject days");

    let mut numbers = HashMap::with_capacity(rows.len());
    for (subject, subject_dates) in dates {
        for (date, day_num) in subject_dates.into_iter().zip(1u32..) {
            numbers.insert((subject, date), day_num);
        }
    }
    numbers
}
