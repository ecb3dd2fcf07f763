//! Polars frames for the persisted tables.

use chrono::NaiveDate;
use polars::prelude::{Column, DataFrame, DataType, Field, NamedFrom, PolarsResult, Schema};

use mpow_model::{DailySummary, Measurement, SubjectDetail};

use crate::store::{DAILY_TABLE, DETAIL_TABLE, MEASUREMENTS_TABLE};

/// Column order of the measurements table.
pub const MEASUREMENT_COLUMNS: [&str; 7] = [
    "subject_id",
    "date",
    "day_num",
    "slot_index",
    "measurement_type",
    "value",
    "unit",
];

/// Dates as a polars `Date` column (days since 1970-01-01).
fn date_column(name: &str, dates: impl Iterator<Item = NaiveDate>) -> PolarsResult<Column> {
    // NaiveDate's default is the unix epoch.
    let epoch = NaiveDate::default();
    let days: Vec<i32> = dates
        .map(|date| (date - epoch).num_days() as i32)
        .collect();
    Column::new(name.into(), days).cast(&DataType::Date)
}

pub fn measurements_frame(measurements: &[Measurement]) -> PolarsResult<DataFrame> {
    let subject: Vec<&str> = measurements.iter().map(|m| m.subject_id.as_str()).collect();
    let day_num: Vec<u32> = measurements.iter().map(|m| m.day_num).collect();
    let slot: Vec<Option<u32>> = measurements.iter().map(Measurement::slot_index).collect();
    let kind: Vec<&str> = measurements
        .iter()
        .map(|m| m.measurement_type.as_str())
        .collect();
    let value: Vec<Option<f64>> = measurements.iter().map(|m| m.value).collect();
    let unit: Vec<&str> = measurements.iter().map(|m| m.unit.as_str()).collect();

    DataFrame::new(vec![
        Column::new(MEASUREMENT_COLUMNS[0].into(), subject),
        date_column(MEASUREMENT_COLUMNS[1], measurements.iter().map(|m| m.date))?,
        Column::new(MEASUREMENT_COLUMNS[2].into(), day_num),
        Column::new(MEASUREMENT_COLUMNS[3].into(), slot),
        Column::new(MEASUREMENT_COLUMNS[4].into(), kind),
        Column::new(MEASUREMENT_COLUMNS[5].into(), value),
        Column::new(MEASUREMENT_COLUMNS[6].into(), unit),
    ])
}

pub fn daily_frame(days: &[DailySummary]) -> PolarsResult<DataFrame> {
    let subject: Vec<&str> = days.iter().map(|d| d.subject_id.as_str()).collect();
    let day_num: Vec<u32> = days.iter().map(|d| d.day_num).collect();
    let pain_observations: Vec<u32> = days.iter().map(|d| d.pain_observations).collect();
    let pain_sum: Vec<Option<f64>> = days.iter().map(|d| d.pain_sum).collect();
    let pain_mean: Vec<Option<f64>> = days.iter().map(|d| d.pain_mean).collect();
    let dose_observations: Vec<u32> = days.iter().map(|d| d.dose_observations).collect();
    let dose_total: Vec<Option<f64>> = days.iter().map(|d| d.dose_total).collect();

    DataFrame::new(vec![
        Column::new("subject_id".into(), subject),
        date_column("date", days.iter().map(|d| d.date))?,
        Column::new("day_num".into(), day_num),
        Column::new("pain_observations".into(), pain_observations),
        Column::new("pain_sum".into(), pain_sum),
        Column::new("pain_mean".into(), pain_mean),
        Column::new("dose_observations".into(), dose_observations),
        Column::new("dose_total".into(), dose_total),
    ])
}

pub fn detail_frame(details: &[SubjectDetail]) -> PolarsResult<DataFrame> {
    let subject: Vec<&str> = details.iter().map(|d| d.subject_id.as_str()).collect();
    let age: Vec<Option<u32>> = details.iter().map(|d| d.age_at_admit).collect();
    let gender: Vec<Option<&str>> = details.iter().map(|d| d.gender.as_deref()).collect();
    let group: Vec<Option<&str>> = details
        .iter()
        .map(|d| d.impairment_group.as_deref())
        .collect();
    let depression: Vec<Option<bool>> = details.iter().map(|d| d.depression).collect();

    DataFrame::new(vec![
        Column::new("subject_id".into(), subject),
        Column::new("age_at_admit".into(), age),
        Column::new("gender".into(), gender),
        Column::new("impairment_group".into(), group),
        Column::new("depression".into(), depression),
    ])
}

/// Column types of a persisted table, for readers that cannot recover them
/// from the file (CSV). `None` for an unknown table name.
pub fn table_schema(name: &str) -> Option<Schema> {
    let columns: &[(&str, DataType)] = match name {
        MEASUREMENTS_TABLE => &[
            ("subject_id", DataType::String),
            ("date", DataType::Date),
            ("day_num", DataType::UInt32),
            ("slot_index", DataType::UInt32),
            ("measurement_type", DataType::String),
            ("value", DataType::Float64),
            ("unit", DataType::String),
        ],
        DAILY_TABLE => &[
            ("subject_id", DataType::String),
            ("date", DataType::Date),
            ("day_num", DataType::UInt32),
            ("pain_observations", DataType::UInt32),
            ("pain_sum", DataType::Float64),
            ("pain_mean", DataType::Float64),
            ("dose_observations", DataType::UInt32),
            ("dose_total", DataType::Float64),
        ],
        DETAIL_TABLE => &[
            ("subject_id", DataType::String),
            ("age_at_admit", DataType::UInt32),
            ("gender", DataType::String),
            ("impairment_group", DataType::String),
            ("depression", DataType::Boolean),
        ],
        _ => return None,
    };
    Some(Schema::from_iter(
        columns
            .iter()
            .map(|(column, dtype)| Field::new((*column).into(), dtype.clone())),
    ))
}
