//! Date cell parsing.

use std::ops::RangeInclusive;

use chrono::{Datelike, Duration, NaiveDate};

/// Years a study date may fall in. chrono's `%Y` also matches one to three
/// digit years, so `1/2/19` would otherwise parse as 0001-02-19.
pub const YEAR_RANGE: RangeInclusive<i32> = 1900..=2100;

/// Smallest accepted Excel serial day number (1927-05-18). Smaller integers
/// in a date column are years or slot numbers, not dates.
pub const EXCEL_SERIAL_MIN: i64 = 10_000;

/// Largest accepted Excel serial day number (2100-12-31).
pub const EXCEL_SERIAL_MAX: i64 = 73_415;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

/// Parse a date cell.
///
/// Accepts:
/// - `YYYY-MM-DD`, `YYYY/MM/DD`, `MM/DD/YYYY`, `DD.MM.YYYY`
/// - datetimes starting with `YYYY-MM-DD` followed by `T` or a space
/// - Excel serial day numbers in the 1900 date system (`43466` is 2019-01-01),
///   optionally with a fractional time part
///
/// Years outside [`YEAR_RANGE`] and serials outside
/// [`EXCEL_SERIAL_MIN`]..=[`EXCEL_SERIAL_MAX`] are rejected.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format)
            && YEAR_RANGE.contains(&date.year())
        {
            return Some(date);
        }
    }

    if let Some(date) = parse_datetime_prefix(trimmed) {
        return Some(date);
    }

    parse_excel_serial(trimmed)
}

fn parse_datetime_prefix(value: &str) -> Option<NaiveDate> {
    let (date_part, rest) = value.split_at_checked(10)?;
    if !rest.starts_with(['T', ' ']) {
        return None;
    }
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .ok()
        .filter(|date| YEAR_RANGE.contains(&date.year()))
}

fn parse_excel_serial(value: &str) -> Option<NaiveDate> {
    if !value.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        return None;
    }
    let serial: f64 = value.parse().ok()?;
    if !serial.is_finite() {
        return None;
    }
    let days = serial.trunc() as i64;
    if !(EXCEL_SERIAL_MIN..=EXCEL_SERIAL_MAX).contains(&days) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(days))
}
