//! Per-subject detail (covariate) table.
//!
//! The features export uses spreadsheet-friendly headers such as
//! `Age at Admit` and `Depression (1=Y, 0=N)`; they are renamed to the
//! snake_case fields of [`SubjectDetail`].

use std::collections::BTreeSet;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use mpow_layout::normalize_key;
use mpow_model::{SubjectDetail, SubjectId};

use crate::error::{IngestError, Result};
use crate::sheet::{check_file_size, validate_encoding};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DetailField {
    Subject,
    AgeAtAdmit,
    Gender,
    ImpairmentGroup,
    Depression,
}

impl DetailField {
    fn name(self) -> &'static str {
        match self {
            DetailField::Subject => "subject_id",
            DetailField::AgeAtAdmit => "age_at_admit",
            DetailField::Gender => "gender",
            DetailField::ImpairmentGroup => "impairment_group",
            DetailField::Depression => "depression",
        }
    }

    fn from_header(header: &str) -> Option<Self> {
        let key = normalize_key(header);
        match key.as_str() {
            "subject" | "subject_id" | "patient" => Some(DetailField::Subject),
            "age_at_admit" | "ageatadmit" => Some(DetailField::AgeAtAdmit),
            "gender" | "sex" => Some(DetailField::Gender),
            "impairment_group" | "impairmentgroup" => Some(DetailField::ImpairmentGroup),
            "depression" => Some(DetailField::Depression),
            _ if key.starts_with("depression_") => Some(DetailField::Depression),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct DetailColumns {
    subject: Option<usize>,
    age_at_admit: Option<usize>,
    gender: Option<usize>,
    impairment_group: Option<usize>,
    depression: Option<usize>,
}

impl DetailColumns {
    fn from_headers(headers: &StringRecord) -> Self {
        let mut columns = DetailColumns::default();
        for (index, header) in headers.iter().enumerate() {
            let slot = match DetailField::from_header(header) {
                Some(DetailField::Subject) => &mut columns.subject,
                Some(DetailField::AgeAtAdmit) => &mut columns.age_at_admit,
                Some(DetailField::Gender) => &mut columns.gender,
                Some(DetailField::ImpairmentGroup) => &mut columns.impairment_group,
                Some(DetailField::Depression) => &mut columns.depression,
                None => {
                    tracing::debug!(column = header, "ignoring detail column");
                    continue;
                }
            };
            if slot.is_none() {
                *slot = Some(index);
            }
        }
        columns
    }
}

fn cell(record: &StringRecord, index: Option<usize>) -> Option<&str> {
    index
        .and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn parse_age(value: &str) -> Option<u32> {
    if let Ok(age) = value.parse::<u32>() {
        return Some(age);
    }
    match value.parse::<f64>() {
        Ok(age) if age.is_finite() && age >= 0.0 && age.fract() == 0.0 && age <= f64::from(u32::MAX) => {
            Some(age as u32)
        }
        _ => None,
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "1.0" | "y" | "yes" | "true" => Some(true),
        "0" | "0.0" | "n" | "no" | "false" => Some(false),
        _ => None,
    }
}

/// Loads the per-subject detail table.
///
/// Only the subject column is required. Unknown columns are ignored.
pub fn load_subject_details(path: &Path, delimiter: u8) -> Result<Vec<SubjectDetail>> {
    check_file_size(path)?;
    validate_encoding(path)?;

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_path(path)
        .map_err(|e| IngestError::csv(path, &e))?;
    let headers = reader
        .headers()
        .map_err(|e| IngestError::csv(path, &e))?
        .clone();
    let columns = DetailColumns::from_headers(&headers);
    let Some(subject_index) = columns.subject else {
        return Err(IngestError::MissingColumn {
            column: "Subject".to_string(),
            path: path.to_path_buf(),
        });
    };

    let invalid = |field: DetailField, value: &str, line: u64| IngestError::InvalidValue {
        field: field.name().to_string(),
        value: value.to_string(),
        line,
        path: path.to_path_buf(),
    };

    let mut seen = BTreeSet::new();
    let mut details = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|e| IngestError::csv(path, &e))?;
        let line = record.position().map_or(index as u64 + 2, csv::Position::line);
        if record.iter().all(|value| value.trim().is_empty()) {
            continue;
        }

        let raw_subject = cell(&record, Some(subject_index)).unwrap_or("");
        let subject_id =
            SubjectId::new(raw_subject).map_err(|_| invalid(DetailField::Subject, raw_subject, line))?;
        if !seen.insert(subject_id.clone()) {
            return Err(IngestError::DuplicateSubject {
                subject: subject_id.to_string(),
                line,
                path: path.to_path_buf(),
            });
        }

        let age_at_admit = match cell(&record, columns.age_at_admit) {
            Some(value) => {
                Some(parse_age(value).ok_or_else(|| invalid(DetailField::AgeAtAdmit, value, line))?)
            }
            None => None,
        };
        let depression = match cell(&record, columns.depression) {
            Some(value) => {
                Some(parse_flag(value).ok_or_else(|| invalid(DetailField::Depression, value, line))?)
            }
            None => None,
        };

        details.push(SubjectDetail {
            subject_id,
            age_at_admit,
            gender: cell(&record, columns.gender).map(str::to_string),
            impairment_group: cell(&record, columns.impairment_group).map(str::to_string),
            depression,
        });
    }

    tracing::debug!(path = %path.display(), subjects = details.len(), "loaded subject details");
    Ok(details)
}
