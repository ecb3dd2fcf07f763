//! Normalization errors.

use chrono::NaiveDate;
use mpow_layout::SchemaError;
use thiserror::Error;

/// Why a cell could not be interpreted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseErrorKind {
    #[error("subject identifier is empty")]
    MissingSubject,
    #[error("date is empty")]
    MissingDate,
    #[error("not a recognized date")]
    InvalidDate,
    #[error("not a number")]
    InvalidNumber,
    #[error("outside the accepted range {}", describe_range(*.min, *.max))]
    OutOfRange { min: Option<f64>, max: Option<f64> },
    #[error("value beyond the last header column")]
    ExtraCells,
}

fn describe_range(min: Option<f64>, max: Option<f64>) -> String {
    match (min, max) {
        (Some(min), Some(max)) => format!("[{min}, {max}]"),
        (Some(min), None) => format!(">= {min}"),
        (None, Some(max)) => format!("<= {max}"),
        (None, None) => "(unbounded)".to_string(),
    }
}

/// An unparseable cell, identified by source line and column.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("parse error on line {line}, column '{column}': {kind} (value '{value}')")]
pub struct ParseError {
    pub line: u64,
    pub column: String,
    pub value: String,
    pub kind: ParseErrorKind,
}

/// Errors produced while normalizing a pivoted sheet.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(
        "duplicate subject-day on line {line}: subject {subject} on {date} already appears on line {first_line}"
    )]
    DuplicateSubjectDay {
        line: u64,
        first_line: u64,
        subject: String,
        date: NaiveDate,
    },
}

impl NormalizeError {
    /// Source line the error refers to, if it is row-level.
    pub fn line(&self) -> Option<u64> {
        match self {
            NormalizeError::Schema(_) => None,
            NormalizeError::Parse(err) => Some(err.line),
            NormalizeError::DuplicateSubjectDay { line, .. } => Some(*line),
        }
    }
}

pub type Result<T> = std::result::Result<T, NormalizeError>;
