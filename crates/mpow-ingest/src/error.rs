//! Error types for source ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading source files.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Source file not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File exceeds the size limit.
    #[error("file {path} is {size} bytes, larger than the {max_size} byte limit")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// File is not UTF-8 encoded.
    #[error("unsupported encoding {encoding} in {path}; re-export the sheet as UTF-8")]
    UnsupportedEncoding {
        path: PathBuf,
        encoding: &'static str,
    },

    // === Parsing Errors ===
    /// Malformed delimited text.
    #[error("failed to parse {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// File has no header row.
    #[error("sheet is empty: {path}")]
    EmptySheet { path: PathBuf },

    // === Workbook Errors ===
    /// Workbook could not be opened or a worksheet could not be read.
    #[error("failed to read workbook {path}: {message}")]
    Workbook { path: PathBuf, message: String },

    /// Requested worksheet does not exist.
    #[error("sheet '{sheet}' not found in {path} (available: {})", .available.join(", "))]
    SheetNotFound {
        path: PathBuf,
        sheet: String,
        available: Vec<String>,
    },

    /// Workbook has several worksheets and none was named.
    #[error("{path} has several sheets ({}); name the one to read", .sheets.join(", "))]
    AmbiguousSheet { path: PathBuf, sheets: Vec<String> },

    // === Detail Table Errors ===
    /// Required column not found.
    #[error("required column '{column}' not found in {path}")]
    MissingColumn { column: String, path: PathBuf },

    /// Cell value cannot be interpreted.
    #[error("invalid {field} value '{value}' on line {line} of {path}")]
    InvalidValue {
        field: String,
        value: String,
        line: u64,
        path: PathBuf,
    },

    /// Subject listed more than once.
    #[error("subject '{subject}' appears more than once in {path} (line {line})")]
    DuplicateSubject {
        subject: String,
        line: u64,
        path: PathBuf,
    },
}

impl IngestError {
    pub(crate) fn open(path: &std::path::Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::FileRead {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    pub(crate) fn workbook(path: &std::path::Path, err: &calamine::Error) -> Self {
        Self::Workbook {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }

    pub(crate) fn csv(path: &std::path::Path, err: &::csv::Error) -> Self {
        Self::CsvParse {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::FileNotFound {
            path: PathBuf::from("/data/retro.csv"),
        };
        insta::assert_snapshot!(err.to_string(), @"file not found: /data/retro.csv");
    }

    #[test]
    fn test_sheet_errors_list_available_sheets() {
        let err = IngestError::SheetNotFound {
            path: PathBuf::from("study.xlsx"),
            sheet: "Dose".to_string(),
            available: vec!["Pain scores".to_string(), "Notes".to_string()],
        };
        insta::assert_snapshot!(
            err.to_string(),
            @"sheet 'Dose' not found in study.xlsx (available: Pain scores, Notes)"
        );

        let err = IngestError::AmbiguousSheet {
            path: PathBuf::from("study.xlsx"),
            sheets: vec!["Pain scores".to_string(), "Notes".to_string()],
        };
        insta::assert_snapshot!(
            err.to_string(),
            @"study.xlsx has several sheets (Pain scores, Notes); name the one to read"
        );
    }

    #[test]
    fn test_open_maps_not_found() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = IngestError::open(std::path::Path::new("x.csv"), io);
        assert!(matches!(err, IngestError::FileNotFound { .. }));

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = IngestError::open(std::path::Path::new("x.csv"), io);
        assert!(matches!(err, IngestError::FileRead { .. }));
    }
}
