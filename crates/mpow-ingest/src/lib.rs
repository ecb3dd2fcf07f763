//! Source data ingestion for MPOW sheets.
//!
//! The study workbook has a single pivoted sheet. This crate reads that
//! sheet, straight from the workbook (`.xlsx`, `.xls`, `.ods`) or from a
//! delimited export, into a [`RawSheet`] without interpreting any cell, and
//! loads the optional per-subject detail table.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use mpow_ingest::{read_sheet, load_subject_details};
//!
//! let sheet = read_sheet(Path::new("data/retro pain scores.xlsx"), b',', Some("Pain scores"))?;
//! let details = load_subject_details(Path::new("data/patient features.csv"), b',')?;
//! ```

mod detail;
mod error;
mod sheet;
mod workbook;

// === Error Types ===
pub use error::{IngestError, Result};

// === Sheet Reading ===
pub use sheet::{
    MAX_SHEET_FILE_SIZE, RawRow, RawSheet, check_file_size, is_workbook_path, read_delimited,
    read_sheet, validate_encoding,
};
pub use workbook::{WORKBOOK_EXTENSIONS, read_workbook};

// === Subject Details ===
pub use detail::load_subject_details;
