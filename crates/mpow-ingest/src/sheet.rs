//! Pivoted sheet reading.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord};

use crate::error::{IngestError, Result};
use crate::workbook::{WORKBOOK_EXTENSIONS, read_workbook};

/// Maximum accepted sheet file size (50 MB).
///
/// A study sheet is a few hundred subject-days; anything near this limit
/// is almost certainly the wrong file.
pub const MAX_SHEET_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// One data row of the pivoted sheet (one subject-day).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based line number in a delimited file, or 1-based row number in a
    /// worksheet. The header is line 1 when nothing precedes it.
    pub line: u64,
    /// Trimmed cell text, in header order. May be shorter or longer than
    /// the header when the export is ragged.
    pub cells: Vec<String>,
}

impl RawRow {
    /// Returns the trimmed cell at `index`, or `""` past the end of the row.
    pub fn cell(&self, index: usize) -> &str {
        self.cells.get(index).map_or("", String::as_str)
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(String::is_empty)
    }
}

/// Uninterpreted contents of a pivoted sheet.
#[derive(Debug, Clone)]
pub struct RawSheet {
    pub path: PathBuf,
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawSheet {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Check file size against [`MAX_SHEET_FILE_SIZE`].
pub fn check_file_size(path: &Path) -> Result<()> {
    let metadata = std::fs::metadata(path).map_err(|e| IngestError::open(path, e))?;
    if metadata.len() > MAX_SHEET_FILE_SIZE {
        return Err(IngestError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max_size: MAX_SHEET_FILE_SIZE,
        });
    }
    Ok(())
}

/// Rejects UTF-16 exports, which spreadsheet tools produce for
/// "Unicode text" and which the CSV reader would misparse.
pub fn validate_encoding(path: &Path) -> Result<()> {
    let mut file = File::open(path).map_err(|e| IngestError::open(path, e))?;
    let mut buffer = [0u8; 2];
    let bytes_read = file.read(&mut buffer).map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    if bytes_read == 2 {
        if buffer == [0xFF, 0xFE] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 LE",
            });
        }
        if buffer == [0xFE, 0xFF] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 BE",
            });
        }
    }
    Ok(())
}

pub(crate) fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').trim().to_string()
}

fn record_line(record: &StringRecord, fallback: u64) -> u64 {
    record.position().map_or(fallback, csv::Position::line)
}

/// Whether `path` names a spreadsheet workbook rather than a delimited export.
pub fn is_workbook_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            WORKBOOK_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Reads a pivoted sheet from a workbook or a delimited export.
///
/// Files with a [`WORKBOOK_EXTENSIONS`] extension are opened as workbooks
/// and `sheet_name` picks the worksheet. Anything else is read as
/// delimited text split on `delimiter`.
pub fn read_sheet(path: &Path, delimiter: u8, sheet_name: Option<&str>) -> Result<RawSheet> {
    if is_workbook_path(path) {
        return read_workbook(path, sheet_name);
    }
    if let Some(name) = sheet_name {
        tracing::warn!(
            path = %path.display(),
            sheet = name,
            "sheet name ignored for delimited input"
        );
    }
    read_delimited(path, delimiter)
}

/// Reads a pivoted sheet exported as delimited text.
pub fn read_delimited(path: &Path, delimiter: u8) -> Result<RawSheet> {
    check_file_size(path)?;
    validate_encoding(path)?;

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_path(path)
        .map_err(|e| IngestError::csv(path, &e))?;

    let mut assembler = SheetAssembler::default();
    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|e| IngestError::csv(path, &e))?;
        let line = record_line(&record, index as u64 + 1);
        let cells = record.iter().map(normalize_cell).collect();
        assembler.push(RawRow { line, cells });
    }
    assembler.finish(path)
}

/// Collects rows into a [`RawSheet`].
///
/// The first non-blank row is the header. Trailing blank header cells
/// (left behind by spreadsheet tools when a formatted column is empty) are
/// dropped. Fully blank data rows are skipped; every other row is kept
/// verbatim so schema violations can be reported against it later.
#[derive(Debug, Default)]
pub(crate) struct SheetAssembler {
    headers: Option<Vec<String>>,
    rows: Vec<RawRow>,
    skipped_blank: usize,
}

impl SheetAssembler {
    pub(crate) fn push(&mut self, row: RawRow) {
        if row.is_blank() {
            self.skipped_blank += 1;
            return;
        }
        if self.headers.is_some() {
            self.rows.push(row);
            return;
        }
        let mut header = row.cells;
        while header.last().is_some_and(String::is_empty) {
            header.pop();
        }
        self.headers = Some(header);
    }

    pub(crate) fn finish(self, path: &Path) -> Result<RawSheet> {
        let headers = self.headers.ok_or_else(|| IngestError::EmptySheet {
            path: path.to_path_buf(),
        })?;

        tracing::debug!(
            path = %path.display(),
            columns = headers.len(),
            rows = self.rows.len(),
            skipped_blank = self.skipped_blank,
            "read pivoted sheet"
        );

        Ok(RawSheet {
            path: path.to_path_buf(),
            headers,
            rows: self.rows,
        })
    }
}
