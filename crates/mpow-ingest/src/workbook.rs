//! Spreadsheet workbook reading.

use std::path::Path;

use calamine::{Data, DataType, Reader, open_workbook_auto};

use crate::error::{IngestError, Result};
use crate::sheet::{RawRow, RawSheet, SheetAssembler, check_file_size, normalize_cell};

/// File extensions opened as workbooks.
pub const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Reads one worksheet of a workbook.
///
/// With `sheet_name` the worksheet is looked up by name, exact match first
/// and then ignoring case. Without it the workbook must hold exactly one
/// worksheet. Row numbers are the worksheet's 1-based row numbers, and
/// date-formatted cells come back as `YYYY-MM-DD`.
pub fn read_workbook(path: &Path, sheet_name: Option<&str>) -> Result<RawSheet> {
    check_file_size(path)?;

    let mut workbook = open_workbook_auto(path).map_err(|e| IngestError::workbook(path, &e))?;
    let names = workbook.sheet_names();
    let name = select_sheet(path, &names, sheet_name)?;
    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| IngestError::workbook(path, &e))?;

    // The range starts at the first used row, not at row 1.
    let first_row = range.start().map_or(0, |(row, _)| u64::from(row));
    let mut assembler = SheetAssembler::default();
    for (offset, cells) in range.rows().enumerate() {
        let line = first_row + offset as u64 + 1;
        let cells = cells.iter().map(cell_text).collect();
        assembler.push(RawRow { line, cells });
    }

    tracing::debug!(path = %path.display(), sheet = %name, "read worksheet");
    assembler.finish(path)
}

fn select_sheet(path: &Path, names: &[String], requested: Option<&str>) -> Result<String> {
    let Some(requested) = requested else {
        return match names {
            [] => Err(IngestError::EmptySheet {
                path: path.to_path_buf(),
            }),
            [only] => Ok(only.clone()),
            _ => Err(IngestError::AmbiguousSheet {
                path: path.to_path_buf(),
                sheets: names.to_vec(),
            }),
        };
    };

    let requested = requested.trim();
    names
        .iter()
        .find(|name| name.as_str() == requested)
        .or_else(|| {
            names
                .iter()
                .find(|name| name.trim().eq_ignore_ascii_case(requested))
        })
        .cloned()
        .ok_or_else(|| IngestError::SheetNotFound {
            path: path.to_path_buf(),
            sheet: requested.to_string(),
            available: names.to_vec(),
        })
}

/// Cell text as a delimited export would carry it.
fn cell_text(cell: &Data) -> String {
    if matches!(cell, Data::DateTime(_) | Data::DateTimeIso(_))
        && let Some(date) = cell.as_date()
    {
        return date.format("%Y-%m-%d").to_string();
    }
    normalize_cell(&cell.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn test_single_sheet_is_picked_without_a_name() {
        let picked = select_sheet(Path::new("a.xlsx"), &names(&["Sheet1"]), None).unwrap();
        assert_eq!(picked, "Sheet1");
    }

    #[test]
    fn test_several_sheets_need_a_name() {
        let result = select_sheet(Path::new("a.xlsx"), &names(&["Pain", "Notes"]), None);
        assert!(matches!(
            result,
            Err(IngestError::AmbiguousSheet { ref sheets, .. }) if sheets.len() == 2
        ));
    }

    #[test]
    fn test_name_lookup_prefers_exact_match() {
        let list = names(&["pain", "Pain"]);
        let picked = select_sheet(Path::new("a.xlsx"), &list, Some("Pain")).unwrap();
        assert_eq!(picked, "Pain");
        let picked = select_sheet(Path::new("a.xlsx"), &list[1..], Some(" PAIN ")).unwrap();
        assert_eq!(picked, "Pain");
    }

    #[test]
    fn test_unknown_name() {
        let result = select_sheet(Path::new("a.xlsx"), &names(&["Pain"]), Some("Dose"));
        assert!(matches!(
            result,
            Err(IngestError::SheetNotFound { ref sheet, .. }) if sheet == "Dose"
        ));
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::Float(3.0)), "3");
        assert_eq!(cell_text(&Data::Float(7.5)), "7.5");
        assert_eq!(cell_text(&Data::Int(12)), "12");
        assert_eq!(cell_text(&Data::String(" 007 ".to_string())), "007");
        assert_eq!(
            cell_text(&Data::DateTimeIso("2019-01-02T00:00:00".to_string())),
            "2019-01-02"
        );
    }
}
