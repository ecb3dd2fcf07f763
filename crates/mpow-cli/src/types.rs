use std::path::PathBuf;

use mpow_layout::SheetSchema;
use mpow_model::IntegrityIssue;
use mpow_output::Manifest;

/// Outcome of `mpow normalize`.
#[derive(Debug)]
pub struct NormalizeResult {
    pub sheet: PathBuf,
    pub output_dir: PathBuf,
    pub rows: usize,
    pub subjects: usize,
    pub slots: u32,
    pub measurements: usize,
    pub missing: usize,
    pub daily_rows: usize,
    pub detail_rows: Option<usize>,
    pub integrity: Vec<IntegrityIssue>,
    /// `None` for a dry run.
    pub manifest: Option<Manifest>,
}

/// Outcome of `mpow inspect`.
#[derive(Debug)]
pub struct InspectResult {
    pub sheet: PathBuf,
    pub rows: usize,
    pub schema: SheetSchema,
}

/// Outcome of `mpow integrity`.
#[derive(Debug)]
pub struct IntegrityResult {
    pub sheet: PathBuf,
    pub subjects: usize,
    pub issues: Vec<IntegrityIssue>,
}
