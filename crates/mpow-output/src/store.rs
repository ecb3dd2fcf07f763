//! Writing the tabular store.
//!
//! A store is a directory holding one file per table and format plus a
//! `manifest.json`. Every file of a run is staged as a `.tmp` sibling and
//! only renamed into place once all of them are written, manifest last. The
//! manifest carries no timestamps, so writing the same input twice produces
//! byte-identical files.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use polars::prelude::{CsvWriter, DataFrame, ParquetWriter, SerWriter};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span};

use mpow_model::{DailySummary, IntegrityIssue, Measurement, SubjectDetail};

use crate::error::{OutputError, Result};
use crate::frames::{daily_frame, detail_frame, measurements_frame};
use crate::hash::compute_file_hash;

pub const MEASUREMENTS_TABLE: &str = "measurements";
pub const DAILY_TABLE: &str = "daily";
pub const DETAIL_TABLE: &str = "detail";
pub const MANIFEST_FILE: &str = "manifest.json";

/// Bumped when the store layout changes incompatibly.
pub const MANIFEST_VERSION: u32 = 1;

const TABLE_NAMES: [&str; 3] = [MEASUREMENTS_TABLE, DAILY_TABLE, DETAIL_TABLE];

/// On-disk encoding of a single table file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Csv,
    Parquet,
}

impl FileFormat {
    pub fn extension(self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Parquet => "parquet",
        }
    }
}

/// Which encodings to write for every table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    Csv,
    Parquet,
    #[default]
    Both,
}

impl TableFormat {
    pub fn file_formats(self) -> &'static [FileFormat] {
        match self {
            TableFormat::Csv => &[FileFormat::Csv],
            TableFormat::Parquet => &[FileFormat::Parquet],
            TableFormat::Both => &[FileFormat::Csv, FileFormat::Parquet],
        }
    }
}

/// Everything persisted by one normalization run.
#[derive(Debug, Clone, Copy)]
pub struct StoreContents<'a> {
    pub measurements: &'a [Measurement],
    pub daily: &'a [DailySummary],
    /// Written as the `detail` table when present.
    pub details: Option<&'a [SubjectDetail]>,
    pub integrity: &'a [IntegrityIssue],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEntry {
    pub path: String,
    pub sha256: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableEntry {
    pub name: String,
    /// File name relative to the store directory.
    pub file: String,
    pub format: FileFormat,
    pub rows: usize,
    pub sha256: String,
}

/// Index of a written store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: u32,
    pub source: SourceEntry,
    pub tables: Vec<TableEntry>,
    pub integrity: Vec<IntegrityIssue>,
}

impl Manifest {
    /// Row count of a table, taken from its first listed file.
    pub fn rows(&self, name: &str) -> Option<usize> {
        self.tables
            .iter()
            .find(|table| table.name == name)
            .map(|table| table.rows)
    }
}

/// Write all tables and the manifest into `dir`.
///
/// `source` is the sheet the contents were derived from; its checksum is
/// recorded in the manifest. Every file is first staged as a `.tmp`
/// sibling. Nothing in `dir` is replaced until all tables and the manifest
/// have been staged, so a failed write leaves the previous store intact.
/// Files of formats not selected by `format` (and a `detail` table when no
/// details are given) are removed on commit.
pub fn write_store(
    dir: &Path,
    source: &Path,
    contents: &StoreContents<'_>,
    format: TableFormat,
) -> Result<Manifest> {
    let span = info_span!("write_store", dir = %dir.display(), ?format);
    let _guard = span.enter();
    let start = Instant::now();

    fs::create_dir_all(dir).map_err(|e| OutputError::io("create directory", dir, e))?;

    let source = SourceEntry {
        path: source.display().to_string(),
        sha256: compute_file_hash(source)?,
    };

    let mut staged = Staging::default();
    let manifest = match stage_store(dir, source, contents, format, &mut staged) {
        Ok(manifest) => manifest,
        Err(err) => {
            staged.discard();
            return Err(err);
        }
    };
    staged.commit(dir, format)?;

    info!(
        tables = manifest.tables.len(),
        measurements = contents.measurements.len(),
        integrity_issues = manifest.integrity.len(),
        duration_ms = start.elapsed().as_millis(),
        "wrote store"
    );
    Ok(manifest)
}

/// Build every frame and stage every file; nothing is renamed here.
fn stage_store(
    dir: &Path,
    source: SourceEntry,
    contents: &StoreContents<'_>,
    format: TableFormat,
    staged: &mut Staging,
) -> Result<Manifest> {
    let mut frames: Vec<(&'static str, DataFrame)> = vec![
        (
            MEASUREMENTS_TABLE,
            measurements_frame(contents.measurements)
                .map_err(|e| OutputError::polars(MEASUREMENTS_TABLE, e))?,
        ),
        (
            DAILY_TABLE,
            daily_frame(contents.daily).map_err(|e| OutputError::polars(DAILY_TABLE, e))?,
        ),
    ];
    if let Some(details) = contents.details {
        frames.push((
            DETAIL_TABLE,
            detail_frame(details).map_err(|e| OutputError::polars(DETAIL_TABLE, e))?,
        ));
    }

    let mut tables = Vec::new();
    for (name, df) in &mut frames {
        for &file_format in format.file_formats() {
            let file = format!("{name}.{}", file_format.extension());
            let temp = staged.stage(&dir.join(&file), |out| {
                write_frame(out, df, name, file_format)
            })?;
            let sha256 = compute_file_hash(&temp)?;
            debug!(table = *name, file = %file, rows = df.height(), "staged table");
            tables.push(TableEntry {
                name: (*name).to_string(),
                file,
                format: file_format,
                rows: df.height(),
                sha256,
            });
        }
    }
    staged.written = frames.iter().map(|(name, _)| *name).collect();

    let manifest = Manifest {
        version: MANIFEST_VERSION,
        source,
        tables,
        integrity: contents.integrity.to_vec(),
    };
    let mut bytes = serde_json::to_vec_pretty(&manifest)?;
    bytes.push(b'\n');
    let manifest_path = dir.join(MANIFEST_FILE);
    staged.stage(&manifest_path, |out| {
        out.write_all(&bytes)
            .map_err(|e| OutputError::io("write", &manifest_path, e))
    })?;
    Ok(manifest)
}

fn write_frame(out: &mut File, df: &mut DataFrame, table: &str, format: FileFormat) -> Result<()> {
    let written = match format {
        FileFormat::Csv => CsvWriter::new(out).include_header(true).finish(df),
        FileFormat::Parquet => ParquetWriter::new(out).finish(df).map(|_| ()),
    };
    written.map_err(|e| OutputError::polars(table, e))
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    PathBuf::from(temp_name)
}

/// Files written to `.tmp` siblings and waiting to be renamed into place.
/// The manifest is always staged last and so is renamed last.
#[derive(Debug, Default)]
struct Staging {
    /// (temp path, target path), in staging order.
    files: Vec<(PathBuf, PathBuf)>,
    /// Tables present in this run.
    written: Vec<&'static str>,
}

impl Staging {
    /// Write the temp sibling of `path`, returning the temp path.
    fn stage<F>(&mut self, path: &Path, write: F) -> Result<PathBuf>
    where
        F: FnOnce(&mut File) -> Result<()>,
    {
        let temp_path = temp_sibling(path);
        let mut file =
            File::create(&temp_path).map_err(|e| OutputError::io("create", &temp_path, e))?;
        let written = write(&mut file).and_then(|()| {
            file.sync_all()
                .map_err(|e| OutputError::io("sync", &temp_path, e))
        });
        drop(file);
        if let Err(err) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(err);
        }
        self.files.push((temp_path.clone(), path.to_path_buf()));
        Ok(temp_path)
    }

    fn discard(self) {
        for (temp, _) in &self.files {
            let _ = fs::remove_file(temp);
        }
        debug!(files = self.files.len(), "discarded staged files");
    }

    /// Rename tables into place, drop stale files, then rename the manifest.
    fn commit(self, dir: &Path, format: TableFormat) -> Result<()> {
        let Some(((manifest_temp, manifest_path), tables)) = self.files.split_last() else {
            return Ok(());
        };
        for (temp, target) in tables {
            rename_into_place(temp, target)?;
        }
        for name in TABLE_NAMES {
            let kept: &[FileFormat] = if self.written.contains(&name) {
                format.file_formats()
            } else {
                &[]
            };
            remove_stale(dir, name, kept)?;
        }
        rename_into_place(manifest_temp, manifest_path)
    }
}

fn rename_into_place(temp_path: &Path, path: &Path) -> Result<()> {
    fs::rename(temp_path, path).map_err(|e| OutputError::AtomicWriteFailed {
        temp_path: temp_path.to_path_buf(),
        target_path: path.to_path_buf(),
        source: e,
    })
}

fn remove_stale(dir: &Path, name: &str, kept: &[FileFormat]) -> Result<()> {
    for format in [FileFormat::Csv, FileFormat::Parquet] {
        if kept.contains(&format) {
            continue;
        }
        let path = dir.join(format!("{name}.{}", format.extension()));
        if path.is_file() {
            fs::remove_file(&path).map_err(|e| OutputError::io("remove", &path, e))?;
            debug!(path = %path.display(), "removed stale table file");
        }
    }
    Ok(())
}
