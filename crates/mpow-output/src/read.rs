//! Reading persisted tables back.

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use polars::prelude::{CsvReadOptions, DataFrame, ParquetReader, SerReader};

use crate::error::{OutputError, Result};
use crate::frames::table_schema;
use crate::store::{FileFormat, MANIFEST_FILE, Manifest};

/// Load table `name` from a store directory.
///
/// Parquet is preferred. The CSV fallback applies the table's known column
/// types so identifiers such as `007` stay strings; columns of unknown
/// tables are inferred.
pub fn read_table(dir: &Path, name: &str) -> Result<DataFrame> {
    let parquet = dir.join(format!("{name}.{}", FileFormat::Parquet.extension()));
    if parquet.is_file() {
        let file = File::open(&parquet).map_err(|e| OutputError::io("read", &parquet, e))?;
        return ParquetReader::new(file)
            .finish()
            .map_err(|e| OutputError::polars(name, e));
    }

    let csv = dir.join(format!("{name}.{}", FileFormat::Csv.extension()));
    if csv.is_file() {
        return CsvReadOptions::default()
            .with_has_header(true)
            .with_schema_overwrite(table_schema(name).map(Arc::new))
            .map_parse_options(|options| options.with_try_parse_dates(true))
            .try_into_reader_with_file_path(Some(csv))
            .and_then(|reader| reader.finish())
            .map_err(|e| OutputError::polars(name, e));
    }

    Err(OutputError::TableNotFound {
        name: name.to_string(),
        dir: dir.to_path_buf(),
    })
}

/// Load the manifest of a store directory.
pub fn read_manifest(dir: &Path) -> Result<Manifest> {
    let path = dir.join(MANIFEST_FILE);
    let bytes = fs::read(&path).map_err(|e| OutputError::io("read", &path, e))?;
    Ok(serde_json::from_slice(&bytes)?)
}
