//! Output error types.

use std::path::PathBuf;

use thiserror::Error;

/// Error raised while writing or reading the tabular store.
#[derive(Debug, Error)]
pub enum OutputError {
    /// File system operation failed.
    #[error("failed to {operation} {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Building, writing, or reading a frame failed.
    #[error("table '{table}': {source}")]
    Polars {
        table: String,
        #[source]
        source: polars::error::PolarsError,
    },

    #[error("manifest JSON error")]
    Manifest(#[from] serde_json::Error),

    /// The temp file was written but could not be moved into place.
    #[error("failed to move {temp_path} into place at {target_path}")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("table '{name}' not found in {dir}")]
    TableNotFound { name: String, dir: PathBuf },
}

impl OutputError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        OutputError::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn polars(table: &str, source: polars::error::PolarsError) -> Self {
        OutputError::Polars {
            table: table.to_string(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, OutputError>;
