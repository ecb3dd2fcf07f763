//! Error types for layout configuration and header schema resolution.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating a [`SheetLayout`](crate::SheetLayout).
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("failed to read layout file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse layout file {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize layout: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid layout: {message}")]
    Invalid { message: String },
}

impl LayoutError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

/// Unexpected column layout in the pivoted sheet header.
///
/// Every variant names the offending column as it appears in the source
/// (or, for missing columns, the name the layout expects).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("schema error: required column '{column}' not found")]
    MissingColumn { column: String },

    #[error("schema error: unrecognized column '{column}'")]
    UnrecognizedColumn { column: String },

    #[error("schema error: column '{column}' duplicates '{first}'")]
    DuplicateColumn { column: String, first: String },

    #[error("schema error: column '{column}' uses slot 0 (slots are 1-based)")]
    ZeroSlot { column: String },

    #[error("schema error: expected column '{column}' is missing ({reason})")]
    MissingSlot { column: String, reason: String },

    #[error("schema error: header has no measurement columns")]
    NoMeasurements,
}

impl SchemaError {
    /// The column this error refers to, if any.
    pub fn column(&self) -> Option<&str> {
        match self {
            SchemaError::MissingColumn { column }
            | SchemaError::UnrecognizedColumn { column }
            | SchemaError::DuplicateColumn { column, .. }
            | SchemaError::ZeroSlot { column }
            | SchemaError::MissingSlot { column, .. } => Some(column),
            SchemaError::NoMeasurements => None,
        }
    }
}
