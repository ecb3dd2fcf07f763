//! Persistent tabular store for normalized MPOW data.
//!
//! Tables (`measurements`, `daily`, optionally `detail`) are written as CSV
//! and/or Parquet next to a `manifest.json` that lists each file with its
//! row count and SHA-256. Downstream analysis reads the store through
//! [`read_table`] or any Parquet/CSV reader.

mod error;
mod frames;
mod hash;
mod read;
mod store;

pub use error::{OutputError, Result};
pub use frames::{
    MEASUREMENT_COLUMNS, daily_frame, detail_frame, measurements_frame, table_schema,
};
pub use hash::compute_file_hash;
pub use read::{read_manifest, read_table};
pub use store::{
    DAILY_TABLE, DETAIL_TABLE, FileFormat, MANIFEST_FILE, MANIFEST_VERSION, MEASUREMENTS_TABLE,
    Manifest, SourceEntry, StoreContents, TableEntry, TableFormat, write_store,
};
