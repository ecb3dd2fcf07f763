//! Normalization of pivoted MPOW sheets into long-form measurements.
//!
//! The source sheet has one row per subject-day and one column per
//! (measurement type, intraday slot). [`normalize_sheet`] turns each row
//! into one [`Measurement`](mpow_model::Measurement) per measure column,
//! keeping empty cells as null-valued records so the grid stays complete.
//!
//! Derived views:
//! - [`summarize_days`]: per subject-day observation counts and sums
//! - [`check_integrity`]: subjects whose pain and dose day counts differ
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use mpow_ingest::read_sheet;
//! use mpow_layout::SheetLayout;
//! use mpow_normalize::{normalize_sheet, summarize_days};
//!
//! let layout = SheetLayout::default();
//! let sheet = read_sheet(
//!     Path::new("data/pain_scores.xlsx"),
//!     layout.delimiter_byte(),
//!     layout.sheet_name.as_deref(),
//! )?;
//! let normalized = normalize_sheet(&sheet, &layout)?;
//! let days = summarize_days(&normalized.measurements);
//! ```

pub mod daily;
pub mod error;
pub mod integrity;
pub mod normalize;
pub mod parse;

pub use daily::summarize_days;
pub use error::{NormalizeError, ParseError, ParseErrorKind, Result};
pub use integrity::check_integrity;
pub use normalize::{NormalizedSheet, normalize_rows, normalize_sheet};
