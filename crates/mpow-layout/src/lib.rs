//! Sheet layout configuration for pivoted MPOW workbooks.
//!
//! The source workbook stores one row per subject-day. Intraday
//! measurements repeat across fixed-width column groups whose names encode
//! the measurement type and slot (`pain_slot1`, `dose_slot1`, ...).
//! A [`SheetLayout`] describes that naming convention; [`SheetSchema`]
//! is the result of checking a concrete header row against it.
//!
//! # Example
//!
//! ```
//! use mpow_layout::{SheetLayout, SheetSchema};
//!
//! let layout = SheetLayout::default();
//! let headers: Vec<String> = ["subject", "date", "pain_slot1", "dose_slot1"]
//!     .iter()
//!     .map(|h| h.to_string())
//!     .collect();
//! let schema = SheetSchema::resolve(&layout, &headers).unwrap();
//! assert_eq!(schema.slot_count(), 1);
//! ```

mod config;
mod error;
mod header;
mod schema;

pub use config::{DEFAULT_DAILY_MARKER, DEFAULT_SLOT_MARKER, MeasureSpec, SheetLayout};
pub use error::{LayoutError, SchemaError};
pub use header::normalize_key;
pub use schema::{MeasureColumn, SheetSchema};
