//! Data model for the MPOW opioid weaning study.
//!
//! The pivoted source sheet holds one row per subject-day with repeated
//! intraday columns. Everything downstream of ingestion works with the
//! long-form types defined here:
//!
//! - [`Measurement`]: one value for one (subject, date, slot, type) key
//! - [`DailySummary`]: per subject-day aggregates of the measurement grid
//! - [`SubjectDetail`]: per-subject covariates joined by analysis code
//! - [`IntegrityIssue`]: pain/dose day-count mismatch for a subject

pub mod daily;
pub mod detail;
pub mod error;
pub mod measurement;
pub mod subject;

pub use daily::{DailySummary, IntegrityIssue};
pub use detail::SubjectDetail;
pub use error::{ModelError, Result};
pub use measurement::{Measurement, MeasurementKey, MeasurementType, Slot};
pub use subject::SubjectId;
