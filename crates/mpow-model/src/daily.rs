//! Per subject-day aggregates and integrity findings.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::SubjectId;

/// Aggregates of one subject-day of the measurement grid.
///
/// Sums and means are `None` when no value of that type was recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub subject_id: SubjectId,
    pub date: NaiveDate,
    pub day_num: u32,
    pub pain_observations: u32,
    pub pain_sum: Option<f64>,
    pub pain_mean: Option<f64>,
    pub dose_observations: u32,
    pub dose_total: Option<f64>,
}

/// A subject whose pain-score days and opioid-dose days disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityIssue {
    pub subject_id: SubjectId,
    /// Days with at least one recorded pain score.
    pub pain_days: u32,
    /// Days with at least one recorded opioid dose.
    pub dose_days: u32,
}

impl IntegrityIssue {
    pub fn difference(&self) -> i64 {
        i64::from(self.pain_days) - i64::from(self.dose_days)
    }
}
