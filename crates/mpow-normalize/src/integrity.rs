//! Pain/dose day-count consistency check.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use mpow_model::{IntegrityIssue, Measurement, MeasurementType, SubjectId};
use tracing::warn;

#[derive(Default)]
struct DayCounts {
    pain: BTreeSet<NaiveDate>,
    dose: BTreeSet<NaiveDate>,
}

/// Report subjects whose number of days with a pain score differs from
/// their number of days with an opioid dose.
///
/// Issues are ordered by subject first appearance. When the sheet carries
/// only one of the two measurement types there is nothing to compare and
/// no issues are returned.
pub fn check_integrity(measurements: &[Measurement]) -> Vec<IntegrityIssue> {
    let has = |kind: MeasurementType| measurements.iter().any(|m| m.measurement_type == kind);
    if !has(MeasurementType::PainScore) || !has(MeasurementType::OpioidDose) {
        return Vec::new();
    }

    let mut order: Vec<&SubjectId> = Vec::new();
    let mut counts: HashMap<&SubjectId, DayCounts> = HashMap::new();
    for measurement in measurements {
        let entry = counts.entry(&measurement.subject_id).or_insert_with(|| {
            order.push(&measurement.subject_id);
            DayCounts::default()
        });
        if measurement.value.is_none() {
            continue;
        }
        match measurement.measurement_type {
            MeasurementType::PainScore => entry.pain.insert(measurement.date),
            MeasurementType::OpioidDose => entry.dose.insert(measurement.date),
        };
    }

    let issues: Vec<IntegrityIssue> = order
        .into_iter()
        .filter_map(|subject| {
            let days = counts.get(subject)?;
            (days.pain.len() != days.dose.len()).then(|| IntegrityIssue {
                subject_id: subject.clone(),
                pain_days: days.pain.len() as u32,
                dose_days: days.dose.len() as u32,
            })
        })
        .collect();

    if !issues.is_empty() {
        warn!(subjects = issues.len(), "pain and dose day counts differ");
    }
    issues
}
