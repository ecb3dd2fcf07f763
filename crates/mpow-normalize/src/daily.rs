//! Per subject-day aggregation of the measurement grid.

use std::collections::HashMap;

use chrono::NaiveDate;
use mpow_model::{DailySummary, Measurement, MeasurementType, SubjectId};

/// Collapse measurements into one [`DailySummary`] per subject-day.
///
/// Summaries come out in first-appearance order. Days whose cells are all
/// empty still get a summary with zero observations.
pub fn summarize_days(measurements: &[Measurement]) -> Vec<DailySummary> {
    let mut index: HashMap<(&SubjectId, NaiveDate), usize> = HashMap::new();
    let mut summaries: Vec<DailySummary> = Vec::new();

    for measurement in measurements {
        let position = *index
            .entry((&measurement.subject_id, measurement.date))
            .or_insert_with(|| {
                summaries.push(DailySummary {
                    subject_id: measurement.subject_id.clone(),
                    date: measurement.date,
                    day_num: measurement.day_num,
                    pain_observations: 0,
                    pain_sum: None,
                    pain_mean: None,
                    dose_observations: 0,
                    dose_total: None,
                });
                summaries.len() - 1
            });

        let Some(value) = measurement.value else {
            continue;
        };
        let summary = &mut summaries[position];
        match measurement.measurement_type {
            MeasurementType::PainScore => {
                summary.pain_observations += 1;
                summary.pain_sum = Some(summary.pain_sum.unwrap_or(0.0) + value);
            }
            MeasurementType::OpioidDose => {
                summary.dose_observations += 1;
                summary.dose_total = Some(summary.dose_total.unwrap_or(0.0) + value);
            }
        }
    }

    for summary in &mut summaries {
        summary.pain_mean = summary
            .pain_sum
            .map(|sum| sum / f64::from(summary.pain_observations));
    }
    summaries
}
