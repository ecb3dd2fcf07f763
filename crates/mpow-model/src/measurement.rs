//! Long-form measurement records.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{ModelError, SubjectId};

/// Kind of quantity recorded in a measurement column group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementType {
    /// Patient-reported pain on a 0-10 numeric rating scale.
    PainScore,
    /// Opioid consumption in oral morphine equivalents.
    OpioidDose,
}

impl MeasurementType {
    /// Returns the canonical name used in persisted tables.
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasurementType::PainScore => "pain_score",
            MeasurementType::OpioidDose => "opioid_dose",
        }
    }
}

impl fmt::Display for MeasurementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MeasurementType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pain_score" | "pain" => Ok(MeasurementType::PainScore),
            "opioid_dose" | "dose" => Ok(MeasurementType::OpioidDose),
            _ => Err(ModelError::UnknownMeasurementType(s.to_string())),
        }
    }
}

/// Position of a value within a subject-day.
///
/// Intraday slots are 1-based ordinals. Daily-only quantities have no slot
/// index and sort after every intraday slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    Intraday(u32),
    Daily,
}

impl Slot {
    /// Slot index as persisted (`None` for daily-only quantities).
    pub fn index(&self) -> Option<u32> {
        match self {
            Slot::Intraday(index) => Some(*index),
            Slot::Daily => None,
        }
    }

    pub fn from_index(index: Option<u32>) -> Self {
        index.map_or(Slot::Daily, Slot::Intraday)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Intraday(index) => write!(f, "slot {index}"),
            Slot::Daily => f.write_str("daily"),
        }
    }
}

impl Serialize for Slot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.index().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Slot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let index = Option::<u32>::deserialize(deserializer)?;
        if index == Some(0) {
            return Err(serde::de::Error::custom("slot index must be 1-based"));
        }
        Ok(Slot::from_index(index))
    }
}

/// Uniqueness key of a measurement.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MeasurementKey {
    pub subject_id: SubjectId,
    pub date: NaiveDate,
    pub slot: Slot,
    pub measurement_type: MeasurementType,
}

/// One normalized measurement.
///
/// `value` is `None` when the source cell was empty; such records are kept
/// so the subject-day grid stays complete for gap analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub subject_id: SubjectId,
    pub date: NaiveDate,
    /// 1-based ordinal of `date` among the subject's dates.
    pub day_num: u32,
    #[serde(rename = "slot_index")]
    pub slot: Slot,
    pub measurement_type: MeasurementType,
    pub value: Option<f64>,
    pub unit: String,
}

impl Measurement {
    pub fn key(&self) -> MeasurementKey {
        MeasurementKey {
            subject_id: self.subject_id.clone(),
            date: self.date,
            slot: self.slot,
            measurement_type: self.measurement_type,
        }
    }

    pub fn slot_index(&self) -> Option<u32> {
        self.slot.index()
    }

    pub fn is_missing(&self) -> bool {
        self.value.is_none()
    }
}
