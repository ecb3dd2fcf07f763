//! TOML sheet layout.

use std::collections::BTreeSet;
use std::path::Path;

use mpow_model::MeasurementType;
use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::header::normalize_key;

/// Marker between the measure prefix and the slot number (`pain_slot1`).
pub const DEFAULT_SLOT_MARKER: &str = "slot";

/// Suffix naming the daily-only column of a measure (`dose_daily`).
pub const DEFAULT_DAILY_MARKER: &str = "daily";

/// Column-naming convention of a pivoted sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SheetLayout {
    /// Header of the subject identifier column.
    pub subject_column: String,
    /// Header of the date column.
    pub date_column: String,
    /// Headers that are present in the sheet but carry no measurements.
    pub ignored_columns: Vec<String>,
    /// Worksheet to read from a workbook. Optional when the workbook has a
    /// single worksheet; ignored for delimited exports.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet_name: Option<String>,
    /// Field delimiter of a delimited export.
    pub delimiter: char,
    pub slot_marker: String,
    pub daily_marker: String,
    /// Measurement column groups, in output order.
    pub measures: Vec<MeasureSpec>,
}

/// One measurement column group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MeasureSpec {
    pub kind: MeasurementType,
    /// Header prefix shared by all columns of this measure.
    pub prefix: String,
    pub unit: String,
    /// Smallest accepted value (inclusive).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Largest accepted value (inclusive).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            subject_column: "subject".to_string(),
            date_column: "date".to_string(),
            ignored_columns: Vec::new(),
            sheet_name: None,
            delimiter: ',',
            slot_marker: DEFAULT_SLOT_MARKER.to_string(),
            daily_marker: DEFAULT_DAILY_MARKER.to_string(),
            measures: vec![
                MeasureSpec {
                    kind: MeasurementType::PainScore,
                    prefix: "pain".to_string(),
                    unit: "NRS".to_string(),
                    min: Some(0.0),
                    max: Some(10.0),
                },
                MeasureSpec {
                    kind: MeasurementType::OpioidDose,
                    prefix: "dose".to_string(),
                    unit: "mg OMEq".to_string(),
                    min: Some(0.0),
                    max: None,
                },
            ],
        }
    }
}

impl SheetLayout {
    /// Loads and validates a layout file.
    pub fn load(path: &Path) -> Result<Self, LayoutError> {
        let content = std::fs::read_to_string(path).map_err(|source| LayoutError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let layout: SheetLayout = toml::from_str(&content).map_err(|source| LayoutError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        layout.validate()?;
        tracing::debug!(
            path = %path.display(),
            measures = layout.measures.len(),
            "loaded sheet layout"
        );
        Ok(layout)
    }

    /// Loads the layout at `path`, or the built-in default when `None`.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, LayoutError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn to_toml_string(&self) -> Result<String, LayoutError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn measure(&self, kind: MeasurementType) -> Option<&MeasureSpec> {
        self.measures.iter().find(|measure| measure.kind == kind)
    }

    /// Delimiter as a CSV byte. Only valid after [`validate`](Self::validate).
    pub fn delimiter_byte(&self) -> u8 {
        u8::try_from(self.delimiter).unwrap_or(b',')
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        let subject = normalize_key(&self.subject_column);
        let date = normalize_key(&self.date_column);
        if subject.is_empty() || date.is_empty() {
            return Err(LayoutError::invalid(
                "subject_column and date_column must not be empty",
            ));
        }
        if subject == date {
            return Err(LayoutError::invalid(format!(
                "subject_column and date_column both resolve to '{subject}'"
            )));
        }
        if self
            .sheet_name
            .as_deref()
            .is_some_and(|name| name.trim().is_empty())
        {
            return Err(LayoutError::invalid("sheet_name must not be blank"));
        }
        if !self.delimiter.is_ascii() || self.delimiter.is_ascii_alphanumeric() {
            return Err(LayoutError::invalid(format!(
                "delimiter '{}' must be a single ASCII punctuation or whitespace character",
                self.delimiter
            )));
        }
        let slot_marker = normalize_key(&self.slot_marker);
        let daily_marker = normalize_key(&self.daily_marker);
        if slot_marker.is_empty() || daily_marker.is_empty() || slot_marker == daily_marker {
            return Err(LayoutError::invalid(
                "slot_marker and daily_marker must be non-empty and distinct",
            ));
        }
        if self.measures.is_empty() {
            return Err(LayoutError::invalid("no measures defined"));
        }

        let mut kinds = BTreeSet::new();
        let mut prefixes = BTreeSet::new();
        for measure in &self.measures {
            if !kinds.insert(measure.kind) {
                return Err(LayoutError::invalid(format!(
                    "measure '{}' is defined more than once",
                    measure.kind
                )));
            }
            let prefix = normalize_key(&measure.prefix);
            if prefix.is_empty() {
                return Err(LayoutError::invalid(format!(
                    "measure '{}' has an empty prefix",
                    measure.kind
                )));
            }
            if prefix == subject || prefix == date {
                return Err(LayoutError::invalid(format!(
                    "prefix '{prefix}' collides with the subject or date column"
                )));
            }
            if !prefixes.insert(prefix.clone()) {
                return Err(LayoutError::invalid(format!(
                    "prefix '{prefix}' is used by more than one measure"
                )));
            }
            if let (Some(min), Some(max)) = (measure.min, measure.max)
                && min > max
            {
                return Err(LayoutError::invalid(format!(
                    "measure '{}' has min {min} greater than max {max}",
                    measure.kind
                )));
            }
        }
        Ok(())
    }
}
