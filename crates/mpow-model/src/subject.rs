use std::fmt;

use crate::ModelError;

/// Subject (patient) identifier as it appears in the source sheet.
///
/// Spreadsheet exports frequently render integer ids as floats (`"12.0"`),
/// so integral float renderings collapse to their integer form.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ModelError::EmptySubjectId);
        }
        Ok(Self(collapse_integral_float(trimmed)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn collapse_integral_float(value: &str) -> String {
    if !value.contains('.') {
        return value.to_string();
    }
    match value.parse::<f64>() {
        Ok(number) if number.is_finite() && number.fract() == 0.0 && number.abs() < 1e15 => {
            format!("{}", number as i64)
        }
        _ => value.to_string(),
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
