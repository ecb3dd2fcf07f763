//! Numeric cell parsing.

/// Outcome of reading a measurement cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericCell {
    /// Empty cell or a missing-value placeholder.
    Missing,
    Value(f64),
    Invalid,
}

/// Placeholders spreadsheet tools write for an absent value.
const MISSING_TOKENS: &[&str] = &["na", "n/a", "nan", "null", "none", "#n/a"];

pub fn is_missing_token(value: &str) -> bool {
    MISSING_TOKENS
        .iter()
        .any(|token| value.eq_ignore_ascii_case(token))
}

/// Parse a measurement cell.
///
/// Handles:
/// - Standard numbers: "3", "-0.5"
/// - Thousands separators: "1,250"
/// - Whitespace, including non-breaking spaces: " 7 "
/// - Scientific notation: "1.5e2"
///
/// Infinities are rejected; `NaN` and the other [`MISSING_TOKENS`] read as
/// missing, matching how dataframe libraries export absent values.
pub fn parse_numeric(value: &str) -> NumericCell {
    let trimmed = value.trim();
    if trimmed.is_empty() || is_missing_token(trimmed) {
        return NumericCell::Missing;
    }

    let cleaned: String = trimmed
        .chars()
        .filter(|c| !matches!(c, ',' | ' ' | '\u{a0}'))
        .collect();

    match cleaned.parse::<f64>() {
        Ok(number) if number.is_finite() => NumericCell::Value(number),
        _ => NumericCell::Invalid,
    }
}
