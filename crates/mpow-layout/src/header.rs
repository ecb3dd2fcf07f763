//! Header key normalization.

/// Normalizes a header cell into a matching key.
///
/// Trims whitespace and a UTF-8 BOM, lowercases, and folds runs of
/// whitespace, `-` and `_` into a single `_`.
pub fn normalize_key(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}').trim();
    let mut key = String::with_capacity(trimmed.len());
    let mut pending_separator = false;
    for ch in trimmed.chars() {
        if ch.is_whitespace() || ch == '-' || ch == '_' {
            pending_separator = true;
            continue;
        }
        if pending_separator && !key.is_empty() {
            key.push('_');
        }
        pending_separator = false;
        key.extend(ch.to_lowercase());
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_case_and_separators() {
        assert_eq!(normalize_key("Pain Slot 1"), "pain_slot_1");
        assert_eq!(normalize_key("pain-slot1"), "pain_slot1");
        assert_eq!(normalize_key("  DOSE__daily "), "dose_daily");
    }

    #[test]
    fn strips_bom() {
        assert_eq!(normalize_key("\u{feff}Subject"), "subject");
    }

    #[test]
    fn drops_leading_and_trailing_separators() {
        assert_eq!(normalize_key("_date_"), "date");
        assert_eq!(normalize_key(""), "");
    }
}
