/// Collapse whitespace and strip the invisible characters OCR output tends
/// to carry, for header comparison.
pub(crate) fn normalize_header(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_ascii_lowercase()
}

/// Strip currency symbols, grouping separators, and percent signs from an
/// extracted numeric cell. The result is still parsed strictly; this only
/// removes decoration, never repairs digits.
pub(crate) fn normalize_amount(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '€' | '$' | '£' | ',' | '%' | ' ' | '\u{a0}' | '\u{feff}'))
        .collect()
}

#[cfg(test)]
pub(crate) fn normalize_header_for_tests(value: &str) -> String {
    normalize_header(value)
}
