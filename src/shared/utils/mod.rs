pub fn mask_pii(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }
    let len = trimmed.chars().count();
    format!("<redacted len={}>", len)
}

/// Keeps the last four digits so log lines can still be correlated.
pub fn mask_phone(value: &str) -> String {
    let digits = digits_only(value);
    if digits.len() <= 4 {
        return mask_pii(value);
    }
    let tail = &digits[digits.len() - 4..];
    format!("<redacted len={} tail={}>", digits.len(), tail)
}

pub fn digits_only(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Drops the separators people type inside phone numbers.
pub fn strip_separators(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')' | '\t'))
        .collect()
}
