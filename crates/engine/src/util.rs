//! Internal helpers for input validation and name normalization.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::{EngineError, ResultEngine};

/// Trim a required text field, rejecting blank input.
pub(crate) fn normalize_required(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(format!(
            "{label} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Case- and diacritic-insensitive key used for category name uniqueness.
///
/// NFKD-decomposes, drops combining marks, lowercases alphanumerics and
/// collapses everything else into single spaces.
pub(crate) fn normalize_name_key(input: &str) -> ResultEngine<String> {
    let mut out = String::new();
    let mut prev_space = false;
    for ch in input.trim().nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_alphanumeric() {
            for lower in ch.to_lowercase() {
                out.push(lower);
            }
            prev_space = false;
        } else if !out.is_empty() && !prev_space {
            out.push(' ');
            prev_space = true;
        }
    }
    let normalized = out.trim();
    if normalized.is_empty() {
        return Err(EngineError::Validation(
            "name must contain at least one alphanumeric character".to_string(),
        ));
    }
    Ok(normalized.to_string())
}

/// Validate a `#rrggbb` hex color.
pub(crate) fn validate_hex_color(value: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or("");
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(EngineError::Validation(format!(
            "invalid color: {trimmed:?} (expected #rrggbb)"
        )));
    }
    Ok(trimmed.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_key_ignores_case_and_accents() {
        assert_eq!(normalize_name_key("  Café  Bars ").unwrap(), "cafe bars");
        assert_eq!(normalize_name_key("FOOD").unwrap(), "food");
        assert!(normalize_name_key("  --  ").is_err());
    }

    #[test]
    fn hex_color_validation() {
        assert_eq!(validate_hex_color("#A1B2C3").unwrap(), "#a1b2c3");
        assert!(validate_hex_color("red").is_err());
        assert!(validate_hex_color("#12345").is_err());
    }
}
