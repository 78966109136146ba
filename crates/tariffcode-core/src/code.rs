//! Normalisation and truncation of tariff codes.
//!
//! A tariff code is a fixed-length string of decimal digits. Sources supply
//! codes at their own native length (often 10 digits, sometimes with spaces
//! between digit pairs), and the label space is built at a chosen depth.
//!
//! # Hierarchy
//!
//! - 6 digits: international subheading
//! - 8 digits: combined nomenclature subheading
//! - 10 digits: commodity code
//!
//! Truncating a code to fewer digits yields its ancestor in the hierarchy,
//! which is how leaf scores are grouped for coarser answers.

/// Placeholder code for terms too generic to classify.
///
/// It lives in the label space so vague training text has somewhere to go,
/// but is never returned as a result.
pub const VAGUE_TERM_CODE: &str = "vvvvvvvvvv";

/// Normalise a raw code to exactly `digits` decimal digits.
///
/// Spaces are removed and the code is truncated to `digits` characters.
/// Returns `None` when the result is not exactly `digits` ASCII digits.
///
/// "0101 21 00 00" at 8 digits → "01012100"
pub fn normalize_code(raw: &str, digits: usize) -> Option<String> {
    if digits == 0 {
        return None;
    }

    let code: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .take(digits)
        .collect();

    if code.len() == digits && code.bytes().all(|b| b.is_ascii_digit()) {
        Some(code)
    } else {
        None
    }
}

/// Truncate a code to its first `digits` characters.
///
/// Codes shorter than `digits` are returned unchanged.
pub fn truncate_code(code: &str, digits: usize) -> &str {
    code.get(..digits).unwrap_or(code)
}

/// The vague-term sentinel at a given depth.
pub fn vague_code(digits: usize) -> &'static str {
    truncate_code(VAGUE_TERM_CODE, digits)
}

/// Normalise a free-text description: trimmed and lowercased.
///
/// Returns `None` for empty or whitespace-only input.
pub fn normalize_description(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}
