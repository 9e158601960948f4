//! Input sanitization functions
//!
//! Strings are normalized here before any length or emptiness check runs.

/// Trim a string, collapsing an all-whitespace value to `None`
pub fn trim_to_none(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
