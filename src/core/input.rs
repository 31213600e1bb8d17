//! Normalisation helpers for form payloads.

/// Maps an empty string to `None`; other values pass through unchanged.
#[must_use]
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
