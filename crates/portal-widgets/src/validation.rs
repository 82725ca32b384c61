#![forbid(unsafe_code)]

//! Format checks for form fields.
//!
//! Values are expected to be trimmed by the caller. Lengths count Unicode
//! scalar values, not bytes.

/// `value` is exactly `len` ASCII decimal digits.
///
/// The empty string never passes, even for `len == 0`.
#[must_use]
pub fn is_exact_digits(value: &str, len: usize) -> bool {
    !value.is_empty()
        && value.chars().count() == len
        && value.chars().all(|c| c.is_ascii_digit())
}

/// `value` has at least `min` characters.
#[must_use]
pub fn has_min_chars(value: &str, min: usize) -> bool {
    value.chars().count() >= min
}

/// `value` equals `expected` after ASCII case folding.
#[must_use]
pub fn matches_code(value: &str, expected: &str) -> bool {
    value.eq_ignore_ascii_case(expected)
}
