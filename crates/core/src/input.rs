//! Numeric text-field validation shared by every form.
//!
//! The presentation layer calls [`screen_edit`] on each keystroke and the
//! `parse_*` functions again when the user submits, so a field that was
//! emptied while editing is still caught at submit time.

use crate::error::{DomainError, DomainResult};

/// Longest text a numeric field accepts while editing.
pub const DEFAULT_FIELD_MAX_LEN: usize = 3;

/// Parses an optionally signed 32-bit base-10 integer.
///
/// Surrounding whitespace, decimal points and empty text are rejected.
pub fn parse_int(field: &str, raw: &str) -> DomainResult<i64> {
    raw.parse::<i32>()
        .map(i64::from)
        .map_err(|_| DomainError::invalid_input(field, raw))
}

/// Parses a unit count: an integer that must not be negative.
pub fn parse_quantity(field: &str, raw: &str) -> DomainResult<u32> {
    let value = parse_int(field, raw)?;
    u32::try_from(value).map_err(|_| DomainError::negative_quantity(field, value))
}

/// Decides which text a numeric field keeps after an edit.
///
/// Empty text is kept so the user can clear the field before retyping.
/// Anything longer than `max_len` characters, or anything that is not an
/// integer, is refused and the field falls back to `previous`.
pub fn screen_edit<'a>(previous: &'a str, proposed: &'a str, max_len: usize) -> &'a str {
    if proposed.is_empty() {
        return proposed;
    }
    if proposed.chars().count() > max_len || proposed.parse::<i32>().is_err() {
        tracing::trace!(previous, proposed, "numeric field edit refused");
        return previous;
    }
    proposed
}
