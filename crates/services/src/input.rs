//! Presence checks and id parsing for raw request fields.

use domains::{BoardError, Result};
use uuid::Uuid;

/// An empty string counts as absent.
pub(crate) fn require<'a>(value: &'a str, field: &'static str) -> Result<&'a str> {
    if value.is_empty() {
        Err(BoardError::MissingParameter(field))
    } else {
        Ok(value)
    }
}

/// Parses an id field. A value that cannot be an id can never resolve,
/// so it is reported as not found rather than as bad input.
pub(crate) fn parse_id(raw: &str, field: &'static str, kind: &'static str) -> Result<Uuid> {
    let raw = require(raw, field)?;
    Uuid::parse_str(raw).map_err(|_| BoardError::NotFound(kind, raw.to_string()))
}
