//! Numeric interpretation of text cells.
//!
//! Cells are stored as text; every aggregator that needs numbers parses through
//! here so that non-numeric input always fails the same way.

use thiserror::Error;

/// The numeric kind a cell was expected to hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericKind {
    Integer,
    Float,
}

/// A cell could not be read as a number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {kind:?} cell, found {text:?}")]
pub struct NumericError {
    pub text: String,
    pub kind: NumericKind,
}

/// Parse a cell as a signed 64-bit integer. Surrounding whitespace is ignored.
///
/// # Errors
/// Returns [`NumericError`] for empty or non-integer text.
pub fn parse_int(cell: &str) -> Result<i64, NumericError> {
    cell.trim().parse::<i64>().map_err(|_| NumericError {
        text: cell.to_string(),
        kind: NumericKind::Integer,
    })
}

/// Parse a cell as an `f64`. Surrounding whitespace is ignored.
///
/// # Errors
/// Returns [`NumericError`] for empty or non-numeric text. `NaN` is rejected so
/// that scores stay totally ordered.
pub fn parse_float(cell: &str) -> Result<f64, NumericError> {
    match cell.trim().parse::<f64>() {
        Ok(v) if !v.is_nan() => Ok(v),
        _ => Err(NumericError {
            text: cell.to_string(),
            kind: NumericKind::Float,
        }),
    }
}
