//! Regex row filter.

use super::{numbered, require_positive};
use crate::emit::Emit;
use crate::error::StageError;
use crate::map::MapStage;
use crate::record::Record;
use crate::schema::RecordSchema;
use anyhow::Result;
use regex::Regex;

/* ===================== Select ===================== */

/// Keeps records whose `field` column matches `pattern` anywhere in the cell.
///
/// Records pass through unchanged; non-matching records produce no output.
///
/// - Input / output: `col0..col{n-1}`
#[derive(Debug, Clone)]
pub struct Select {
    schema: RecordSchema,
    pattern: Regex,
    field: usize,
}

impl Select {
    /// Match `pattern` against column `field` of `n`-column records.
    ///
    /// # Errors
    /// Returns [`StageError::Configuration`] if `pattern` does not compile, `n`
    /// is zero, or `field >= n`.
    pub fn new(pattern: &str, field: usize, n: usize) -> Result<Self, StageError> {
        require_positive("select column count", n)?;
        if field >= n {
            return Err(StageError::config(format!(
                "select field {field} outside {n} declared columns"
            )));
        }
        let pattern = Regex::new(pattern)
            .map_err(|e| StageError::config(format!("invalid select pattern: {e}")))?;
        let schema = RecordSchema::declare(numbered("col", n), numbered("col", n))?;
        Ok(Self {
            schema,
            pattern,
            field,
        })
    }

    /// Match against the first column of single-column records.
    ///
    /// # Errors
    /// Returns [`StageError::Configuration`] if `pattern` does not compile.
    pub fn first_column(pattern: &str) -> Result<Self, StageError> {
        Self::new(pattern, 0, 1)
    }
}

impl MapStage for Select {
    fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    fn process(&mut self, input: &Record) -> Result<Emit> {
        if self.pattern.is_match(input.cell(self.field)) {
            return Ok(input.clone().into());
        }
        Ok(Emit::none())
    }
}
