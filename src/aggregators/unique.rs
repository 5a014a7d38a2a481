//! Per-group key and first-record reducers.

use super::{numbered, require_positive};
use crate::emit::Emit;
use crate::error::StageError;
use crate::record::Record;
use crate::reduce::ReduceStage;
use crate::schema::RecordSchema;
use anyhow::Result;

/* ===================== Unique ===================== */

/// Emits each distinct group key once, when its group ends.
///
/// - Input / output: `value`
#[derive(Debug, Clone)]
pub struct Unique {
    schema: RecordSchema,
}

impl Unique {
    /// # Errors
    /// Propagates schema declaration errors.
    pub fn new() -> Result<Self, StageError> {
        Ok(Self {
            schema: RecordSchema::declare(["value"], ["value"])?,
        })
    }
}

impl ReduceStage for Unique {
    fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    fn term(&mut self, key: &str) -> Result<Emit> {
        let mut out = self.schema.new_output();
        out.set(0, key);
        Ok(out.into())
    }
}

/* ===================== FirstOfGroup ===================== */

/// Emits `n` columns (after skipping `skip`) of each group's first record.
///
/// The copy is taken at `init` and written at `term`; later records of the
/// group are ignored.
///
/// - Input: `skip0..skip{skip-1}`, `col0..col{n-1}`
/// - Output: `col0..col{n-1}`
#[derive(Debug, Clone)]
pub struct FirstOfGroup {
    schema: RecordSchema,
    skip: usize,
    first: Option<Record>,
}

impl FirstOfGroup {
    /// # Errors
    /// Returns [`StageError::Configuration`] if `n` is zero.
    pub fn new(n: usize, skip: usize) -> Result<Self, StageError> {
        require_positive("first-of-group column count", n)?;
        let schema = RecordSchema::declare(
            numbered("skip", skip).chain(numbered("col", n)),
            numbered("col", n),
        )?;
        Ok(Self {
            schema,
            skip,
            first: None,
        })
    }
}

impl ReduceStage for FirstOfGroup {
    fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    fn init(&mut self, input: &Record) -> Result<Emit> {
        let mut out = self.schema.new_output();
        out.copy_from(input, self.skip);
        self.first = Some(out);
        Ok(Emit::none())
    }

    fn term(&mut self, _key: &str) -> Result<Emit> {
        Ok(self.first.take().into())
    }
}
