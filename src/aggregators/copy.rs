//! Column passthrough.

use super::{numbered, require_positive};
use crate::emit::Emit;
use crate::error::StageError;
use crate::map::MapStage;
use crate::record::Record;
use crate::reduce::ReduceStage;
use crate::schema::RecordSchema;
use anyhow::Result;

/* ===================== Passthrough ===================== */

/// Copies `n` columns after skipping the first `skip`, one output per input.
///
/// Works as a map stage and as a (non-grouping) reduce stage.
///
/// - Input: `skip0..skip{skip-1}`, `col0..col{n-1}`
/// - Output: `col0..col{n-1}`
#[derive(Debug, Clone)]
pub struct Passthrough {
    schema: RecordSchema,
    skip: usize,
}

impl Passthrough {
    /// Copy the first `n` columns.
    ///
    /// # Errors
    /// Returns [`StageError::Configuration`] if `n` is zero.
    pub fn new(n: usize) -> Result<Self, StageError> {
        Self::skipping(n, 0)
    }

    /// Copy `n` columns after dropping the first `skip`.
    ///
    /// # Errors
    /// Returns [`StageError::Configuration`] if `n` is zero.
    pub fn skipping(n: usize, skip: usize) -> Result<Self, StageError> {
        require_positive("passthrough column count", n)?;
        let schema = RecordSchema::declare(
            numbered("skip", skip).chain(numbered("col", n)),
            numbered("col", n),
        )?;
        Ok(Self { schema, skip })
    }

    fn copy(&self, input: &Record) -> Emit {
        let mut out = self.schema.new_output();
        out.copy_from(input, self.skip);
        out.into()
    }
}

impl MapStage for Passthrough {
    fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    fn process(&mut self, input: &Record) -> Result<Emit> {
        Ok(self.copy(input))
    }
}

impl ReduceStage for Passthrough {
    fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    fn process(&mut self, input: &Record) -> Result<Emit> {
        Ok(self.copy(input))
    }
}
