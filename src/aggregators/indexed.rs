//! Two-level grouping: an outer group keyed by the first field, tallied by the
//! raw text of the second.
//!
//! At `term` one line is written per inner key, in the order the inner keys
//! were first seen within the group:
//!
//! ```text
//! 100  1000        100  1000  3
//! 100  1000   ->   100  1001  1
//! 100  1001
//! 100  1000
//! ```

use crate::emit::Emit;
use crate::error::StageError;
use crate::record::Record;
use crate::reduce::ReduceStage;
use crate::schema::RecordSchema;
use anyhow::{Result, anyhow};
use std::collections::HashMap;

/// Per-index totals in first-seen order.
#[derive(Debug, Clone, Default)]
struct Tally {
    order: Vec<(String, i64)>,
    slots: HashMap<String, usize>,
}

impl Tally {
    fn clear(&mut self) {
        self.order.clear();
        self.slots.clear();
    }

    fn add(&mut self, index: &str, by: i64) -> Result<()> {
        let slot = match self.slots.get(index) {
            Some(&slot) => slot,
            None => {
                self.order.push((index.to_string(), 0));
                self.slots.insert(index.to_string(), self.order.len() - 1);
                self.order.len() - 1
            }
        };
        let total = &mut self.order[slot].1;
        *total = total
            .checked_add(by)
            .ok_or_else(|| anyhow!("total for index `{index}` overflowed"))?;
        Ok(())
    }

    fn emit(&mut self, schema: &RecordSchema, key: &str) -> Emit {
        let rows = self
            .order
            .drain(..)
            .map(|(index, total)| {
                let mut out = schema.new_output();
                out.set(0, key);
                out.set(1, index);
                out.set(2, total);
                out
            })
            .collect();
        self.slots.clear();
        rows
    }
}

/* ===================== IndexedSum ===================== */

/// Sums `value` per `(unique, index)` pair within each `unique` group.
///
/// - Input: `unique`, `index`, `value`
/// - Output: `unique`, `index`, `value`
#[derive(Debug, Clone)]
pub struct IndexedSum {
    schema: RecordSchema,
    tally: Tally,
}

impl IndexedSum {
    /// # Errors
    /// Propagates schema declaration errors.
    pub fn new() -> Result<Self, StageError> {
        Ok(Self {
            schema: RecordSchema::declare(
                ["unique", "index", "value"],
                ["unique", "index", "value"],
            )?,
            tally: Tally::default(),
        })
    }
}

impl ReduceStage for IndexedSum {
    fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    fn init(&mut self, _input: &Record) -> Result<Emit> {
        self.tally.clear();
        Ok(Emit::none())
    }

    fn each(&mut self, input: &Record) -> Result<Emit> {
        let value = input.int(2)?;
        self.tally.add(input.cell(1), value)?;
        Ok(Emit::none())
    }

    fn term(&mut self, key: &str) -> Result<Emit> {
        Ok(self.tally.emit(&self.schema, key))
    }
}

/* ===================== IndexedCount ===================== */

/// Counts occurrences of each `index` within each `unique` group.
///
/// - Input: `unique`, `index`
/// - Output: `unique`, `index`, `value`
#[derive(Debug, Clone)]
pub struct IndexedCount {
    schema: RecordSchema,
    tally: Tally,
}

impl IndexedCount {
    /// # Errors
    /// Propagates schema declaration errors.
    pub fn new() -> Result<Self, StageError> {
        Ok(Self {
            schema: RecordSchema::declare(["unique", "index"], ["unique", "index", "value"])?,
            tally: Tally::default(),
        })
    }
}

impl ReduceStage for IndexedCount {
    fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    fn init(&mut self, _input: &Record) -> Result<Emit> {
        self.tally.clear();
        Ok(Emit::none())
    }

    fn each(&mut self, input: &Record) -> Result<Emit> {
        self.tally.add(input.cell(1), 1)?;
        Ok(Emit::none())
    }

    fn term(&mut self, key: &str) -> Result<Emit> {
        Ok(self.tally.emit(&self.schema, key))
    }
}
