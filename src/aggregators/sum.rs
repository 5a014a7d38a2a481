//! Summing and counting reducers.

use super::{numbered, require_positive};
use crate::emit::Emit;
use crate::error::StageError;
use crate::record::Record;
use crate::reduce::ReduceStage;
use crate::schema::RecordSchema;
use anyhow::{Result, anyhow};

/* ===================== StreamSum ===================== */

/// Float sums of `n` columns (after skipping `skip`) over the whole stream.
///
/// Grouping is ignored; exactly one line is written, at `end`.
///
/// - Input: `skip0..skip{skip-1}`, `count0..count{n-1}`
/// - Output: `sum0..sum{n-1}`
#[derive(Debug, Clone)]
pub struct StreamSum {
    schema: RecordSchema,
    skip: usize,
    sums: Vec<f64>,
}

impl StreamSum {
    /// # Errors
    /// Returns [`StageError::Configuration`] if `n` is zero.
    pub fn new(n: usize, skip: usize) -> Result<Self, StageError> {
        require_positive("sum column count", n)?;
        let schema = RecordSchema::declare(
            numbered("skip", skip).chain(numbered("count", n)),
            numbered("sum", n),
        )?;
        Ok(Self {
            schema,
            skip,
            sums: vec![0.0; n],
        })
    }
}

impl ReduceStage for StreamSum {
    fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    fn begin(&mut self) -> Result<Emit> {
        self.sums.fill(0.0);
        Ok(Emit::none())
    }

    fn process(&mut self, input: &Record) -> Result<Emit> {
        // Parse every column first so a bad cell leaves all sums untouched.
        let values = (0..self.sums.len())
            .map(|i| input.float(self.skip + i))
            .collect::<Result<Vec<_>, _>>()?;
        for (sum, v) in self.sums.iter_mut().zip(values) {
            *sum += v;
        }
        Ok(Emit::none())
    }

    fn end(&mut self) -> Result<Emit> {
        let mut out = self.schema.new_output();
        for (i, sum) in self.sums.iter().enumerate() {
            out.set(i, sum);
        }
        Ok(out.into())
    }
}

/* ===================== GroupedSum ===================== */

/// Per-group integer sums of `n` columns, plus the last-seen `extra` columns.
///
/// - Input: `unique`, `count0..count{n-1}`, `extra0..extra{extra-1}`
/// - Output: `value`, `sum0..sum{n-1}`, `extra0..extra{extra-1}`
#[derive(Debug, Clone)]
pub struct GroupedSum {
    schema: RecordSchema,
    sums: Vec<i64>,
    extras: Vec<String>,
}

impl GroupedSum {
    /// # Errors
    /// Returns [`StageError::Configuration`] if `n` is zero.
    pub fn new(n: usize, extra: usize) -> Result<Self, StageError> {
        require_positive("sum column count", n)?;
        let schema = RecordSchema::declare(
            ["unique".to_string()]
                .into_iter()
                .chain(numbered("count", n))
                .chain(numbered("extra", extra)),
            ["value".to_string()]
                .into_iter()
                .chain(numbered("sum", n))
                .chain(numbered("extra", extra)),
        )?;
        Ok(Self {
            schema,
            sums: vec![0; n],
            extras: vec![String::new(); extra],
        })
    }
}

impl ReduceStage for GroupedSum {
    fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    fn init(&mut self, _input: &Record) -> Result<Emit> {
        self.sums.fill(0);
        self.extras.fill(String::new());
        Ok(Emit::none())
    }

    fn each(&mut self, input: &Record) -> Result<Emit> {
        let n = self.sums.len();
        let values = (0..n)
            .map(|i| input.int(1 + i))
            .collect::<Result<Vec<_>, _>>()?;
        for (i, (sum, v)) in self.sums.iter_mut().zip(values).enumerate() {
            *sum = sum
                .checked_add(v)
                .ok_or_else(|| anyhow!("sum{i} overflowed in group `{}`", input.cell(0)))?;
        }
        for (i, extra) in self.extras.iter_mut().enumerate() {
            extra.clear();
            extra.push_str(input.cell(1 + n + i));
        }
        Ok(Emit::none())
    }

    fn term(&mut self, key: &str) -> Result<Emit> {
        let n = self.sums.len();
        let mut out = self.schema.new_output();
        out.set(0, key);
        for (i, sum) in self.sums.iter().enumerate() {
            out.set(1 + i, sum);
        }
        for (i, extra) in self.extras.iter().enumerate() {
            out.set(1 + n + i, extra);
        }
        Ok(out.into())
    }
}

/* ===================== GroupedCount ===================== */

/// Per-group record counts, plus the last-seen `extra` columns.
///
/// - Input: `unique`, `extra0..extra{extra-1}`
/// - Output: `value`, `count`, `extra0..extra{extra-1}`
#[derive(Debug, Clone)]
pub struct GroupedCount {
    schema: RecordSchema,
    count: u64,
    extras: Vec<String>,
}

impl GroupedCount {
    /// # Errors
    /// Propagates schema declaration errors.
    pub fn new(extra: usize) -> Result<Self, StageError> {
        let schema = RecordSchema::declare(
            ["unique".to_string()]
                .into_iter()
                .chain(numbered("extra", extra)),
            ["value".to_string(), "count".to_string()]
                .into_iter()
                .chain(numbered("extra", extra)),
        )?;
        Ok(Self {
            schema,
            count: 0,
            extras: vec![String::new(); extra],
        })
    }
}

impl ReduceStage for GroupedCount {
    fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    fn init(&mut self, _input: &Record) -> Result<Emit> {
        self.count = 0;
        self.extras.fill(String::new());
        Ok(Emit::none())
    }

    fn each(&mut self, input: &Record) -> Result<Emit> {
        self.count += 1;
        for (i, extra) in self.extras.iter_mut().enumerate() {
            extra.clear();
            extra.push_str(input.cell(1 + i));
        }
        Ok(Emit::none())
    }

    fn term(&mut self, key: &str) -> Result<Emit> {
        let mut out = self.schema.new_output();
        out.set(0, key);
        out.set(1, self.count);
        for (i, extra) in self.extras.iter().enumerate() {
            out.set(2 + i, extra);
        }
        Ok(out.into())
    }
}
