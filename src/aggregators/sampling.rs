//! Uniform fixed-size sampling of a whole stream.

use super::{numbered, require_positive};
use crate::emit::Emit;
use crate::error::StageError;
use crate::record::Record;
use crate::reduce::ReduceStage;
use crate::schema::RecordSchema;
use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/* ===================== ReservoirSample<R> ===================== */

/// Keeps a uniform random sample of `capacity` records (Algorithm R).
///
/// The first `capacity` records are always kept. Record number `n` after that
/// replaces a random slot with probability `capacity / n`. Grouping is
/// ignored; the pool is emitted at `end` in slot order.
///
/// - Input / output: `col0..col{columns-1}` (one column unless widened with
///   [`columns`](Self::columns))
///
/// # Examples
/// ```
/// use tabreduce::StageRunner;
/// use tabreduce::aggregators::ReservoirSample;
///
/// let mut sample = ReservoirSample::with_seed(2, 7)?;
/// let (out, _) = StageRunner::default().reduce_lines(&mut sample, &["a", "b", "c", "d"])?;
/// assert_eq!(out.len(), 2);
/// # anyhow::Result::<()>::Ok(())
/// ```
#[derive(Debug, Clone)]
pub struct ReservoirSample<R = StdRng> {
    schema: RecordSchema,
    capacity: usize,
    seen: u64,
    pool: Vec<Record>,
    rng: R,
}

impl ReservoirSample<StdRng> {
    /// Sample with a generator seeded from the thread RNG.
    ///
    /// # Errors
    /// Returns [`StageError::Configuration`] if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, StageError> {
        Self::with_rng(capacity, StdRng::from_rng(&mut rand::rng()))
    }

    /// Sample reproducibly from a fixed seed.
    ///
    /// # Errors
    /// Returns [`StageError::Configuration`] if `capacity` is zero.
    pub fn with_seed(capacity: usize, seed: u64) -> Result<Self, StageError> {
        Self::with_rng(capacity, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> ReservoirSample<R> {
    /// # Errors
    /// Returns [`StageError::Configuration`] if `capacity` is zero.
    pub fn with_rng(capacity: usize, rng: R) -> Result<Self, StageError> {
        require_positive("sample capacity", capacity)?;
        Ok(Self {
            schema: Self::declare(1)?,
            capacity,
            seen: 0,
            pool: Vec::with_capacity(capacity),
            rng,
        })
    }

    /// Retain `n` leading columns of each sampled record.
    ///
    /// # Errors
    /// Returns [`StageError::Configuration`] if `n` is zero.
    pub fn columns(mut self, n: usize) -> Result<Self, StageError> {
        require_positive("sample column count", n)?;
        self.schema = Self::declare(n)?;
        Ok(self)
    }

    fn declare(n: usize) -> Result<RecordSchema, StageError> {
        RecordSchema::declare(numbered("col", n), numbered("col", n))
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records observed since `begin`.
    #[must_use]
    pub const fn seen(&self) -> u64 {
        self.seen
    }

    #[must_use]
    pub fn pool(&self) -> &[Record] {
        &self.pool
    }
}

impl<R: Rng> ReduceStage for ReservoirSample<R> {
    fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    fn begin(&mut self) -> Result<Emit> {
        self.seen = 0;
        self.pool.clear();
        Ok(Emit::none())
    }

    fn process(&mut self, input: &Record) -> Result<Emit> {
        self.seen += 1;
        let mut kept = self.schema.new_output();
        kept.copy_from(input, 0);
        if self.pool.len() < self.capacity {
            self.pool.push(kept);
            return Ok(Emit::none());
        }
        let slot = self.rng.random_range(0..self.seen);
        if let Ok(slot) = usize::try_from(slot)
            && slot < self.capacity
        {
            self.pool[slot] = kept;
        }
        Ok(Emit::none())
    }

    fn end(&mut self) -> Result<Emit> {
        Ok(std::mem::take(&mut self.pool).into())
    }
}
