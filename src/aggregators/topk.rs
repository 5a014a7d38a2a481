//! Bounded top-K retention over numeric values and grouped totals.
//!
//! Both reducers share [`BoundedPool`] and a [`Direction`]. The "smallest"
//! flavour is the same algorithm with the comparator reversed.

use super::BoundedPool;
use crate::emit::Emit;
use crate::error::StageError;
use crate::record::Record;
use crate::reduce::ReduceStage;
use crate::schema::RecordSchema;
use anyhow::{Result, anyhow};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Which end of the ordering a top-K pool keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Keep the largest values, emitted in descending order.
    #[default]
    Largest,
    /// Keep the smallest values, emitted in ascending order.
    Smallest,
}

impl Direction {
    /// `Less` when `a` should rank ahead of `b`.
    #[must_use]
    pub fn compare<T: Ord + ?Sized>(self, a: &T, b: &T) -> Ordering {
        match self {
            Self::Largest => b.cmp(a),
            Self::Smallest => a.cmp(b),
        }
    }
}

/* ===================== BoundedTopK ===================== */

/// One retained `(key, value)` row with its parsed score.
///
/// `value` keeps the cell text exactly as read, so `007` is written back as
/// `007` even though it ranks as 7.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranked {
    pub key: String,
    pub value: String,
    pub score: OrderedFloat<f64>,
}

type RankFn = Box<dyn Fn(&Ranked, &Ranked) -> Ordering + Send>;

/// Keeps the `capacity` best `(key, value)` records of the whole stream.
///
/// - Input / output: `key`, `value` (`value` must parse as a number)
///
/// Emits the pool best-first at `end`. Grouping is ignored.
#[derive(Debug)]
pub struct BoundedTopK {
    schema: RecordSchema,
    pool: BoundedPool<Ranked, RankFn>,
}

impl BoundedTopK {
    /// Keep the `capacity` records with the largest values.
    ///
    /// # Errors
    /// Returns [`StageError::Configuration`] if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, StageError> {
        Self::largest(capacity)
    }

    /// # Errors
    /// Returns [`StageError::Configuration`] if `capacity` is zero.
    pub fn largest(capacity: usize) -> Result<Self, StageError> {
        Self::ordered(capacity, Direction::Largest)
    }

    /// # Errors
    /// Returns [`StageError::Configuration`] if `capacity` is zero.
    pub fn smallest(capacity: usize) -> Result<Self, StageError> {
        Self::ordered(capacity, Direction::Smallest)
    }

    /// Rank by score in the given direction.
    ///
    /// # Errors
    /// Returns [`StageError::Configuration`] if `capacity` is zero.
    pub fn ordered(capacity: usize, direction: Direction) -> Result<Self, StageError> {
        Self::with_comparator(capacity, move |a, b| direction.compare(&a.score, &b.score))
    }

    /// Rank with an arbitrary comparator; `Less` means "keep ahead of".
    ///
    /// # Errors
    /// Returns [`StageError::Configuration`] if `capacity` is zero.
    pub fn with_comparator<F>(capacity: usize, cmp: F) -> Result<Self, StageError>
    where
        F: Fn(&Ranked, &Ranked) -> Ordering + Send + 'static,
    {
        let pool = BoundedPool::new(capacity, Box::new(cmp) as RankFn)?;
        Ok(Self {
            schema: RecordSchema::declare(["key", "value"], ["key", "value"])?,
            pool,
        })
    }

    /// Rows retained so far, best first.
    #[must_use]
    pub fn retained(&self) -> &[Ranked] {
        self.pool.items()
    }
}

impl ReduceStage for BoundedTopK {
    fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    fn begin(&mut self) -> Result<Emit> {
        self.pool.drain_sorted();
        Ok(Emit::none())
    }

    fn process(&mut self, input: &Record) -> Result<Emit> {
        let score = input.float(1)?;
        self.pool.offer(Ranked {
            key: input.cell(0).to_string(),
            value: input.cell(1).to_string(),
            score: OrderedFloat(score),
        });
        Ok(Emit::none())
    }

    fn end(&mut self) -> Result<Emit> {
        Ok(self
            .pool
            .drain_sorted()
            .into_iter()
            .map(|ranked| {
                let mut out = self.schema.new_output();
                out.set(0, ranked.key);
                out.set(1, ranked.value);
                out
            })
            .collect())
    }
}

/* ===================== GroupedSumTopK ===================== */

type TotalFn = Box<dyn Fn(&(String, i64), &(String, i64)) -> Ordering + Send>;

/// Sums `value` per group and keeps the `capacity` groups with the best totals.
///
/// - Input / output: `key`, `value`
///
/// Each group's total is offered to the pool at `term`; the pool is emitted
/// best-first at `end`.
#[derive(Debug)]
pub struct GroupedSumTopK {
    schema: RecordSchema,
    sum: i64,
    pool: BoundedPool<(String, i64), TotalFn>,
}

impl GroupedSumTopK {
    /// Keep the `capacity` groups with the largest totals.
    ///
    /// # Errors
    /// Returns [`StageError::Configuration`] if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, StageError> {
        Self::ordered(capacity, Direction::Largest)
    }

    /// # Errors
    /// Returns [`StageError::Configuration`] if `capacity` is zero.
    pub fn ordered(capacity: usize, direction: Direction) -> Result<Self, StageError> {
        let cmp: TotalFn =
            Box::new(move |a: &(String, i64), b: &(String, i64)| direction.compare(&a.1, &b.1));
        Ok(Self {
            schema: RecordSchema::declare(["key", "value"], ["key", "value"])?,
            sum: 0,
            pool: BoundedPool::new(capacity, cmp)?,
        })
    }

    /// `(key, total)` pairs retained so far, best first.
    #[must_use]
    pub fn retained(&self) -> &[(String, i64)] {
        self.pool.items()
    }
}

impl ReduceStage for GroupedSumTopK {
    fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    fn begin(&mut self) -> Result<Emit> {
        self.pool.drain_sorted();
        Ok(Emit::none())
    }

    fn init(&mut self, _input: &Record) -> Result<Emit> {
        self.sum = 0;
        Ok(Emit::none())
    }

    fn each(&mut self, input: &Record) -> Result<Emit> {
        let v = input.int(1)?;
        self.sum = self
            .sum
            .checked_add(v)
            .ok_or_else(|| anyhow!("total overflowed in group `{}`", input.cell(0)))?;
        Ok(Emit::none())
    }

    fn term(&mut self, key: &str) -> Result<Emit> {
        self.pool.offer((key.to_string(), self.sum));
        Ok(Emit::none())
    }

    fn end(&mut self) -> Result<Emit> {
        Ok(self
            .pool
            .drain_sorted()
            .into_iter()
            .map(|(key, total)| {
                let mut out = self.schema.new_output();
                out.set(0, key);
                out.set(1, total);
                out
            })
            .collect())
    }
}
