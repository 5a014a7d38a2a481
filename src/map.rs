//! Map stages: independent per-record transforms.
//!
//! A map stage sees every input record exactly once, in input order, and may
//! emit any number of records for it. Optional [`begin`](MapStage::begin) and
//! [`end`](MapStage::end) hooks bracket the run for whole-stream accumulation.
//!
//! ```
//! use tabreduce::{Emit, MapFn, RecordSchema, StageRunner};
//!
//! let schema = RecordSchema::declare(["date", "time", "url"], ["date_time", "url"])?;
//! let mut stage = MapFn::new(schema, |rec, schema| {
//!     let mut out = schema.new_output();
//!     out.set(0, format!("{}T{}", rec.cell(0), rec.cell(1)));
//!     out.set(1, rec.cell(2));
//!     Ok(out.into())
//! });
//! let (lines, _) = StageRunner::default().map_lines(&mut stage, &["2008-10-01\t10:30:00\t/a"])?;
//! assert_eq!(lines, vec!["2008-10-01T10:30:00\t/a"]);
//! # Ok::<(), tabreduce::StageError>(())
//! ```

use crate::emit::Emit;
use crate::record::Record;
use crate::schema::RecordSchema;
use anyhow::Result;

/// A per-record transform.
pub trait MapStage {
    /// The schema used to decode input and encode output.
    fn schema(&self) -> &RecordSchema;

    /// Called once before any input.
    fn begin(&mut self) -> Result<Emit> {
        Ok(Emit::none())
    }

    /// Called once per input record.
    fn process(&mut self, input: &Record) -> Result<Emit>;

    /// Called once after the last input.
    fn end(&mut self) -> Result<Emit> {
        Ok(Emit::none())
    }
}

impl<S: MapStage + ?Sized> MapStage for Box<S> {
    fn schema(&self) -> &RecordSchema {
        (**self).schema()
    }

    fn begin(&mut self) -> Result<Emit> {
        (**self).begin()
    }

    fn process(&mut self, input: &Record) -> Result<Emit> {
        (**self).process(input)
    }

    fn end(&mut self) -> Result<Emit> {
        (**self).end()
    }
}

/// A map stage built from a closure.
///
/// The closure receives the input record and the stage schema (for
/// [`RecordSchema::new_output`]).
pub struct MapFn<F> {
    schema: RecordSchema,
    f: F,
}

impl<F> MapFn<F>
where
    F: FnMut(&Record, &RecordSchema) -> Result<Emit>,
{
    pub const fn new(schema: RecordSchema, f: F) -> Self {
        Self { schema, f }
    }
}

impl<F> MapStage for MapFn<F>
where
    F: FnMut(&Record, &RecordSchema) -> Result<Emit>,
{
    fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    fn process(&mut self, input: &Record) -> Result<Emit> {
        (self.f)(input, &self.schema)
    }
}
