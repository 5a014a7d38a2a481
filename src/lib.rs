//! # tabreduce
//!
//! A local **map / grouped-reduce engine** for delimited text lines, with a
//! library of streaming aggregators.
//!
//! Data flows the way it does through a classic streaming job:
//!
//! ```text
//! raw lines -> decode -> MapStage -> encode -> sort -> decode -> ReduceStage -> encode -> lines
//! ```
//!
//! ## Key Features
//!
//! - **Schema-driven records** - fields declared once, addressed by position or name
//! - **Map stages** - per-record transforms emitting zero, one or many records
//! - **Grouped reduce stages** - `init`/`each`/`term` hooks over contiguous key runs
//! - **Built-in aggregators** - sums, counts, unique keys, indexed tallies,
//!   reservoir sampling, bounded top-K
//! - **Error policy** - abort on the first hook error, or count and carry on
//! - **Local jobs** - glob inputs, transparent gzip, multi-stage plans, metrics
//!
//! ## Quick Start
//!
//! ```
//! use tabreduce::StageRunner;
//! use tabreduce::aggregators::GroupedSum;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut sum = GroupedSum::new(1, 0)?;
//! let (out, report) =
//!     StageRunner::default().reduce_lines(&mut sum, &["100\t3", "100\t5", "101\t2"])?;
//! assert_eq!(out, vec!["100\t8", "101\t2"]);
//! assert_eq!(report.groups, 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Records and schemas
//!
//! A [`RecordSchema`] fixes ordered input and output field names and the
//! separators. [`RecordSchema::decode`] turns a line into a [`Record`];
//! [`RecordSchema::encode`] projects the output fields back into a line.
//! Cells are text; numbers are parsed where they are used (see [`numeric`]).
//!
//! ### Stages
//!
//! - [`MapStage`] - `process` once per record, plus optional `begin`/`end`
//! - [`ReduceStage`] - grouping hooks driven by a [`GroupTracker`], plus
//!   `begin`/`process`/`end` for whole-stream work
//!
//! Every hook returns an [`Emit`]: nothing, one record, or many.
//!
//! ### Running
//!
//! [`StageRunner`] runs one stage over a reader and writer (or in-memory
//! lines) and returns a [`RunReport`]. [`LocalJob`] chains [`StagePlan`]s
//! over files.
//!
//! ## Feature Flags
//!
//! - `compression-gzip` (default) - read and write `.gz` files transparently
//!
//! ## Module Overview
//!
//! - [`schema`] / [`record`] - line codec and record container
//! - [`map`] / [`reduce`] - stage traits and the grouping state machine
//! - [`runtime`] - the run loop and error policy
//! - [`aggregators`] - built-in stages
//! - [`job`] - local multi-stage jobs
//! - [`io`] - globbing and compression
//! - [`metrics`] - run counters and custom metrics
//! - [`testing`] - assertions and fixtures for stage tests

pub mod aggregators;
pub mod emit;
pub mod error;
pub mod io;
pub mod job;
pub mod map;
pub mod metrics;
pub mod numeric;
pub mod record;
pub mod reduce;
pub mod runtime;
pub mod schema;
pub mod testing;

pub use emit::Emit;
pub use error::{Hook, StageError};
pub use job::{GroupingSort, JobOptions, JobReport, LexicalSort, LocalJob, StagePlan, StageReport};
pub use map::{MapFn, MapStage};
pub use metrics::{CounterMetric, Metric, MetricsCollector};
pub use numeric::{NumericError, NumericKind, parse_float, parse_int};
pub use record::{Layout, Record};
pub use reduce::{GroupState, GroupTracker, ReduceStage, Transition};
pub use runtime::{RunReport, StageOptions, StageRunner};
pub use schema::{RecordSchema, TAB};
