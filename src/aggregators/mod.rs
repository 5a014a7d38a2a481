//! Built-in stages for common map and reduce jobs.
//!
//! Each aggregator declares its own [`RecordSchema`](crate::RecordSchema) and
//! validates its parameters at construction, so a bad capacity or pattern fails
//! before any record is read.
//!
//! | Stage | Kind | Emits |
//! |---|---|---|
//! | [`Passthrough`] | map or reduce | columns `skip..skip+n` of every record |
//! | [`Select`] | map | records whose field matches a regex |
//! | [`Unique`] | reduce | each group key once |
//! | [`FirstOfGroup`] | reduce | columns of each group's first record |
//! | [`StreamSum`] | reduce | one line of float sums over the whole stream |
//! | [`GroupedSum`] | reduce | per-group integer sums plus last extras |
//! | [`GroupedCount`] | reduce | per-group record counts plus last extras |
//! | [`IndexedSum`] / [`IndexedCount`] | reduce | per (group, second field) sum or count |
//! | [`ReservoirSample`] | reduce | a uniform fixed-size sample of the stream |
//! | [`BoundedTopK`] | reduce | the M best records by value |
//! | [`GroupedSumTopK`] | reduce | the M groups with the best totals |
//!
//! # Examples
//! ```
//! use tabreduce::StageRunner;
//! use tabreduce::aggregators::GroupedSum;
//!
//! let mut sum = GroupedSum::new(1, 0)?;
//! let (out, _) = StageRunner::default().reduce_lines(&mut sum, &["a\t1", "a\t2", "b\t5"])?;
//! assert_eq!(out, vec!["a\t3", "b\t5"]);
//! # anyhow::Result::<()>::Ok(())
//! ```

mod copy;
mod indexed;
mod pool;
mod sampling;
mod select;
mod sum;
mod topk;
mod unique;

pub use copy::Passthrough;
pub use indexed::{IndexedCount, IndexedSum};
pub use pool::BoundedPool;
pub use sampling::ReservoirSample;
pub use select::Select;
pub use sum::{GroupedCount, GroupedSum, StreamSum};
pub use topk::{BoundedTopK, Direction, GroupedSumTopK, Ranked};
pub use unique::{FirstOfGroup, Unique};

use crate::error::StageError;

/// `prefix0`, `prefix1`, ... `prefix{n-1}`.
pub(crate) fn numbered(prefix: &str, n: usize) -> impl Iterator<Item = String> + '_ {
    (0..n).map(move |i| format!("{prefix}{i}"))
}

pub(crate) fn require_positive(what: &str, n: usize) -> Result<(), StageError> {
    if n == 0 {
        return Err(StageError::config(format!("{what} must be at least 1")));
    }
    Ok(())
}
