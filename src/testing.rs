//! Helpers for testing stages and jobs.
//!
//! - **Assertions**: compare output lines in order or as a multiset, and check
//!   line shape
//! - **Fixtures**: small grouped inputs with known results, plus a web-log
//!   sample for map-stage tests
//! - [`lines`]: build an owned line vector from string literals
//!
//! # Quick Start
//!
//! ```
//! use tabreduce::StageRunner;
//! use tabreduce::aggregators::GroupedSum;
//! use tabreduce::testing::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut sum = GroupedSum::new(1, 0)?;
//! let (out, report) = StageRunner::default().reduce_lines(&mut sum, &grouped_sum_input())?;
//! assert_lines_equal(&out, &grouped_sum_expected());
//! assert_eq!(report.errors, 0);
//! # Ok(())
//! # }
//! ```

pub mod assertions;
pub mod fixtures;

pub use assertions::*;
pub use fixtures::*;

/// Owned lines from anything string-like.
///
/// ```
/// use tabreduce::testing::lines;
///
/// assert_eq!(lines(["a\t1", "b\t2"]), vec!["a\t1".to_string(), "b\t2".to_string()]);
/// ```
pub fn lines<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}
