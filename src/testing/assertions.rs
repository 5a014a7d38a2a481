//! Assertions over stage output lines.
//!
//! Reduce output follows group order and map output follows input order, so
//! [`assert_lines_equal`] is usually right. Samplers and other whole-stream
//! stages whose output order is unspecified use
//! [`assert_lines_unordered_equal`].

use std::collections::BTreeMap;
use std::fmt::Debug;

/// Assert that two line sequences are equal in order and content.
///
/// # Panics
///
/// Panics if the sequences differ in length or at any position.
///
/// # Example
///
/// ```
/// use tabreduce::testing::assert_lines_equal;
///
/// assert_lines_equal(&["a\t1", "b\t2"], &["a\t1", "b\t2"]);
/// ```
pub fn assert_lines_equal<A, E>(actual: &[A], expected: &[E])
where
    A: AsRef<str> + Debug,
    E: AsRef<str> + Debug,
{
    assert_eq!(
        actual.len(),
        expected.len(),
        "Line count mismatch:\n  Expected length: {}\n  Actual length: {}\n  Expected: {expected:?}\n  Actual: {actual:?}",
        expected.len(),
        actual.len()
    );

    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert_eq!(
            a.as_ref(),
            e.as_ref(),
            "Line mismatch at index {i}:\n  Full expected: {expected:?}\n  Full actual: {actual:?}"
        );
    }
}

/// Assert that two line sequences hold the same lines, ignoring order.
///
/// Duplicates count: `["a", "a"]` does not equal `["a"]`.
///
/// # Panics
///
/// Panics if any line occurs a different number of times in each sequence.
///
/// # Example
///
/// ```
/// use tabreduce::testing::assert_lines_unordered_equal;
///
/// assert_lines_unordered_equal(&["b", "a", "a"], &["a", "b", "a"]);
/// ```
pub fn assert_lines_unordered_equal<A, E>(actual: &[A], expected: &[E])
where
    A: AsRef<str> + Debug,
    E: AsRef<str> + Debug,
{
    let actual_counts = tally(actual);
    let expected_counts = tally(expected);

    if actual_counts != expected_counts {
        let missing: Vec<_> = expected_counts
            .iter()
            .filter(|(line, n)| actual_counts.get(*line) < Some(*n))
            .map(|(line, _)| *line)
            .collect();
        let extra: Vec<_> = actual_counts
            .iter()
            .filter(|(line, n)| expected_counts.get(*line) < Some(*n))
            .map(|(line, _)| *line)
            .collect();

        panic!(
            "Line content mismatch:\n  Missing lines: {missing:?}\n  Extra lines: {extra:?}\n  Expected: {expected:?}\n  Actual: {actual:?}"
        );
    }
}

fn tally<L: AsRef<str>>(lines: &[L]) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for line in lines {
        *counts.entry(line.as_ref()).or_insert(0) += 1;
    }
    counts
}

/// Assert that every line splits into exactly `columns` fields on `sep`.
///
/// # Panics
///
/// Panics on the first line with a different field count.
///
/// # Example
///
/// ```
/// use tabreduce::testing::assert_column_count;
///
/// assert_column_count(&["a\t1", "b\t2"], "\t", 2);
/// ```
pub fn assert_column_count<L: AsRef<str> + Debug>(lines: &[L], sep: &str, columns: usize) {
    for (i, line) in lines.iter().enumerate() {
        let found = line.as_ref().split(sep).count();
        assert_eq!(
            found, columns,
            "Column count mismatch at index {i}:\n  Expected: {columns}\n  Actual: {found}\n  Line: {line:?}"
        );
    }
}

/// Assert that all elements satisfy a predicate.
///
/// # Panics
///
/// Panics if any element does not satisfy the predicate.
///
/// # Example
///
/// ```
/// use tabreduce::testing::assert_all;
///
/// assert_all(&["a\t1", "b\t2"], |l| l.contains('\t'));
/// ```
pub fn assert_all<T: Debug>(collection: &[T], predicate: impl Fn(&T) -> bool) {
    for (i, item) in collection.iter().enumerate() {
        assert!(
            predicate(item),
            "Predicate failed for element at index {i}:\n  Element: {item:?}\n  Collection: {collection:?}"
        );
    }
}

/// Assert that `line` occurs in `lines`.
///
/// # Panics
///
/// Panics if the line is not found.
pub fn assert_contains_line<L: AsRef<str> + Debug>(lines: &[L], line: &str) {
    assert!(
        lines.iter().any(|l| l.as_ref() == line),
        "Line not found:\n  Looking for: {line:?}\n  Lines: {lines:?}"
    );
}
