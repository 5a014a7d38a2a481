//! Tests for bounded top-K retention.

use anyhow::Result;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tabreduce::aggregators::{BoundedPool, BoundedTopK, Direction, GroupedSumTopK};
use tabreduce::testing::*;
use tabreduce::{StageError, StageRunner};

fn keyed(values: &[i64]) -> Vec<String> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| format!("k{i}\t{v}"))
        .collect()
}

#[test]
fn largest_values_in_descending_order() -> Result<()> {
    let mut top = BoundedTopK::new(3)?;
    let (out, _) = StageRunner::default().reduce_lines(&mut top, &keyed(&[5, 1, 9, 3, 7, 2]))?;
    assert_lines_equal(&out, &["k2\t9", "k4\t7", "k0\t5"]);
    Ok(())
}

#[test]
fn smallest_is_the_same_pool_reversed() -> Result<()> {
    let mut bottom = BoundedTopK::smallest(2)?;
    let (out, _) =
        StageRunner::default().reduce_lines(&mut bottom, &keyed(&[5, 1, 9, 3, 7, 2]))?;
    assert_lines_equal(&out, &["k1\t1", "k5\t2"]);
    Ok(())
}

#[test]
fn fewer_records_than_capacity() -> Result<()> {
    let mut top = BoundedTopK::new(10)?;
    let (out, _) = StageRunner::default().reduce_lines(&mut top, &keyed(&[4, 8]))?;
    assert_lines_equal(&out, &["k1\t8", "k0\t4"]);
    Ok(())
}

#[test]
fn value_text_is_kept_verbatim() -> Result<()> {
    let mut top = BoundedTopK::new(2)?;
    let (out, _) =
        StageRunner::default().reduce_lines(&mut top, &["a\t007", "b\t1e1", "c\t2.50"])?;
    assert_lines_equal(&out, &["b\t1e1", "a\t007"]);
    Ok(())
}

#[test]
fn ties_keep_the_incumbent() -> Result<()> {
    let mut top = BoundedTopK::new(2)?;
    let (out, _) = StageRunner::default().reduce_lines(&mut top, &["a\t5", "b\t5", "c\t5"])?;
    assert_lines_equal(&out, &["a\t5", "b\t5"]);
    Ok(())
}

#[test]
fn matches_full_sort_for_any_arrival_order() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(0x70_9C);
    for round in 0..25 {
        let len = rng.random_range(1..200_usize);
        let capacity = rng.random_range(1..20_usize);
        let mut values: Vec<i64> = (0..len).map(|_| rng.random_range(-1000..1000)).collect();
        values.shuffle(&mut rng);

        let mut top = BoundedTopK::new(capacity)?;
        let (out, _) = StageRunner::default().reduce_lines(&mut top, &keyed(&values))?;
        let got: Vec<i64> = out
            .iter()
            .map(|l| l.split('\t').nth(1).unwrap_or_default().parse())
            .collect::<Result<_, _>>()?;

        let mut expected = values.clone();
        expected.sort_unstable_by(|a, b| b.cmp(a));
        expected.truncate(capacity);
        assert_eq!(got, expected, "round {round}: capacity {capacity}, len {len}");
    }
    Ok(())
}

#[test]
fn custom_comparator_ranks_by_key() -> Result<()> {
    let mut top = BoundedTopK::with_comparator(2, |a, b| a.key.cmp(&b.key))?;
    let (out, _) = StageRunner::default().reduce_lines(&mut top, &["m\t1", "c\t2", "x\t3", "a\t4"])?;
    assert_lines_equal(&out, &["a\t4", "c\t2"]);
    assert!(top.retained().is_empty());
    Ok(())
}

#[test]
fn non_numeric_value_is_a_hook_error() -> Result<()> {
    let mut top = BoundedTopK::new(2)?;
    let (out, report) =
        StageRunner::catching().reduce_lines(&mut top, &["a\t1", "b\tmany", "c\t3"])?;
    assert_lines_equal(&out, &["c\t3", "a\t1"]);
    assert_eq!(report.errors, 1);
    Ok(())
}

#[test]
fn grouped_sum_top_k_keeps_best_totals() -> Result<()> {
    let lines = [
        "a\t1", "a\t1", "b\t10", "c\t4", "c\t4", "d\t3", "e\t2", "e\t2", "e\t2",
    ];
    let mut top = GroupedSumTopK::new(2)?;
    let (out, report) = StageRunner::default().reduce_lines(&mut top, &lines)?;
    assert_lines_equal(&out, &["b\t10", "c\t8"]);
    assert_eq!(report.groups, 5);

    let mut bottom = GroupedSumTopK::ordered(2, Direction::Smallest)?;
    let (out, _) = StageRunner::default().reduce_lines(&mut bottom, &lines)?;
    assert_lines_equal(&out, &["a\t2", "d\t3"]);
    Ok(())
}

#[test]
fn pool_rejects_zero_capacity() {
    assert!(matches!(
        BoundedTopK::new(0),
        Err(StageError::Configuration(_))
    ));
    assert!(matches!(
        GroupedSumTopK::new(0),
        Err(StageError::Configuration(_))
    ));
    assert!(BoundedPool::new(0, |a: &i32, b: &i32| a.cmp(b)).is_err());
}

#[test]
fn pool_offer_reports_retention() -> Result<()> {
    let mut pool = BoundedPool::new(2, |a: &i32, b: &i32| b.cmp(a))?;
    assert!(pool.offer(1));
    assert!(pool.offer(3));
    assert!(pool.is_full());
    assert!(!pool.offer(0));
    assert!(pool.offer(2));
    assert_eq!(pool.items(), &[3, 2]);
    assert_eq!(pool.drain_sorted(), vec![3, 2]);
    assert!(pool.is_empty());
    Ok(())
}

#[test]
fn direction_deserializes_lowercase() -> Result<()> {
    let d: Direction = serde_json::from_str(r#""smallest""#)?;
    assert_eq!(d, Direction::Smallest);
    assert_eq!(Direction::default(), Direction::Largest);
    Ok(())
}
