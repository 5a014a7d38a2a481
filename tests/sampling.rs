//! Tests for reservoir sampling.

use anyhow::Result;
use std::collections::{HashMap, HashSet};
use tabreduce::aggregators::ReservoirSample;
use tabreduce::testing::*;
use tabreduce::{StageError, StageRunner};

fn numbered(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("r{i}")).collect()
}

#[test]
fn short_stream_is_returned_whole() -> Result<()> {
    for n in [0, 1, 5, 10] {
        let input = numbered(n);
        let mut sample = ReservoirSample::with_seed(10, 1)?;
        let (out, _) = StageRunner::default().reduce_lines(&mut sample, &input)?;
        assert_lines_unordered_equal(&out, &input);
        assert_eq!(sample.seen(), n as u64);
    }
    Ok(())
}

#[test]
fn long_stream_yields_capacity_distinct_inputs() -> Result<()> {
    let input = numbered(500);
    let known: HashSet<&str> = input.iter().map(String::as_str).collect();

    for seed in 0..20 {
        let mut sample = ReservoirSample::with_seed(7, seed)?;
        let (out, report) = StageRunner::default().reduce_lines(&mut sample, &input)?;
        assert_eq!(out.len(), 7);
        assert_eq!(report.records_out, 7);

        let distinct: HashSet<&str> = out.iter().map(String::as_str).collect();
        assert_eq!(distinct.len(), 7, "duplicates in {out:?}");
        assert_all(&out, |line| known.contains(line.as_str()));
    }
    Ok(())
}

#[test]
fn same_seed_same_sample() -> Result<()> {
    let input = numbered(1000);
    let mut a = ReservoirSample::with_seed(16, 42)?;
    let mut b = ReservoirSample::with_seed(16, 42)?;
    let (out_a, _) = StageRunner::default().reduce_lines(&mut a, &input)?;
    let (out_b, _) = StageRunner::default().reduce_lines(&mut b, &input)?;
    assert_eq!(out_a, out_b);
    Ok(())
}

#[test]
fn rerun_starts_from_an_empty_pool() -> Result<()> {
    let mut sample = ReservoirSample::with_seed(3, 9)?;
    StageRunner::default().reduce_lines(&mut sample, &numbered(50))?;
    let (out, _) = StageRunner::default().reduce_lines(&mut sample, &["only"])?;
    assert_eq!(out, vec!["only"]);
    assert_eq!(sample.seen(), 1);
    Ok(())
}

#[test]
fn wider_samples_keep_several_columns() -> Result<()> {
    let mut sample = ReservoirSample::with_seed(2, 5)?.columns(2)?;
    let (out, _) = StageRunner::default().reduce_lines(&mut sample, &["a\t1\tx", "b\t2\ty"])?;
    assert_lines_unordered_equal(&out, &["a\t1", "b\t2"]);
    assert_column_count(&out, "\t", 2);
    Ok(())
}

#[test]
fn zero_capacity_or_columns_rejected() -> Result<()> {
    assert!(matches!(
        ReservoirSample::with_seed(0, 1),
        Err(StageError::Configuration(_))
    ));
    assert!(ReservoirSample::new(0).is_err());
    assert!(ReservoirSample::with_seed(1, 1)?.columns(0).is_err());
    Ok(())
}

#[mark_flaky_tests::flaky]
#[test]
fn selection_frequency_is_uniform() {
    const N: usize = 20;
    const M: usize = 5;
    const RUNS: usize = 4000;

    let input = numbered(N);
    let mut hits: HashMap<String, usize> = HashMap::new();
    for _ in 0..RUNS {
        let mut sample = ReservoirSample::new(M).expect("valid capacity");
        let (out, _) = StageRunner::default()
            .reduce_lines(&mut sample, &input)
            .expect("sampling run");
        for line in out {
            *hits.entry(line).or_default() += 1;
        }
    }

    // Each record is kept with probability M/N: 1000 expected hits, sd ~27.
    let expected = RUNS * M / N;
    for line in &input {
        let got = hits.get(line).copied().unwrap_or(0);
        let diff = got.abs_diff(expected);
        assert!(
            diff * 100 <= expected * 15,
            "{line} selected {got} times, expected about {expected}"
        );
    }
}
