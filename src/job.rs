//! Local job runner: map, sort, reduce over files, one stage after another.
//!
//! Each [`StagePlan`] pairs a map stage with a reduce stage:
//!
//! 1. every file matched by the plan's input patterns is streamed (gzip
//!    transparently) through the mapper, one file after another;
//! 2. the mapper's output lines are grouped by a [`GroupingSort`];
//! 3. the reducer runs over the sorted lines and writes the output file.
//!
//! A later stage can read an earlier stage's output by naming its path as an
//! input pattern.
//!
//! # Examples
//! ```no_run
//! use tabreduce::aggregators::{GroupedSumTopK, Passthrough};
//! use tabreduce::{JobOptions, LocalJob, StagePlan};
//!
//! let mut job = LocalJob::new(JobOptions::default()).stage(
//!     StagePlan::new(Passthrough::new(2)?, GroupedSumTopK::new(10)?)
//!         .input("logs/*.tsv.gz")
//!         .output("out/top10.tsv"),
//! );
//! let report = job.run()?;
//! println!("{} errors", report.errors());
//! # anyhow::Result::<()>::Ok(())
//! ```

use crate::io::glob::expand_patterns;
use crate::io::{create_output, open_concatenated};
use crate::map::MapStage;
use crate::metrics::MetricsCollector;
use crate::reduce::ReduceStage;
use crate::runtime::{RunReport, StageOptions, StageRunner};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::{self, BufRead, Read};
use std::path::{Path, PathBuf};
use tracing::info;

/* ===================== Configuration ===================== */

/// Options for a whole job.
///
/// Every field has a default, so a config file only names what it changes:
///
/// ```json
/// { "catch_errors": true, "metrics_path": "out/metrics.json" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobOptions {
    /// Passed to every stage run; see [`StageOptions::catch_errors`].
    pub catch_errors: bool,
    /// Where to write the job's metrics as JSON after a successful run.
    pub metrics_path: Option<PathBuf>,
}

impl JobOptions {
    /// Load options from a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not valid options JSON.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text =
            fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parse job options {}", path.display()))
    }

    #[must_use]
    pub const fn stage_options(&self) -> StageOptions {
        StageOptions {
            catch_errors: self.catch_errors,
        }
    }
}

/* ===================== Sorting ===================== */

/// Orders intermediate lines so equal grouping keys are contiguous.
pub trait GroupingSort {
    /// Reorder `lines` in place.
    ///
    /// # Errors
    /// Implementations backed by an external tool may fail.
    fn sort(&self, lines: &mut [String]) -> Result<()>;
}

/// Byte-wise ordering of whole lines, the same order `LC_ALL=C sort` gives.
///
/// Lines sharing a key followed by the separator share a prefix, so each key's
/// lines end up adjacent.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalSort;

impl GroupingSort for LexicalSort {
    fn sort(&self, lines: &mut [String]) -> Result<()> {
        lines.sort();
        Ok(())
    }
}

/* ===================== StagePlan ===================== */

/// One map → sort → reduce step of a job.
pub struct StagePlan {
    name: Option<String>,
    mapper: Box<dyn MapStage>,
    reducer: Box<dyn ReduceStage>,
    inputs: Vec<String>,
    output: Option<PathBuf>,
}

impl StagePlan {
    pub fn new(mapper: impl MapStage + 'static, reducer: impl ReduceStage + 'static) -> Self {
        Self {
            name: None,
            mapper: Box::new(mapper),
            reducer: Box::new(reducer),
            inputs: Vec::new(),
            output: None,
        }
    }

    /// Label used for metrics and logs; defaults to `stage<N>`.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add an input glob pattern.
    #[must_use]
    pub fn input(mut self, pattern: impl Into<String>) -> Self {
        self.inputs.push(pattern.into());
        self
    }

    #[must_use]
    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    #[must_use]
    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }
}

impl fmt::Debug for StagePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StagePlan")
            .field("name", &self.name)
            .field("inputs", &self.inputs)
            .field("output", &self.output)
            .finish_non_exhaustive()
    }
}

/* ===================== Reports ===================== */

/// Outcome of one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    pub name: String,
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
    pub map: RunReport,
    pub reduce: RunReport,
}

/// Outcome of a whole job, one entry per stage in run order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobReport {
    pub stages: Vec<StageReport>,
}

impl JobReport {
    /// Hook errors across every run of the job.
    #[must_use]
    pub fn errors(&self) -> u64 {
        self.stages
            .iter()
            .map(|s| s.map.errors + s.reduce.errors)
            .sum()
    }
}

/* ===================== LocalJob ===================== */

/// Runs stage plans in order on the local machine.
pub struct LocalJob {
    options: JobOptions,
    stages: Vec<StagePlan>,
    sorter: Box<dyn GroupingSort>,
    metrics: MetricsCollector,
}

impl LocalJob {
    #[must_use]
    pub fn new(options: JobOptions) -> Self {
        Self {
            options,
            stages: Vec::new(),
            sorter: Box::new(LexicalSort),
            metrics: MetricsCollector::new(),
        }
    }

    /// Append a stage.
    #[must_use]
    pub fn stage(mut self, plan: StagePlan) -> Self {
        self.stages.push(plan);
        self
    }

    /// Replace the default [`LexicalSort`].
    #[must_use]
    pub fn sorter(mut self, sorter: impl GroupingSort + 'static) -> Self {
        self.sorter = Box::new(sorter);
        self
    }

    #[must_use]
    pub const fn options(&self) -> &JobOptions {
        &self.options
    }

    /// Metrics published by runs so far.
    #[must_use]
    pub const fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    /// Run every stage in order.
    ///
    /// # Errors
    /// Fails if the job has no stages, a stage has no inputs or no output, an
    /// input pattern matches nothing, a file cannot be read or written, or a
    /// hook fails while errors are not being caught. Output written by earlier
    /// stages is left in place.
    pub fn run(&mut self) -> Result<JobReport> {
        if self.stages.is_empty() {
            bail!("job has no stages");
        }
        let runner = StageRunner::new(self.options.stage_options());
        self.metrics.record_start();

        let mut report = JobReport::default();
        for (idx, plan) in self.stages.iter_mut().enumerate() {
            let stage = run_stage(&runner, self.sorter.as_ref(), &self.metrics, idx, plan)?;
            report.stages.push(stage);
        }

        self.metrics.record_end();
        if let Some(path) = &self.options.metrics_path {
            self.metrics
                .save_to_file(path)
                .with_context(|| format!("write metrics to {}", path.display()))?;
        }
        info!(stages = report.stages.len(), errors = report.errors(), "job finished");
        Ok(report)
    }
}

impl fmt::Debug for LocalJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalJob")
            .field("options", &self.options)
            .field("stages", &self.stages)
            .finish_non_exhaustive()
    }
}

fn run_stage(
    runner: &StageRunner,
    sorter: &dyn GroupingSort,
    metrics: &MetricsCollector,
    idx: usize,
    plan: &mut StagePlan,
) -> Result<StageReport> {
    let name = plan.name.clone().unwrap_or_else(|| format!("stage{idx}"));
    let output = plan
        .output
        .clone()
        .with_context(|| format!("{name}: no output path"))?;
    let inputs = expand_patterns(&plan.inputs).with_context(|| format!("{name}: inputs"))?;

    let source = open_concatenated(&inputs).with_context(|| format!("{name}: inputs"))?;
    let mut intermediate = Vec::new();
    let map = runner
        .run_map(plan.mapper.as_mut(), source, &mut intermediate)
        .with_context(|| format!("{name}: map"))?;

    let mut lines: Vec<String> = String::from_utf8_lossy(&intermediate)
        .lines()
        .map(str::to_string)
        .collect();
    drop(intermediate);
    sorter
        .sort(&mut lines)
        .with_context(|| format!("{name}: sort"))?;

    let out = create_output(&output).with_context(|| format!("{name}: output"))?;
    let reduce = runner
        .run_reduce(plan.reducer.as_mut(), SortedLines::new(lines), out)
        .with_context(|| format!("{name}: reduce into {}", output.display()))?;

    map.publish(metrics, &format!("{name}.map"));
    reduce.publish(metrics, &format!("{name}.reduce"));
    info!(
        stage = %name,
        inputs = inputs.len(),
        output = %output.display(),
        map_out = map.records_out,
        groups = reduce.groups,
        errors = map.errors + reduce.errors,
        "stage finished"
    );
    Ok(StageReport {
        name,
        inputs,
        output,
        map,
        reduce,
    })
}

/// Hands sorted lines to the reducer one at a time, releasing each as it goes.
struct SortedLines {
    lines: std::vec::IntoIter<String>,
    current: Vec<u8>,
    pos: usize,
}

impl SortedLines {
    fn new(lines: Vec<String>) -> Self {
        Self {
            lines: lines.into_iter(),
            current: Vec::new(),
            pos: 0,
        }
    }
}

impl Read for SortedLines {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let available = self.fill_buf()?;
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.consume(n);
        Ok(n)
    }
}

impl BufRead for SortedLines {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        while self.pos >= self.current.len() {
            let Some(line) = self.lines.next() else {
                return Ok(&[]);
            };
            self.current = line.into_bytes();
            self.current.push(b'\n');
            self.pos = 0;
        }
        Ok(&self.current[self.pos..])
    }

    fn consume(&mut self, amt: usize) {
        self.pos += amt;
    }
}
