//! The single-pass run loop shared by map and reduce stages.
//!
//! A run calls `begin`, then decodes each input line and calls the
//! record-level hooks, then calls `end`. Every record a hook emits is encoded
//! and written as one line before the next input line is read.
//!
//! Each hook call is wrapped on its own. A hook error bumps the run's error
//! counter; with [`StageOptions::catch_errors`] it is logged and the run moves
//! on, otherwise the run stops with [`StageError::Processing`]. Lines already
//! written stay written, so the output of an aborted run is partial.
//!
//! Input is split on `\n` as raw bytes. A line that is not valid UTF-8 is a
//! bad record, not an I/O failure: it is counted under [`Hook::Decode`] and,
//! when errors are caught, skipped before any hook sees it.

use crate::emit::Emit;
use crate::error::{Hook, StageError};
use crate::map::MapStage;
use crate::metrics::MetricsCollector;
use crate::reduce::{GroupTracker, ReduceStage, Transition};
use crate::schema::RecordSchema;
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};
use tracing::{error, info, warn};

/// Per-stage error policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageOptions {
    /// Swallow hook errors (after counting them) instead of aborting.
    pub catch_errors: bool,
}

impl StageOptions {
    #[must_use]
    pub const fn catching() -> Self {
        Self { catch_errors: true }
    }
}

/// Counters for one stage run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub records_in: u64,
    pub records_out: u64,
    /// Groups finalized (reduce runs only).
    pub groups: u64,
    /// Hook errors, swallowed or not.
    pub errors: u64,
}

impl RunReport {
    /// Add these counters to `metrics` as `<label>.<counter>`.
    pub fn publish(&self, metrics: &MetricsCollector, label: &str) {
        metrics.increment_counter(&format!("{label}.records_in"), self.records_in);
        metrics.increment_counter(&format!("{label}.records_out"), self.records_out);
        metrics.increment_counter(&format!("{label}.groups"), self.groups);
        metrics.increment_counter(&format!("{label}.errors"), self.errors);
    }
}

/// Drives map and reduce stages over line streams.
#[derive(Debug, Clone, Copy, Default)]
pub struct StageRunner {
    pub options: StageOptions,
}

impl StageRunner {
    #[must_use]
    pub const fn new(options: StageOptions) -> Self {
        Self { options }
    }

    /// A runner that catches hook errors.
    #[must_use]
    pub const fn catching() -> Self {
        Self::new(StageOptions::catching())
    }

    /// Run a map stage from `input` to `output`.
    ///
    /// # Errors
    /// Returns [`StageError::Processing`] for an uncaught hook error or
    /// non-UTF-8 line, and [`StageError::Io`] if reading or writing fails.
    pub fn run_map<S, R, W>(&self, stage: &mut S, input: R, output: W) -> Result<RunReport, StageError>
    where
        S: MapStage + ?Sized,
        R: BufRead,
        W: Write,
    {
        let mut sink = Sink::new(stage.schema().clone(), output, self.options);
        let mut lines = RawLines::new(input);
        sink.step(Hook::Begin, 0, stage.begin())?;
        while let Some((n, bytes)) = lines.next_line()? {
            sink.report.records_in += 1;
            let Some(line) = sink.text(n, bytes)? else { continue };
            let rec = sink.schema.decode(line);
            sink.step(Hook::Process, n, stage.process(&rec))?;
        }
        sink.step(Hook::End, 0, stage.end())?;
        let report = sink.finish()?;
        info!(
            records_in = report.records_in,
            records_out = report.records_out,
            errors = report.errors,
            "map run finished"
        );
        Ok(report)
    }

    /// Run a reduce stage from grouped `input` to `output`.
    ///
    /// # Errors
    /// Returns [`StageError::Processing`] for an uncaught hook error or
    /// non-UTF-8 line, and [`StageError::Io`] if reading or writing fails.
    pub fn run_reduce<S, R, W>(&self, stage: &mut S, input: R, output: W) -> Result<RunReport, StageError>
    where
        S: ReduceStage + ?Sized,
        R: BufRead,
        W: Write,
    {
        let mut sink = Sink::new(stage.schema().clone(), output, self.options);
        let mut tracker = GroupTracker::new();
        let mut lines = RawLines::new(input);
        sink.step(Hook::Begin, 0, stage.begin())?;
        while let Some((n, bytes)) = lines.next_line()? {
            sink.report.records_in += 1;
            let Some(line) = sink.text(n, bytes)? else { continue };
            let rec = sink.schema.decode(line);

            let transition = tracker.observe(rec.cell(0));
            if let Transition::Switched { previous } = &transition {
                sink.step(Hook::Term, n, stage.term(previous))?;
            }
            if transition.starts_group() {
                sink.step(Hook::Init, n, stage.init(&rec))?;
            }
            sink.step(Hook::Each, n, stage.each(&rec))?;
            sink.step(Hook::Process, n, stage.process(&rec))?;
        }
        if let Some(key) = tracker.finish() {
            sink.step(Hook::Term, 0, stage.term(&key))?;
        }
        sink.step(Hook::End, 0, stage.end())?;
        sink.report.groups = tracker.groups();
        let report = sink.finish()?;
        info!(
            records_in = report.records_in,
            records_out = report.records_out,
            groups = report.groups,
            errors = report.errors,
            "reduce run finished"
        );
        Ok(report)
    }

    /// Run a map stage over in-memory lines and return the output lines.
    ///
    /// # Errors
    /// See [`run_map`](Self::run_map).
    pub fn map_lines<S, L>(&self, stage: &mut S, lines: &[L]) -> Result<(Vec<String>, RunReport), StageError>
    where
        S: MapStage + ?Sized,
        L: AsRef<str>,
    {
        let input = join_lines(lines);
        let mut out = Vec::new();
        let report = self.run_map(stage, input.as_bytes(), &mut out)?;
        Ok((split_output(&out), report))
    }

    /// Run a reduce stage over in-memory grouped lines and return the output lines.
    ///
    /// # Errors
    /// See [`run_reduce`](Self::run_reduce).
    pub fn reduce_lines<S, L>(&self, stage: &mut S, lines: &[L]) -> Result<(Vec<String>, RunReport), StageError>
    where
        S: ReduceStage + ?Sized,
        L: AsRef<str>,
    {
        let input = join_lines(lines);
        let mut out = Vec::new();
        let report = self.run_reduce(stage, input.as_bytes(), &mut out)?;
        Ok((split_output(&out), report))
    }
}

/// Encodes hook output and applies the error policy.
struct Sink<W: Write> {
    schema: RecordSchema,
    out: W,
    options: StageOptions,
    report: RunReport,
}

impl<W: Write> Sink<W> {
    const fn new(schema: RecordSchema, out: W, options: StageOptions) -> Self {
        Self {
            schema,
            out,
            options,
            report: RunReport {
                records_in: 0,
                records_out: 0,
                groups: 0,
                errors: 0,
            },
        }
    }

    fn step(&mut self, hook: Hook, line: u64, result: anyhow::Result<Emit>) -> Result<(), StageError> {
        match result {
            Ok(emit) => {
                for rec in emit {
                    let encoded = self.schema.encode(&rec);
                    self.out.write_all(encoded.as_bytes())?;
                    self.out.write_all(b"\n")?;
                    self.report.records_out += 1;
                }
                Ok(())
            }
            Err(source) => self.fail(hook, line, source),
        }
    }

    fn fail(&mut self, hook: Hook, line: u64, source: anyhow::Error) -> Result<(), StageError> {
        self.report.errors += 1;
        if self.options.catch_errors {
            warn!(%hook, line, error = %format!("{source:#}"), "hook error ignored");
            Ok(())
        } else {
            error!(%hook, line, error = %format!("{source:#}"), "hook error; aborting run");
            Err(StageError::Processing { hook, line, source })
        }
    }

    /// The line as text, or `None` once a non-UTF-8 line has been counted and skipped.
    fn text<'a>(&mut self, line: u64, bytes: &'a [u8]) -> Result<Option<&'a str>, StageError> {
        match std::str::from_utf8(bytes) {
            Ok(text) => Ok(Some(text)),
            Err(err) => {
                self.fail(Hook::Decode, line, anyhow!("line is not valid UTF-8: {err}"))?;
                Ok(None)
            }
        }
    }

    fn finish(mut self) -> Result<RunReport, StageError> {
        self.out.flush()?;
        Ok(self.report)
    }
}

/// Splits input on `\n` without requiring UTF-8, numbering lines from 1.
struct RawLines<R> {
    input: R,
    buf: Vec<u8>,
    count: u64,
}

impl<R: BufRead> RawLines<R> {
    const fn new(input: R) -> Self {
        Self { input, buf: Vec::new(), count: 0 }
    }

    /// The next line with its terminator removed.
    fn next_line(&mut self) -> std::io::Result<Option<(u64, &[u8])>> {
        self.buf.clear();
        if self.input.read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(None);
        }
        self.count += 1;
        let mut end = self.buf.len();
        if self.buf[..end].ends_with(b"\n") {
            end -= 1;
            if self.buf[..end].ends_with(b"\r") {
                end -= 1;
            }
        }
        Ok(Some((self.count, &self.buf[..end])))
    }
}

fn join_lines<L: AsRef<str>>(lines: &[L]) -> String {
    let mut buf = String::new();
    for l in lines {
        buf.push_str(l.as_ref());
        buf.push('\n');
    }
    buf
}

fn split_output(out: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(out)
        .lines()
        .map(str::to_string)
        .collect()
}
