//! File access for local jobs: input discovery, line readers and writers.

pub mod compression;
pub mod glob;

use anyhow::{Context, Result};
use compression::{auto_detect_reader, auto_detect_writer};
use std::fs::{File, create_dir_all};
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Open `path` for line reading, decompressing when it is compressed.
///
/// # Errors
/// Returns an error if the file cannot be opened or its codec fails.
pub fn open_lines(path: impl AsRef<Path>) -> Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let reader = auto_detect_reader(f, path)?;
    Ok(Box::new(BufReader::new(reader)))
}

/// Open every file in `paths`, in order, as one line stream.
///
/// A file whose last line lacks a `\n` gets one, so lines never run across
/// file boundaries. All files are opened before the stream is returned.
///
/// # Errors
/// Returns an error naming the first file that cannot be opened.
pub fn open_concatenated(paths: &[PathBuf]) -> Result<Box<dyn BufRead>> {
    let mut stream: Box<dyn Read> = Box::new(io::empty());
    for path in paths {
        debug!(path = %path.display(), "opening input");
        let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
        let reader = auto_detect_reader(f, path)?;
        stream = Box::new(stream.chain(LineTerminated::new(reader)));
    }
    Ok(Box::new(BufReader::new(stream)))
}

/// Ends a non-empty stream with `\n` when it does not already.
struct LineTerminated<R> {
    inner: R,
    last: Option<u8>,
    done: bool,
}

impl<R> LineTerminated<R> {
    const fn new(inner: R) -> Self {
        Self {
            inner,
            last: None,
            done: false,
        }
    }
}

impl<R: Read> Read for LineTerminated<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.done || buf.is_empty() {
            return Ok(0);
        }
        let n = self.inner.read(buf)?;
        if n > 0 {
            self.last = Some(buf[n - 1]);
            return Ok(n);
        }
        self.done = true;
        if self.last.is_some_and(|b| b != b'\n') {
            buf[0] = b'\n';
            return Ok(1);
        }
        Ok(0)
    }
}

/// Create `path` (and its parent directories) for writing lines, compressing
/// when the extension names a codec.
///
/// # Errors
/// Returns an error if the directory or file cannot be created.
pub fn create_output(path: impl AsRef<Path>) -> Result<Box<dyn Write>> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent).with_context(|| format!("mkdir -p {}", parent.display()))?;
    }
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    auto_detect_writer(f, path)
}
