//! Input file discovery.
//!
//! Job inputs are given as glob patterns (`logs/2024-*/access.log.gz`). Each
//! pattern expands to the regular files it matches, in sorted order, so a job
//! reads its inputs in the same sequence on every run.
//!
//! # Examples
//!
//! ```no_run
//! use tabreduce::io::glob::{expand_glob, expand_patterns};
//!
//! let day = expand_glob("logs/2024-06-01/*.log")?;
//! let week = expand_patterns(&["logs/2024-06-0[1-7]/*.log", "logs/extra.log.gz"])?;
//! # use anyhow::Error; Ok::<(), Error>(())
//! ```

use anyhow::{Context, Result, bail};
use glob::glob;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Expand a glob pattern into the sorted regular files it matches.
///
/// Supports the usual `*`, `?`, `**`, `[abc]` and `[!abc]` syntax. Directories
/// that match are skipped. Zero matches yields an empty vector.
///
/// # Errors
///
/// Returns an error if the pattern is invalid or a matched entry cannot be read.
pub fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let paths = glob(pattern).with_context(|| format!("invalid glob pattern: {pattern}"))?;

    let mut result = Vec::new();
    for entry in paths {
        let path =
            entry.with_context(|| format!("error reading glob entry for pattern: {pattern}"))?;
        if path.is_file() {
            result.push(path);
        }
    }
    result.sort();
    Ok(result)
}

/// Like [`expand_glob`], but zero matches is an error.
///
/// # Errors
///
/// Returns an error if the pattern is invalid, an entry cannot be read, or
/// nothing matches.
pub fn expand_glob_required(pattern: &str) -> Result<Vec<PathBuf>> {
    let files = expand_glob(pattern)?;
    if files.is_empty() {
        bail!("no files found matching pattern: {pattern}");
    }
    Ok(files)
}

/// Expand several patterns into one sorted, de-duplicated file list.
///
/// Every pattern must match at least one file.
///
/// # Errors
///
/// Returns an error if `patterns` is empty or any pattern fails
/// [`expand_glob_required`].
pub fn expand_patterns<P: AsRef<str>>(patterns: &[P]) -> Result<Vec<PathBuf>> {
    if patterns.is_empty() {
        bail!("no input patterns given");
    }
    let mut files = BTreeSet::new();
    for pattern in patterns {
        files.extend(expand_glob_required(pattern.as_ref())?);
    }
    Ok(files.into_iter().collect())
}
