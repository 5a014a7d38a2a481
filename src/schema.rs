//! Record schemas and the line codec.
//!
//! A [`RecordSchema`] fixes the input field names, the output field names and
//! the two separators. It is declared once when a stage is built and never
//! changes afterwards.
//!
//! ## Codec rules
//! - **decode** strips one trailing `\n` / `\r\n`, splits on the input
//!   separator and assigns cells positionally. Short lines leave the remaining
//!   fields empty; extra columns are ignored.
//! - **encode** projects the declared output fields in order, strips trailing
//!   line-terminator characters from each cell and joins with the output
//!   separator.
//!
//! Neither direction escapes embedded separators or newlines, so a cell that
//! contains one does not survive a round trip.
//!
//! ```
//! use tabreduce::RecordSchema;
//!
//! let schema = RecordSchema::declare(["ip", "bytes"], ["ip", "bytes"])?;
//! let rec = schema.decode("10.0.0.1\t512\n");
//! assert_eq!(rec.field("bytes"), Some("512"));
//! assert_eq!(schema.encode(&rec), "10.0.0.1\t512");
//! # Ok::<(), tabreduce::StageError>(())
//! ```

use crate::error::StageError;
use crate::record::{Layout, Record};
use std::sync::Arc;
use tracing::debug;

/// The default separator for both directions.
pub const TAB: &str = "\t";

/// Immutable field declarations and separators for one stage.
#[derive(Debug, Clone)]
pub struct RecordSchema {
    input: Arc<Layout>,
    output: Arc<Layout>,
    in_sep: String,
    out_sep: String,
}

impl RecordSchema {
    /// Declare input and output fields with tab separators.
    ///
    /// # Errors
    /// Returns [`StageError::Configuration`] on a duplicate name within either list.
    pub fn declare<I, O, S, T>(input: I, output: O) -> Result<Self, StageError>
    where
        I: IntoIterator<Item = S>,
        O: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Ok(Self {
            input: Arc::new(Layout::new(input)?),
            output: Arc::new(Layout::new(output)?),
            in_sep: TAB.to_string(),
            out_sep: TAB.to_string(),
        })
    }

    /// Use `sep` to split input lines.
    ///
    /// # Errors
    /// Returns [`StageError::Configuration`] if `sep` is empty.
    pub fn field_separator(mut self, sep: impl Into<String>) -> Result<Self, StageError> {
        self.in_sep = non_empty(sep.into())?;
        Ok(self)
    }

    /// Use `sep` to join output cells.
    ///
    /// # Errors
    /// Returns [`StageError::Configuration`] if `sep` is empty.
    pub fn emit_separator(mut self, sep: impl Into<String>) -> Result<Self, StageError> {
        self.out_sep = non_empty(sep.into())?;
        Ok(self)
    }

    #[must_use]
    pub fn input(&self) -> &Arc<Layout> {
        &self.input
    }

    #[must_use]
    pub fn output(&self) -> &Arc<Layout> {
        &self.output
    }

    #[must_use]
    pub fn in_sep(&self) -> &str {
        &self.in_sep
    }

    #[must_use]
    pub fn out_sep(&self) -> &str {
        &self.out_sep
    }

    /// A blank record with the input layout.
    #[must_use]
    pub fn new_input(&self) -> Record {
        Record::blank(Arc::clone(&self.input))
    }

    /// A blank record with the output layout.
    #[must_use]
    pub fn new_output(&self) -> Record {
        Record::blank(Arc::clone(&self.output))
    }

    /// Split one physical line into an input record.
    #[must_use]
    pub fn decode(&self, line: &str) -> Record {
        let cols: Vec<&str> = chomp(line).split(self.in_sep.as_str()).collect();
        if cols.len() < self.input.len() {
            debug!(
                expected = self.input.len(),
                found = cols.len(),
                "short line; missing fields left empty"
            );
        }
        Record::from_cells(Arc::clone(&self.input), cols)
    }

    /// Render a record as one output line (without terminator).
    ///
    /// Records with the output layout are written positionally; any other
    /// record is projected by field name, with undeclared names left empty.
    #[must_use]
    pub fn encode(&self, record: &Record) -> String {
        let same_shape = Arc::ptr_eq(record.layout(), &self.output)
            || record.layout().as_ref() == self.output.as_ref();
        let mut line = String::new();
        for (i, name) in self.output.names().iter().enumerate() {
            if i > 0 {
                line.push_str(&self.out_sep);
            }
            let cell = if same_shape {
                record.cell(i)
            } else {
                record.field(name).unwrap_or("")
            };
            line.push_str(chomp_all(cell));
        }
        line
    }
}

fn non_empty(sep: String) -> Result<String, StageError> {
    if sep.is_empty() {
        return Err(StageError::config("separator must not be empty"));
    }
    Ok(sep)
}

/// Drop one trailing line terminator.
fn chomp(line: &str) -> &str {
    line.strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(line)
}

/// Drop every trailing line-terminator character.
fn chomp_all(cell: &str) -> &str {
    cell.trim_end_matches(['\r', '\n'])
}
