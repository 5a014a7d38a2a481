//! Records: fixed-arity rows of text cells addressable by position or name.

use crate::error::StageError;
use crate::numeric::{NumericError, parse_float, parse_int};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Resolved field names for one side of a schema.
///
/// Built once at declaration and shared by every record with this shape.
#[derive(Debug, PartialEq, Eq)]
pub struct Layout {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl Layout {
    /// Build a layout, rejecting duplicate names.
    ///
    /// # Errors
    /// Returns [`StageError::Configuration`] if a name appears twice.
    pub fn new<I, S>(names: I) -> Result<Self, StageError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let mut index = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(StageError::config(format!("duplicate field name `{name}`")));
            }
        }
        Ok(Self { names, index })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }
}

/// One row of text cells.
///
/// The arity is fixed by the layout; cells that were never assigned hold the
/// empty string.
#[derive(Clone, PartialEq, Eq)]
pub struct Record {
    layout: Arc<Layout>,
    cells: Vec<String>,
}

impl Record {
    /// A record with every cell empty.
    #[must_use]
    pub fn blank(layout: Arc<Layout>) -> Self {
        let cells = vec![String::new(); layout.len()];
        Self { layout, cells }
    }

    /// Build a record from cells. Missing trailing cells are left empty and
    /// surplus cells are dropped.
    pub fn from_cells<I, S>(layout: Arc<Layout>, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut rec = Self::blank(layout);
        for (slot, v) in rec.cells.iter_mut().zip(cells) {
            *slot = v.into();
        }
        rec
    }

    #[must_use]
    pub fn layout(&self) -> &Arc<Layout> {
        &self.layout
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[must_use]
    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    #[must_use]
    pub fn into_cells(self) -> Vec<String> {
        self.cells
    }

    /// Cell at `i`, if within the layout.
    #[must_use]
    pub fn get(&self, i: usize) -> Option<&str> {
        self.cells.get(i).map(String::as_str)
    }

    /// Cell at `i`, or `""` outside the layout.
    #[must_use]
    pub fn cell(&self, i: usize) -> &str {
        self.get(i).unwrap_or("")
    }

    /// Cell named `name`, if declared.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.layout.position(name).map(|i| self.cells[i].as_str())
    }

    /// Cell named `name`.
    ///
    /// # Errors
    /// Returns [`StageError::UnknownField`] if the layout does not declare it.
    pub fn require(&self, name: &str) -> Result<&str, StageError> {
        self.field(name)
            .ok_or_else(|| StageError::UnknownField(name.to_string()))
    }

    /// Overwrite cell `i` with the text form of `value`. Out-of-range
    /// positions are ignored, since the arity is fixed.
    pub fn set(&mut self, i: usize, value: impl ToString) {
        if let Some(slot) = self.cells.get_mut(i) {
            *slot = value.to_string();
        }
    }

    /// Overwrite the cell named `name`.
    ///
    /// # Errors
    /// Returns [`StageError::UnknownField`] if the layout does not declare it.
    pub fn set_field(&mut self, name: &str, value: impl ToString) -> Result<(), StageError> {
        let i = self
            .layout
            .position(name)
            .ok_or_else(|| StageError::UnknownField(name.to_string()))?;
        self.cells[i] = value.to_string();
        Ok(())
    }

    /// Copy `src` cells `skip..` into this record starting at position 0.
    /// Copying stops at whichever record runs out first.
    pub fn copy_from(&mut self, src: &Record, skip: usize) -> &mut Self {
        for (dst, v) in self.cells.iter_mut().zip(src.cells.iter().skip(skip)) {
            dst.clone_from(v);
        }
        self
    }

    /// Cell `i` parsed as an integer.
    ///
    /// # Errors
    /// Returns [`NumericError`] if the cell is not an integer.
    pub fn int(&self, i: usize) -> Result<i64, NumericError> {
        parse_int(self.cell(i))
    }

    /// Cell `i` parsed as a float.
    ///
    /// # Errors
    /// Returns [`NumericError`] if the cell is not numeric.
    pub fn float(&self, i: usize) -> Result<f64, NumericError> {
        parse_float(self.cell(i))
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut m = f.debug_map();
        for (name, v) in self.layout.names.iter().zip(&self.cells) {
            m.entry(name, v);
        }
        m.finish()
    }
}
