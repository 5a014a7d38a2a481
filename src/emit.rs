//! The uniform hook return value.

use crate::record::Record;
use std::iter::Chain;
use std::{option, vec};

/// Zero, one, or many output records produced by one hook call.
///
/// Every hook returns an `Emit`; the runtime writes each contained record as
/// its own line, in order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum Emit {
    #[default]
    Nothing,
    One(Record),
    Many(Vec<Record>),
}

impl Emit {
    #[must_use]
    pub const fn none() -> Self {
        Self::Nothing
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Nothing => 0,
            Self::One(_) => 1,
            Self::Many(v) => v.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Record> for Emit {
    fn from(r: Record) -> Self {
        Self::One(r)
    }
}

impl From<Option<Record>> for Emit {
    fn from(r: Option<Record>) -> Self {
        r.map_or(Self::Nothing, Self::One)
    }
}

impl From<Vec<Record>> for Emit {
    fn from(v: Vec<Record>) -> Self {
        Self::Many(v)
    }
}

impl FromIterator<Record> for Emit {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::Many(iter.into_iter().collect())
    }
}

impl IntoIterator for Emit {
    type Item = Record;
    type IntoIter = Chain<option::IntoIter<Record>, vec::IntoIter<Record>>;

    fn into_iter(self) -> Self::IntoIter {
        let (one, many) = match self {
            Self::Nothing => (None, Vec::new()),
            Self::One(r) => (Some(r), Vec::new()),
            Self::Many(v) => (None, v),
        };
        one.into_iter().chain(many)
    }
}
