//! Grouped reduce stages.
//!
//! Reduce input must arrive grouped: every record sharing a first-field value
//! appears in one contiguous run. The runtime walks the stream with a
//! [`GroupTracker`] and calls the grouping hooks on each transition:
//!
//! | Event | Hooks |
//! |---|---|
//! | first record | `init`, `each` |
//! | same key as previous | `each` |
//! | key changes | `term(previous key)`, `init`, `each` |
//! | end of input with a group open | `term(last key)` |
//!
//! Independently of grouping, `process` sees every record (after the grouping
//! hooks for that record) and `begin`/`end` bracket the whole run.

use crate::emit::Emit;
use crate::record::Record;
use crate::schema::RecordSchema;
use anyhow::Result;

/// A grouped aggregation over pre-grouped input.
///
/// Every hook has a no-op default, so a stage implements only what it needs:
/// per-group reducers implement `init`/`each`/`term`, whole-stream reducers
/// implement `begin`/`process`/`end`.
pub trait ReduceStage {
    /// The schema used to decode input and encode output.
    fn schema(&self) -> &RecordSchema;

    /// Called once before any input.
    fn begin(&mut self) -> Result<Emit> {
        Ok(Emit::none())
    }

    /// Called for every record, regardless of grouping.
    fn process(&mut self, _input: &Record) -> Result<Emit> {
        Ok(Emit::none())
    }

    /// Called with the first record of each group, before `each`.
    fn init(&mut self, _input: &Record) -> Result<Emit> {
        Ok(Emit::none())
    }

    /// Called for every record of the current group.
    fn each(&mut self, _input: &Record) -> Result<Emit> {
        Ok(Emit::none())
    }

    /// Called exactly once when a group ends, with that group's key.
    fn term(&mut self, _key: &str) -> Result<Emit> {
        Ok(Emit::none())
    }

    /// Called once after the last input (and after the last `term`).
    fn end(&mut self) -> Result<Emit> {
        Ok(Emit::none())
    }
}

impl<S: ReduceStage + ?Sized> ReduceStage for Box<S> {
    fn schema(&self) -> &RecordSchema {
        (**self).schema()
    }
    fn begin(&mut self) -> Result<Emit> {
        (**self).begin()
    }
    fn process(&mut self, input: &Record) -> Result<Emit> {
        (**self).process(input)
    }
    fn init(&mut self, input: &Record) -> Result<Emit> {
        (**self).init(input)
    }
    fn each(&mut self, input: &Record) -> Result<Emit> {
        (**self).each(input)
    }
    fn term(&mut self, key: &str) -> Result<Emit> {
        (**self).term(key)
    }
    fn end(&mut self) -> Result<Emit> {
        (**self).end()
    }
}

/// Where the tracker is in the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupState {
    NoGroup,
    InGroup { key: String },
    Done,
}

/// What a new record did to the grouping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// First record of the stream opened a group.
    Opened,
    /// Record belongs to the open group.
    Continued,
    /// Record closed the group keyed `previous` and opened a new one.
    Switched { previous: String },
}

impl Transition {
    /// Whether this record starts a group (and so needs `init`).
    #[must_use]
    pub const fn starts_group(&self) -> bool {
        !matches!(self, Self::Continued)
    }
}

/// Contiguous-run detection over group keys.
#[derive(Debug, Clone)]
pub struct GroupTracker {
    state: GroupState,
    groups: u64,
}

impl Default for GroupTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl GroupTracker {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: GroupState::NoGroup,
            groups: 0,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &GroupState {
        &self.state
    }

    /// Number of groups opened so far.
    #[must_use]
    pub const fn groups(&self) -> u64 {
        self.groups
    }

    /// Key of the open group, if any.
    #[must_use]
    pub fn current_key(&self) -> Option<&str> {
        match &self.state {
            GroupState::InGroup { key } => Some(key),
            _ => None,
        }
    }

    /// Feed the next record's key.
    pub fn observe(&mut self, key: &str) -> Transition {
        match &mut self.state {
            GroupState::InGroup { key: current } if current == key => Transition::Continued,
            GroupState::InGroup { key: current } => {
                let previous = std::mem::replace(current, key.to_string());
                self.groups += 1;
                Transition::Switched { previous }
            }
            GroupState::NoGroup | GroupState::Done => {
                self.state = GroupState::InGroup {
                    key: key.to_string(),
                };
                self.groups += 1;
                Transition::Opened
            }
        }
    }

    /// End of input. Returns the key of the group still open, which must be
    /// finalized, and moves to [`GroupState::Done`].
    pub fn finish(&mut self) -> Option<String> {
        match std::mem::replace(&mut self.state, GroupState::Done) {
            GroupState::InGroup { key } => Some(key),
            GroupState::NoGroup | GroupState::Done => None,
        }
    }
}
