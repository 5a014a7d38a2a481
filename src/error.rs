//! Error taxonomy for stage construction and stage runs.
//!
//! Hook code returns [`anyhow::Result`] so user stages can use `?` on anything.
//! The runtime wraps hook failures in [`StageError::Processing`], which carries
//! the hook name and input line number alongside the original error chain.
//! Input lines that are not valid UTF-8 are reported the same way, under
//! [`Hook::Decode`].

use std::fmt;
use thiserror::Error;

/// The lifecycle hook a fault was raised from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    /// Not a stage hook: the input line was not valid UTF-8.
    Decode,
    Begin,
    Process,
    Init,
    Each,
    Term,
    End,
}

impl Hook {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Decode => "decode",
            Self::Begin => "begin",
            Self::Process => "process",
            Self::Init => "init",
            Self::Each => "each",
            Self::Term => "term",
            Self::End => "end",
        }
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors raised while building or running a stage.
#[derive(Debug, Error)]
pub enum StageError {
    /// Invalid stage or schema parameters. Raised before any record is read.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A hook returned an error, or an input line could not be decoded, and
    /// the stage does not catch errors.
    #[error("{hook} hook failed at line {line}: {source:#}")]
    Processing {
        hook: Hook,
        /// 1-based input line, or 0 for hooks that run without input.
        line: u64,
        #[source]
        source: anyhow::Error,
    },

    /// A record was addressed by a name its layout does not declare.
    #[error("unknown field `{0}`")]
    UnknownField(String),

    /// Reading input or writing output failed.
    #[error("stage i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

impl StageError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Whether this error came out of a user hook.
    #[must_use]
    pub const fn is_processing(&self) -> bool {
        matches!(self, Self::Processing { .. })
    }
}
