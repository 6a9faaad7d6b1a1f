//! Submodule defining the errors used across the crate.

use core::fmt::{self, Display};

use crate::sql::{ParseError, StatementKind};

/// Which side of a comparison a statement came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    /// The statement extracted from the first (legacy) dialect.
    Left,
    /// The statement materialized from the second (BW) dialect.
    Right,
}

impl Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// Errors that make a pair of statements impossible to compare.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Error {
    /// One side could not be parsed.
    #[error("{side} statement: {source}")]
    Parse {
        /// The side that failed.
        side: Side,
        /// The underlying parse failure.
        source: ParseError,
    },
    /// The two sides are different kinds of statement.
    #[error("Statement kinds differ: {left} vs {right}")]
    KindMismatch {
        /// Kind of the left statement.
        left: StatementKind,
        /// Kind of the right statement.
        right: StatementKind,
    },
    /// The framework column configuration could not be loaded.
    #[error("Invalid framework column configuration: {0}")]
    Config(alloc::string::String),
    /// A report could not be serialized.
    #[error("Could not serialize report: {0}")]
    Report(alloc::string::String),
}

impl Error {
    /// Whether the failure is an unsupported statement kind rather than malformed input.
    #[must_use]
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Error::Parse { source, .. } if source.is_unsupported())
    }
}
