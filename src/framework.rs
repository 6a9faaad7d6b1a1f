//! Columns injected by the interface runtime, excluded before comparison.
//!
//! Both sides of a migrated interface carry bookkeeping columns that the
//! messaging runtime fills in itself: a sequence id and an interface type
//! code on the send side, plus an interface timestamp and a transfer flag on
//! the receive side. They say nothing about the business data and are
//! removed by [`FrameworkColumns::exclude`] before the column sets are
//! compared. [`FrameworkColumns::check`] separately verifies that they are
//! present and, where a fixed value is mandated, that it is used.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt::{self, Display};

use crate::sql::{ColumnEntry, ColumnExpressionMap};
use crate::{IndexMap, IndexSet};

/// The side of an interface a statement belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// Extraction from the source system (SELECT).
    Send,
    /// Insertion into the target system (INSERT).
    Receive,
}

impl Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Send => write!(f, "send"),
            Direction::Receive => write!(f, "receive"),
        }
    }
}

/// Framework columns required for one direction.
///
/// Names are stored uppercased. Some columns must also hold a fixed value,
/// compared case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FrameworkColumnSet {
    required: IndexSet<String>,
    expected: IndexMap<String, String>,
}

impl FrameworkColumnSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required column.
    #[must_use]
    pub fn require(mut self, column: &str) -> Self {
        self.required.insert(column.to_ascii_uppercase());
        self
    }

    /// Add a required column that must hold `value`.
    #[must_use]
    pub fn expect_value(mut self, column: &str, value: &str) -> Self {
        let column = column.to_ascii_uppercase();
        self.required.insert(column.clone());
        self.expected.insert(column, value.to_string());
        self
    }

    /// Whether `column` belongs to the set, case-insensitively.
    #[must_use]
    pub fn contains(&self, column: &str) -> bool {
        self.required.contains(&column.to_ascii_uppercase())
    }

    /// The required columns, uppercased, in declaration order.
    pub fn required(&self) -> impl Iterator<Item = &str> {
        self.required.iter().map(String::as_str)
    }

    /// The value `column` must hold, if one is mandated.
    #[must_use]
    pub fn expected_value(&self, column: &str) -> Option<&str> {
        self.expected
            .get(&column.to_ascii_uppercase())
            .map(String::as_str)
    }

    /// Number of required columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.required.len()
    }

    /// Whether no column is required.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.required.is_empty()
    }

    /// Whether a parsed column is one of the framework columns, by name or alias.
    fn matches(&self, entry: &ColumnEntry) -> bool {
        self.contains(&entry.name) || entry.alias.as_deref().is_some_and(|a| self.contains(a))
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for FrameworkColumnSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Routed through the builder so names are uppercased.
        #[derive(serde::Deserialize)]
        struct Raw {
            #[serde(default)]
            required: Vec<String>,
            #[serde(default)]
            expected: IndexMap<String, String>,
        }

        let raw = Raw::deserialize(deserializer)?;
        let set = raw
            .required
            .iter()
            .fold(Self::new(), |set, column| set.require(column));
        Ok(raw
            .expected
            .iter()
            .fold(set, |set, (column, value)| set.expect_value(column, value)))
    }
}

/// Framework columns for both directions.
///
/// The default is the standard runtime configuration:
///
/// | Direction | Column                      | Fixed value |
/// |-----------|-----------------------------|-------------|
/// | both      | `EAI_SEQ_ID`                |             |
/// | both      | `DATA_INTERFACE_TYPE_CODE`  |             |
/// | receive   | `EAI_INTERFACE_DATE`        | `SYSDATE`   |
/// | receive   | `APPLICATION_TRANSFER_FLAG` | `'N'`       |
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameworkColumns {
    /// Columns for SELECT statements.
    pub send: FrameworkColumnSet,
    /// Columns for INSERT statements.
    pub receive: FrameworkColumnSet,
}

impl Default for FrameworkColumns {
    fn default() -> Self {
        Self {
            send: FrameworkColumnSet::new()
                .require("EAI_SEQ_ID")
                .require("DATA_INTERFACE_TYPE_CODE"),
            receive: FrameworkColumnSet::new()
                .require("EAI_SEQ_ID")
                .require("DATA_INTERFACE_TYPE_CODE")
                .expect_value("EAI_INTERFACE_DATE", "SYSDATE")
                .expect_value("APPLICATION_TRANSFER_FLAG", "'N'"),
        }
    }
}

impl FrameworkColumns {
    /// Create a configuration from explicit sets.
    #[must_use]
    pub fn new(send: FrameworkColumnSet, receive: FrameworkColumnSet) -> Self {
        Self { send, receive }
    }

    /// The set for `direction`.
    #[must_use]
    pub fn for_direction(&self, direction: Direction) -> &FrameworkColumnSet {
        match direction {
            Direction::Send => &self.send,
            Direction::Receive => &self.receive,
        }
    }

    /// A copy of `columns` without the framework columns of `direction`.
    ///
    /// A column is dropped when its name or its alias is in the set.
    /// Missing framework columns are not an error here; see [`Self::check`].
    #[must_use]
    pub fn exclude(&self, columns: &ColumnExpressionMap, direction: Direction) -> ColumnExpressionMap {
        let set = self.for_direction(direction);
        columns.filtered(|entry| !set.matches(entry))
    }

    /// Advisory check of the framework columns of `direction`.
    ///
    /// Reports each required column that is absent and each fixed-value
    /// column holding something else. Never fails.
    #[must_use]
    pub fn check(&self, columns: &ColumnExpressionMap, direction: Direction) -> Vec<Warning> {
        let set = self.for_direction(direction);
        let mut warnings = Vec::new();

        for column in set.required() {
            let Some(entry) = columns.iter().find(|entry| {
                entry.name.eq_ignore_ascii_case(column)
                    || entry
                        .alias
                        .as_deref()
                        .is_some_and(|a| a.eq_ignore_ascii_case(column))
            }) else {
                warnings.push(Warning::MissingFrameworkColumn {
                    direction,
                    column: column.to_string(),
                });
                continue;
            };
            let Some(expected) = set.expected_value(column) else {
                continue;
            };
            if !entry.expression.trim().eq_ignore_ascii_case(expected) {
                warnings.push(Warning::UnexpectedFrameworkValue {
                    column: column.to_string(),
                    expected: expected.to_string(),
                    actual: entry.expression.clone(),
                });
            }
        }

        for warning in &warnings {
            tracing::warn!(%direction, %warning, "Framework column check");
        }
        warnings
    }

    /// Load a configuration from JSON.
    ///
    /// The document has one object per direction, each with a `required`
    /// list and an optional `expected` map of fixed values:
    ///
    /// ```json
    /// {
    ///   "send": { "required": ["EAI_SEQ_ID"] },
    ///   "receive": { "required": ["EAI_SEQ_ID"], "expected": { "FLAG": "'N'" } }
    /// }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Config`] if the document is malformed.
    #[cfg(feature = "json")]
    pub fn from_json(json: &str) -> Result<Self, crate::Error> {
        serde_json::from_str(json).map_err(|err| crate::Error::Config(err.to_string()))
    }
}

/// An advisory finding that does not affect equality.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Warning {
    /// A required framework column is absent.
    MissingFrameworkColumn {
        /// Direction whose set requires the column.
        direction: Direction,
        /// The missing column, uppercased.
        column: String,
    },
    /// A framework column does not hold its mandated value.
    UnexpectedFrameworkValue {
        /// The column, uppercased.
        column: String,
        /// The mandated value.
        expected: String,
        /// The value found.
        actual: String,
    },
    /// The two statements name different tables.
    TableMismatch {
        /// Table of the left statement.
        left: String,
        /// Table of the right statement.
        right: String,
    },
}

impl Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::MissingFrameworkColumn { direction, column } => {
                write!(f, "Required framework column {column} missing from {direction} statement")
            }
            Warning::UnexpectedFrameworkValue {
                column,
                expected,
                actual,
            } => write!(f, "Framework column {column} should be {expected}, found {actual}"),
            Warning::TableMismatch { left, right } => {
                write!(f, "Table names differ: {left} vs {right}")
            }
        }
    }
}
