//! Parsed statement shapes.

use alloc::string::String;
use core::fmt::{self, Display};

use super::parser::ParseError;
use crate::IndexMap;
use crate::framework::Direction;

/// The kind of a statement, from its leading keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatementKind {
    /// SELECT statement (send side).
    Select,
    /// INSERT statement (receive side).
    Insert,
    /// UPDATE statement. Classified but never compared.
    Update,
    /// DELETE statement. Classified but never compared.
    Delete,
}

impl StatementKind {
    /// Classify a leading keyword, case-insensitively.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        [Self::Select, Self::Insert, Self::Update, Self::Delete]
            .into_iter()
            .find(|kind| kind.keyword().eq_ignore_ascii_case(keyword))
    }

    /// The SQL keyword introducing this kind of statement.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Select => "SELECT",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }

    /// Whether the column comparator supports this kind.
    #[must_use]
    pub fn is_comparable(self) -> bool {
        matches!(self, Self::Select | Self::Insert)
    }

    /// The interface direction whose framework columns apply.
    #[must_use]
    pub fn direction(self) -> Option<Direction> {
        match self {
            Self::Select => Some(Direction::Send),
            Self::Insert => Some(Direction::Receive),
            Self::Update | Self::Delete => None,
        }
    }
}

impl Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// One column of a statement and the expression supplying it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnEntry {
    /// Column identifier as first spelled in the statement.
    pub name: String,
    /// For SELECT, the selected term; for INSERT, the value at the matching
    /// VALUES position.
    pub expression: String,
    /// Alias given to a selected term, if any.
    pub alias: Option<String>,
}

/// Ordered map from column identifier to source expression.
///
/// Identity is case-insensitive (`col_a` and `COL_A` are the same column);
/// the first spelling is kept for display. Keys are unique: inserting a
/// duplicate is an error, never a merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnExpressionMap {
    columns: IndexMap<String, ColumnEntry>,
}

impl ColumnExpressionMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::DuplicateColumn`] if a column with the same
    /// case-insensitive name is already present.
    pub fn insert(
        &mut self,
        name: &str,
        expression: &str,
        alias: Option<&str>,
    ) -> Result<(), ParseError> {
        let key = name.to_ascii_uppercase();
        if self.columns.contains_key(&key) {
            return Err(ParseError::DuplicateColumn(name.into()));
        }
        self.columns.insert(
            key,
            ColumnEntry {
                name: name.into(),
                expression: expression.into(),
                alias: alias.map(String::from),
            },
        );
        Ok(())
    }

    /// Look a column up by name, case-insensitively.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ColumnEntry> {
        self.columns.get(&name.to_ascii_uppercase())
    }

    /// Whether a column with this name is present, case-insensitively.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the map has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Columns in statement order.
    pub fn iter(&self) -> impl Iterator<Item = &ColumnEntry> {
        self.columns.values()
    }

    /// Column names in statement order, as first spelled.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.values().map(|entry| entry.name.as_str())
    }

    /// A copy keeping only the columns accepted by `keep`, order preserved.
    #[must_use]
    pub fn filtered(&self, mut keep: impl FnMut(&ColumnEntry) -> bool) -> Self {
        Self {
            columns: self
                .columns
                .iter()
                .filter(|(_, entry)| keep(entry))
                .map(|(key, entry)| (key.clone(), entry.clone()))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ColumnExpressionMap {
    type Item = &'a ColumnEntry;
    type IntoIter = indexmap::map::Values<'a, String, ColumnEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.values()
    }
}

/// A successfully parsed SELECT or INSERT statement.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParsedStatement {
    /// Statement kind, always [`StatementKind::Select`] or [`StatementKind::Insert`].
    pub kind: StatementKind,
    /// Target table (INSERT) or first source table (SELECT).
    pub table: String,
    /// Columns and their source expressions.
    pub columns: ColumnExpressionMap,
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn test_kind_from_keyword() {
        assert_eq!(StatementKind::from_keyword("select"), Some(StatementKind::Select));
        assert_eq!(StatementKind::from_keyword("Insert"), Some(StatementKind::Insert));
        assert_eq!(StatementKind::from_keyword("MERGE"), None);
        assert!(!StatementKind::Update.is_comparable());
        assert_eq!(StatementKind::Insert.direction(), Some(Direction::Receive));
    }

    #[test]
    fn test_map_identity_is_case_insensitive() {
        let mut map = ColumnExpressionMap::new();
        map.insert("Col_A", ":a", None).unwrap();
        assert!(map.contains("COL_A"));
        assert_eq!(map.get("col_a").unwrap().name, "Col_A");
        assert_eq!(
            map.insert("COL_A", ":b", None),
            Err(ParseError::DuplicateColumn("COL_A".into()))
        );
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_filtered_keeps_order() {
        let mut map = ColumnExpressionMap::new();
        for name in ["c", "a", "b"] {
            map.insert(name, name, None).unwrap();
        }
        let kept = map.filtered(|entry| entry.name != "a");
        assert_eq!(kept.names().collect::<Vec<_>>(), ["c", "b"]);
    }
}
