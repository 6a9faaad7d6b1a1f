//! Column-set comparison of two parsed statements.

use alloc::string::String;
use alloc::vec::Vec;

use crate::errors::{Error, Side};
use crate::framework::{Direction, FrameworkColumns, Warning};
use crate::normalize::{normalize, strip_hints};
use crate::report::Status;
use crate::sql::scanner::QuoteState;
use crate::sql::{ColumnExpressionMap, ParsedStatement, Parser, StatementKind, statement_kind};

/// One column on which the two statements disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Difference {
    /// Column identifier, as first spelled (left side when present).
    pub column: String,
    /// Expression on the left side, `None` when the column is absent there.
    pub left: Option<String>,
    /// Expression on the right side, `None` when the column is absent there.
    pub right: Option<String>,
}

/// The differences between two column maps, in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComparisonResult {
    /// Left-side columns first, then columns only on the right.
    pub differences: Vec<Difference>,
}

impl ComparisonResult {
    /// Whether the two maps agree on every column.
    #[must_use]
    pub fn is_equal(&self) -> bool {
        self.differences.is_empty()
    }
}

/// The result of comparing two raw statements.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ComparisonOutcome {
    /// Same columns with the same expressions.
    Equal,
    /// At least one column differs.
    Different(Vec<Difference>),
    /// The statements could not be compared.
    NotComparable(Error),
}

impl ComparisonOutcome {
    /// Whether the statements are equal.
    #[must_use]
    pub fn is_equal(&self) -> bool {
        matches!(self, Self::Equal)
    }

    /// The display status of this outcome.
    #[must_use]
    pub fn status(&self) -> Status {
        match self {
            Self::Equal => Status::Equal,
            Self::Different(_) => Status::Different,
            Self::NotComparable(_) => Status::NotComparable,
        }
    }

    /// The differences, empty unless [`Self::Different`].
    #[must_use]
    pub fn differences(&self) -> &[Difference] {
        match self {
            Self::Different(differences) => differences,
            Self::Equal | Self::NotComparable(_) => &[],
        }
    }
}

impl From<ComparisonResult> for ComparisonOutcome {
    fn from(result: ComparisonResult) -> Self {
        if result.is_equal() {
            Self::Equal
        } else {
            Self::Different(result.differences)
        }
    }
}

/// Compare two column maps over the union of their columns.
///
/// Columns are matched case-insensitively. A column present on one side
/// only yields a [`Difference`] with the other side `None`; a column on both
/// sides yields one when the trimmed expressions differ. Expressions are
/// compared case-insensitively except inside quoted literals, so
/// `to_char(x)` matches `TO_CHAR(x)` but `'n'` does not match `'N'`.
///
/// # Example
///
/// ```
/// use sql_parity::{compare, sql::parse_sql};
///
/// let left = parse_sql("SELECT a, b, c FROM t").unwrap();
/// let right = parse_sql("SELECT b, a, c FROM t").unwrap();
/// assert!(compare(&left.columns, &right.columns).is_equal());
/// ```
#[must_use]
pub fn compare(left: &ColumnExpressionMap, right: &ColumnExpressionMap) -> ComparisonResult {
    let mut differences = Vec::new();

    for entry in left {
        match right.get(&entry.name) {
            Some(other) if values_match(&entry.expression, &other.expression) => {}
            other => differences.push(Difference {
                column: entry.name.clone(),
                left: Some(entry.expression.clone()),
                right: other.map(|other| other.expression.clone()),
            }),
        }
    }
    for entry in right.iter().filter(|entry| !left.contains(&entry.name)) {
        differences.push(Difference {
            column: entry.name.clone(),
            left: None,
            right: Some(entry.expression.clone()),
        });
    }

    ComparisonResult { differences }
}

/// Whether two expressions are the same, ignoring case outside literals.
fn values_match(left: &str, right: &str) -> bool {
    let (left, right) = (left.trim(), right.trim());
    left == right || case_folded(left) == case_folded(right)
}

/// Uppercase everything outside quoted literals.
fn case_folded(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut quote = QuoteState::default();
    value
        .char_indices()
        .map(|(pos, c)| {
            if quote.step(bytes, pos) {
                c
            } else {
                c.to_ascii_uppercase()
            }
        })
        .collect()
}

/// Full comparison of two raw statements.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QueryComparison {
    /// Kind of the compared statements, when it could be determined.
    pub kind: Option<StatementKind>,
    /// Table of the left statement, when it parsed.
    pub table: Option<String>,
    /// Equality verdict.
    pub outcome: ComparisonOutcome,
    /// Advisory findings that do not affect the verdict.
    pub warnings: Vec<Warning>,
}

impl QueryComparison {
    /// The display status of the outcome.
    #[must_use]
    pub fn status(&self) -> Status {
        self.outcome.status()
    }

    fn not_comparable(kind: Option<StatementKind>, error: Error) -> Self {
        tracing::info!(%error, "Statements not comparable");
        Self {
            kind,
            table: None,
            outcome: ComparisonOutcome::NotComparable(error),
            warnings: Vec::new(),
        }
    }
}

/// Parse one side with comments and optimizer hints removed.
fn parse_side(side: Side, text: &str) -> Result<ParsedStatement, Error> {
    // Comments go first: hint removal joins lines.
    let query = normalize(&strip_hints(&normalize(text)));
    Parser::new(&query)
        .parse()
        .map_err(|source| Error::Parse { side, source })
}

/// Compare the left (legacy) statement with the right (materialized BW)
/// statement.
///
/// Both sides are normalized and parsed, and must be of the same kind.
/// Framework columns of the matching direction (SELECT = send, INSERT =
/// receive) are excluded before comparison. The framework columns of the
/// right side are then checked and a differing table name is reported,
/// both as warnings.
///
/// Never fails: malformed or unsupported statements yield
/// [`ComparisonOutcome::NotComparable`].
#[must_use]
pub fn compare_queries(left: &str, right: &str, framework: &FrameworkColumns) -> QueryComparison {
    let kind = statement_kind(left).or_else(|| statement_kind(right));
    let (left, right) = match (parse_side(Side::Left, left), parse_side(Side::Right, right)) {
        (Ok(left), Ok(right)) => (left, right),
        (Err(error), _) | (_, Err(error)) => return QueryComparison::not_comparable(kind, error),
    };
    if left.kind != right.kind {
        let error = Error::KindMismatch {
            left: left.kind,
            right: right.kind,
        };
        return QueryComparison::not_comparable(Some(left.kind), error);
    }

    let direction = if left.kind == StatementKind::Select {
        Direction::Send
    } else {
        Direction::Receive
    };

    let mut warnings = Vec::new();
    if !left.table.eq_ignore_ascii_case(&right.table) {
        warnings.push(Warning::TableMismatch {
            left: left.table.clone(),
            right: right.table.clone(),
        });
    }
    warnings.extend(framework.check(&right.columns, direction));

    let outcome = ComparisonOutcome::from(compare(
        &framework.exclude(&left.columns, direction),
        &framework.exclude(&right.columns, direction),
    ));
    tracing::info!(
        kind = %left.kind,
        table = %left.table,
        status = %outcome.status(),
        differences = outcome.differences().len(),
        warnings = warnings.len(),
        "Compared statements"
    );

    QueryComparison {
        kind: Some(left.kind),
        table: Some(left.table),
        outcome,
        warnings,
    }
}
