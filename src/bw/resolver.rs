//! Materialization of a BW prepared statement into comparable SQL.
//!
//! A JDBC activity stores its statement with positional `?` placeholders.
//! Resolution runs in two stages: each placeholder is first replaced by the
//! declared parameter name at its position (`?` → `:X`), then each
//! parameter name by the field bound to it (`:X` → `:FIELD1`). SELECT
//! statements take neither stage; only their optimizer hints are removed.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use super::binding::{PlaceholderBinding, declared_parameters};
use super::tree::BindingNode;
use crate::normalize::{collapse_whitespace, strip_comments, strip_hints};
use crate::sql::scanner::{TextState, is_word_byte, leading_word};
use crate::sql::{StatementKind, statement_kind};

/// Why a statement was left out of the resolver output.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Exclusion {
    /// The statement text is blank.
    Empty,
    /// A `SELECT ... FROM DUAL` probe, which carries no business data.
    DualProbe,
    /// Neither a SELECT nor a DML statement.
    Unsupported {
        /// The leading keyword, uppercased.
        keyword: String,
    },
}

/// A statement in all its resolution stages.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResolvedStatement {
    /// Kind of the statement.
    pub kind: StatementKind,
    /// The statement as stored in the activity, trimmed.
    pub original: String,
    /// After placeholder substitution (`?` → `:name`).
    pub named: String,
    /// After binding substitution (`:name` → `:field`). The comparator input.
    pub resolved: String,
    /// Declared parameters used by the statement that have no binding and
    /// remain as `:name`.
    pub unresolved: Vec<String>,
    /// Placeholders beyond the declared parameters, left as `?`.
    pub surplus_placeholders: usize,
}

/// Outcome of resolving one statement.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Resolution {
    /// Left out of the comparison.
    Excluded(Exclusion),
    /// Ready for comparison.
    Resolved(ResolvedStatement),
}

impl Resolution {
    /// The resolved statement, unless excluded.
    #[must_use]
    pub fn statement(&self) -> Option<&ResolvedStatement> {
        match self {
            Self::Resolved(statement) => Some(statement),
            Self::Excluded(_) => None,
        }
    }

    /// The final query text, unless excluded.
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.statement().map(|statement| statement.resolved.as_str())
    }
}

/// Number of `?` placeholders outside quoted literals and comments.
#[must_use]
pub fn count_placeholders(statement: &str) -> usize {
    let bytes = statement.as_bytes();
    let mut state = TextState::default();
    (0..bytes.len())
        .filter(|&pos| !state.step(bytes, pos) && bytes[pos] == b'?')
        .count()
}

/// Replace each `?` placeholder by `:name` of the declared parameter at the
/// same position.
///
/// Returns the substituted text and the number of placeholders beyond the
/// declared names, which are left as `?`. Extra names are ignored. Question
/// marks inside quoted literals or `--` comments are not placeholders.
///
/// # Example
///
/// ```
/// use sql_parity::bw::substitute_placeholders;
///
/// let names = ["X".to_string(), "Y".to_string()];
/// let (named, surplus) = substitute_placeholders("INSERT INTO t (a,b) VALUES (?,?)", &names);
/// assert_eq!(named, "INSERT INTO t (a,b) VALUES (:X,:Y)");
/// assert_eq!(surplus, 0);
/// ```
#[must_use]
pub fn substitute_placeholders(statement: &str, declared: &[String]) -> (String, usize) {
    let bytes = statement.as_bytes();
    let mut out = String::with_capacity(statement.len() + 8 * declared.len());
    let mut state = TextState::default();
    let mut names = declared.iter();
    let mut surplus = 0;
    let mut copied = 0;

    for pos in 0..bytes.len() {
        if state.step(bytes, pos) || bytes[pos] != b'?' {
            continue;
        }
        let Some(name) = names.next() else {
            surplus += 1;
            continue;
        };
        out.push_str(&statement[copied..pos]);
        out.push(':');
        out.push_str(name);
        copied = pos + 1;
    }
    out.push_str(&statement[copied..]);

    (out, surplus)
}

/// Replace each bound `:name` by `:field`, all at once.
///
/// Every bound parameter is first swapped for a marker that cannot occur
/// in the statement, and the markers are then expanded in one scan, so a
/// field that happens to equal another declared name is never substituted
/// again. Only whole bind names outside quoted literals and comments are
/// replaced:
/// `:X` does not touch `:XY` or `'HH24:MI'`.
///
/// Returns the substituted text and the declared names that occur in the
/// statement without a binding, which stay as `:name`.
#[must_use]
pub fn substitute_bindings(statement: &str, binding: &PlaceholderBinding) -> (String, Vec<String>) {
    let mut fence = String::from("\u{1}");
    while statement.contains(fence.as_str()) {
        fence.push('\u{1}');
    }

    let mut fields: Vec<&str> = Vec::new();
    let mut unresolved: Vec<String> = Vec::new();
    let mut marked = String::with_capacity(statement.len());
    let mut copied = 0;

    for (start, end) in bind_names(statement) {
        let name = &statement[start + 1..end];
        if let Some(found) = binding.get(name) {
            marked.push_str(&statement[copied..start]);
            marked.push_str(&fence);
            marked.push_str(&fields.len().to_string());
            marked.push_str(&fence);
            fields.push(found.field());
            copied = end;
        } else if binding.is_declared(name) && !unresolved.iter().any(|known| known == name) {
            unresolved.push(name.into());
        }
    }
    marked.push_str(&statement[copied..]);

    // Markers split the text into alternating literal and index segments.
    let mut out = String::with_capacity(marked.len());
    for (index, segment) in marked.split(fence.as_str()).enumerate() {
        if index % 2 == 0 {
            out.push_str(segment);
        } else if let Some(field) = segment.parse::<usize>().ok().and_then(|i| fields.get(i)) {
            out.push(':');
            out.push_str(field);
        }
    }

    (out, unresolved)
}

/// Byte ranges of the `:name` bind variables outside quoted literals and
/// comments, colon included.
fn bind_names(statement: &str) -> Vec<(usize, usize)> {
    let bytes = statement.as_bytes();
    let mut state = TextState::default();
    let mut ranges = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        if state.step(bytes, pos) {
            pos += 1;
            continue;
        }
        let bound_left = pos > 0 && (is_word_byte(bytes[pos - 1]) || bytes[pos - 1] == b':');
        if bytes[pos] == b':' && !bound_left {
            let end = bytes[pos + 1..]
                .iter()
                .position(|&b| !is_word_byte(b))
                .map_or(bytes.len(), |len| pos + 1 + len);
            if end > pos + 1 {
                ranges.push((pos, end));
                pos = end;
                continue;
            }
        }
        pos += 1;
    }
    ranges
}

/// Whether a statement is a `SELECT ... FROM DUAL` probe.
#[must_use]
pub fn is_dual_probe(statement: &str) -> bool {
    let code = strip_comments(statement);
    if statement_kind(&code) != Some(StatementKind::Select) {
        return false;
    }
    let text = collapse_whitespace(&code).to_ascii_lowercase();
    text.match_indices("from dual").any(|(at, probe)| {
        text.as_bytes()
            .get(at + probe.len())
            .is_none_or(|&b| !is_word_byte(b))
    })
}

/// Resolve one statement.
///
/// `declared` is the declared-parameter list of the activity (`None` when
/// the activity has no such block, in which case placeholders stay `?`),
/// and `input` the input mapping searched for bindings.
#[must_use]
pub fn resolve(statement: &str, declared: Option<&[String]>, input: Option<&BindingNode>) -> Resolution {
    let original = statement.trim();
    if original.is_empty() {
        return Resolution::Excluded(Exclusion::Empty);
    }

    let code = strip_comments(original);
    let kind = match statement_kind(&code) {
        Some(StatementKind::Select) if is_dual_probe(original) => {
            tracing::debug!(statement = %original, "Excluded FROM DUAL probe");
            return Resolution::Excluded(Exclusion::DualProbe);
        }
        Some(StatementKind::Select) => {
            // Comments go first: hint removal joins lines.
            let cleaned = strip_hints(&code);
            return Resolution::Resolved(ResolvedStatement {
                kind: StatementKind::Select,
                original: original.into(),
                named: cleaned.clone(),
                resolved: cleaned,
                unresolved: Vec::new(),
                surplus_placeholders: 0,
            });
        }
        Some(kind) => kind,
        None => {
            let keyword = leading_word(&code).to_ascii_uppercase();
            tracing::debug!(%keyword, "Excluded unsupported statement");
            return Resolution::Excluded(Exclusion::Unsupported { keyword });
        }
    };

    let declared: &[String] = match declared {
        Some(declared) => declared,
        None => {
            tracing::warn!(statement = %original, "No declared parameters, placeholders left as '?'");
            &[]
        }
    };
    let (named, surplus_placeholders) = substitute_placeholders(original, declared);
    if surplus_placeholders > 0 {
        tracing::warn!(surplus_placeholders, "More placeholders than declared parameters");
    }
    tracing::debug!(%named, "Substituted placeholders");

    let binding = PlaceholderBinding::build(declared, input);
    let (resolved, unresolved) = substitute_bindings(&named, &binding);
    if !unresolved.is_empty() {
        tracing::warn!(?unresolved, "Parameters left unresolved");
    }
    tracing::debug!(%resolved, "Substituted bindings");

    Resolution::Resolved(ResolvedStatement {
        kind,
        original: original.into(),
        named,
        resolved,
        unresolved,
        surplus_placeholders,
    })
}

/// Resolve the statement of a JDBC activity.
///
/// Returns `None` for activities whose `type` does not mention JDBC or
/// that carry no `config/statement`.
#[must_use]
pub fn resolve_activity(activity: &BindingNode) -> Option<Resolution> {
    let activity_type = activity.child("type").and_then(BindingNode::text)?;
    if !activity_type.to_ascii_lowercase().contains("jdbc") {
        return None;
    }
    let statement = activity
        .find_path(&["config", "statement"])
        .and_then(BindingNode::text)?;

    tracing::debug!(
        activity = activity.attribute("name").unwrap_or_default(),
        "Resolving JDBC activity"
    );
    let declared = declared_parameters(activity);
    Some(resolve(
        statement,
        declared.as_deref(),
        activity.find("inputBindings"),
    ))
}

/// Resolve every JDBC activity below `root`, in document order.
#[must_use]
pub fn resolve_process(root: &BindingNode) -> Vec<Resolution> {
    root.descendants()
        .filter(|node| node.is("activity"))
        .filter_map(resolve_activity)
        .collect()
}

/// The statement representing a process: the first SELECT, else the first
/// other resolved statement.
#[must_use]
pub fn primary_query(resolutions: &[Resolution]) -> Option<&ResolvedStatement> {
    let mut statements = resolutions.iter().filter_map(Resolution::statement);
    statements
        .clone()
        .find(|statement| statement.kind == StatementKind::Select)
        .or_else(|| statements.next())
}
