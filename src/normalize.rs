//! Canonical text form of SQL statements.
//!
//! Normalization removes the cosmetic differences between two renderings of
//! the same statement so that downstream parsing and comparison only ever see
//! one spelling:
//!
//! - `--` line comments are dropped,
//! - whitespace runs collapse to a single space,
//! - spaces around `,`, `(` and `)` disappear,
//! - `SELECT`, `FROM`, `WHERE`, `INTO` and `VALUES` are followed by exactly one
//!   space (the keyword keeps its original case),
//! - both ends are trimmed.
//!
//! Quoted literals are copied verbatim. Normalization is idempotent.

use alloc::string::String;
use core::fmt::{self, Display};
use core::ops::Deref;

use crate::sql::scanner::{QuoteState, TextState, keyword_at};

/// Keywords that are always followed by exactly one space.
pub const SPACED_KEYWORDS: [&str; 5] = ["SELECT", "FROM", "WHERE", "INTO", "VALUES"];

/// A statement in canonical text form.
///
/// Only obtainable through [`normalize`], so holding one guarantees the
/// canonical spelling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NormalizedQuery(String);

impl NormalizedQuery {
    /// The canonical text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the query and return the canonical text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl Deref for NormalizedQuery {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NormalizedQuery {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for NormalizedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NormalizedQuery {
    fn from(text: &str) -> Self {
        normalize(text)
    }
}

/// Normalize raw statement text. Never fails.
///
/// # Example
///
/// ```
/// use sql_parity::normalize;
///
/// let query = normalize("select  a ,\n b -- trailing note\n from   t");
/// assert_eq!(query.as_str(), "select a,b from t");
/// assert_eq!(normalize(&query), query);
/// ```
#[must_use]
pub fn normalize(text: &str) -> NormalizedQuery {
    let spaced = space_keywords(&canonical_spacing(text));
    NormalizedQuery(String::from(spaced.trim()))
}

/// Strip comments, collapse whitespace and remove spacing around punctuation.
fn canonical_spacing(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut quote: Option<char> = None;
    let mut pending_space = false;
    let mut prev = '\0';

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            out.push(c);
            if c == q && prev != '\\' {
                quote = None;
            }
            prev = c;
            continue;
        }

        match c {
            '-' if chars.peek() == Some(&'-') => {
                while chars.next_if(|&n| n != '\n').is_some() {}
                pending_space = true;
            }
            c if c.is_whitespace() => pending_space = true,
            ',' | '(' | ')' => {
                out.push(c);
                pending_space = false;
            }
            _ => {
                if pending_space && !out.is_empty() && !out.ends_with([',', '(', ')']) {
                    out.push(' ');
                }
                pending_space = false;
                if c == '\'' || c == '"' {
                    quote = Some(c);
                }
                out.push(c);
            }
        }
        prev = c;
    }

    out
}

/// Insert the single space owed after each spaced keyword.
///
/// After [`canonical_spacing`] at most one space follows any word, so only
/// keywords glued to punctuation or quotes need a space inserted.
fn space_keywords(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len() + 8);
    let mut quote = QuoteState::default();
    let mut copied = 0;
    let mut pos = 0;

    while pos < bytes.len() {
        if quote.step(bytes, pos) {
            pos += 1;
            continue;
        }
        if let Some(keyword) = SPACED_KEYWORDS.iter().find(|kw| keyword_at(bytes, pos, kw)) {
            let end = pos + keyword.len();
            if end < bytes.len() && bytes[end] != b' ' {
                out.push_str(&text[copied..end]);
                out.push(' ');
                copied = end;
            }
            pos = end;
            continue;
        }
        pos += 1;
    }

    out.push_str(&text[copied..]);
    out
}

/// Remove `--` line comments outside quoted literals.
///
/// The newline ending each comment is kept, so the surrounding tokens stay
/// apart and line structure survives for later whitespace collapsing.
#[must_use]
pub fn strip_comments(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut state = TextState::default();
    let mut copied = 0;

    for pos in 0..bytes.len() {
        let was_comment = state.in_comment();
        state.step(bytes, pos);
        match (was_comment, state.in_comment()) {
            (false, true) => out.push_str(&text[copied..pos]),
            (true, false) => copied = pos,
            _ => {}
        }
    }
    if !state.in_comment() {
        out.push_str(&text[copied..]);
    }
    out
}

/// Remove Oracle optimizer hints (`/*+ ... */`) and collapse whitespace
/// outside quoted literals.
///
/// Ordinary block comments are kept.
#[must_use]
pub fn strip_hints(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut quote = QuoteState::default();
    let mut copied = 0;
    let mut pos = 0;

    while pos < bytes.len() {
        if quote.step(bytes, pos) {
            pos += 1;
            continue;
        }
        if bytes[pos..].starts_with(b"/*+") {
            let Some(close) = text[pos + 3..].find("*/") else {
                break;
            };
            out.push_str(&text[copied..pos]);
            out.push(' ');
            pos += 3 + close + 2;
            copied = pos;
            continue;
        }
        pos += 1;
    }
    out.push_str(&text[copied..]);

    collapse_whitespace(&out)
}

/// Collapse whitespace runs outside quoted literals to one space and trim.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut quote: Option<char> = None;
    let mut pending_space = false;
    let mut prev = '\0';

    for c in text.chars() {
        if let Some(q) = quote {
            if c == q && prev != '\\' {
                quote = None;
            }
        } else if c.is_whitespace() {
            pending_space = true;
            prev = c;
            continue;
        } else if c == '\'' || c == '"' {
            quote = Some(c);
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(c);
        prev = c;
    }

    out
}
