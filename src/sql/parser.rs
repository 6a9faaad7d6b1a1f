//! Structural parser for the SELECT and INSERT statements being compared.
//!
//! The parser works on [`NormalizedQuery`] text and is built on the
//! quote- and parenthesis-aware scanner rather than regular expressions, so
//! function calls and date literals inside column lists never mis-split.

use alloc::string::{String, ToString};

use super::scanner::{
    Structure, find_keyword, find_top_level, is_word_byte, leading_word, matching_paren,
    split_top_level,
};
use super::statement::{ColumnExpressionMap, ParsedStatement, StatementKind};
use crate::normalize::{NormalizedQuery, normalize};

/// Words that can never be an alias.
const NON_ALIAS_WORDS: [&str; 17] = [
    "AND", "AS", "ASC", "BETWEEN", "CASE", "DESC", "DISTINCT", "ELSE", "END", "IN", "IS", "LIKE",
    "NOT", "NULL", "OR", "THEN", "WHEN",
];

/// Words after which an expression continues, so the next word is an operand.
const OPERATOR_WORDS: [&str; 12] = [
    "AND", "BETWEEN", "CASE", "DISTINCT", "ELSE", "IN", "IS", "LIKE", "NOT", "OR", "THEN", "WHEN",
];

/// Structural parse failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParseError {
    /// Nothing left to parse.
    #[error("Empty statement")]
    EmptyStatement,
    /// The statement is neither SELECT nor INSERT.
    #[error("Unsupported statement kind: {keyword}")]
    Unsupported {
        /// The leading keyword found, uppercased.
        keyword: String,
    },
    /// SELECT without a top-level FROM.
    #[error("Missing FROM clause in SELECT")]
    MissingFrom,
    /// No table name where one was expected.
    #[error("Missing table name")]
    MissingTable,
    /// INSERT without a parenthesized column list.
    #[error("Missing column list in INSERT")]
    MissingColumnList,
    /// INSERT without a VALUES clause.
    #[error("Missing VALUES clause in INSERT")]
    MissingValues,
    /// A parenthesis group never closes.
    #[error("Unbalanced parentheses starting at position {pos}")]
    UnbalancedParentheses {
        /// Position of the unclosed `(` in the normalized text.
        pos: usize,
    },
    /// The column list is empty.
    #[error("Empty column list")]
    EmptyColumnList,
    /// A column list entry is empty.
    #[error("Empty column at position {index}")]
    EmptyColumn {
        /// Zero-based position in the column list.
        index: usize,
    },
    /// An INSERT value is empty.
    #[error("Empty value for column {column}")]
    EmptyValue {
        /// The column whose value is empty.
        column: String,
    },
    /// INSERT column and value lists differ in length.
    #[error("Column count ({columns}) does not match value count ({values})")]
    ColumnCountMismatch {
        /// Number of columns.
        columns: usize,
        /// Number of values.
        values: usize,
    },
    /// The same column appears twice.
    #[error("Duplicate column name: {0}")]
    DuplicateColumn(String),
}

impl ParseError {
    /// Whether this is an unsupported statement kind rather than malformed input.
    #[must_use]
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }
}

/// Parser over one normalized statement.
pub struct Parser<'a> {
    sql: &'a str,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given normalized statement.
    #[must_use]
    pub fn new(query: &'a NormalizedQuery) -> Self {
        Self {
            sql: strip_procedural(query.as_str()),
        }
    }

    /// Parse the statement into its kind, table and column map.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Unsupported`] for anything but SELECT or INSERT,
    /// and a structural variant for malformed input.
    pub fn parse(&self) -> Result<ParsedStatement, ParseError> {
        if self.sql.is_empty() {
            return Err(ParseError::EmptyStatement);
        }
        let parsed = match StatementKind::from_keyword(leading_word(self.sql)) {
            Some(StatementKind::Select) => self.parse_select(),
            Some(StatementKind::Insert) => self.parse_insert(),
            _ => Err(ParseError::Unsupported {
                keyword: leading_word(self.sql).to_ascii_uppercase(),
            }),
        }?;
        tracing::debug!(
            kind = %parsed.kind,
            table = %parsed.table,
            columns = parsed.columns.len(),
            "Parsed statement"
        );
        Ok(parsed)
    }

    /// Parse `SELECT <cols> FROM <table> ...`.
    fn parse_select(&self) -> Result<ParsedStatement, ParseError> {
        let sql = self.sql;
        let select = find_keyword(sql, "SELECT", 0).ok_or(ParseError::EmptyStatement)?;
        let list_start = select + "SELECT".len();
        let from = find_keyword(sql, "FROM", list_start).ok_or(ParseError::MissingFrom)?;
        let table = table_after(sql, from + "FROM".len()).ok_or(ParseError::MissingTable)?;

        let mut columns = ColumnExpressionMap::new();
        for (index, token) in split_top_level(&sql[list_start..from]).iter().enumerate() {
            if token.is_empty() {
                return Err(ParseError::EmptyColumn { index });
            }
            let (expression, alias) = split_alias(token);
            columns.insert(expression, expression, alias)?;
        }
        if columns.is_empty() {
            return Err(ParseError::EmptyColumnList);
        }

        Ok(ParsedStatement {
            kind: StatementKind::Select,
            table,
            columns,
        })
    }

    /// Parse `INSERT INTO <table> (<cols>) VALUES (<values>)`.
    fn parse_insert(&self) -> Result<ParsedStatement, ParseError> {
        let sql = self.sql;
        let into = find_keyword(sql, "INTO", 0).ok_or(ParseError::MissingTable)?;
        let table = table_after(sql, into + "INTO".len()).ok_or(ParseError::MissingTable)?;

        let values = find_keyword(sql, "VALUES", into).ok_or(ParseError::MissingValues)?;
        let columns_open = find_top_level(sql, b'(', into)
            .filter(|&open| open < values)
            .ok_or(ParseError::MissingColumnList)?;
        let columns_close = matching_paren(sql, columns_open)
            .ok_or(ParseError::UnbalancedParentheses { pos: columns_open })?;

        // Values may themselves contain parenthesized calls, so the group is
        // scanned for its balancing parenthesis.
        let values_open = find_top_level(sql, b'(', values).ok_or(ParseError::MissingValues)?;
        let values_close = matching_paren(sql, values_open)
            .ok_or(ParseError::UnbalancedParentheses { pos: values_open })?;

        let names = split_top_level(&sql[columns_open + 1..columns_close]);
        let exprs = split_top_level(&sql[values_open + 1..values_close]);
        if names.is_empty() {
            return Err(ParseError::EmptyColumnList);
        }
        if names.len() != exprs.len() {
            return Err(ParseError::ColumnCountMismatch {
                columns: names.len(),
                values: exprs.len(),
            });
        }

        let mut columns = ColumnExpressionMap::new();
        for (index, (name, expr)) in names.iter().zip(&exprs).enumerate() {
            if name.is_empty() {
                return Err(ParseError::EmptyColumn { index });
            }
            if expr.is_empty() {
                return Err(ParseError::EmptyValue {
                    column: name.clone(),
                });
            }
            columns.insert(name, expr, None)?;
        }

        Ok(ParsedStatement {
            kind: StatementKind::Insert,
            table,
            columns,
        })
    }
}

/// Normalize and parse raw statement text.
///
/// # Errors
///
/// See [`Parser::parse`].
///
/// # Example
///
/// ```
/// use sql_parity::sql::parse_sql;
///
/// let parsed = parse_sql("INSERT INTO t (a, b) VALUES (:a, TO_DATE(:b, 'YYYY,MM'))").unwrap();
/// assert_eq!(parsed.table, "t");
/// assert_eq!(parsed.columns.get("B").unwrap().expression, "TO_DATE(:b,'YYYY,MM')");
/// ```
pub fn parse_sql(text: &str) -> Result<ParsedStatement, ParseError> {
    Parser::new(&normalize(text)).parse()
}

/// Keep only the `INSERT INTO ... VALUES (...)` span of a procedural block.
///
/// `BEGIN INSERT ...; EXCEPTION ... END;` becomes the bare INSERT. A
/// trailing `;` is dropped from any statement. Text starting with neither
/// INSERT nor a block keyword is returned trimmed.
#[must_use]
pub fn strip_procedural(text: &str) -> &str {
    let trimmed = text.trim();
    let lead = leading_word(trimmed);
    let is_block = ["INSERT", "BEGIN", "DECLARE"]
        .iter()
        .any(|kw| kw.eq_ignore_ascii_case(lead));

    let body = match find_keyword(trimmed, "INSERT", 0) {
        Some(start) if is_block => &trimmed[start..],
        _ => trimmed,
    };
    let end = find_top_level(body, b';', 0).unwrap_or(body.len());
    body[..end].trim_end()
}

/// The statement kind of raw text, after stripping procedural wrapping.
#[must_use]
pub fn statement_kind(text: &str) -> Option<StatementKind> {
    StatementKind::from_keyword(leading_word(strip_procedural(text)))
}

/// The table a statement reads from or writes to.
///
/// FROM-table for SELECT and DELETE, INTO-table for INSERT, target for UPDATE.
#[must_use]
pub fn extract_table_name(text: &str) -> Option<String> {
    let query = normalize(text);
    let sql = strip_procedural(query.as_str());
    let keyword = match statement_kind(sql)? {
        StatementKind::Select | StatementKind::Delete => "FROM",
        StatementKind::Insert => "INTO",
        StatementKind::Update => "UPDATE",
    };
    let at = find_keyword(sql, keyword, 0)?;
    table_after(sql, at + keyword.len())
}

/// Whether a query selects business data rather than probing for existence.
///
/// Rejects select lists made only of literals (`SELECT 1`, `SELECT NULL`,
/// `SELECT 'x'`) or row counts (`COUNT(*)`, `COUNT(1)`). Anything that is
/// not a SELECT is meaningful; a SELECT that does not parse is not.
#[must_use]
pub fn is_meaningful_query(text: &str) -> bool {
    if statement_kind(text) != Some(StatementKind::Select) {
        return true;
    }
    match parse_sql(text) {
        Ok(parsed) => !parsed
            .columns
            .iter()
            .all(|entry| is_literal(&entry.expression) || is_row_count(&entry.expression)),
        Err(_) => false,
    }
}

/// Split a select-list term into its expression and optional alias.
///
/// `expr AS alias`, `expr alias` and `f(x)alias` (normalization removes the
/// space after a parenthesis) all yield `(expr, Some(alias))`. The alias
/// must be a bare identifier, not a keyword, and must not follow an operator
/// (`a || b` has no alias).
#[must_use]
pub fn split_alias(token: &str) -> (&str, Option<&str>) {
    let token = token.trim();
    let Some((head_end, alias_start)) = alias_boundary(token) else {
        return (token, None);
    };
    let candidate = &token[alias_start..];
    let head = token[..head_end].trim_end();

    let head_last_word = head
        .rsplit(|c: char| c.is_whitespace() || matches!(c, '(' | ')' | ','))
        .next()
        .unwrap_or_default();
    let has_as = head_last_word.eq_ignore_ascii_case("AS");
    let after_operator = head.ends_with(['|', '+', '-', '*', '/', '=', '<', '>', '%'])
        || OPERATOR_WORDS
            .iter()
            .any(|kw| kw.eq_ignore_ascii_case(head_last_word));

    if head.is_empty()
        || after_operator
        || !is_bare_identifier(candidate)
        || NON_ALIAS_WORDS
            .iter()
            .any(|kw| kw.eq_ignore_ascii_case(candidate))
    {
        return (token, None);
    }

    let expression = if has_as {
        head[..head.len() - 2].trim_end()
    } else {
        head
    };
    if expression.is_empty() {
        return (token, None);
    }
    (expression, Some(candidate))
}

/// Where the expression ends and a trailing alias would start: after the
/// last top-level space, or directly after the last top-level `)`.
fn alias_boundary(token: &str) -> Option<(usize, usize)> {
    let last = Structure::new(token)
        .filter(|site| !site.quoted && site.depth == 0 && matches!(site.byte, b' ' | b')'))
        .last()?;
    if last.byte == b' ' {
        Some((last.pos, last.pos + 1))
    } else {
        Some((last.pos + 1, last.pos + 1))
    }
}

/// Whether `word` is an unquoted identifier that does not start with a digit.
fn is_bare_identifier(word: &str) -> bool {
    let bytes = word.as_bytes();
    !bytes.is_empty() && !bytes[0].is_ascii_digit() && bytes.iter().all(|&b| is_word_byte(b))
}

/// The table token following a FROM/INTO/UPDATE keyword ending at `pos`.
fn table_after(sql: &str, pos: usize) -> Option<String> {
    let rest = sql[pos..].trim_start();
    let end = rest
        .bytes()
        .position(|b| b.is_ascii_whitespace() || matches!(b, b'(' | b')' | b',' | b';'))
        .unwrap_or(rest.len());
    let table = &rest[..end];
    if table.is_empty() || table.eq_ignore_ascii_case("WHERE") {
        return None;
    }
    Some(table.to_string())
}

/// Numbers, quoted strings and NULL.
fn is_literal(expr: &str) -> bool {
    let expr = expr.trim();
    let quoted = expr.len() >= 2
        && ((expr.starts_with('\'') && expr.ends_with('\''))
            || (expr.starts_with('"') && expr.ends_with('"')));
    let numeric = !expr.is_empty()
        && expr
            .trim_start_matches(['-', '+'])
            .bytes()
            .all(|b| b.is_ascii_digit() || b == b'.');
    quoted || numeric || expr.eq_ignore_ascii_case("NULL")
}

/// `COUNT(*)` or `COUNT(1)`, in any case and spacing.
fn is_row_count(expr: &str) -> bool {
    let compact: String = expr
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect();
    compact == "COUNT(*)" || compact == "COUNT(1)"
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn parse(text: &str) -> Result<ParsedStatement, ParseError> {
        parse_sql(text)
    }

    #[test]
    fn test_parse_select() {
        let parsed = parse("SELECT a, b, c FROM d WHERE x = 1").unwrap();
        assert_eq!(parsed.kind, StatementKind::Select);
        assert_eq!(parsed.table, "d");
        assert_eq!(parsed.columns.names().collect::<Vec<_>>(), ["a", "b", "c"]);
        assert_eq!(parsed.columns.get("b").unwrap().expression, "b");
    }

    #[test]
    fn test_parse_select_aliases() {
        let parsed =
            parse("SELECT to_char(tdate, 'YYYYMMDDHH24MISS') AS tdate, x y, z FROM tb_test")
                .unwrap();
        let entry = parsed.columns.get("to_char(tdate,'YYYYMMDDHH24MISS')").unwrap();
        assert_eq!(entry.alias.as_deref(), Some("tdate"));
        assert_eq!(parsed.columns.get("x").unwrap().alias.as_deref(), Some("y"));
        assert_eq!(parsed.columns.get("z").unwrap().alias, None);
    }

    #[test]
    fn test_parse_select_subquery_in_list() {
        let parsed = parse("SELECT a, (SELECT MAX(b) FROM u) mb FROM t").unwrap();
        assert_eq!(parsed.table, "t");
        assert_eq!(parsed.columns.len(), 2);
        let sub = parsed.columns.get("(SELECT MAX(b)FROM u)").unwrap();
        assert_eq!(sub.alias.as_deref(), Some("mb"));
    }

    #[test]
    fn test_parse_select_missing_from() {
        assert_eq!(parse("SELECT a, b"), Err(ParseError::MissingFrom));
        assert_eq!(parse("SELECT a FROM"), Err(ParseError::MissingTable));
        assert_eq!(parse("SELECT a, FROM t"), Err(ParseError::EmptyColumn { index: 1 }));
    }

    #[test]
    fn test_parse_select_duplicate_column() {
        assert_eq!(
            parse("SELECT a, A FROM t"),
            Err(ParseError::DuplicateColumn("A".into()))
        );
    }

    #[test]
    fn test_parse_insert() {
        let parsed = parse("INSERT INTO owner.t (a, b, c) VALUES (:a, 'N', SYSDATE)").unwrap();
        assert_eq!(parsed.kind, StatementKind::Insert);
        assert_eq!(parsed.table, "owner.t");
        assert_eq!(parsed.columns.get("B").unwrap().expression, "'N'");
        assert_eq!(parsed.columns.get("c").unwrap().expression, "SYSDATE");
    }

    #[test]
    fn test_parse_insert_with_nested_calls() {
        let parsed =
            parse("INSERT INTO t(a,b) VALUES (NVL(TO_DATE(:a,'YYYY,MM'),SYSDATE), DECODE(:b,1,'Y','N'))")
                .unwrap();
        assert_eq!(
            parsed.columns.get("a").unwrap().expression,
            "NVL(TO_DATE(:a,'YYYY,MM'),SYSDATE)"
        );
        assert_eq!(parsed.columns.get("b").unwrap().expression, "DECODE(:b,1,'Y','N')");
    }

    #[test]
    fn test_parse_insert_count_mismatch() {
        assert_eq!(
            parse("INSERT INTO t (a, b) VALUES (:a)"),
            Err(ParseError::ColumnCountMismatch {
                columns: 2,
                values: 1
            })
        );
    }

    #[test]
    fn test_parse_insert_shape_errors() {
        assert_eq!(parse("INSERT INTO t VALUES (1)"), Err(ParseError::MissingColumnList));
        assert_eq!(parse("INSERT INTO t (a) SELECT 1 FROM dual"), Err(ParseError::MissingValues));
        assert!(matches!(
            parse("INSERT INTO t (a) VALUES (f(1)"),
            Err(ParseError::UnbalancedParentheses { .. })
        ));
        assert_eq!(
            parse("INSERT INTO t (a, b) VALUES (1, )"),
            Err(ParseError::EmptyValue { column: "b".into() })
        );
    }

    #[test]
    fn test_parse_procedural_block() {
        let parsed = parse(
            "BEGIN\n INSERT INTO t (a) VALUES (:a);\nEXCEPTION WHEN DUP_VAL_ON_INDEX THEN NULL;\nEND;",
        )
        .unwrap();
        assert_eq!(parsed.table, "t");
        assert_eq!(parsed.columns.len(), 1);
    }

    #[test]
    fn test_parse_unsupported() {
        let err = parse("UPDATE t SET a = 1").unwrap_err();
        assert!(err.is_unsupported());
        assert_eq!(parse("  "), Err(ParseError::EmptyStatement));
    }

    #[test]
    fn test_split_alias() {
        assert_eq!(split_alias("a"), ("a", None));
        assert_eq!(split_alias("a AS b"), ("a", Some("b")));
        assert_eq!(split_alias("f(x,'a b') c"), ("f(x,'a b')", Some("c")));
        assert_eq!(split_alias("a || b"), ("a || b", None));
        assert_eq!(split_alias("x IS NULL"), ("x IS NULL", None));
        assert_eq!(split_alias("CASE WHEN a THEN b END"), ("CASE WHEN a THEN b END", None));
        assert_eq!(split_alias("CASE WHEN a THEN b END st"), ("CASE WHEN a THEN b END", Some("st")));
        assert_eq!(split_alias("DISTINCT a"), ("DISTINCT a", None));
        assert_eq!(split_alias("TO_CHAR(x)AS d"), ("TO_CHAR(x)", Some("d")));
        assert_eq!(split_alias("TO_CHAR(x)d"), ("TO_CHAR(x)", Some("d")));
        assert_eq!(split_alias("COUNT(*)"), ("COUNT(*)", None));
    }

    #[test]
    fn test_extract_table_name() {
        assert_eq!(extract_table_name("select a from s.t where x=1").as_deref(), Some("s.t"));
        assert_eq!(extract_table_name("INSERT INTO t(a) VALUES (1)").as_deref(), Some("t"));
        assert_eq!(extract_table_name("UPDATE t SET a = 1").as_deref(), Some("t"));
        assert_eq!(extract_table_name("DELETE FROM t WHERE a = 1").as_deref(), Some("t"));
        assert_eq!(extract_table_name("MERGE INTO t"), None);
    }

    #[test]
    fn test_is_meaningful_query() {
        assert!(is_meaningful_query("SELECT a, b FROM t"));
        assert!(!is_meaningful_query("SELECT 1 FROM t WHERE ROWNUM = 1"));
        assert!(!is_meaningful_query("select count ( * ) from t"));
        assert!(!is_meaningful_query("SELECT 'x', NULL FROM t"));
        assert!(is_meaningful_query("INSERT INTO t (a) VALUES (1)"));
    }
}
