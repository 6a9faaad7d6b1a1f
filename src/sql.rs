//! Structural view of the SQL statements being compared.
//!
//! Statements are normalized first (see [`crate::normalize`]) and then parsed
//! into a [`ParsedStatement`]: its kind, its table and an ordered
//! [`ColumnExpressionMap`] from column to source expression. Only SELECT and
//! INSERT are parsed; other kinds are classified and reported as
//! [`ParseError::Unsupported`].

mod parser;
pub(crate) mod scanner;
mod statement;

pub use parser::{
    ParseError, Parser, extract_table_name, is_meaningful_query, parse_sql, split_alias,
    statement_kind, strip_procedural,
};
pub use scanner::split_top_level;
pub use statement::{ColumnEntry, ColumnExpressionMap, ParsedStatement, StatementKind};
