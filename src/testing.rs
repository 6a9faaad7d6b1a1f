//! Property checks shared by the fuzz harnesses and the regression tests.
//!
//! This module is gated behind the `testing` feature.
//!
//! # Provided helpers
//!
//! - [`test_normalize_idempotent`]: normalizing twice changes nothing
//! - [`test_split_preserves_content`]: splitting loses nothing but separators and padding
//! - [`test_compare_reflexive`]: a statement always equals itself
//! - [`test_resolver_rotation`]: binding substitution never re-substitutes

use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use arbitrary::Arbitrary;

use crate::bw::{ParameterBinding, PlaceholderBinding, substitute_bindings, substitute_placeholders};
use crate::sql::parse_sql;
use crate::{ComparisonOutcome, FrameworkColumns, compare, compare_queries, normalize, split_top_level};

/// Assert that [`normalize`] is idempotent on `input`.
///
/// # Panics
///
/// Panics if normalizing the normalized text changes it.
pub fn test_normalize_idempotent(input: &str) {
    let once = normalize(input);
    let twice = normalize(&once);
    assert_eq!(once, twice, "normalize is not idempotent on {input:?}");
}

/// Assert that [`split_top_level`] only drops top-level commas and the
/// whitespace around tokens.
///
/// # Panics
///
/// Panics if the joined tokens differ from the input, whitespace ignored.
pub fn test_split_preserves_content(input: &str) {
    let squeeze = |text: &str| -> String { text.chars().filter(|c| !c.is_whitespace()).collect() };
    let tokens = split_top_level(input);
    assert_eq!(
        squeeze(&tokens.join(",")),
        squeeze(input),
        "split_top_level lost content of {input:?}"
    );
}

/// Assert that a statement compared against itself is never reported as
/// different.
///
/// # Panics
///
/// Panics if either the column comparison or the full statement
/// comparison reports a difference.
pub fn test_compare_reflexive(input: &str) {
    if let Ok(parsed) = parse_sql(input) {
        let result = compare(&parsed.columns, &parsed.columns);
        assert!(result.is_equal(), "{input:?} differs from itself: {result}");
    }
    let comparison = compare_queries(input, input, &FrameworkColumns::default());
    assert!(
        !matches!(comparison.outcome, ComparisonOutcome::Different(_)),
        "{input:?} differs from itself: {}",
        comparison.outcome
    );
}

/// An INSERT whose parameters are bound to each other in a rotation.
///
/// Parameter `P{i}` is bound to field `P{(i + shift) % n}`, so every
/// resolved field is also a declared parameter name.
#[derive(Debug, Clone, Arbitrary)]
pub struct ResolverCase {
    /// Number of parameters, reduced to `1..=16`.
    pub count: u8,
    /// Rotation applied to the bindings.
    pub shift: u8,
    /// Whether to append a literal containing `?` and a bind-like name.
    pub with_literal: bool,
}

impl ResolverCase {
    fn len(&self) -> usize {
        usize::from(self.count % 16) + 1
    }

    /// The INSERT statement with one `?` per parameter.
    #[must_use]
    pub fn statement(&self) -> String {
        let n = self.len();
        let mut columns: Vec<String> = (0..n).map(|i| format!("c{i}")).collect();
        let mut values: Vec<String> = (0..n).map(|_| String::from("?")).collect();
        if self.with_literal {
            columns.push(String::from("note"));
            values.push(String::from("'is ? :P0'"));
        }
        format!("INSERT INTO t ({}) VALUES ({})", columns.join(","), values.join(","))
    }

    /// Declared parameter names, in placeholder order.
    #[must_use]
    pub fn declared(&self) -> Vec<String> {
        (0..self.len()).map(|i| format!("P{i}")).collect()
    }

    /// The rotated bindings.
    #[must_use]
    pub fn binding(&self) -> PlaceholderBinding {
        let n = self.len();
        let shift = usize::from(self.shift);
        (0..n).fold(PlaceholderBinding::new(&self.declared()), |binding, i| {
            binding.with_binding(
                &format!("P{i}"),
                ParameterBinding::Direct(format!("P{}", (i + shift) % n)),
            )
        })
    }
}

/// Assert that both substitution stages of a [`ResolverCase`] produce the
/// rotated names, each exactly once, with the literal untouched.
///
/// # Panics
///
/// Panics if the resolved statement is not the expected one or does not
/// parse to one column per parameter.
pub fn test_resolver_rotation(case: &ResolverCase) {
    let n = case.len();
    let statement = case.statement();
    let (named, surplus) = substitute_placeholders(&statement, &case.declared());
    assert_eq!(surplus, 0);

    let (resolved, unresolved) = substitute_bindings(&named, &case.binding());
    assert!(unresolved.is_empty());

    let shift = usize::from(case.shift);
    let expected_values: Vec<String> = (0..n).map(|i| format!(":P{}", (i + shift) % n)).collect();
    let expected = statement.replacen(&vec!["?"; n].join(","), &expected_values.join(","), 1);
    assert_eq!(resolved, expected, "rotation {case:?}");

    let parsed = parse_sql(&resolved).unwrap_or_else(|err| panic!("{resolved:?}: {err}"));
    assert_eq!(parsed.columns.len(), n + usize::from(case.with_literal));
}
