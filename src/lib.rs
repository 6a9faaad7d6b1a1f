#![doc = include_str!("../README.md")]
#![no_std]
#![deny(clippy::mod_module_files)]

extern crate alloc;

pub mod bw;
pub mod compare;
pub mod errors;
pub mod framework;
pub mod normalize;
pub mod report;
pub mod sql;
#[cfg(feature = "testing")]
pub mod testing;

// Re-export main types
pub use bw::{
    BindingNode, Exclusion, ParameterBinding, PlaceholderBinding, Resolution, ResolvedStatement,
    resolve,
};
pub use compare::{
    ComparisonOutcome, ComparisonResult, Difference, QueryComparison, compare, compare_queries,
};
pub use errors::{Error, Side};
pub use framework::{Direction, FrameworkColumnSet, FrameworkColumns, Warning};
pub use normalize::{NormalizedQuery, normalize};
pub use report::{InterfaceReport, Status};
pub use sql::{
    ColumnEntry, ColumnExpressionMap, ParseError, ParsedStatement, StatementKind, split_top_level,
};

/// `IndexMap` alias using hashbrown's default hasher for `no_std` compatibility.
pub(crate) type IndexMap<K, V> = indexmap::IndexMap<K, V, hashbrown::DefaultHashBuilder>;

/// `IndexSet` alias using hashbrown's default hasher for `no_std` compatibility.
pub(crate) type IndexSet<T> = indexmap::IndexSet<T, hashbrown::DefaultHashBuilder>;
