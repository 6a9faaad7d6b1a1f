//! Benchmark for the statement comparison pipeline.
//!
//! Measures the performance of:
//! 1. Normalizing raw statement text
//! 2. Parsing normalized statements into column maps
//! 3. Comparing two renderings of the same statement end to end
//! 4. Resolving a prepared BW statement against its bindings

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use sql_parity::sql::parse_sql;
use sql_parity::{BindingNode, FrameworkColumns, compare_queries, normalize, resolve};
use std::fmt::Write;
use std::hint::black_box;

/// An INSERT with `columns` columns, each bound to a named parameter.
fn legacy_insert(columns: usize) -> String {
    let names: Vec<String> = (0..columns).map(|i| format!("col_{i}")).collect();
    let values: Vec<String> = (0..columns)
        .map(|i| match i % 3 {
            0 => format!(":col_{i}"),
            1 => format!("NVL(:col_{i}, 'n/a')"),
            _ => format!("TO_DATE(:col_{i}, 'YYYY-MM-DD')"),
        })
        .collect();
    format!(
        "INSERT INTO orders ({})\n  VALUES ({})",
        names.join(",\n    "),
        values.join(",\n    ")
    )
}

/// The same INSERT with reversed columns, different spacing and the
/// framework columns added.
fn migrated_insert(columns: usize) -> String {
    let mut names: Vec<String> = (0..columns).rev().map(|i| format!("COL_{i}")).collect();
    let mut values: Vec<String> = (0..columns)
        .rev()
        .map(|i| match i % 3 {
            0 => format!(":col_{i}"),
            1 => format!("nvl( :col_{i} , 'n/a' )"),
            _ => format!("to_date( :col_{i} , 'YYYY-MM-DD' )"),
        })
        .collect();
    names.extend(["EAI_SEQ_ID", "DATA_INTERFACE_TYPE_CODE"].map(String::from));
    values.extend([":seq", "'ORD'"].map(String::from));
    format!(
        "insert into orders ( {} ) values ( {} )",
        names.join(" , "),
        values.join(" , ")
    )
}

/// A prepared statement with `columns` placeholders and its input mapping.
fn prepared_insert(columns: usize) -> (String, Vec<String>, BindingNode) {
    let mut statement = String::from("INSERT INTO orders (");
    for i in 0..columns {
        let _ = write!(statement, "{}col_{i}", if i == 0 { "" } else { ", " });
    }
    statement.push_str(") VALUES (");
    statement.push_str(&vec!["?"; columns].join(", "));
    statement.push(')');

    let declared: Vec<String> = (0..columns).map(|i| format!("P_{i}")).collect();
    let input = (0..columns).fold(BindingNode::new("jdbcUpdateActivityInput"), |node, i| {
        node.with_child(
            BindingNode::new(&format!("P_{i}")).with_child(
                BindingNode::new("xsl:value-of").with_attribute("select", &format!("$Start/row/FIELD_{i}")),
            ),
        )
    });
    (statement, declared, BindingNode::new("inputBindings").with_child(input))
}

fn benchmark_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");

    for columns in [4, 32, 256] {
        let statement = migrated_insert(columns);
        group.throughput(Throughput::Bytes(statement.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(columns), &statement, |b, statement| {
            b.iter(|| black_box(normalize(black_box(statement))));
        });
    }

    group.finish();
}

fn benchmark_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_sql");

    for columns in [4, 32, 256] {
        let statement = normalize(&legacy_insert(columns));
        group.throughput(Throughput::Elements(columns as u64));
        group.bench_with_input(BenchmarkId::from_parameter(columns), &statement, |b, statement| {
            b.iter(|| black_box(parse_sql(black_box(statement)).unwrap()));
        });
    }

    group.finish();
}

fn benchmark_compare_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("compare_queries");
    let framework = FrameworkColumns::default();

    for columns in [4, 32, 256] {
        let left = legacy_insert(columns);
        let right = migrated_insert(columns);
        group.throughput(Throughput::Elements(columns as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(columns),
            &(left, right),
            |b, (left, right)| {
                b.iter(|| {
                    let comparison = compare_queries(black_box(left), black_box(right), &framework);
                    assert!(comparison.outcome.is_equal());
                    black_box(comparison)
                });
            },
        );
    }

    group.finish();
}

fn benchmark_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");

    for columns in [4, 32, 256] {
        let (statement, declared, input) = prepared_insert(columns);
        group.throughput(Throughput::Elements(columns as u64));
        group.bench_function(BenchmarkId::from_parameter(columns), |b| {
            b.iter(|| black_box(resolve(black_box(&statement), Some(declared.as_slice()), Some(&input))));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_normalize,
    benchmark_parse,
    benchmark_compare_queries,
    benchmark_resolve,
);
criterion_main!(benches);
