//! Binding resolution fuzzer.
//!
//! Tests that parameters bound to each other in a rotation are each
//! substituted exactly once, with quoted literals left alone.

use honggfuzz::fuzz;
use sql_parity::testing::{ResolverCase, test_resolver_rotation};

fn main() {
    loop {
        fuzz!(|case: ResolverCase| {
            test_resolver_rotation(&case);
        });
    }
}
