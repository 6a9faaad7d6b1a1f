//! Comparison fuzzer.
//!
//! Tests that any text compared against itself is never reported as
//! different, whether or not it parses.

use honggfuzz::fuzz;
use sql_parity::testing::test_compare_reflexive;

fn main() {
    loop {
        fuzz!(|input: String| {
            test_compare_reflexive(&input);
        });
    }
}
