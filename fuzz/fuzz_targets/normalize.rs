//! Normalization fuzzer.
//!
//! Tests that normalizing an already normalized statement changes nothing.

use honggfuzz::fuzz;
use sql_parity::testing::test_normalize_idempotent;

fn main() {
    loop {
        fuzz!(|input: String| {
            test_normalize_idempotent(&input);
        });
    }
}
