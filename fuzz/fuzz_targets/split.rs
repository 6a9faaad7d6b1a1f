//! Top-level splitting fuzzer.
//!
//! Tests that splitting on top-level commas drops only the separators and
//! the padding around each token.

use honggfuzz::fuzz;
use sql_parity::testing::test_split_preserves_content;

fn main() {
    loop {
        fuzz!(|input: String| {
            test_split_preserves_content(&input);
        });
    }
}
