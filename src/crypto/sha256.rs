// Copyright (c) 2016-2017 Martijn Rijkeboer <mrr@sru-systems.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use sha2::{Digest, Sha256};

/// Hash the concatenation of the inputs using SHA-256.
pub fn hash(inputs: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for input in inputs {
        hasher.update(input);
    }
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_hash_returns_correct_result() {
        // Wikipedia test vectors.
        let tests = vec![
            (
                "",
                "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
            ),
            (
                "The quick brown fox jumps over the lazy dog",
                "d7a8fbb307d7809469ca9abcb0082e4f8d5651e46d3cdb762d02d0bf37c9e592",
            ),
        ];

        for (input_str, expected_hex) in tests {
            let actual = hash(&[input_str.as_bytes()]);
            assert_eq!(hex::encode(actual), expected_hex);
        }
    }

    #[test]
    fn test_hash_concatenates_inputs() {
        let a = hash(&[b"foo", b"bar"]);
        let b = hash(&[b"foobar"]);
        assert_eq!(a, b);
    }
}
