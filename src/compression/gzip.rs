// Copyright (c) 2016-2017 Martijn Rijkeboer <mrr@sru-systems.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Optional gzip decompression of the decrypted main payload, selected by
//! the header's `Compression` field.

use flate2::read::GzDecoder;
use std::io::Read;
use crate::types::error::{Error, Result};

/// Decompress a gzip-compressed payload.
pub fn decode(input: &[u8]) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    let mut decoder = GzDecoder::new(input);
    decoder
        .read_to_end(&mut output)
        .map_err(|e| Error::DecompressionFailed(e.to_string()))?;
    Ok(output)
}

#[cfg(test)]
mod tests {

    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn encode(input: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(input).unwrap();
        encoder.finish().unwrap()
    }

    quickcheck::quickcheck! {
        fn test_decode_inverses_encode(data: Vec<u8>) -> bool {
            let encoded = encode(&data);
            let decoded = decode(&encoded).unwrap();
            decoded == data
        }
    }

    #[test]
    fn test_decode_invalid_data_errors() {
        let result = decode(&[0x00, 0x01, 0x02]);
        assert!(result.is_err());
    }
}
