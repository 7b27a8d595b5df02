// Copyright (c) 2016-2017 Martijn Rijkeboer <mrr@sru-systems.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::types::error::{Error, Result};

/// The compression algorithm applied to the decrypted main payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Compression {
    /// No compression; the cleartext buffer is XML bytes directly.
    None,
    /// GZip compression; the cleartext buffer must be inflated first.
    Gzip,
}

impl Compression {
    /// Decode the CompressionFlags header value.
    pub fn from_flags(flags: u32) -> Result<Compression> {
        match flags {
            0 => Ok(Compression::None),
            1 => Ok(Compression::Gzip),
            other => Err(Error::UnsupportedCompression(other)),
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_from_flags_decodes_known_values() {
        assert_eq!(Compression::from_flags(0).unwrap(), Compression::None);
        assert_eq!(Compression::from_flags(1).unwrap(), Compression::Gzip);
    }

    #[test]
    fn test_from_flags_rejects_unknown_values() {
        assert!(matches!(
            Compression::from_flags(2),
            Err(Error::UnsupportedCompression(2))
        ));
    }
}
