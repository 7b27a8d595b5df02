// Copyright (c) 2016-2017 Martijn Rijkeboer <mrr@sru-systems.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use secstr::SecStr;
use std::io::Read;
use crate::format::key_file_reader;
use crate::types::error::Result;

/// A loaded key-file sub-key (C3's result). The raw 32-byte key is held in
/// a `SecStr` so it is zeroed on drop.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyFile {
    key: SecStr,
}

impl KeyFile {
    pub(crate) fn from_raw(raw: [u8; 32]) -> KeyFile {
        KeyFile {
            key: SecStr::new(raw.to_vec()),
        }
    }

    /// Attempts to load a key file from any readable source, trying the
    /// XML, binary, hex, and hashed encodings in that order.
    pub fn open<R: Read>(reader: &mut R) -> Result<KeyFile> {
        key_file_reader::read(reader)
    }

    /// The raw 32-byte key, copied out of protected memory.
    pub fn raw_key(&self) -> [u8; 32] {
        let unsecure = self.key.unsecure();
        let mut array = [0u8; 32];
        array.copy_from_slice(unsecure);
        array
    }
}
