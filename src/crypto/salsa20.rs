// Copyright (c) 2016-2017 Martijn Rijkeboer <mrr@sru-systems.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The Salsa20 inner keystream (C6) used to XOR-decrypt protected string
//! values at their declared offsets.

use salsa20::cipher::{KeyIvInit, StreamCipher as _};
use salsa20::Salsa20;
use crate::common::SALSA20_IV;
use crate::crypto::sha256;
use crate::types::error::{Error, Result};

/// On-demand Salsa20 keystream. Grows its internal buffer lazily so that
/// `process` can be called with arbitrary, non-decreasing offsets without
/// re-deriving the keystream from the start each time.
pub struct Keystream {
    cipher: Salsa20,
    produced: Vec<u8>,
}

impl Keystream {
    /// Create a new keystream from the raw `ProtectedStreamKey` header
    /// field. The Salsa20 key is `SHA-256(protected_stream_key)`.
    pub fn new(protected_stream_key: &[u8; 32]) -> Keystream {
        let key = sha256::hash(&[protected_stream_key]);
        let cipher = Salsa20::new((&key).into(), (&SALSA20_IV).into());
        Keystream {
            cipher,
            produced: Vec::new(),
        }
    }

    /// XOR `cipher_text` against the keystream bytes starting at `offset`,
    /// extending the internal buffer as needed, and return the plaintext.
    /// Fails with `Error::OffsetOutOfRange` if `offset` plus the cipher
    /// text's length overflows `usize` or exceeds what Salsa20 can produce.
    pub fn process(&mut self, offset: usize, cipher_text: &[u8]) -> Result<Vec<u8>> {
        let needed = offset
            .checked_add(cipher_text.len())
            .ok_or(Error::OffsetOutOfRange)?;
        if needed > self.produced.len() {
            let extra = needed - self.produced.len();
            let start = self.produced.len();
            self.produced.resize(needed, 0);
            self.cipher
                .try_apply_keystream(&mut self.produced[start..start + extra])
                .map_err(|_| Error::OffsetOutOfRange)?;
        }

        let mut out = cipher_text.to_vec();
        for (i, byte) in out.iter_mut().enumerate() {
            *byte ^= self.produced[offset + i];
        }
        Ok(out)
    }
}
