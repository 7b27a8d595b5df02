// Copyright (c) 2016-2017 Martijn Rijkeboer <mrr@sru-systems.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The composite key (C2): aggregation of a password sub-key and/or a
//! key-file sub-key into a single raw key, and its AES-ECB transform into
//! the transformed master key.

use std::sync::atomic::AtomicBool;
use crate::crypto::{aes_ecb, sha256};
use crate::types::error::{Error, Result};

/// Ordered aggregation of sub-keys (password, key-file, ...), each a raw
/// 32-byte key.
#[derive(Clone, Debug, Default)]
pub struct CompositeKey {
    sub_keys: Vec<[u8; 32]>,
}

impl CompositeKey {
    /// Create an empty composite key with no sub-keys.
    pub fn new() -> CompositeKey {
        CompositeKey::default()
    }

    /// Add a password sub-key. The sub-key is `SHA-256(utf8 bytes)`.
    pub fn add_password(&mut self, password: &str) {
        self.sub_keys.push(sha256::hash(&[password.as_bytes()]));
    }

    /// Add a raw 32-byte key-file sub-key, as produced by the key-file loader.
    pub fn add_key_file(&mut self, raw_key: [u8; 32]) {
        self.sub_keys.push(raw_key);
    }

    /// `raw_key()` is SHA-256 over the concatenation of each sub-key's raw
    /// bytes, in the order they were added. An empty composite's raw key is
    /// `SHA-256("")`.
    pub fn raw_key(&self) -> [u8; 32] {
        let refs: Vec<&[u8]> = self.sub_keys.iter().map(|k| k.as_slice()).collect();
        sha256::hash(&refs)
    }

    /// Transform `raw_key()` under `seed` for `rounds` AES-ECB rounds and
    /// re-hash the result, producing the transformed master key.
    pub fn transform(&self, seed: &[u8; 32], rounds: u64) -> Result<[u8; 32]> {
        self.transform_cancellable(seed, rounds, None)
    }

    /// As `transform`, but cooperatively cancellable; see
    /// [`aes_ecb::transform_rounds_cancellable`].
    pub fn transform_cancellable(
        &self,
        seed: &[u8; 32],
        rounds: u64,
        cancel: Option<&AtomicBool>,
    ) -> Result<[u8; 32]> {
        if rounds == 0 {
            return Err(Error::InvalidRounds);
        }
        let transformed = aes_ecb::transform_rounds_cancellable(&self.raw_key(), seed, rounds, cancel)?;
        Ok(sha256::hash(&[&transformed]))
    }
}
