// Copyright (c) 2016-2017 Martijn Rijkeboer <mrr@sru-systems.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::crypto::salsa20::Keystream;
use crate::types::error::Result;

/// One `<String>` value inside an entry: `Title`, `UserName`, `Password`,
/// `URL`, or `Notes`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntryValue {
    /// The original base64-or-plain XML text.
    pub data: String,
    /// Whether the XML declared `Protected="True"`.
    pub protected: bool,
    /// The resolved plaintext. Empty until `resolve` is called for
    /// protected values; equal to `data` for unprotected ones.
    pub plain_text: String,
    /// Base64-decoded ciphertext, present only while still unresolved.
    pub cipher_text: Option<Vec<u8>>,
    /// Cumulative starting offset into the Salsa20 keystream, present only
    /// for protected values.
    pub random_offset: Option<usize>,
}

impl EntryValue {
    /// Construct an unprotected value; `plain_text` equals `data`.
    pub fn plain(data: String) -> EntryValue {
        EntryValue {
            plain_text: data.clone(),
            data,
            protected: false,
            cipher_text: None,
            random_offset: None,
        }
    }

    /// Construct a still-encrypted protected value.
    pub fn protected(data: String, cipher_text: Vec<u8>, random_offset: usize) -> EntryValue {
        EntryValue {
            data,
            protected: true,
            plain_text: String::new(),
            cipher_text: Some(cipher_text),
            random_offset: Some(random_offset),
        }
    }

    /// Whether this value still needs `resolve` called on it.
    pub fn is_unresolved(&self) -> bool {
        self.protected && self.cipher_text.is_some()
    }

    /// XOR-decrypt `cipher_text` at `random_offset` through `keystream` and
    /// store the result as `plain_text`. A no-op for unprotected values or
    /// values already resolved.
    pub fn resolve(&mut self, keystream: &mut Keystream) -> Result<()> {
        if let (Some(offset), Some(cipher_text)) = (self.random_offset, self.cipher_text.take()) {
            let plain = keystream.process(offset, &cipher_text)?;
            self.plain_text = String::from_utf8_lossy(&plain).into_owned();
        }
        Ok(())
    }
}

/// A single password entry, with its four Non-goal-scoped protected
/// fields (`Title` is resolvable but not declared protected in the
/// fixtures; all five string fields may in principle be protected).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Entry {
    /// The immediate parent group's `Name`.
    pub group: String,
    /// Lowercase-hex UUID, 32 characters.
    pub uuid: String,
    pub title: EntryValue,
    pub username: EntryValue,
    pub password: EntryValue,
    pub url: EntryValue,
    pub notes: EntryValue,
    /// Whether this entry is a `<History>` copy of a prior revision.
    pub historical: bool,
}
