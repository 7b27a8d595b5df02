// Copyright (c) 2016-2017 Martijn Rijkeboer <mrr@sru-systems.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The entry query service (C9) and the `Database::open` entry point that
//! drives the header parser (C7) to build it.

use std::io::Read;
use crate::crypto::salsa20::Keystream;
use crate::format::kdbx_reader;
use crate::types::composite_key::CompositeKey;
use crate::types::entry::Entry;
use crate::types::error::Result;
use crate::types::key_file::KeyFile;

/// The password and/or key-file sub-keys used to open a database.
#[derive(Default)]
pub struct KeyMaterial<'a> {
    password: Option<&'a str>,
    key_file: Option<KeyFile>,
}

impl<'a> KeyMaterial<'a> {
    /// An empty key material, equivalent to an empty-string password.
    pub fn new() -> KeyMaterial<'a> {
        KeyMaterial::default()
    }

    /// Attach a password sub-key. Ignored if `password` is empty.
    pub fn with_password(mut self, password: &'a str) -> KeyMaterial<'a> {
        self.password = Some(password);
        self
    }

    /// Attach a key-file sub-key.
    pub fn with_key_file(mut self, key_file: KeyFile) -> KeyMaterial<'a> {
        self.key_file = Some(key_file);
        self
    }

    fn composite_key(&self) -> CompositeKey {
        let mut composite = CompositeKey::new();
        if let Some(password) = self.password {
            if !password.is_empty() {
                composite.add_password(password);
            }
        }
        if let Some(ref key_file) = self.key_file {
            composite.add_key_file(key_file.raw_key());
        }
        composite
    }
}

/// A decrypted and parsed kdbx database, ready to be queried.
///
/// Single-owner, single-use: open it once, then query `list`/`search` as
/// many times as needed.
pub struct Database {
    entries: Vec<Entry>,
    keystream: Keystream,
}

impl Database {
    /// Attempts to decrypt and parse a kdbx v2/v3 database from `source`
    /// using `key_material`.
    pub fn open<R: Read>(key_material: &KeyMaterial, source: &mut R) -> Result<Database> {
        let composite_key = key_material.composite_key();
        let opened = kdbx_reader::read(source, &composite_key)?;
        let keystream = Keystream::new(&opened.protected_stream_key);
        Ok(Database {
            entries: opened.entries,
            keystream,
        })
    }

    /// Returns every entry, with all protected fields except `Password`
    /// resolved to plaintext, optionally omitting historical copies.
    pub fn list(&mut self, include_historical: bool) -> Result<Vec<Entry>> {
        let mut projected: Vec<Entry> = self
            .entries
            .iter()
            .filter(|entry| include_historical || !entry.historical)
            .cloned()
            .collect();

        for entry in projected.iter_mut() {
            entry.title.resolve(&mut self.keystream)?;
            entry.username.resolve(&mut self.keystream)?;
            entry.url.resolve(&mut self.keystream)?;
            entry.notes.resolve(&mut self.keystream)?;
        }

        Ok(projected)
    }

    /// Finds the single best match for `term`, trying (in priority order)
    /// an exact UUID match, an exact Title match, then a case-insensitive
    /// Title match. Returns `None` if no candidate exists, or if the
    /// winning candidate is historical and `include_historical` is false.
    pub fn search(&mut self, term: &str, include_historical: bool) -> Result<Option<Entry>> {
        for entry in self.entries.iter_mut() {
            entry.title.resolve(&mut self.keystream)?;
        }

        let term_lower = term.to_lowercase();
        let entries = &self.entries;
        let (p1, p2, p3) = std::thread::scope(|scope| {
            let h1 = scope.spawn(|| entries.iter().position(|e| e.uuid == term));
            let h2 = scope.spawn(|| entries.iter().position(|e| e.title.plain_text == term));
            let h3 = scope
                .spawn(|| entries.iter().position(|e| e.title.plain_text.to_lowercase() == term_lower));
            (
                h1.join().expect("uuid search probe panicked"),
                h2.join().expect("title search probe panicked"),
                h3.join().expect("lowercase title search probe panicked"),
            )
        });

        let winner = match p1.or(p2).or(p3) {
            Some(winner) => winner,
            None => return Ok(None),
        };
        if !include_historical && self.entries[winner].historical {
            return Ok(None);
        }

        let mut result = self.entries[winner].clone();
        result.password.resolve(&mut self.keystream)?;
        result.username.resolve(&mut self.keystream)?;
        result.url.resolve(&mut self.keystream)?;
        result.notes.resolve(&mut self.keystream)?;
        Ok(Some(result))
    }
}
