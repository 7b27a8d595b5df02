// Copyright (c) 2016-2017 Martijn Rijkeboer <mrr@sru-systems.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Decryption and parsing pipeline for KeePass 2 (kdbx v2/v3) password
//! databases.
//!
//! This crate reads the contents of a `.kdbx` file: it parses the
//! binary header, derives the master key from a password and/or key
//! file, decrypts the AES-CBC body, verifies the hashed-block framing,
//! decompresses the payload if needed, parses the inner XML, and
//! resolves Salsa20-protected string values on demand. It does not
//! write or modify kdbx files.
//!
//! # Examples
//!
//! Open a database with a password and list its entries:
//!
//! ```rust,no_run
//! use kdbx_core::{Database, KeyMaterial};
//! use std::fs::File;
//!
//! # fn example() -> kdbx_core::Result<()> {
//! let mut file = File::open("passwords.kdbx")?;
//! let key_material = KeyMaterial::new().with_password("secret");
//! let mut db = Database::open(&key_material, &mut file)?;
//!
//! for entry in db.list(false)? {
//!     println!("{}: {}", entry.title.plain_text, entry.username.plain_text);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Open a database with both a password and a key file:
//!
//! ```rust,no_run
//! use kdbx_core::{Database, KeyFile, KeyMaterial};
//! use std::fs::File;
//!
//! # fn example() -> kdbx_core::Result<()> {
//! let mut key_file_src = File::open("passwords.key")?;
//! let key_file = KeyFile::open(&mut key_file_src)?;
//!
//! let mut db_file = File::open("passwords.kdbx")?;
//! let key_material = KeyMaterial::new().with_password("secret").with_key_file(key_file);
//! let mut db = Database::open(&key_material, &mut db_file)?;
//! let found = db.search("Sample Entry", false)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Not implemented
//!
//! - Writing or modifying kdbx files.
//! - kdbx4 (Argon2, ChaCha20, inner-header) databases.
//! - kdbx1 (`.kdb`) databases, beyond detecting and rejecting them.
//! - Attachments, custom icons, tags, expiry, and any entry fields
//!   beyond Title, UserName, Password, URL, Notes, and UUID.

mod common;
mod compression;
mod crypto;
mod format;
mod io;
mod types;

pub use crate::types::{CompositeKey, Compression, Database, Entry, EntryValue, Error, KeyFile, KeyMaterial, Result, Version};
