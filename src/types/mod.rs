// Copyright (c) 2016-2017 Martijn Rijkeboer <mrr@sru-systems.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

pub mod composite_key;
pub mod compression;
pub mod database;
pub mod entry;
pub mod error;
pub mod key_file;
pub mod version;

pub use self::composite_key::CompositeKey;
pub use self::compression::Compression;
pub use self::database::{Database, KeyMaterial};
pub use self::entry::{Entry, EntryValue};
pub use self::error::{Error, Result};
pub use self::key_file::KeyFile;
pub use self::version::Version;
