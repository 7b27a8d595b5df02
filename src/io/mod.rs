// Copyright (c) 2016-2017 Martijn Rijkeboer <mrr@sru-systems.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Reusable `Read`-wrapping building blocks shared by the format readers.

mod log;
mod log_reader;
mod hashed_block_reader;

pub use self::log::Log;
pub use self::log_reader::LogReader;
pub use self::hashed_block_reader::HashedBlockReader;
