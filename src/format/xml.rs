// Copyright (c) 2016-2017 Martijn Rijkeboer <mrr@sru-systems.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Small helpers shared by the inner-XML entry extractor.

use std::io::Read;
use xml::attribute::OwnedAttribute;
use xml::common::Position;
use xml::reader::EventReader;
use crate::types::error::{Error, Result};

/// Creates a new malformed-XML error result, tagged with the reader's
/// current position.
pub fn read_err<S, R, X>(reader: &EventReader<R>, msg: S) -> Result<X>
where
    R: Read,
    S: Into<String>,
{
    let msg: String = msg.into();
    Err(Error::MalformedXml(format!("{} {}", reader.position(), msg)))
}

/// Searches `attrs` for an attribute named `name` (case-insensitive).
pub fn search_attr_value(attrs: &[OwnedAttribute], name: &str) -> Option<String> {
    attrs
        .iter()
        .find(|attr| attr.name.local_name.eq_ignore_ascii_case(name))
        .map(|attr| attr.value.clone())
}
