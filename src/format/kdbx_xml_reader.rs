// Copyright (c) 2016-2017 Martijn Rijkeboer <mrr@sru-systems.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The XML entry extractor (C8): parses the inner XML into a flat,
//! document-order list of entries, assigning Salsa20 random-stream offsets
//! to protected values as it goes.

use std::io::Read;
use xml::reader::{EventReader, XmlEvent};
use super::xml;
use crate::common;
use crate::types::entry::{Entry, EntryValue};
use crate::types::error::Result;

/// Everything extracted from the inner XML that the pipeline driver (C7)
/// needs: the declared header hash (if any) and the flattened entry list.
#[derive(Debug, Default)]
pub struct XmlData {
    /// Base64-decoded `Meta/HeaderHash`, if the element was present and
    /// non-empty.
    pub header_hash: Option<Vec<u8>>,
    /// All entries in document order, including historical ones.
    pub entries: Vec<Entry>,
}

/// Attempts to parse the inner XML from `source`.
pub fn read<R: Read>(source: &mut R) -> Result<XmlData> {
    let mut reader = EventReader::new(source);
    let mut header_hash = None;
    let mut entries = Vec::new();
    let mut offset = 0usize;

    let mut seen_root_element = false;

    loop {
        match reader.next()? {
            XmlEvent::StartElement { name, .. } => {
                if !seen_root_element {
                    seen_root_element = true;
                    if name.local_name != common::TAG_KEEPASS_FILE {
                        return xml::read_err(
                            &reader,
                            format!("expected root element {}", common::TAG_KEEPASS_FILE),
                        );
                    }
                    continue;
                }
                match name.local_name.as_str() {
                    common::TAG_META => header_hash = read_meta(&mut reader)?,
                    common::TAG_ROOT => entries = read_root(&mut reader, &mut offset)?,
                    _ => {}
                }
            }
            XmlEvent::EndDocument { .. } => break,
            _ => {}
        }
    }

    Ok(XmlData {
        header_hash,
        entries,
    })
}

fn read_meta<R: Read>(reader: &mut EventReader<R>) -> Result<Option<Vec<u8>>> {
    let mut header_hash = None;
    loop {
        match reader.next()? {
            XmlEvent::StartElement { name, .. } => {
                if name.local_name == common::TAG_HEADER_HASH {
                    let text = read_element_text(reader)?;
                    if !text.trim().is_empty() {
                        header_hash = Some(base64::decode(text.trim())?);
                    }
                }
            }
            XmlEvent::EndElement { name, .. } => {
                if name.local_name == common::TAG_META {
                    break;
                }
            }
            _ => {}
        }
    }
    Ok(header_hash)
}

fn read_root<R: Read>(reader: &mut EventReader<R>, offset: &mut usize) -> Result<Vec<Entry>> {
    let mut entries = Vec::new();
    loop {
        match reader.next()? {
            XmlEvent::StartElement { name, .. } => {
                if name.local_name == common::TAG_GROUP {
                    entries = read_group(reader, offset)?;
                }
            }
            XmlEvent::EndElement { name, .. } => {
                if name.local_name == common::TAG_ROOT {
                    break;
                }
            }
            _ => {}
        }
    }
    Ok(entries)
}

/// Reads one `<Group>` element, recursively flattening its own entries
/// (each immediately followed by its historical copies) and then its
/// nested groups' entries, per the traversal order mandated for C8.
fn read_group<R: Read>(reader: &mut EventReader<R>, offset: &mut usize) -> Result<Vec<Entry>> {
    let mut name = String::new();
    let mut own = Vec::new();
    let mut nested = Vec::new();

    loop {
        match reader.next()? {
            XmlEvent::StartElement { name: el, .. } => match el.local_name.as_str() {
                common::TAG_NAME => name = read_element_text(reader)?,
                common::TAG_ENTRY => {
                    let (entry, history) = read_entry(reader, false, offset)?;
                    own.push(entry);
                    own.extend(history);
                }
                common::TAG_GROUP => nested.extend(read_group(reader, offset)?),
                _ => {}
            },
            XmlEvent::EndElement { name: el, .. } => {
                if el.local_name == common::TAG_GROUP {
                    break;
                }
            }
            _ => {}
        }
    }

    for entry in own.iter_mut() {
        entry.group = name.clone();
    }
    own.extend(nested);
    Ok(own)
}

/// Reads one `<Entry>`, returning it along with any `<History>` copies
/// (only collected for non-historical entries; a historical entry's own
/// History element, if present, is ignored).
fn read_entry<R: Read>(
    reader: &mut EventReader<R>,
    historical: bool,
    offset: &mut usize,
) -> Result<(Entry, Vec<Entry>)> {
    let mut entry = Entry {
        historical,
        ..Entry::default()
    };
    let mut history = Vec::new();

    loop {
        match reader.next()? {
            XmlEvent::StartElement { name, .. } => match name.local_name.as_str() {
                common::TAG_UUID => {
                    let text = read_element_text(reader)?;
                    entry.uuid = decode_uuid(reader, &text)?;
                }
                common::TAG_STRING => read_string_field(reader, &mut entry, offset)?,
                common::TAG_HISTORY if !historical => {
                    history = read_history(reader, offset)?;
                }
                _ => {}
            },
            XmlEvent::EndElement { name, .. } => {
                if name.local_name == common::TAG_ENTRY {
                    break;
                }
            }
            _ => {}
        }
    }

    Ok((entry, history))
}

fn read_history<R: Read>(reader: &mut EventReader<R>, offset: &mut usize) -> Result<Vec<Entry>> {
    let mut history = Vec::new();
    loop {
        match reader.next()? {
            XmlEvent::StartElement { name, .. } => {
                if name.local_name == common::TAG_ENTRY {
                    let (entry, _) = read_entry(reader, true, offset)?;
                    history.push(entry);
                }
            }
            XmlEvent::EndElement { name, .. } => {
                if name.local_name == common::TAG_HISTORY {
                    break;
                }
            }
            _ => {}
        }
    }
    Ok(history)
}

/// Reads a `<String><Key>..</Key><Value ..>..</Value></String>` element,
/// assigning `offset` on the entry's matching field when `Key` names one
/// of the five scoped fields. Unscoped keys still advance `offset` when
/// protected, since the shared Salsa20 keystream was consumed for them by
/// the original writer regardless of whether this reader keeps the value.
fn read_string_field<R: Read>(
    reader: &mut EventReader<R>,
    entry: &mut Entry,
    offset: &mut usize,
) -> Result<()> {
    let mut key: Option<String> = None;
    let mut value_text = String::new();
    let mut protected = false;

    loop {
        match reader.next()? {
            XmlEvent::StartElement {
                name, attributes, ..
            } => match name.local_name.as_str() {
                common::TAG_KEY => key = Some(read_element_text(reader)?),
                common::TAG_VALUE => {
                    protected = xml::search_attr_value(&attributes, common::ATTR_PROTECTED)
                        .map(|v| v.eq_ignore_ascii_case("true"))
                        .unwrap_or(false);
                    value_text = read_element_text(reader)?;
                }
                _ => {}
            },
            XmlEvent::EndElement { name, .. } => {
                if name.local_name == common::TAG_STRING {
                    break;
                }
            }
            _ => {}
        }
    }

    let key = match key {
        Some(k) => k,
        None => return xml::read_err(reader, "String element missing Key"),
    };

    let value = if protected && !value_text.is_empty() {
        let cipher_text = base64::decode(value_text.trim())?;
        let entry_value = EntryValue::protected(value_text, cipher_text.clone(), *offset);
        *offset += cipher_text.len();
        entry_value
    } else {
        EntryValue::plain(value_text)
    };

    match key.as_str() {
        common::STRING_KEY_TITLE => entry.title = value,
        common::STRING_KEY_USERNAME => entry.username = value,
        common::STRING_KEY_PASSWORD => entry.password = value,
        common::STRING_KEY_URL => entry.url = value,
        common::STRING_KEY_NOTES => entry.notes = value,
        _ => {}
    }

    Ok(())
}

fn decode_uuid<R: Read>(reader: &EventReader<R>, text: &str) -> Result<String> {
    let bytes = base64::decode(text.trim())?;
    if bytes.len() != 16 {
        return xml::read_err(reader, "UUID did not decode to 16 bytes");
    }
    Ok(hex::encode(bytes))
}

/// Accumulates `Characters`/`CData` text until the current element's
/// `EndElement`. Assumes no nested elements, which holds for every leaf
/// tag this reader looks at (`Name`, `UUID`, `Key`, `Value`, `HeaderHash`).
fn read_element_text<R: Read>(reader: &mut EventReader<R>) -> Result<String> {
    let mut text = String::new();
    loop {
        match reader.next()? {
            XmlEvent::Characters(s) | XmlEvent::CData(s) => text.push_str(&s),
            XmlEvent::EndElement { .. } => break,
            _ => {}
        }
    }
    Ok(text)
}

#[cfg(test)]
mod tests {

    use super::*;
    use std::io::Cursor;
    use crate::types::error::Error;

    fn sample_xml() -> String {
        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<KeePassFile>
  <Meta>
    <HeaderHash>{header_hash}</HeaderHash>
  </Meta>
  <Root>
    <Group>
      <UUID>{group_uuid}</UUID>
      <Name>General</Name>
      <Entry>
        <UUID>{entry_uuid}</UUID>
        <String><Key>Title</Key><Value>Sample Entry</Value></String>
        <String><Key>UserName</Key><Value>someone</Value></String>
        <String><Key>Password</Key><Value Protected="True">{password_cipher}</Value></String>
        <History>
          <Entry>
            <UUID>{entry_uuid}</UUID>
            <String><Key>Title</Key><Value>Sample Entry</Value></String>
            <String><Key>Password</Key><Value>old-password</Value></String>
          </Entry>
        </History>
      </Entry>
    </Group>
  </Root>
</KeePassFile>"#,
            header_hash = base64::encode([0u8; 32]),
            group_uuid = base64::encode([1u8; 16]),
            entry_uuid = base64::encode([2u8; 16]),
            password_cipher = base64::encode(b"ciphertextbytes!"),
        )
    }

    #[test]
    fn test_read_extracts_header_hash_and_entries() {
        let xml = sample_xml();
        let data = read(&mut Cursor::new(xml)).unwrap();
        assert_eq!(data.header_hash, Some(vec![0u8; 32]));
        assert_eq!(data.entries.len(), 2);

        let active = &data.entries[0];
        assert_eq!(active.group, "General");
        assert_eq!(active.uuid, hex::encode([2u8; 16]));
        assert_eq!(active.title.plain_text, "Sample Entry");
        assert_eq!(active.username.plain_text, "someone");
        assert!(active.password.protected);
        assert_eq!(active.password.random_offset, Some(0));
        assert!(!active.historical);

        let historical = &data.entries[1];
        assert!(historical.historical);
        assert_eq!(historical.group, "General");
        assert_eq!(historical.password.plain_text, "old-password");
    }

    #[test]
    fn test_read_rejects_wrong_root_element() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?><NotAKeePassFile></NotAKeePassFile>"#;
        let result = read(&mut Cursor::new(xml));
        assert!(matches!(result, Err(Error::MalformedXml(_))));
    }

    #[test]
    fn test_offsets_advance_by_cipher_text_length() {
        let xml = format!(
            r#"<KeePassFile><Meta></Meta><Root><Group><Name>G</Name>
            <Entry><UUID>{uuid}</UUID>
              <String><Key>Title</Key><Value Protected="True">{a}</Value></String>
              <String><Key>Notes</Key><Value Protected="True">{b}</Value></String>
            </Entry>
            </Group></Root></KeePassFile>"#,
            uuid = base64::encode([3u8; 16]),
            a = base64::encode(b"12345"),
            b = base64::encode(b"abc"),
        );
        let data = read(&mut Cursor::new(xml)).unwrap();
        let entry = &data.entries[0];
        assert_eq!(entry.title.random_offset, Some(0));
        assert_eq!(entry.notes.random_offset, Some(5));
    }
}
