// Copyright (c) 2016-2017 Martijn Rijkeboer <mrr@sru-systems.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The key-file loader (C3): detects and parses the four key-file
//! encodings (XML, 32-byte binary, 64-byte hex, arbitrary-length hashed).

use hex::FromHex;
use std::io::{Cursor, Read};
use xml::reader::{EventReader, XmlEvent};
use crate::common::{
    KEY_FILE_BINARY_LEN, KEY_FILE_HEX_LEN, KEY_FILE_XML_VERSION, KF_TAG_DATA, KF_TAG_KEY,
    KF_TAG_KEY_FILE, KF_TAG_META, KF_TAG_VERSION,
};
use crate::crypto::sha256;
use crate::types::error::{Error, Result};
use crate::types::key_file::KeyFile;

/// Attempts to load a key file, trying XML, binary, hex, and hashed
/// encodings in that order.
pub fn read<R: Read>(reader: &mut R) -> Result<KeyFile> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;

    if data.is_empty() {
        return Err(Error::InvalidKeyFile);
    }

    if let Some(raw) = try_read_xml(&data) {
        return Ok(KeyFile::from_raw(raw));
    }

    if data.len() == KEY_FILE_BINARY_LEN {
        let mut raw = [0u8; 32];
        raw.copy_from_slice(&data);
        return Ok(KeyFile::from_raw(raw));
    }

    if data.len() == KEY_FILE_HEX_LEN {
        if let Ok(bytes) = Vec::from_hex(&data) {
            let mut raw = [0u8; 32];
            raw.copy_from_slice(&bytes);
            return Ok(KeyFile::from_raw(raw));
        }
    }

    Ok(KeyFile::from_raw(sha256::hash(&[&data])))
}

/// Attempts to parse `data` as the `<KeyFile>` XML encoding. Returns `None`
/// (rather than an error) on anything that doesn't match, so the caller
/// falls through to the remaining encodings.
fn try_read_xml(data: &[u8]) -> Option<[u8; 32]> {
    let mut reader = EventReader::new(Cursor::new(data));
    let mut version_ok = false;
    let mut key_data: Option<String> = None;

    loop {
        let event = reader.next().ok()?;
        match event {
            XmlEvent::StartElement { name, .. } => {
                if name.local_name == KF_TAG_KEY_FILE {
                    read_key_file_body(&mut reader, &mut version_ok, &mut key_data);
                }
            }
            XmlEvent::EndDocument { .. } => break,
            _ => {}
        }
    }

    if !version_ok {
        return None;
    }

    let key_data = key_data?;
    let decoded = base64::decode(key_data.trim()).ok()?;
    if decoded.is_empty() || decoded.len() != 32 {
        return None;
    }
    let mut raw = [0u8; 32];
    raw.copy_from_slice(&decoded);
    Some(raw)
}

fn read_key_file_body<R: Read>(
    reader: &mut EventReader<R>,
    version_ok: &mut bool,
    key_data: &mut Option<String>,
) {
    loop {
        let event = match reader.next() {
            Ok(event) => event,
            Err(_) => return,
        };
        match event {
            XmlEvent::StartElement { name, .. } => {
                if name.local_name == KF_TAG_META {
                    read_meta(reader, version_ok);
                } else if name.local_name == KF_TAG_KEY {
                    read_key(reader, key_data);
                }
            }
            XmlEvent::EndElement { name, .. } => {
                if name.local_name == KF_TAG_KEY_FILE {
                    return;
                }
            }
            _ => {}
        }
    }
}

fn read_meta<R: Read>(reader: &mut EventReader<R>, version_ok: &mut bool) {
    loop {
        let event = match reader.next() {
            Ok(event) => event,
            Err(_) => return,
        };
        match event {
            XmlEvent::StartElement { name, .. } => {
                if name.local_name == KF_TAG_VERSION {
                    if let Ok(XmlEvent::Characters(text)) = reader.next() {
                        *version_ok = text == KEY_FILE_XML_VERSION;
                    }
                }
            }
            XmlEvent::EndElement { name, .. } => {
                if name.local_name == KF_TAG_META {
                    return;
                }
            }
            _ => {}
        }
    }
}

fn read_key<R: Read>(reader: &mut EventReader<R>, key_data: &mut Option<String>) {
    loop {
        let event = match reader.next() {
            Ok(event) => event,
            Err(_) => return,
        };
        match event {
            XmlEvent::StartElement { name, .. } => {
                if name.local_name == KF_TAG_DATA {
                    if let Ok(XmlEvent::Characters(text)) = reader.next() {
                        *key_data = Some(text);
                    }
                }
            }
            XmlEvent::EndElement { name, .. } => {
                if name.local_name == KF_TAG_KEY {
                    return;
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use std::io::Cursor as TestCursor;

    #[test]
    fn test_read_binary_key_file() {
        let data = [7u8; 32];
        let key = read(&mut TestCursor::new(data.to_vec())).unwrap();
        assert_eq!(key.raw_key(), data);
    }

    #[test]
    fn test_read_hex_key_file() {
        let raw = [5u8; 32];
        let hex_str = hex::encode(raw);
        let key = read(&mut TestCursor::new(hex_str.into_bytes())).unwrap();
        assert_eq!(key.raw_key(), raw);
    }

    #[test]
    fn test_read_hashed_key_file_for_arbitrary_content() {
        let content = b"not 32 or 64 bytes, and not xml".to_vec();
        let key = read(&mut TestCursor::new(content.clone())).unwrap();
        assert_eq!(key.raw_key(), sha256::hash(&[&content]));
    }

    #[test]
    fn test_read_xml_key_file() {
        let raw = [3u8; 32];
        let encoded = base64::encode(raw);
        let xml = format!(
            "<KeyFile><Meta><Version>1.00</Version></Meta><Key><Data>{}</Data></Key></KeyFile>",
            encoded
        );
        let key = read(&mut TestCursor::new(xml.into_bytes())).unwrap();
        assert_eq!(key.raw_key(), raw);
    }

    #[test]
    fn test_read_empty_errors() {
        assert!(matches!(
            read(&mut TestCursor::new(Vec::new())),
            Err(Error::InvalidKeyFile)
        ));
    }
}
