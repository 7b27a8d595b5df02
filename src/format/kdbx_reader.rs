// Copyright (c) 2016-2017 Martijn Rijkeboer <mrr@sru-systems.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The kdbx header parser and pipeline driver (C7): validates
//! signatures/version, extracts the TLV header fields, then drives
//! C2 -> C4 -> C5 -> decompression -> C8 and verifies the header hash.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Read;
use crate::common;
use crate::compression::gzip;
use crate::crypto::{aes_cbc::AesCbcReader, sha256};
use crate::io::{HashedBlockReader, Log, LogReader};
use crate::types::compression::Compression;
use crate::types::composite_key::CompositeKey;
use crate::types::entry::Entry;
use crate::types::error::{Error, Result};
use crate::types::version::Version;
use super::kdbx_xml_reader;

/// Everything the pipeline driver produces once a database has been
/// fully decrypted and parsed.
pub struct OpenedDatabase {
    pub version: Version,
    pub compression: Compression,
    pub entries: Vec<Entry>,
    pub protected_stream_key: [u8; 32],
}

#[derive(Default)]
struct Headers {
    cipher_id: Option<[u8; 16]>,
    compression_flags: Option<u32>,
    master_seed: Option<[u8; 32]>,
    transform_seed: Option<[u8; 32]>,
    transform_rounds: Option<u64>,
    encryption_iv: Option<[u8; 16]>,
    protected_stream_key: Option<[u8; 32]>,
    stream_start_bytes: Option<[u8; 32]>,
    inner_random_stream_id: Option<u32>,
}

/// Attempts to open and fully decrypt/parse a kdbx database from `source`,
/// using `composite_key` as the aggregated sub-keys.
pub fn read<R: Read>(source: &mut R, composite_key: &CompositeKey) -> Result<OpenedDatabase> {
    let mut reader = LogReader::new(source);

    let signature1 = reader.read_u32::<LittleEndian>()?;
    if signature1 != common::SIGNATURE1 {
        return Err(Error::NotAKdbx);
    }

    let signature2 = reader.read_u32::<LittleEndian>()?;
    if signature2 == common::SIGNATURE2_KDB1 {
        return Err(Error::Kdbx1Unsupported);
    }
    if signature2 != common::SIGNATURE2_KDBX {
        return Err(Error::NotAKdbx);
    }

    let raw_version = reader.read_u32::<LittleEndian>()?;
    let version = Version::new(raw_version)?;

    let headers = read_headers(&mut reader)?;
    let stored_header_hash = sha256::hash(&[reader.logged()]);
    reader.stop();
    reader.clear();

    let cipher_id = require(headers.cipher_id, common::HID_CIPHER_ID)?;
    if cipher_id != common::AES_CIPHER_ID {
        return Err(Error::UnsupportedCipher);
    }
    let compression = Compression::from_flags(require(headers.compression_flags, common::HID_COMPRESSION_FLAGS)?)?;
    let master_seed = require(headers.master_seed, common::HID_MASTER_SEED)?;
    let transform_seed = require(headers.transform_seed, common::HID_TRANSFORM_SEED)?;
    let transform_rounds = require(headers.transform_rounds, common::HID_TRANSFORM_ROUNDS)?;
    if transform_rounds == 0 {
        return Err(Error::InvalidRounds);
    }
    let encryption_iv = require(headers.encryption_iv, common::HID_ENCRYPTION_IV)?;
    let protected_stream_key = require(headers.protected_stream_key, common::HID_PROTECTED_STREAM_KEY)?;
    let stream_start_bytes = require(headers.stream_start_bytes, common::HID_STREAM_START_BYTES)?;
    let inner_random_stream_id = require(
        headers.inner_random_stream_id,
        common::HID_INNER_RANDOM_STREAM_ID,
    )?;
    if inner_random_stream_id != common::INNER_STREAM_SALSA20 {
        return Err(Error::UnsupportedRandomStream(inner_random_stream_id));
    }

    let transformed_master_key = composite_key.transform(&transform_seed, transform_rounds)?;
    let final_key = sha256::hash(&[&master_seed, &transformed_master_key]);

    let mut cbc_reader = AesCbcReader::new(reader, &final_key, &encryption_iv);

    let mut start_bytes = [0u8; 32];
    read_exact_eof_aware(&mut cbc_reader, &mut start_bytes)?;
    if start_bytes != stream_start_bytes {
        return Err(Error::WrongKeyOrCorrupt);
    }

    let mut hashed_reader = HashedBlockReader::new(cbc_reader);
    let mut cleartext = Vec::new();
    let mut chunk = vec![0u8; common::DRAIN_CHUNK_SIZE];
    loop {
        let n = hashed_reader.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        cleartext.extend_from_slice(&chunk[..n]);
    }

    let xml_bytes = match compression {
        Compression::Gzip => gzip::decode(&cleartext)?,
        Compression::None => cleartext,
    };

    let xml_data = kdbx_xml_reader::read(&mut std::io::Cursor::new(xml_bytes))?;

    match xml_data.header_hash {
        Some(ref declared) if !declared.is_empty() => {
            if declared.as_slice() != stored_header_hash {
                return Err(Error::HeaderHashMismatch);
            }
        }
        _ => {
            if version.requires_header_hash() {
                return Err(Error::HeaderHashMismatch);
            }
        }
    }

    Ok(OpenedDatabase {
        version,
        compression,
        entries: xml_data.entries,
        protected_stream_key,
    })
}

fn read_headers<R: Read>(reader: &mut LogReader<R>) -> Result<Headers> {
    let mut headers = Headers::default();
    loop {
        let header_id = reader.read_u8()?;
        let low = reader.read_u8()?;
        let high = reader.read_u8()?;
        let field_len = u16::from_le_bytes([low, high]) as usize;
        let mut data = vec![0u8; field_len];
        reader.read_exact(&mut data)?;

        match header_id {
            common::HID_END_OF_HEADER => break,
            common::HID_COMMENT => {}
            common::HID_CIPHER_ID => {
                check_len(header_id, &data, common::SIZE_CIPHER_ID)?;
                headers.cipher_id = Some(fixed16(header_id, &data)?)
            }
            common::HID_COMPRESSION_FLAGS => {
                check_len(header_id, &data, common::SIZE_COMPRESSION_FLAGS)?;
                headers.compression_flags = Some(u32_le(header_id, &data)?)
            }
            common::HID_MASTER_SEED => {
                check_len(header_id, &data, common::SIZE_MASTER_SEED)?;
                headers.master_seed = Some(fixed32(header_id, &data)?)
            }
            common::HID_TRANSFORM_SEED => {
                check_len(header_id, &data, common::SIZE_TRANSFORM_SEED)?;
                headers.transform_seed = Some(fixed32(header_id, &data)?)
            }
            common::HID_TRANSFORM_ROUNDS => {
                check_len(header_id, &data, common::SIZE_TRANSFORM_ROUNDS)?;
                headers.transform_rounds = Some(u64_le(header_id, &data)?)
            }
            common::HID_ENCRYPTION_IV => {
                check_len(header_id, &data, common::SIZE_ENCRYPTION_IV)?;
                headers.encryption_iv = Some(fixed16(header_id, &data)?)
            }
            common::HID_PROTECTED_STREAM_KEY => {
                check_len(header_id, &data, common::SIZE_PROTECTED_STREAM_KEY)?;
                headers.protected_stream_key = Some(fixed32(header_id, &data)?)
            }
            common::HID_STREAM_START_BYTES => {
                check_len(header_id, &data, common::SIZE_STREAM_START_BYTES)?;
                headers.stream_start_bytes = Some(fixed32(header_id, &data)?)
            }
            common::HID_INNER_RANDOM_STREAM_ID => {
                check_len(header_id, &data, common::SIZE_INNER_RANDOM_STREAM_ID)?;
                headers.inner_random_stream_id = Some(u32_le(header_id, &data)?)
            }
            // Unknown fields are ignored for forward compatibility.
            _ => {}
        }
    }
    Ok(headers)
}

fn require<T>(value: Option<T>, header_id: u8) -> Result<T> {
    value.ok_or(Error::MissingHeader(header_id))
}

/// Checks a TLV field's declared length against the fixed size the format
/// mandates for that field, before the fixed-size conversion is attempted.
fn check_len(header_id: u8, data: &[u8], expected: u16) -> Result<()> {
    if data.len() != expected as usize {
        return Err(Error::TruncatedHeader(header_id));
    }
    Ok(())
}

fn fixed16(header_id: u8, data: &[u8]) -> Result<[u8; 16]> {
    data.try_into().map_err(|_| Error::TruncatedHeader(header_id))
}

fn fixed32(header_id: u8, data: &[u8]) -> Result<[u8; 32]> {
    data.try_into().map_err(|_| Error::TruncatedHeader(header_id))
}

fn u32_le(header_id: u8, data: &[u8]) -> Result<u32> {
    let bytes: [u8; 4] = data.try_into().map_err(|_| Error::TruncatedHeader(header_id))?;
    Ok(u32::from_le_bytes(bytes))
}

fn u64_le(header_id: u8, data: &[u8]) -> Result<u64> {
    let bytes: [u8; 8] = data.try_into().map_err(|_| Error::TruncatedHeader(header_id))?;
    Ok(u64::from_le_bytes(bytes))
}

fn read_exact_eof_aware<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    reader.read_exact(buf).map_err(|_| Error::WrongKeyOrCorrupt)
}

/// End-to-end pipeline tests, grounded in the teacher's
/// `test_database_open_can_read_saved_database` style integration test: a
/// database is assembled here rather than loaded from a fixture file on
/// disk, since this crate doesn't implement a writer.
#[cfg(test)]
mod pipeline_tests {

    use super::*;
    use cbc::cipher::{BlockEncryptMut, KeyIvInit};
    use byteorder::WriteBytesExt;
    use flate2::write::GzEncoder;
    use flate2::Compression as GzCompression;
    use std::io::Write;
    use crate::crypto::salsa20::Keystream;
    use crate::types::composite_key::CompositeKey;

    const PASSWORD: &str = "correct horse battery staple";
    const ROUNDS: u64 = 7;

    fn encrypt_cbc(key: &[u8; 32], iv: &[u8; 16], data: &[u8]) -> Vec<u8> {
        let mut encryptor = cbc::Encryptor::<aes::Aes256>::new(key.into(), iv.into());
        let mut padded = data.to_vec();
        let pad = 16 - (padded.len() % 16);
        padded.extend(std::iter::repeat(pad as u8).take(pad));
        let mut out = Vec::with_capacity(padded.len());
        for chunk in padded.chunks_exact(16) {
            let mut block: [u8; 16] = chunk.try_into().unwrap();
            let mut generic = block.into();
            encryptor.encrypt_block_mut(&mut generic);
            block = generic.into();
            out.extend_from_slice(&block);
        }
        out
    }

    fn write_hashed_blocks(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        if !data.is_empty() {
            out.write_u32::<LittleEndian>(0).unwrap();
            out.extend_from_slice(&sha256::hash(&[data]));
            out.write_u32::<LittleEndian>(data.len() as u32).unwrap();
            out.extend_from_slice(data);
        }
        let final_index = if data.is_empty() { 0 } else { 1 };
        out.write_u32::<LittleEndian>(final_index).unwrap();
        out.extend_from_slice(&common::FINAL_BLOCK_HASH);
        out.write_u32::<LittleEndian>(0).unwrap();
        out
    }

    fn write_header_field(out: &mut Vec<u8>, id: u8, data: &[u8]) {
        out.write_u8(id).unwrap();
        let len = data.len() as u16;
        out.write_u8((len & 0xFF) as u8).unwrap();
        out.write_u8((len >> 8) as u8).unwrap();
        out.extend_from_slice(data);
    }

    struct Fixture {
        master_seed: [u8; 32],
        transform_seed: [u8; 32],
        encryption_iv: [u8; 16],
        protected_stream_key: [u8; 32],
        stream_start_bytes: [u8; 32],
    }

    impl Fixture {
        fn new() -> Fixture {
            Fixture {
                master_seed: [0x11; 32],
                transform_seed: [0x22; 32],
                encryption_iv: [0x33; 16],
                protected_stream_key: [0x44; 32],
                stream_start_bytes: [0x55; 32],
            }
        }

        fn header_bytes(&self, gzip: bool) -> Vec<u8> {
            let mut out = Vec::new();
            write_header_field(&mut out, common::HID_CIPHER_ID, &common::AES_CIPHER_ID);
            let flags: u32 = if gzip { 1 } else { 0 };
            write_header_field(&mut out, common::HID_COMPRESSION_FLAGS, &flags.to_le_bytes());
            write_header_field(&mut out, common::HID_MASTER_SEED, &self.master_seed);
            write_header_field(&mut out, common::HID_TRANSFORM_SEED, &self.transform_seed);
            write_header_field(&mut out, common::HID_TRANSFORM_ROUNDS, &ROUNDS.to_le_bytes());
            write_header_field(&mut out, common::HID_ENCRYPTION_IV, &self.encryption_iv);
            write_header_field(
                &mut out,
                common::HID_PROTECTED_STREAM_KEY,
                &self.protected_stream_key,
            );
            write_header_field(
                &mut out,
                common::HID_STREAM_START_BYTES,
                &self.stream_start_bytes,
            );
            write_header_field(
                &mut out,
                common::HID_INNER_RANDOM_STREAM_ID,
                &common::INNER_STREAM_SALSA20.to_le_bytes(),
            );
            write_header_field(&mut out, common::HID_END_OF_HEADER, &[0, 0, 0, 0]);
            out
        }

        fn xml_with_header_hash(&self, full_header_bytes: &[u8], title_cipher: &[u8]) -> String {
            let header_hash = sha256::hash(&[full_header_bytes]);
            format!(
                r#"<?xml version="1.0" encoding="utf-8"?>
<KeePassFile>
  <Meta><HeaderHash>{hash}</HeaderHash></Meta>
  <Root>
    <Group>
      <Name>General</Name>
      <Entry>
        <UUID>{uuid}</UUID>
        <String><Key>Title</Key><Value Protected="True">{title}</Value></String>
        <String><Key>UserName</Key><Value>alice</Value></String>
        <String><Key>URL</Key><Value>https://example.com</Value></String>
      </Entry>
    </Group>
  </Root>
</KeePassFile>"#,
                hash = base64::encode(header_hash),
                uuid = base64::encode([9u8; 16]),
                title = base64::encode(title_cipher),
            )
        }

        fn build(&self, gzip: bool, corrupt_header_hash: bool) -> Vec<u8> {
            let header_bytes = self.header_bytes(gzip);
            let mut full_header_bytes = Vec::new();
            full_header_bytes.write_u32::<LittleEndian>(common::SIGNATURE1).unwrap();
            full_header_bytes.write_u32::<LittleEndian>(common::SIGNATURE2_KDBX).unwrap();
            full_header_bytes.write_u32::<LittleEndian>(0x0003_0001).unwrap();
            full_header_bytes.extend_from_slice(&header_bytes);

            let mut keystream = Keystream::new(&self.protected_stream_key);
            let title_cipher = keystream.process(0, b"Sample Entry");
            let mut xml = self.xml_with_header_hash(&full_header_bytes, &title_cipher);
            if corrupt_header_hash {
                xml = xml.replace(
                    &base64::encode(sha256::hash(&[&full_header_bytes])),
                    &base64::encode([0xAAu8; 32]),
                );
            }

            let payload = if gzip {
                let mut encoder = GzEncoder::new(Vec::new(), GzCompression::default());
                encoder.write_all(xml.as_bytes()).unwrap();
                encoder.finish().unwrap()
            } else {
                xml.into_bytes()
            };

            let mut plaintext = self.stream_start_bytes.to_vec();
            plaintext.extend(write_hashed_blocks(&payload));

            let composite = {
                let mut c = CompositeKey::new();
                c.add_password(PASSWORD);
                c
            };
            let transformed = composite
                .transform(&self.transform_seed, ROUNDS)
                .unwrap();
            let final_key = sha256::hash(&[&self.master_seed, &transformed]);
            let body = encrypt_cbc(&final_key, &self.encryption_iv, &plaintext);

            let mut file = Vec::new();
            file.write_u32::<LittleEndian>(common::SIGNATURE1).unwrap();
            file.write_u32::<LittleEndian>(common::SIGNATURE2_KDBX).unwrap();
            file.write_u32::<LittleEndian>(0x0003_0001).unwrap();
            file.extend_from_slice(&header_bytes);
            file.extend_from_slice(&body);
            file
        }
    }

    #[test]
    fn test_open_with_correct_password_succeeds() {
        let fixture = Fixture::new();
        let file = fixture.build(false, false);
        let mut composite = CompositeKey::new();
        composite.add_password(PASSWORD);
        let opened = read(&mut std::io::Cursor::new(file), &composite).unwrap();
        assert_eq!(opened.entries.len(), 1);
        assert_eq!(opened.entries[0].username.plain_text, "alice");
        assert_eq!(opened.entries[0].url.plain_text, "https://example.com");
    }

    #[test]
    fn test_open_with_incorrect_password_fails() {
        let fixture = Fixture::new();
        let file = fixture.build(false, false);
        let mut composite = CompositeKey::new();
        composite.add_password("wrong password");
        let result = read(&mut std::io::Cursor::new(file), &composite);
        assert!(matches!(result, Err(Error::WrongKeyOrCorrupt)));
    }

    #[test]
    fn test_open_decompresses_gzip_payload() {
        let fixture = Fixture::new();
        let file = fixture.build(true, false);
        let mut composite = CompositeKey::new();
        composite.add_password(PASSWORD);
        let opened = read(&mut std::io::Cursor::new(file), &composite).unwrap();
        assert_eq!(opened.compression, Compression::Gzip);
        assert_eq!(opened.entries.len(), 1);
    }

    #[test]
    fn test_open_resolves_protected_title_via_keystream() {
        let fixture = Fixture::new();
        let file = fixture.build(false, false);
        let mut composite = CompositeKey::new();
        composite.add_password(PASSWORD);
        let opened = read(&mut std::io::Cursor::new(file), &composite).unwrap();
        let mut keystream = Keystream::new(&opened.protected_stream_key);
        let mut title = opened.entries[0].title.clone();
        title.resolve(&mut keystream).unwrap();
        assert_eq!(title.plain_text, "Sample Entry");
    }

    #[test]
    fn test_open_with_corrupt_header_hash_fails() {
        let fixture = Fixture::new();
        let file = fixture.build(false, true);
        let mut composite = CompositeKey::new();
        composite.add_password(PASSWORD);
        let result = read(&mut std::io::Cursor::new(file), &composite);
        assert!(matches!(result, Err(Error::HeaderHashMismatch)));
    }

    #[test]
    fn test_open_rejects_wrong_signature() {
        let mut file = Vec::new();
        file.write_u32::<LittleEndian>(0xDEAD_BEEF).unwrap();
        let mut composite = CompositeKey::new();
        composite.add_password(PASSWORD);
        let result = read(&mut std::io::Cursor::new(file), &composite);
        assert!(matches!(result, Err(Error::NotAKdbx)));
    }
}
