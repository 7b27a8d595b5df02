// Copyright (c) 2016-2017 Martijn Rijkeboer <mrr@sru-systems.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Module containing constants for the kdbx v2/v3 file format.

/// First database signature, identifying the file as a KeePass database.
pub const SIGNATURE1: u32 = 0x9AA2_D903;

/// Second signature for kdbx1 (.kdb) databases. Rejected with `Kdbx1Unsupported`.
pub const SIGNATURE2_KDB1: u32 = 0xB54B_FB65;

/// Second signature for kdbx2/3 databases.
pub const SIGNATURE2_KDBX: u32 = 0xB54B_FB67;

/// Mask applied to the version field before range-checking it.
pub const VERSION_CRITICAL_MASK: u32 = 0xFFFF_0000;

/// Lowest accepted (masked) version, 2.0.
pub const VERSION_MIN: u32 = 0x0002_0000;

/// Highest accepted (masked) version, 3.0. Files with a masked version of
/// 3.1 and above require a non-empty header hash (see `HEADER_HASH_FLOOR`).
pub const VERSION_MAX: u32 = 0x0003_0000;

/// Masked version at and above which a non-empty `HeaderHash` is mandatory.
pub const HEADER_HASH_FLOOR: u32 = 0x0003_0001;

/// The 16-byte identifier of the AES cipher; the only cipher this crate accepts.
pub const AES_CIPHER_ID: [u8; 16] = [
    0x31, 0xc1, 0xf2, 0xe6, 0xbf, 0x71, 0x43, 0x50, 0xbe, 0x58, 0x05, 0x21, 0x6a, 0xfc, 0x5a, 0xff,
];

/// Inner-stream cipher identifier for Salsa20; the only one this crate accepts.
pub const INNER_STREAM_SALSA20: u32 = 2;

/// Fixed 8-byte Salsa20 IV used for the inner protected-value keystream.
pub const SALSA20_IV: [u8; 8] = [0xe8, 0x30, 0x09, 0x4b, 0x97, 0x20, 0x5d, 0x2a];

/// Hash stored in the final (zero-length) hashed block.
pub const FINAL_BLOCK_HASH: [u8; 32] = [0; 32];

/// Default number of key-transform rounds used when a writer doesn't specify one.
pub const TRANSFORM_ROUNDS_DEFAULT: u64 = 100_000;

/// Chunk size used when draining the hashed-block reader into a cleartext buffer.
pub const DRAIN_CHUNK_SIZE: usize = 64_500;

// TLV header field identifiers.
pub const HID_END_OF_HEADER: u8 = 0;
pub const HID_COMMENT: u8 = 1;
pub const HID_CIPHER_ID: u8 = 2;
pub const HID_COMPRESSION_FLAGS: u8 = 3;
pub const HID_MASTER_SEED: u8 = 4;
pub const HID_TRANSFORM_SEED: u8 = 5;
pub const HID_TRANSFORM_ROUNDS: u8 = 6;
pub const HID_ENCRYPTION_IV: u8 = 7;
pub const HID_PROTECTED_STREAM_KEY: u8 = 8;
pub const HID_STREAM_START_BYTES: u8 = 9;
pub const HID_INNER_RANDOM_STREAM_ID: u8 = 10;

// Fixed sizes for the TLV fields that carry one (in bytes).
pub const SIZE_CIPHER_ID: u16 = 16;
pub const SIZE_COMPRESSION_FLAGS: u16 = 4;
pub const SIZE_MASTER_SEED: u16 = 32;
pub const SIZE_TRANSFORM_SEED: u16 = 32;
pub const SIZE_TRANSFORM_ROUNDS: u16 = 8;
pub const SIZE_ENCRYPTION_IV: u16 = 16;
pub const SIZE_PROTECTED_STREAM_KEY: u16 = 32;
pub const SIZE_STREAM_START_BYTES: u16 = 32;
pub const SIZE_INNER_RANDOM_STREAM_ID: u16 = 4;

// XML element and attribute names.
pub const TAG_KEEPASS_FILE: &str = "KeePassFile";
pub const TAG_META: &str = "Meta";
pub const TAG_HEADER_HASH: &str = "HeaderHash";
pub const TAG_ROOT: &str = "Root";
pub const TAG_GROUP: &str = "Group";
pub const TAG_NAME: &str = "Name";
pub const TAG_UUID: &str = "UUID";
pub const TAG_ENTRY: &str = "Entry";
pub const TAG_STRING: &str = "String";
pub const TAG_KEY: &str = "Key";
pub const TAG_VALUE: &str = "Value";
pub const TAG_HISTORY: &str = "History";
pub const ATTR_PROTECTED: &str = "Protected";

// Known entry string keys.
pub const STRING_KEY_TITLE: &str = "Title";
pub const STRING_KEY_USERNAME: &str = "UserName";
pub const STRING_KEY_PASSWORD: &str = "Password";
pub const STRING_KEY_URL: &str = "URL";
pub const STRING_KEY_NOTES: &str = "Notes";

// Key-file constants.
pub const KEY_FILE_BINARY_LEN: usize = 32;
pub const KEY_FILE_HEX_LEN: usize = 64;
pub const KEY_FILE_XML_VERSION: &str = "1.00";
pub const KF_TAG_KEY_FILE: &str = "KeyFile";
pub const KF_TAG_META: &str = "Meta";
pub const KF_TAG_VERSION: &str = "Version";
pub const KF_TAG_KEY: &str = "Key";
pub const KF_TAG_DATA: &str = "Data";

/// Number of AES-ECB rounds between cooperative cancellation checks.
pub const CANCEL_CHECK_INTERVAL: u64 = 4096;
