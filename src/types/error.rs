// Copyright (c) 2016-2017 Martijn Rijkeboer <mrr@sru-systems.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use thiserror::Error;

/// Error type for kdbx decryption and parsing failures.
#[derive(Error, Debug)]
pub enum Error {
    /// The first signature doesn't match a KeePass database at all.
    #[error("not a kdbx file: bad signature")]
    NotAKdbx,

    /// The second signature identifies a kdbx1 (.kdb) database.
    #[error("kdbx1 (.kdb) databases are not supported")]
    Kdbx1Unsupported,

    /// The masked file version is outside the supported 2.0..=3.1 range.
    #[error("unsupported kdbx version: {0:#010x}")]
    UnsupportedVersion(u32),

    /// A header field declared more data than the source actually had.
    #[error("truncated header while reading field {0}")]
    TruncatedHeader(u8),

    /// A required header field was never seen before EndOfHeader.
    #[error("missing required header field {0}")]
    MissingHeader(u8),

    /// The CipherID header did not name the AES cipher.
    #[error("unsupported cipher")]
    UnsupportedCipher,

    /// The CompressionFlags header named an algorithm other than None/GZip.
    #[error("unsupported compression algorithm: {0}")]
    UnsupportedCompression(u32),

    /// The InnerRandomStreamID header named a cipher other than Salsa20.
    #[error("unsupported inner random stream cipher: {0}")]
    UnsupportedRandomStream(u32),

    /// A transform seed was not exactly 32 bytes.
    #[error("invalid transform seed length")]
    InvalidSeed,

    /// Transform rounds was zero.
    #[error("invalid transform rounds: must be greater than zero")]
    InvalidRounds,

    /// The key file could not be parsed as any recognized encoding.
    #[error("invalid key file")]
    InvalidKeyFile,

    /// Cleartext didn't start with the expected StreamStartBytes.
    #[error("wrong key or corrupt database")]
    WrongKeyOrCorrupt,

    /// A hashed block's declared index didn't match the expected sequence.
    #[error("bad block index: expected {expected}, got {actual}")]
    BadBlockIndex {
        /// Index the reader expected next.
        expected: u32,
        /// Index actually read from the stream.
        actual: u32,
    },

    /// A hashed block's payload hash didn't match its declared SHA-256.
    #[error("hash mismatch in block {0}")]
    HashMismatch(u32),

    /// The zero-length final block carried a non-zero hash.
    #[error("bad final block hash")]
    BadFinalHash,

    /// Gzip inflation of the cleartext body failed.
    #[error("decompression failed: {0}")]
    DecompressionFailed(String),

    /// The inner XML was not well-formed or missing a required element.
    #[error("malformed xml: {0}")]
    MalformedXml(String),

    /// A base64 field failed to decode.
    #[error("base64 decode error: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    /// SHA-256(storedHeaderBytes) didn't match the XML-declared HeaderHash.
    #[error("header hash mismatch")]
    HeaderHashMismatch,

    /// A Salsa20 offset fell outside any byte range this entry set could produce.
    #[error("protected-value offset out of range")]
    OffsetOutOfRange,

    /// The caller's cancellation flag was observed set during a key transform.
    #[error("operation cancelled")]
    Cancelled,

    /// Propagated I/O error from the underlying byte source.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<xml::reader::Error> for Error {
    fn from(err: xml::reader::Error) -> Error {
        Error::MalformedXml(err.to_string())
    }
}

/// Result type used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;
