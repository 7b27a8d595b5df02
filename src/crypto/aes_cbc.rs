// Copyright (c) 2016-2017 Martijn Rijkeboer <mrr@sru-systems.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The AES-CBC stream reader (C4): a block-boundary-respecting decrypting
//! `Read` adapter over a seekable byte source, grounded in the teacher's
//! `LogReader<R>` (reader-wrapping-reader) idiom.

use aes::Aes256;
use cbc::cipher::{BlockDecryptMut, KeyIvInit};
use std::io::{self, Read};

type Decryptor = cbc::Decryptor<Aes256>;

const BLOCK_SIZE: usize = 16;

/// Decrypting `Read` adapter. Buffers exactly one ciphertext block at a
/// time so the inner reader may satisfy `read()` with short reads (the
/// *bufferFilling* state); a block is only decrypted once it is full.
/// PKCS#7 padding on the very last block is trimmed once EOF on the inner
/// reader is confirmed.
pub struct AesCbcReader<R> {
    inner: R,
    decryptor: Option<Decryptor>,
    cipher_buf: [u8; BLOCK_SIZE],
    cipher_filled: usize,
    plain_buf: Vec<u8>,
    plain_pos: usize,
    eof: bool,
}

impl<R: Read> AesCbcReader<R> {
    /// Create a new reader decrypting `inner`'s bytes under `key`/`iv`.
    pub fn new(inner: R, key: &[u8; 32], iv: &[u8; 16]) -> AesCbcReader<R> {
        let decryptor = Decryptor::new(key.into(), iv.into());
        AesCbcReader {
            inner,
            decryptor: Some(decryptor),
            cipher_buf: [0; BLOCK_SIZE],
            cipher_filled: 0,
            plain_buf: Vec::new(),
            plain_pos: 0,
            eof: false,
        }
    }

    fn fill_plain_buf(&mut self) -> io::Result<()> {
        loop {
            if self.plain_pos < self.plain_buf.len() || self.eof {
                return Ok(());
            }

            // Top up the one-block cipher buffer, tolerating short reads.
            while self.cipher_filled < BLOCK_SIZE {
                let n = self
                    .inner
                    .read(&mut self.cipher_buf[self.cipher_filled..])?;
                if n == 0 {
                    break;
                }
                self.cipher_filled += n;
            }

            if self.cipher_filled == 0 {
                self.eof = true;
                return Ok(());
            }

            if self.cipher_filled < BLOCK_SIZE {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "truncated aes-cbc ciphertext",
                ));
            }

            // Peek ahead one byte to tell whether this is the final block,
            // since PKCS#7 unpadding must only run on the last block.
            let mut probe = [0u8; 1];
            let probed = self.inner.read(&mut probe)?;

            let decryptor = self
                .decryptor
                .as_mut()
                .expect("decrypt called after final block");
            let mut block = self.cipher_buf;
            let mut generic = block.into();
            decryptor.decrypt_block_mut(&mut generic);
            block = generic.into();

            if probed == 0 {
                let pad = *block.last().unwrap_or(&0) as usize;
                if pad == 0 || pad > BLOCK_SIZE {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        "invalid pkcs7 padding",
                    ));
                }
                self.plain_buf = block[..BLOCK_SIZE - pad].to_vec();
                self.decryptor = None;
            } else {
                self.plain_buf = block.to_vec();
                self.cipher_buf[0] = probe[0];
                self.cipher_filled = 1;
            }
            self.plain_pos = 0;
        }
    }
}

impl<R: Read> Read for AesCbcReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        self.fill_plain_buf()?;
        let available = &self.plain_buf[self.plain_pos..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.plain_pos += n;
        Ok(n)
    }
}
