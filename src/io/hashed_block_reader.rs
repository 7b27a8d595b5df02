// Copyright (c) 2016-2017 Martijn Rijkeboer <mrr@sru-systems.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The hashed-block stream reader (C5): verifies and strips the
//! `index(u32) || sha256(u8x32) || length(u32) || data` framing that wraps
//! the decrypted main payload, exposing the concatenated block data as a
//! plain `Read`.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{self, Read};
use crate::common::FINAL_BLOCK_HASH;
use crate::crypto::sha256;
use crate::types::error::Error;

/// Reads hashed blocks from `inner`, verifying each block's SHA-256 hash and
/// index before handing its data back through `Read`.
pub struct HashedBlockReader<R> {
    inner: R,
    next_index: u32,
    block: Vec<u8>,
    pos: usize,
    done: bool,
}

impl<R: Read> HashedBlockReader<R> {
    /// Create a new hashed-block reader wrapping `inner`.
    pub fn new(inner: R) -> HashedBlockReader<R> {
        HashedBlockReader {
            inner,
            next_index: 0,
            block: Vec::new(),
            pos: 0,
            done: false,
        }
    }

    fn read_block(&mut self) -> io::Result<()> {
        let index = self.inner.read_u32::<LittleEndian>()?;
        if index != self.next_index {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                Error::BadBlockIndex {
                    expected: self.next_index,
                    actual: index,
                },
            ));
        }

        let mut hash = [0u8; 32];
        self.inner.read_exact(&mut hash)?;

        let length = self.inner.read_u32::<LittleEndian>()? as usize;

        if length == 0 {
            if hash != FINAL_BLOCK_HASH {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    Error::BadFinalHash,
                ));
            }
            self.done = true;
            self.block.clear();
            self.pos = 0;
            return Ok(());
        }

        let mut data = vec![0u8; length];
        self.inner.read_exact(&mut data)?;

        let actual_hash = sha256::hash(&[&data]);
        if actual_hash != hash {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                Error::HashMismatch(index),
            ));
        }

        self.next_index += 1;
        self.block = data;
        self.pos = 0;
        Ok(())
    }
}

impl<R: Read> Read for HashedBlockReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        while self.pos >= self.block.len() && !self.done {
            self.read_block()?;
        }
        if self.done && self.pos >= self.block.len() {
            return Ok(0);
        }
        let available = &self.block[self.pos..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.pos += n;
        Ok(n)
    }
}
