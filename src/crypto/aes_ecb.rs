// Copyright (c) 2016-2017 Martijn Rijkeboer <mrr@sru-systems.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The AES-ECB round engine (C1): repeated single-block encryption of a
//! 32-byte buffer under a 32-byte seed, used by the composite-key transform.

use aes::cipher::{BlockEncrypt, KeyInit};
use aes::Aes256;
use std::sync::atomic::{AtomicBool, Ordering};
use crate::common::CANCEL_CHECK_INTERVAL;
use crate::types::error::{Error, Result};

/// Encrypt the two 16-byte halves of `key` in place, `rounds` times each,
/// under AES-256-ECB keyed by `seed`. The halves are independent state
/// chains and are dispatched to two OS threads so the transform takes
/// roughly half the wall time on a multi-core host.
pub fn transform_rounds(key: &[u8; 32], seed: &[u8; 32], rounds: u64) -> Result<[u8; 32]> {
    transform_rounds_cancellable(key, seed, rounds, None)
}

/// As `transform_rounds`, but checks `cancel` every [`CANCEL_CHECK_INTERVAL`]
/// rounds and bails out with `Error::Cancelled` if it is set.
pub fn transform_rounds_cancellable(
    key: &[u8; 32],
    seed: &[u8; 32],
    rounds: u64,
    cancel: Option<&AtomicBool>,
) -> Result<[u8; 32]> {
    let mut left = [0u8; 16];
    let mut right = [0u8; 16];
    left.copy_from_slice(&key[0..16]);
    right.copy_from_slice(&key[16..32]);

    let (left_out, right_out) = std::thread::scope(|scope| {
        let left_handle = scope.spawn(|| encrypt_chain(left, seed, rounds, cancel));
        let right_handle = scope.spawn(|| encrypt_chain(right, seed, rounds, cancel));
        (
            left_handle.join().expect("aes-ecb left chain panicked"),
            right_handle.join().expect("aes-ecb right chain panicked"),
        )
    });

    let left_out = left_out?;
    let right_out = right_out?;

    let mut output = [0u8; 32];
    output[0..16].copy_from_slice(&left_out);
    output[16..32].copy_from_slice(&right_out);
    Ok(output)
}

fn encrypt_chain(
    mut block: [u8; 16],
    seed: &[u8; 32],
    rounds: u64,
    cancel: Option<&AtomicBool>,
) -> Result<[u8; 16]> {
    let cipher = Aes256::new_from_slice(seed).map_err(|_| Error::InvalidSeed)?;
    for round in 0..rounds {
        if let Some(flag) = cancel {
            if round % CANCEL_CHECK_INTERVAL == 0 && flag.load(Ordering::Relaxed) {
                return Err(Error::Cancelled);
            }
        }
        let mut generic = block.into();
        cipher.encrypt_block(&mut generic);
        block = generic.into();
    }
    Ok(block)
}
