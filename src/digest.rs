//! Candidate encoding and the per-nonce digest step.
//!
//! A candidate is `data || decimal(nonce)`: the nonce is appended as base-10
//! ASCII with no padding, sign or separator. Anyone holding `(data, nonce)`
//! can therefore recompute the hash with any SHA-256 tool.

use sha2::{Digest, Sha256};
use std::io::Write;

/// Raw digest length in bytes
pub const DIGEST_LEN: usize = 32;
/// Digest length in hex characters (the maximum difficulty)
pub const DIGEST_HEX_LEN: usize = DIGEST_LEN * 2;

/// Longest decimal rendering of a u64
const MAX_NONCE_DIGITS: usize = 20;

/// SHA-256 of `data` followed by the decimal nonce
pub fn block_digest(data: &[u8], nonce: u64) -> [u8; DIGEST_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.update(nonce.to_string().as_bytes());
    hasher.finalize().into()
}

/// Lowercase hex form of [`block_digest`]
pub fn block_hash(data: &[u8], nonce: u64) -> String {
    hex::encode(block_digest(data, nonce))
}

/// Count leading `'0'` characters of the digest's hex representation
pub fn leading_zero_digits(digest: &[u8; DIGEST_LEN]) -> usize {
    let mut count = 0;
    for byte in digest {
        if *byte == 0 {
            count += 2;
            continue;
        }
        if byte >> 4 == 0 {
            count += 1;
        }
        break;
    }
    count
}

/// Reusable candidate buffer for hot loops.
///
/// The data prefix is copied once; each [`NonceBuffer::digest`] call only
/// rewrites the nonce suffix, so no allocation happens per candidate.
pub struct NonceBuffer {
    bytes: Vec<u8>,
    data_len: usize,
}

impl NonceBuffer {
    pub fn new(data: &[u8]) -> Self {
        let mut bytes = Vec::with_capacity(data.len() + MAX_NONCE_DIGITS);
        bytes.extend_from_slice(data);
        Self {
            bytes,
            data_len: data.len(),
        }
    }

    #[inline(always)]
    pub fn digest(&mut self, nonce: u64) -> [u8; DIGEST_LEN] {
        self.bytes.truncate(self.data_len);
        // Writing into a Vec cannot fail
        let _ = write!(self.bytes, "{}", nonce);
        Sha256::digest(&self.bytes).into()
    }
}
