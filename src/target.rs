use crate::digest::{DIGEST_HEX_LEN, DIGEST_LEN};
use crate::error::MinerError;

/// Leading-zero target for block digests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifficultyTarget {
    difficulty: usize,
}

impl DifficultyTarget {
    /// Create a target requiring `difficulty` leading zero hex chars.
    /// Anything beyond the digest length can never match and is rejected.
    pub fn new(difficulty: usize) -> Result<Self, MinerError> {
        if difficulty > DIGEST_HEX_LEN {
            return Err(MinerError::InvalidDifficulty {
                difficulty,
                max: DIGEST_HEX_LEN,
            });
        }
        Ok(Self { difficulty })
    }

    /// Check if the given digest meets the target
    #[inline(always)]
    pub fn matches(&self, digest: &[u8; DIGEST_LEN]) -> bool {
        // Number of full zero bytes required
        let full_bytes = self.difficulty / 2;

        if digest[..full_bytes].iter().any(|b| *b != 0) {
            return false;
        }

        // If odd number of hex chars, check the high nibble of the next byte
        if self.difficulty % 2 == 1 {
            return digest[full_bytes] >> 4 == 0;
        }

        true
    }

    /// Check a hex-encoded digest
    pub fn matches_hex(&self, hash: &str) -> bool {
        hash.len() >= self.difficulty && hash.bytes().take(self.difficulty).all(|c| c == b'0')
    }

    /// Get the difficulty (number of leading zero hex chars)
    pub fn difficulty(&self) -> usize {
        self.difficulty
    }

    /// Estimate attempts needed (average case)
    pub fn estimated_attempts(&self) -> u64 {
        // Each hex char = 4 bits = 16 possibilities
        16u64.saturating_pow(self.difficulty as u32)
    }
}
