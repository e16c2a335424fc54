//! Single-threaded nonce search.
//!
//! Nonces are tried in increasing order from the start nonce, so the first
//! match is the smallest satisfying nonce.

use crate::digest::{NonceBuffer, block_digest};
use crate::error::MinerError;
use crate::mining::config::MinerConfig;
use crate::target::DifficultyTarget;
use crate::types::{MiningRequest, MiningResult};

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, warn};

/// Candidates between cancellation/deadline checks and progress reports
const CHECK_INTERVAL: u64 = 4096;

/// Resolved limits for one search
#[derive(Debug, Clone, Copy)]
pub(crate) struct SearchBounds {
    pub start: u64,
    /// Inclusive upper bound
    pub last: u64,
    /// `last` comes from an attempt cap rather than the end of the counter
    pub capped: bool,
    pub deadline: Option<Instant>,
}

impl SearchBounds {
    pub fn from_config(config: &MinerConfig) -> Self {
        let (last, capped) = config.last_nonce();
        Self {
            start: config.start_nonce,
            last,
            capped,
            // A deadline past what Instant can represent means no deadline
            deadline: config.timeout.and_then(|t| Instant::now().checked_add(t)),
        }
    }

    pub fn deadline_passed(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Error for a range that was fully scanned without a match
    pub fn exhausted(&self, attempts: u64) -> MinerError {
        if self.capped {
            MinerError::SearchTimedOut { attempts }
        } else {
            MinerError::SearchExhausted {
                start_nonce: self.start,
            }
        }
    }

    pub fn result(&self, nonce: u64, digest: &[u8; 32]) -> MiningResult {
        MiningResult {
            nonce,
            hash: hex::encode(digest),
            attempts: (nonce - self.start).saturating_add(1),
        }
    }
}

/// Mine `data` from nonce 0 until the hash has `difficulty` leading zeros
pub fn mine(data: &[u8], difficulty: usize) -> Result<MiningResult, MinerError> {
    mine_with(&MiningRequest::new(data, difficulty), &MinerConfig::new(1))
}

/// Single-threaded search honouring the config's start nonce, cap and timeout
pub fn mine_with(request: &MiningRequest, config: &MinerConfig) -> Result<MiningResult, MinerError> {
    let progress = AtomicU64::new(0);
    let cancel = AtomicBool::new(false);
    search_serial(request, config, &progress, &cancel)
}

/// Recompute the hash for `(data, nonce)` and test it against the difficulty
pub fn verify(data: &[u8], nonce: u64, difficulty: usize) -> Result<bool, MinerError> {
    let target = DifficultyTarget::new(difficulty)?;
    Ok(target.matches(&block_digest(data, nonce)))
}

pub(crate) fn search_serial(
    request: &MiningRequest,
    config: &MinerConfig,
    total_attempts: &AtomicU64,
    cancel: &AtomicBool,
) -> Result<MiningResult, MinerError> {
    let target = DifficultyTarget::new(request.difficulty)?;
    config.validate()?;
    let bounds = SearchBounds::from_config(config);

    debug!(
        difficulty = target.difficulty(),
        start = bounds.start,
        last = bounds.last,
        "starting serial search"
    );

    let mut buf = NonceBuffer::new(&request.data);
    let mut nonce = bounds.start;
    let mut attempts = 0u64;
    let mut reported = 0u64;

    loop {
        let digest = buf.digest(nonce);
        attempts += 1;

        if target.matches(&digest) {
            total_attempts.fetch_add(attempts - reported, Ordering::Relaxed);
            return Ok(bounds.result(nonce, &digest));
        }

        if nonce == bounds.last {
            total_attempts.fetch_add(attempts - reported, Ordering::Relaxed);
            return Err(bounds.exhausted(attempts));
        }

        if attempts % CHECK_INTERVAL == 0 {
            total_attempts.fetch_add(attempts - reported, Ordering::Relaxed);
            reported = attempts;
            if cancel.load(Ordering::Relaxed) {
                warn!(attempts, "serial search cancelled");
                return Err(MinerError::Cancelled);
            }
            if bounds.deadline_passed() {
                warn!(attempts, "serial search hit its deadline");
                return Err(MinerError::SearchTimedOut { attempts });
            }
        }

        nonce += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::block_hash;
    use std::time::Duration;

    #[test]
    fn test_zero_difficulty_returns_nonce_zero() {
        let result = mine(b"anything", 0).unwrap();
        assert_eq!(result.nonce, 0);
        assert_eq!(result.hash, block_hash(b"anything", 0));
        assert_eq!(result.attempts, 1);
    }

    #[test]
    fn test_block_data_fixture() {
        let result = mine(b"Block Data", 4).unwrap();
        assert_eq!(result.nonce, 20913);
        assert_eq!(
            result.hash,
            "000080549a5d4f822f78d52a39882ed90a8821e61d00c9d9625998ddd793eec6"
        );
        assert_eq!(result.attempts, 20914);
    }

    #[test]
    fn test_result_is_minimal() {
        let result = mine(b"Block Data", 2).unwrap();
        assert_eq!(result.nonce, 350);
        for nonce in 0..result.nonce {
            assert!(!verify(b"Block Data", nonce, 2).unwrap());
        }
    }

    #[test]
    fn test_invalid_difficulty() {
        assert!(matches!(
            mine(b"Block Data", 65),
            Err(MinerError::InvalidDifficulty { .. })
        ));
        assert!(verify(b"Block Data", 0, 100).is_err());
    }

    #[test]
    fn test_start_nonce_skips_earlier_matches() {
        let request = MiningRequest::new("Block Data", 1);
        let config = MinerConfig::new(1).with_start_nonce(4);
        let result = mine_with(&request, &config).unwrap();
        assert!(result.nonce >= 4);
        assert!(verify(b"Block Data", result.nonce, 1).unwrap());
        assert_eq!(result.attempts, result.nonce - 4 + 1);
    }

    #[test]
    fn test_attempt_cap_times_out() {
        // First 4-zero nonce is 20913
        let request = MiningRequest::new("Block Data", 4);
        let config = MinerConfig::new(1).with_max_attempts(1000);
        assert!(matches!(
            mine_with(&request, &config),
            Err(MinerError::SearchTimedOut { attempts: 1000 })
        ));
    }

    #[test]
    fn test_deadline_times_out() {
        let request = MiningRequest::new("Block Data", 64);
        let config = MinerConfig::new(1).with_timeout(Duration::from_millis(20));
        assert!(matches!(
            mine_with(&request, &config),
            Err(MinerError::SearchTimedOut { .. })
        ));
    }

    #[test]
    fn test_unrepresentable_timeout_is_no_deadline() {
        let request = MiningRequest::new("Block Data", 1);
        let config = MinerConfig::new(1).with_timeout(Duration::from_secs(u64::MAX));
        let result = mine_with(&request, &config).unwrap();
        assert_eq!(result.nonce, 3);
    }

    #[test]
    fn test_counter_overflow_exhausts() {
        let request = MiningRequest::new("Block Data", 64);
        let config = MinerConfig::new(1).with_start_nonce(u64::MAX - 50);
        assert!(matches!(
            mine_with(&request, &config),
            Err(MinerError::SearchExhausted {
                start_nonce
            }) if start_nonce == u64::MAX - 50
        ));
    }

    #[test]
    fn test_cancelled() {
        let request = MiningRequest::new("Block Data", 64);
        let progress = AtomicU64::new(0);
        let cancel = AtomicBool::new(true);
        let result = search_serial(&request, &MinerConfig::new(1), &progress, &cancel);
        assert!(matches!(result, Err(MinerError::Cancelled)));
        assert_eq!(progress.load(Ordering::Relaxed), CHECK_INTERVAL);
    }

    #[test]
    fn test_idempotent() {
        let a = mine(b"Block Data", 3).unwrap();
        let b = mine(b"Block Data", 3).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.nonce, 19247);
    }
}
