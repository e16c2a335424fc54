//! Mining configuration

use crate::error::MinerError;
use std::time::Duration;

/// Nonces a worker claims at a time
pub const DEFAULT_CHUNK_SIZE: u64 = 10_000;

/// Configuration for mining operations
#[derive(Clone, Debug)]
pub struct MinerConfig {
    /// Number of CPU threads (0 = auto-detect)
    pub threads: usize,
    /// Starting nonce value
    pub start_nonce: u64,
    /// Nonces claimed per worker batch
    pub chunk_size: u64,
    /// Give up after this many candidates
    pub max_attempts: Option<u64>,
    /// Give up after this much wall-clock time
    pub timeout: Option<Duration>,
}

impl MinerConfig {
    pub fn new(threads: usize) -> Self {
        Self {
            threads: if threads == 0 { num_cpus::get() } else { threads },
            start_nonce: 0,
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_attempts: None,
            timeout: None,
        }
    }

    pub fn with_start_nonce(mut self, nonce: u64) -> Self {
        self.start_nonce = nonce;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u64) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn validate(&self) -> Result<(), MinerError> {
        if self.chunk_size == 0 {
            return Err(MinerError::InvalidConfig("chunk_size must be > 0".into()));
        }
        if self.max_attempts == Some(0) {
            return Err(MinerError::InvalidConfig("max_attempts must be > 0".into()));
        }
        Ok(())
    }

    /// Last nonce (inclusive) the search may examine, and whether that
    /// bound comes from a caller cap rather than the end of the u64 space
    pub fn last_nonce(&self) -> (u64, bool) {
        match self.max_attempts {
            Some(cap) => match self.start_nonce.checked_add(cap.saturating_sub(1)) {
                Some(last) => (last, true),
                None => (u64::MAX, false),
            },
            None => (u64::MAX, false),
        }
    }
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_threads() {
        let config = MinerConfig::new(0);
        assert!(config.threads >= 1);
        assert_eq!(MinerConfig::new(3).threads, 3);
    }

    #[test]
    fn test_zero_chunk_rejected() {
        let config = MinerConfig::new(1).with_chunk_size(0);
        assert!(matches!(config.validate(), Err(MinerError::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_cap_rejected() {
        let config = MinerConfig::new(1).with_max_attempts(0);
        assert!(matches!(config.validate(), Err(MinerError::InvalidConfig(_))));
    }

    #[test]
    fn test_last_nonce() {
        assert_eq!(MinerConfig::new(1).last_nonce(), (u64::MAX, false));

        let capped = MinerConfig::new(1).with_start_nonce(10).with_max_attempts(5);
        assert_eq!(capped.last_nonce(), (14, true));

        // Cap reaching past the counter is plain exhaustion
        let wide = MinerConfig::new(1)
            .with_start_nonce(u64::MAX - 1)
            .with_max_attempts(10);
        assert_eq!(wide.last_nonce(), (u64::MAX, false));
    }
}
