use thiserror::Error;

#[derive(Debug, Error)]
pub enum MinerError {
    #[error("difficulty {difficulty} exceeds the digest length of {max} hex chars")]
    InvalidDifficulty { difficulty: usize, max: usize },

    #[error("nonce space exhausted from {start_nonce} without a match")]
    SearchExhausted { start_nonce: u64 },

    #[error("search stopped after {attempts} attempts without a match")]
    SearchTimedOut { attempts: u64 },

    #[error("mining cancelled")]
    Cancelled,

    #[error("invalid miner config: {0}")]
    InvalidConfig(String),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
