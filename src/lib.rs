// Core mining library
pub mod common;
pub mod digest;
pub mod error;
pub mod mining;
pub mod progress;
pub mod target;
pub mod types;

// Re-export for convenience
pub use digest::{DIGEST_HEX_LEN, block_digest, block_hash, leading_zero_digits};
pub use error::MinerError;
pub use mining::{
    CpuExecutor, MinerConfig, MinerExecutor, SerialExecutor, mine, mine_with, verify,
};
pub use target::DifficultyTarget;
pub use types::{MiningRequest, MiningResult};
