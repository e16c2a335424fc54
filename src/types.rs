use serde::{Deserialize, Serialize};

/// Input to a single search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiningRequest {
    pub data: Vec<u8>,
    pub difficulty: usize,
}

impl MiningRequest {
    pub fn new(data: impl Into<Vec<u8>>, difficulty: usize) -> Self {
        Self {
            data: data.into(),
            difficulty,
        }
    }
}

/// Result when a nonce meeting the difficulty is found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiningResult {
    pub nonce: u64,
    /// Lowercase hex SHA-256 of `data || decimal(nonce)`
    pub hash: String,
    /// Candidates examined, counted from the start nonce
    pub attempts: u64,
}
