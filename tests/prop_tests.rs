use proptest::prelude::*;

use pow_miner::{
    CpuExecutor, MinerConfig, MinerError, MinerExecutor, MiningRequest, block_hash, mine,
    verify,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64};

fn leading_zeros(hash: &str) -> usize {
    hash.chars().take_while(|c| *c == '0').count()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Zero difficulty always stops at nonce 0.
    #[test]
    fn zero_difficulty_returns_nonce_zero(data in prop::collection::vec(any::<u8>(), 0..64)) {
        let result = mine(&data, 0).unwrap();
        prop_assert_eq!(result.nonce, 0);
        prop_assert_eq!(result.hash, block_hash(&data, 0));
    }

    /// Mined hashes meet the target and can be recomputed from (data, nonce).
    #[test]
    fn mined_hash_is_reproducible(
        data in prop::collection::vec(any::<u8>(), 0..64),
        difficulty in 0usize..=2,
    ) {
        let result = mine(&data, difficulty).unwrap();
        prop_assert!(leading_zeros(&result.hash) >= difficulty);
        prop_assert_eq!(&result.hash, &block_hash(&data, result.nonce));
        prop_assert!(verify(&data, result.nonce, difficulty).unwrap());
    }

    /// No smaller nonce satisfies the difficulty.
    #[test]
    fn mined_nonce_is_minimal(
        data in "[a-zA-Z0-9 ]{0,32}",
        difficulty in 1usize..=2,
    ) {
        let result = mine(data.as_bytes(), difficulty).unwrap();
        for nonce in 0..result.nonce {
            prop_assert!(!verify(data.as_bytes(), nonce, difficulty).unwrap());
        }
    }

    /// The parallel executor finds exactly the nonce the serial search finds.
    #[test]
    fn parallel_agrees_with_serial(
        data in prop::collection::vec(any::<u8>(), 1..32),
        difficulty in 1usize..=3,
        threads in 2usize..=4,
        chunk_size in 1u64..512,
    ) {
        let request = MiningRequest::new(data.clone(), difficulty);
        let config = MinerConfig::new(threads).with_chunk_size(chunk_size);
        let parallel = CpuExecutor::new()
            .mine(
                &request,
                &config,
                Arc::new(AtomicU64::new(0)),
                Arc::new(AtomicBool::new(false)),
            )
            .unwrap();
        prop_assert_eq!(parallel, mine(&data, difficulty).unwrap());
    }

    /// Difficulties past the digest length fail before searching.
    #[test]
    fn oversized_difficulty_rejected(
        data in prop::collection::vec(any::<u8>(), 0..32),
        difficulty in 65usize..10_000,
    ) {
        let rejected = matches!(
            mine(&data, difficulty),
            Err(MinerError::InvalidDifficulty { difficulty: d, max: 64 }) if d == difficulty
        );
        prop_assert!(rejected);
    }
}
