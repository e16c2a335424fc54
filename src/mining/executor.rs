//! Mining executors - Backend implementations for mining

use crate::digest::{DIGEST_LEN, NonceBuffer};
use crate::error::MinerError;
use crate::mining::config::MinerConfig;
use crate::mining::search::{SearchBounds, search_serial};
use crate::target::DifficultyTarget;
use crate::types::{MiningRequest, MiningResult};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::{debug, info, warn};

/// Trait for mining execution backends
pub trait MinerExecutor {
    /// Search for the smallest nonce meeting the request's difficulty.
    ///
    /// `total_attempts` is bumped as candidates are scanned so a caller can
    /// poll it for progress. Setting `cancel` aborts with `Cancelled`.
    fn mine(
        &self,
        request: &MiningRequest,
        config: &MinerConfig,
        total_attempts: Arc<AtomicU64>,
        cancel: Arc<AtomicBool>,
    ) -> Result<MiningResult, MinerError>;
}

/// Single-threaded executor, ignores `config.threads`
pub struct SerialExecutor;

impl MinerExecutor for SerialExecutor {
    fn mine(
        &self,
        request: &MiningRequest,
        config: &MinerConfig,
        total_attempts: Arc<AtomicU64>,
        cancel: Arc<AtomicBool>,
    ) -> Result<MiningResult, MinerError> {
        search_serial(request, config, &total_attempts, &cancel)
    }
}

/// CPU-based mining executor using a rayon pool
pub struct CpuExecutor;

impl CpuExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CpuExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared state for one parallel search
struct Search<'a> {
    data: &'a [u8],
    target: DifficultyTarget,
    bounds: SearchBounds,
    chunk_size: u64,
    /// Index of the next unclaimed chunk
    next_chunk: AtomicU64,
    /// Smallest matching nonce seen so far (u64::MAX until found)
    best: AtomicU64,
    /// Candidates scanned across all workers
    scanned: AtomicU64,
    timed_out: AtomicBool,
    total_attempts: &'a AtomicU64,
    cancel: &'a AtomicBool,
}

impl Search<'_> {
    /// Claim the next chunk as an inclusive nonce range.
    ///
    /// Chunks are handed out in increasing order, so once a chunk starts past
    /// `best` every later one does too.
    fn claim(&self) -> Option<(u64, u64)> {
        if self.bounds.deadline_passed() {
            self.timed_out.store(true, Ordering::Relaxed);
            return None;
        }

        let index = self.next_chunk.fetch_add(1, Ordering::Relaxed);
        let lo = self
            .bounds
            .start
            .checked_add(index.checked_mul(self.chunk_size)?)?;
        if lo > self.bounds.last || lo > self.best.load(Ordering::Relaxed) {
            return None;
        }
        let hi = lo.saturating_add(self.chunk_size - 1).min(self.bounds.last);
        Some((lo, hi))
    }

    /// Worker loop; returns this worker's smallest match, if any
    fn run_worker(&self, worker: usize) -> Option<(u64, [u8; DIGEST_LEN])> {
        // Thread-local buffer - only allocated ONCE per thread
        let mut buf = NonceBuffer::new(self.data);
        let mut found = None;
        let mut chunks = 0u64;

        'claim: while let Some((lo, hi)) = self.claim() {
            chunks += 1;
            let mut scanned = 0u64;

            for nonce in lo..=hi {
                if self.cancel.load(Ordering::Relaxed) {
                    self.report(scanned);
                    break 'claim;
                }
                // A smaller match already exists
                if nonce > self.best.load(Ordering::Relaxed) {
                    break;
                }

                let digest = buf.digest(nonce);
                scanned += 1;

                if self.target.matches(&digest) {
                    self.best.fetch_min(nonce, Ordering::Relaxed);
                    // Chunks arrive in increasing order, the first hit is this worker's minimum
                    if found.is_none() {
                        found = Some((nonce, digest));
                    }
                    break;
                }
            }

            self.report(scanned);
        }

        debug!(worker, chunks, found = found.is_some(), "worker finished");
        found
    }

    fn report(&self, scanned: u64) {
        self.scanned.fetch_add(scanned, Ordering::Relaxed);
        self.total_attempts.fetch_add(scanned, Ordering::Relaxed);
    }
}

impl MinerExecutor for CpuExecutor {
    fn mine(
        &self,
        request: &MiningRequest,
        config: &MinerConfig,
        total_attempts: Arc<AtomicU64>,
        cancel: Arc<AtomicBool>,
    ) -> Result<MiningResult, MinerError> {
        let target = DifficultyTarget::new(request.difficulty)?;
        config.validate()?;

        // Configure thread pool
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .build()?;

        let search = Search {
            data: &request.data,
            target,
            bounds: SearchBounds::from_config(config),
            chunk_size: config.chunk_size,
            next_chunk: AtomicU64::new(0),
            best: AtomicU64::new(u64::MAX),
            scanned: AtomicU64::new(0),
            timed_out: AtomicBool::new(false),
            total_attempts: &total_attempts,
            cancel: &cancel,
        };

        debug!(
            threads = pool.current_num_threads(),
            difficulty = target.difficulty(),
            start = search.bounds.start,
            chunk_size = search.chunk_size,
            "starting parallel search"
        );

        // One worker per pool thread
        let per_worker = pool.broadcast(|ctx| search.run_worker(ctx.index()));

        let scanned = search.scanned.load(Ordering::Relaxed);

        if cancel.load(Ordering::Relaxed) {
            warn!(scanned, "parallel search cancelled");
            return Err(MinerError::Cancelled);
        }

        // Every chunk below the winner was claimed and scanned to completion
        if let Some((nonce, digest)) = per_worker.into_iter().flatten().min_by_key(|(n, _)| *n) {
            info!(nonce, scanned, "found matching nonce");
            return Ok(search.bounds.result(nonce, &digest));
        }

        if search.timed_out.load(Ordering::Relaxed) {
            warn!(scanned, "parallel search hit its deadline");
            return Err(MinerError::SearchTimedOut { attempts: scanned });
        }

        Err(search.bounds.exhausted(scanned))
    }
}
