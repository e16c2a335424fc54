use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use pow_miner::common::{format_hashrate, format_large_number};
use pow_miner::progress::ProgressDisplay;
use pow_miner::{
    CpuExecutor, DifficultyTarget, MinerConfig, MinerError, MinerExecutor, MiningRequest,
    SerialExecutor, block_digest, block_hash, leading_zero_digits,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Proof-of-work block miner - find the smallest nonce whose SHA-256 has N leading zeros
#[derive(Parser, Debug)]
#[command(name = "pow-miner")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Number of CPU threads to use (default: all cores)
    #[arg(short, long, global = true, env = "MINER_THREADS")]
    threads: Option<usize>,
}

#[derive(clap::Args, Debug)]
#[group(required = true, multiple = false)]
struct DataArgs {
    /// Block data as a UTF-8 string
    #[arg(short, long)]
    data: Option<String>,

    /// Block data as hex-encoded bytes
    #[arg(long)]
    data_hex: Option<String>,
}

impl DataArgs {
    fn bytes(&self) -> Result<Vec<u8>> {
        match (&self.data, &self.data_hex) {
            (Some(data), _) => Ok(data.as_bytes().to_vec()),
            (None, Some(data_hex)) => {
                hex::decode(data_hex.trim_start_matches("0x")).context("Invalid --data-hex")
            }
            (None, None) => anyhow::bail!("either --data or --data-hex is required"),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Mine for the smallest nonce meeting the difficulty
    Mine {
        #[command(flatten)]
        data: DataArgs,

        /// Required number of leading zero hex chars
        #[arg(short = 'D', long)]
        difficulty: usize,

        /// Nonce to start searching from
        #[arg(long, default_value = "0")]
        start_nonce: u64,

        /// Give up after this many attempts
        #[arg(long)]
        max_attempts: Option<u64>,

        /// Give up after this many seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Disable the progress display
        #[arg(long)]
        no_progress: bool,
    },
    /// Check that a nonce meets the difficulty for the given data
    Verify {
        #[command(flatten)]
        data: DataArgs,

        /// Nonce to check
        #[arg(short, long)]
        nonce: u64,

        /// Required number of leading zero hex chars
        #[arg(short = 'D', long)]
        difficulty: usize,
    },
    /// Measure hashrate for a fixed duration
    Bench {
        /// Benchmark duration in seconds
        #[arg(long, default_value = "10")]
        seconds: u64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let threads = args.threads.unwrap_or_else(num_cpus::get);

    match args.command {
        Commands::Mine {
            data,
            difficulty,
            start_nonce,
            max_attempts,
            timeout_secs,
            json,
            no_progress,
        } => {
            let mut config = MinerConfig::new(threads).with_start_nonce(start_nonce);
            if let Some(cap) = max_attempts {
                config = config.with_max_attempts(cap);
            }
            if let Some(secs) = timeout_secs {
                config = config.with_timeout(Duration::from_secs(secs));
            }
            run_mining(data.bytes()?, difficulty, config, json, no_progress)
        }
        Commands::Verify {
            data,
            nonce,
            difficulty,
        } => run_verify(&data.bytes()?, nonce, difficulty),
        Commands::Bench { seconds } => run_bench(threads, seconds),
    }
}

fn executor_for(threads: usize) -> Box<dyn MinerExecutor> {
    if threads <= 1 {
        Box::new(SerialExecutor)
    } else {
        Box::new(CpuExecutor::new())
    }
}

fn run_mining(
    data: Vec<u8>,
    difficulty: usize,
    config: MinerConfig,
    json: bool,
    no_progress: bool,
) -> Result<()> {
    let target = DifficultyTarget::new(difficulty).context("Invalid difficulty")?;
    let request = MiningRequest::new(data, difficulty);

    if !json {
        println!("🚀 Proof-of-Work Block Miner");
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        println!("📦 Data: {} bytes", request.data.len());
        println!(
            "📊 Difficulty: {} hex chars (~{} attempts avg)",
            target.difficulty(),
            format_large_number(target.estimated_attempts())
        );
        println!("🔢 Start nonce: {}", config.start_nonce);
        println!("🧵 Threads: {}", config.threads);
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    let total_attempts = Arc::new(AtomicU64::new(0));
    let cancel = Arc::new(AtomicBool::new(false));
    let done = Arc::new(AtomicBool::new(false));

    let cancel_clone = cancel.clone();
    ctrlc::set_handler(move || {
        eprintln!("\n⛔ Cancelled by user");
        cancel_clone.store(true, Ordering::SeqCst);
    })
    .ok();

    let progress = Arc::new(if json || no_progress {
        ProgressDisplay::hidden()
    } else {
        ProgressDisplay::new(target.estimated_attempts(), difficulty)
    });
    let progress_handle = {
        let done = done.clone();
        let total_attempts = total_attempts.clone();
        let progress = progress.clone();
        thread::spawn(move || {
            while !done.load(Ordering::Relaxed) {
                thread::sleep(Duration::from_millis(100));
                progress.update(total_attempts.load(Ordering::Relaxed));
            }
        })
    };

    info!(difficulty, threads = config.threads, "mining started");
    let executor = executor_for(config.threads);
    let result = executor.mine(&request, &config, total_attempts.clone(), cancel.clone());

    done.store(true, Ordering::SeqCst);
    let _ = progress_handle.join();

    let result = match result {
        Ok(result) => result,
        Err(MinerError::Cancelled) => {
            progress.finish_with_message("❌ Cancelled");
            println!("\n❌ Mining cancelled without finding a match.");
            return Ok(());
        }
        Err(err) => {
            progress.finish_with_message("❌ No match");
            return Err(err).context("Mining failed");
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    progress.finish_with_success(result.attempts);
    let elapsed = progress.elapsed();
    let scanned = total_attempts.load(Ordering::Relaxed);

    println!("\n");
    println!("🎉 ════════════════════════════════════════════════════════");
    println!("   FOUND MATCHING NONCE!");
    println!("════════════════════════════════════════════════════════════");
    println!();
    println!("🔢 Nonce:             {}", style(result.nonce).green().bold());
    println!("📋 Hash:              {}", style(&result.hash).cyan());
    println!(
        "🔢 Attempts:          {}",
        format_large_number(result.attempts)
    );
    println!(
        "⏱️  Elapsed:           {:.2}s ({})",
        elapsed.as_secs_f64(),
        format_hashrate(progress.hashrate(scanned))
    );
    println!("════════════════════════════════════════════════════════════");

    Ok(())
}

fn run_verify(data: &[u8], nonce: u64, difficulty: usize) -> Result<()> {
    let target = DifficultyTarget::new(difficulty).context("Invalid difficulty")?;
    let digest = block_digest(data, nonce);

    println!("📋 Hash:         {}", block_hash(data, nonce));
    println!("📊 Leading zeros: {}", leading_zero_digits(&digest));

    if target.matches(&digest) {
        let msg = format!("✅ Nonce {} meets difficulty {}", nonce, difficulty);
        println!("{}", style(msg).green());
        Ok(())
    } else {
        anyhow::bail!("nonce {} does not meet difficulty {}", nonce, difficulty)
    }
}

fn bench_config(threads: usize, seconds: u64) -> MinerConfig {
    MinerConfig::new(threads).with_timeout(Duration::from_secs(seconds))
}

fn run_bench(threads: usize, seconds: u64) -> Result<()> {
    let config = bench_config(threads, seconds);
    println!(
        "⏱️  Benchmarking {} thread(s) for {}s...",
        config.threads, seconds
    );

    // Full-length target never matches, so the search runs until the deadline
    let request = MiningRequest::new("pow-miner benchmark", pow_miner::DIGEST_HEX_LEN);
    let progress = ProgressDisplay::hidden();

    let result = executor_for(config.threads).mine(
        &request,
        &config,
        Arc::new(AtomicU64::new(0)),
        Arc::new(AtomicBool::new(false)),
    );

    let attempts = match result {
        Err(MinerError::SearchTimedOut { attempts }) => attempts,
        Ok(found) => {
            println!("🎉 Found a full-zero hash, somehow: {}", found.hash);
            found.attempts
        }
        Err(err) => return Err(err).context("Benchmark failed"),
    };

    println!(
        "📊 {} attempts, {}",
        format_large_number(attempts),
        format_hashrate(progress.hashrate(attempts))
    );
    Ok(())
}
