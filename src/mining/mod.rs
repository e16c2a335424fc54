//! Mining module - Core abstractions for nonce search
//!
//! This module separates:
//! - The single-threaded search and verification routine (`search`)
//! - Execution backends (serial, multi-threaded CPU) via `MinerExecutor` trait

pub mod config;
pub mod executor;
pub mod search;

pub use config::MinerConfig;
pub use executor::{CpuExecutor, MinerExecutor, SerialExecutor};
pub use search::{mine, mine_with, verify};
