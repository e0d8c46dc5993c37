pub mod bitwise;
pub mod ethash;
pub mod hash_types;
pub mod keccak;
pub mod kiss99;
pub mod progpow;

use thiserror::Error;

/// Number of blocks a DAG epoch stays constant.
pub const EPOCH_LENGTH: u64 = 7_500;
/// Number of blocks before the random program changes.
pub const PERIOD_LENGTH: u64 = 3;
/// Lanes that work together calculating a hash.
pub const LANES: usize = 16;
/// uint32 registers per lane.
pub const REGS: usize = 32;
/// uint32 loads from the DAG per lane.
pub const DAG_LOADS: usize = 4;
/// Size of the cached portion of the DAG.
pub const CACHE_BYTES: usize = 16 * 1024;
/// DAG accesses, also the number of loops executed per hash.
pub const CNT_DAG: usize = 64;
/// Random cache accesses per loop.
pub const CNT_CACHE: usize = 11;
/// Random math instructions per loop.
pub const CNT_MATH: usize = 18;

pub const LIGHT_CACHE_INIT_SIZE: usize = 16 * 1024 * 1024;
pub const LIGHT_CACHE_GROWTH: usize = 128 * 1024;
pub const LIGHT_CACHE_ROUNDS: usize = 3;
pub const FULL_DATASET_INIT_SIZE: usize = 1024 * 1024 * 1024;
pub const FULL_DATASET_GROWTH: usize = 8 * 1024 * 1024;
pub const FULL_DATASET_ITEM_PARENTS: u32 = 256;
/// Size of the precomputed dataset head kept for the random cache loads.
pub const L1_CACHE_SIZE: usize = 16 * 1024;

#[derive(Debug, Error)]
pub enum KawpowError {
    /// Epoch context allocation failed; datasets reach multiple GiB at
    /// large epochs.
    #[error("out of memory allocating epoch context")]
    OutOfMemory,
}

/// Outcome of checking a submitted solution against the chain rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationResult {
    Ok,
    /// The final hash does not meet the boundary.
    InvalidNonce,
    /// The submitted mix hash does not match the recomputed one.
    InvalidMixHash,
}
