//! The ProgPoW hashing engine used by KawPoW.
//!
//! A hash seeds a 16-lane, 32-register mix matrix from the header/nonce
//! digest, then runs 64 rounds of a program keyed by the block period.
//! Each round loads one 2048-byte DAG item, performs the program's random
//! cache loads and random math, and merges the DAG words back in. Lane and
//! cross-lane FNV reductions produce the mix hash; keccak-f[800] closes it.
//!
//! Every round executes the same program: the program is generated once
//! from the period seed and the rounds only differ through the mix state
//! and the DAG item they read, which is what lets the GPU compile one
//! specialized inner loop per period (see [`kernel`]).

pub mod kernel;

use crate::bitwise::{clz32, fnv1a, mul_hi32, popcnt32, rotl32, rotr32, FNV_OFFSET_BASIS};
use crate::ethash::{self, EpochContext};
use crate::hash_types::{Hash2048, Hash256};
use crate::keccak::keccakf800;
use crate::kiss99::Kiss99;
use crate::{
    KawpowError, VerificationResult, CACHE_BYTES, CNT_CACHE, CNT_DAG, CNT_MATH, DAG_LOADS, LANES,
    PERIOD_LENGTH, REGS,
};

const L1_CACHE_WORDS: u32 = (CACHE_BYTES / 4) as u32;
const WORDS_PER_LANE: usize = Hash2048::SIZE / (4 * LANES);

/// The RNG state a program is generated from: a seeded KISS99 stream plus
/// two independent register permutations drawn from it.
#[derive(Clone)]
pub struct MixRngState {
    pub rng: Kiss99,
    dst_counter: usize,
    src_counter: usize,
    dst_seq: [u32; REGS],
    src_seq: [u32; REGS],
}

impl MixRngState {
    pub fn new(seed: u64) -> Self {
        let seed_lo = seed as u32;
        let seed_hi = (seed >> 32) as u32;

        let z = fnv1a(FNV_OFFSET_BASIS, seed_lo);
        let w = fnv1a(z, seed_hi);
        let jsr = fnv1a(w, seed_lo);
        let jcong = fnv1a(jsr, seed_hi);
        let mut rng = Kiss99::new(z, w, jsr, jcong);

        let mut dst_seq = [0u32; REGS];
        let mut src_seq = [0u32; REGS];
        for i in 0..REGS {
            dst_seq[i] = i as u32;
            src_seq[i] = i as u32;
        }

        // Fisher-Yates over both sequences, interleaved: the shared stream
        // advances between the two swaps of each step.
        for i in (2..=REGS as u32).rev() {
            let j = rng.next() % i;
            dst_seq.swap((i - 1) as usize, j as usize);
            let j = rng.next() % i;
            src_seq.swap((i - 1) as usize, j as usize);
        }

        MixRngState {
            rng,
            dst_counter: 0,
            src_counter: 0,
            dst_seq,
            src_seq,
        }
    }

    pub fn next_dst(&mut self) -> u32 {
        let value = self.dst_seq[self.dst_counter % REGS];
        self.dst_counter += 1;
        value
    }

    pub fn next_src(&mut self) -> u32 {
        let value = self.src_seq[self.src_counter % REGS];
        self.src_counter += 1;
        value
    }

    pub fn dst_seq(&self) -> &[u32; REGS] {
        &self.dst_seq
    }

    pub fn src_seq(&self) -> &[u32; REGS] {
        &self.src_seq
    }
}

/// Merges `b` into lane register `a` keeping `a`'s entropy; the rotation
/// count from the selector's high bits is never zero.
fn random_merge(a: &mut u32, b: u32, sel: u32) {
    let x = ((sel >> 16) % 31) + 1;
    match sel % 4 {
        0 => *a = a.wrapping_mul(33).wrapping_add(b),
        1 => *a = (*a ^ b).wrapping_mul(33),
        2 => *a = rotl32(*a, x) ^ b,
        _ => *a = rotr32(*a, x) ^ b,
    }
}

/// One of eleven random math operations on two lane registers.
fn random_math(a: u32, b: u32, sel: u32) -> u32 {
    match sel % 11 {
        0 => a.wrapping_add(b),
        1 => a.wrapping_mul(b),
        2 => mul_hi32(a, b),
        3 => a.min(b),
        4 => rotl32(a, b),
        5 => rotr32(a, b),
        6 => a & b,
        7 => a | b,
        8 => a ^ b,
        9 => clz32(a) + clz32(b),
        _ => popcnt32(a) + popcnt32(b),
    }
}

/// One generated instruction of the inner loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramOp {
    /// Merge a word of the 16 KiB dataset head into a register.
    CacheLoad { src: u32, dst: u32, sel: u32 },
    /// Random math over two distinct registers, merged into a third.
    RandomMath {
        src1: u32,
        src2: u32,
        math_sel: u32,
        dst: u32,
        merge_sel: u32,
    },
}

/// The period-keyed inner-loop program.
///
/// Generated by walking a [`MixRngState`] in instruction order; the CPU
/// rounds interpret the result and the kernel emitter prints it, so the
/// two can never disagree on operation order or operands.
pub struct LoopProgram {
    ops: Vec<ProgramOp>,
    dag_dsts: [u32; DAG_LOADS],
    dag_sels: [u32; DAG_LOADS],
}

impl LoopProgram {
    pub fn generate(mut state: MixRngState) -> Self {
        let mut ops = Vec::with_capacity(CNT_CACHE + CNT_MATH);
        for i in 0..CNT_CACHE.max(CNT_MATH) {
            if i < CNT_CACHE {
                let src = state.next_src();
                let dst = state.next_dst();
                let sel = state.rng.next();
                ops.push(ProgramOp::CacheLoad { src, dst, sel });
            }
            if i < CNT_MATH {
                // two unique source registers from a single draw
                let src_rnd = state.rng.next() % (REGS as u32 * (REGS as u32 - 1));
                let src1 = src_rnd % REGS as u32;
                let mut src2 = src_rnd / REGS as u32;
                if src2 >= src1 {
                    src2 += 1;
                }
                let math_sel = state.rng.next();
                let dst = state.next_dst();
                let merge_sel = state.rng.next();
                ops.push(ProgramOp::RandomMath {
                    src1,
                    src2,
                    math_sel,
                    dst,
                    merge_sel,
                });
            }
        }

        // The first DAG word always lands in register 0 so the load address
        // of the next round depends on the loaded data.
        let mut dag_dsts = [0u32; DAG_LOADS];
        let mut dag_sels = [0u32; DAG_LOADS];
        for i in 0..DAG_LOADS {
            dag_dsts[i] = if i == 0 { 0 } else { state.next_dst() };
            dag_sels[i] = state.rng.next();
        }

        LoopProgram {
            ops,
            dag_dsts,
            dag_sels,
        }
    }

    pub fn ops(&self) -> &[ProgramOp] {
        &self.ops
    }

    pub fn dag_dsts(&self) -> &[u32; DAG_LOADS] {
        &self.dag_dsts
    }

    pub fn dag_sels(&self) -> &[u32; DAG_LOADS] {
        &self.dag_sels
    }
}

type Mix = [[u32; REGS]; LANES];

fn init_mix(seed: u64) -> Mix {
    let z = fnv1a(FNV_OFFSET_BASIS, seed as u32);
    let w = fnv1a(z, (seed >> 32) as u32);

    let mut mix = [[0u32; REGS]; LANES];
    for (l, lane) in mix.iter_mut().enumerate() {
        let jsr = fnv1a(w, l as u32);
        let jcong = fnv1a(jsr, l as u32);
        let mut rng = Kiss99::new(z, w, jsr, jcong);
        for reg in lane.iter_mut() {
            *reg = rng.next();
        }
    }
    mix
}

fn round(context: &EpochContext, r: u32, mix: &mut Mix, program: &LoopProgram) {
    let num_items = context.full_dataset_num_items() / 2;
    let item_index = mix[(r as usize) % LANES][0] % num_items;

    // one 2048-byte item as two 1024-byte loads
    let item = Hash2048::from_hash1024s(
        &context.lazy_lookup_1024(item_index * 2),
        &context.lazy_lookup_1024(item_index * 2 + 1),
    );

    let l1_cache = context.l1_cache();
    for op in program.ops() {
        match *op {
            ProgramOp::CacheLoad { src, dst, sel } => {
                for lane in mix.iter_mut() {
                    let offset = (lane[src as usize] % L1_CACHE_WORDS) as usize;
                    random_merge(&mut lane[dst as usize], l1_cache[offset], sel);
                }
            }
            ProgramOp::RandomMath {
                src1,
                src2,
                math_sel,
                dst,
                merge_sel,
            } => {
                for lane in mix.iter_mut() {
                    let data = random_math(lane[src1 as usize], lane[src2 as usize], math_sel);
                    random_merge(&mut lane[dst as usize], data, merge_sel);
                }
            }
        }
    }

    let item_words = item.to_word32s();
    for (l, lane) in mix.iter_mut().enumerate() {
        let offset = (((l as u32) ^ r) as usize % LANES) * WORDS_PER_LANE;
        for i in 0..WORDS_PER_LANE {
            random_merge(
                &mut lane[program.dag_dsts[i] as usize],
                item_words[offset + i],
                program.dag_sels[i],
            );
        }
    }
}

/// Seed digest: header hash and little-endian nonce absorbed into a
/// keccak-f[800] state with fixed padding words.
pub fn hash_seed(header_hash: &Hash256, nonce: u64) -> Hash256 {
    let mut state = [0u32; 25];
    for i in 0..8 {
        state[i] = header_hash.word32(i);
    }
    state[8] = nonce as u32;
    state[9] = (nonce >> 32) as u32;
    state[10] = 0x0000_0001;
    state[18] = 0x8000_8081;

    keccakf800(&mut state);

    let mut words = [0u32; 8];
    words.copy_from_slice(&state[..8]);
    Hash256::from_word32s(&words)
}

/// The 64-round DAG mix keyed by the block period.
pub fn hash_mix(context: &EpochContext, period: u32, seed: u64) -> Hash256 {
    let mut mix = init_mix(seed);
    let program = LoopProgram::generate(MixRngState::new(u64::from(period)));

    for r in 0..CNT_DAG as u32 {
        round(context, r, &mut mix, &program);
    }

    // per-lane reduction
    let mut lane_hash = [0u32; LANES];
    for (l, lane) in mix.iter().enumerate() {
        lane_hash[l] = FNV_OFFSET_BASIS;
        for reg in lane.iter() {
            lane_hash[l] = fnv1a(lane_hash[l], *reg);
        }
    }

    // cross-lane reduction to 256 bits
    let mut result = [FNV_OFFSET_BASIS; 8];
    for (l, hash) in lane_hash.iter().enumerate() {
        result[l % 8] = fnv1a(result[l % 8], *hash);
    }
    Hash256::from_word32s(&result)
}

/// Final compression of the seed digest and the mix hash.
pub fn hash_final(input_hash: &Hash256, mix_hash: &Hash256) -> Hash256 {
    let mut state = [0u32; 25];
    for i in 0..8 {
        state[i] = input_hash.word32(i);
    }
    for i in 0..8 {
        state[8 + i] = mix_hash.word32(i);
    }
    state[17] = 0x0000_0001;
    state[24] = 0x8000_8081;

    keccakf800(&mut state);

    let mut words = [0u32; 8];
    words.copy_from_slice(&state[..8]);
    Hash256::from_word32s(&words)
}

/// Full KawPoW hash of a header and nonce: `(final_hash, mix_hash)`.
pub fn hash(
    context: &EpochContext,
    period: u32,
    header_hash: &Hash256,
    nonce: u64,
) -> (Hash256, Hash256) {
    let seed_hash = hash_seed(header_hash, nonce);
    let seed = seed_hash.word64(0);
    let mix_hash = hash_mix(context, period, seed);
    let final_hash = hash_final(&seed_hash, &mix_hash);
    (final_hash, mix_hash)
}

/// Recomputes the hash and checks it against the boundary and the
/// submitted mix hash.
pub fn verify_full(
    context: &EpochContext,
    period: u32,
    header_hash: &Hash256,
    mix_hash: &Hash256,
    nonce: u64,
    boundary: &Hash256,
) -> VerificationResult {
    let (final_hash, expected_mix) = hash(context, period, header_hash, nonce);
    if !final_hash.less_or_equal(boundary) {
        return VerificationResult::InvalidNonce;
    }
    if expected_mix != *mix_hash {
        return VerificationResult::InvalidMixHash;
    }
    VerificationResult::Ok
}

/// Verification by absolute block number: derives the DAG epoch and the
/// program period, fetching the epoch context from the shared registry.
pub fn verify_by_block(
    block_number: u64,
    header_hash: &Hash256,
    mix_hash: &Hash256,
    nonce: u64,
    boundary: &Hash256,
) -> Result<VerificationResult, KawpowError> {
    let epoch_number = ethash::epoch_from_block(block_number);
    let context = ethash::get_epoch_context(epoch_number, false)?;
    let period = (block_number / PERIOD_LENGTH) as u32;
    Ok(verify_full(
        &context, period, header_hash, mix_hash, nonce, boundary,
    ))
}
