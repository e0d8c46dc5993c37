//! Ethash epoch contexts: the per-epoch light cache, on-demand full-dataset
//! items derived from it, and the shared context registry.
//!
//! The light cache is a prime-length array of 512-bit items built by a
//! keccak512 chain plus three RandMemoHash rounds; every DAG item is 256
//! FNV mixing rounds over it. Item counts are always the largest odd prime
//! below the epoch's size bound so the modulo indexing cycles through the
//! whole cache.

use crate::bitwise::fnv1;
use crate::hash_types::{Hash1024, Hash2048, Hash256, Hash512};
use crate::keccak::{keccak256, keccak256_32, keccak512, keccak512_64};
use crate::{
    KawpowError, VerificationResult, EPOCH_LENGTH, FULL_DATASET_GROWTH, FULL_DATASET_INIT_SIZE,
    FULL_DATASET_ITEM_PARENTS, L1_CACHE_SIZE, LIGHT_CACHE_GROWTH, LIGHT_CACHE_INIT_SIZE,
    LIGHT_CACHE_ROUNDS,
};
use byteorder::{ByteOrder, LittleEndian};
use log::debug;
use num_bigint::BigUint;
use num_traits::One;
use once_cell::sync::{Lazy, OnceCell};
use parking_lot::Mutex;
use rayon::prelude::*;
use std::cell::RefCell;
use std::sync::Arc;

/// Dataset reads per plain-ethash hash.
const NUM_DATASET_ACCESSES: u32 = 64;

/// 16 parallel FNV-1 steps over the 32-bit lanes of two 512-bit items.
fn fnv1_512(a: &[u32; 16], b: &[u32; 16]) -> [u32; 16] {
    let mut out = [0u32; 16];
    for i in 0..16 {
        out[i] = fnv1(a[i], b[i]);
    }
    out
}

fn xor_512(x: &Hash512, y: &Hash512) -> Hash512 {
    let mut out = [0u8; Hash512::SIZE];
    for (i, byte) in out.iter_mut().enumerate() {
        *byte = x.0[i] ^ y.0[i];
    }
    Hash512::from_bytes(out)
}

/// Checks primality of an odd number > 2 by trial division. The divisor
/// square is compared with 64-bit precision to avoid a sqrt.
fn is_odd_prime(number: u32) -> bool {
    if number & 1 == 0 {
        return false;
    }
    let number = u64::from(number);
    let mut d = 3u64;
    while d * d <= number {
        if number % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}

/// Largest odd prime less than or equal to the bound; 0 when the bound is
/// < 2, and 1 for bound 2 (the descent only visits odd numbers and stops
/// at 1, which the trial division does not reject).
pub fn find_largest_prime(upper_bound: u32) -> u32 {
    if upper_bound < 2 {
        return 0;
    }
    let mut n = if upper_bound & 1 == 1 {
        upper_bound
    } else {
        upper_bound - 1
    };
    while !is_odd_prime(n) {
        n -= 2;
    }
    n
}

pub fn light_cache_num_items(epoch_number: u32) -> u32 {
    const NUM_ITEMS_INIT: u32 = (LIGHT_CACHE_INIT_SIZE / Hash512::SIZE) as u32;
    const NUM_ITEMS_GROWTH: u32 = (LIGHT_CACHE_GROWTH / Hash512::SIZE) as u32;
    find_largest_prime(NUM_ITEMS_INIT + epoch_number * NUM_ITEMS_GROWTH)
}

pub fn full_dataset_num_items(epoch_number: u32) -> u32 {
    const NUM_ITEMS_INIT: u32 = (FULL_DATASET_INIT_SIZE / Hash1024::SIZE) as u32;
    const NUM_ITEMS_GROWTH: u32 = (FULL_DATASET_GROWTH / Hash1024::SIZE) as u32;
    find_largest_prime(NUM_ITEMS_INIT + epoch_number * NUM_ITEMS_GROWTH)
}

/// Epoch number an absolute block number falls into.
pub fn epoch_from_block(block_number: u64) -> u32 {
    (block_number / EPOCH_LENGTH) as u32
}

/// The keccak256 chain seed identifying an epoch; epoch 0 is all zeros.
pub fn seed_from_epoch(epoch_number: u32) -> Hash256 {
    let mut seed = Hash256::zero();
    for _ in 0..epoch_number {
        seed = keccak256_32(&seed);
    }
    seed
}

thread_local! {
    static EPOCH_SEED_CACHE: RefCell<Option<(u32, Hash256)>> = RefCell::new(None);
}

/// Reverse lookup of [`seed_from_epoch`], bounded at 30 000 epochs.
///
/// A thread-local one-entry cache makes sequential epoch access O(1); a
/// miss falls back to a linear scan from epoch 0.
pub fn epoch_from_seed(seed: &Hash256) -> Option<u32> {
    const NUM_TRIES: u32 = 30_000;

    EPOCH_SEED_CACHE.with(|slot| {
        let mut slot = slot.borrow_mut();

        if let Some((cached_number, cached_seed)) = slot.as_ref() {
            if cached_seed == seed {
                return Some(*cached_number);
            }
            // The next seed in the chain matches for sequential access.
            let next = keccak256_32(cached_seed);
            if &next == seed {
                let number = cached_number + 1;
                *slot = Some((number, next));
                return Some(number);
            }
        }

        let mut candidate = Hash256::zero();
        for number in 0..NUM_TRIES {
            if &candidate == seed {
                *slot = Some((number, candidate));
                return Some(number);
            }
            candidate = keccak256_32(&candidate);
        }

        *slot = None;
        None
    })
}

fn build_light_cache(num_items: u32, seed: &Hash256) -> Result<Vec<Hash512>, KawpowError> {
    let mut cache: Vec<Hash512> = Vec::new();
    cache
        .try_reserve_exact(num_items as usize)
        .map_err(|_| KawpowError::OutOfMemory)?;

    let mut item = keccak512(seed.as_bytes());
    cache.push(item);
    for _ in 1..num_items {
        item = keccak512_64(&item);
        cache.push(item);
    }

    let num_items = num_items as usize;
    for _ in 0..LIGHT_CACHE_ROUNDS {
        for i in 0..num_items {
            // First index: the item's first 4 bytes as a little-endian
            // integer. Second index: the previous item, wrapping.
            let v = (cache[i].word32(0) as usize) % num_items;
            let w = (num_items + i - 1) % num_items;
            let x = xor_512(&cache[v], &cache[w]);
            cache[i] = keccak512_64(&x);
        }
    }

    Ok(cache)
}

/// One 512-bit sub-item of the dataset, mid-derivation.
struct ItemState<'a> {
    cache: &'a [Hash512],
    num_cache_items: u32,
    seed: u32,
    mix: [u32; 16],
}

impl<'a> ItemState<'a> {
    fn new(cache: &'a [Hash512], index: u32) -> Self {
        let num_cache_items = cache.len() as u32;
        let mut mix = cache[(index % num_cache_items) as usize].to_word32s();
        mix[0] ^= index;
        let mix = keccak512_64(&Hash512::from_word32s(&mix)).to_word32s();
        ItemState {
            cache,
            num_cache_items,
            seed: index,
            mix,
        }
    }

    fn update(&mut self, round: u32) {
        let t = fnv1(self.seed ^ round, self.mix[(round % 16) as usize]);
        let parent_index = (t % self.num_cache_items) as usize;
        self.mix = fnv1_512(&self.mix, &self.cache[parent_index].to_word32s());
    }

    fn finish(self) -> Hash512 {
        keccak512_64(&Hash512::from_word32s(&self.mix))
    }
}

fn item_1024_from_cache(cache: &[Hash512], index: u32) -> Hash1024 {
    let mut item0 = ItemState::new(cache, index.wrapping_mul(2));
    let mut item1 = ItemState::new(cache, index.wrapping_mul(2) + 1);

    for i in 0..FULL_DATASET_ITEM_PARENTS {
        item0.update(i);
        item1.update(i);
    }

    Hash1024::from_hash512s(&item0.finish(), &item1.finish())
}

fn item_2048_from_cache(cache: &[Hash512], index: u32) -> Hash2048 {
    let base = index.wrapping_mul(4);
    let mut item0 = ItemState::new(cache, base);
    let mut item1 = ItemState::new(cache, base + 1);
    let mut item2 = ItemState::new(cache, base + 2);
    let mut item3 = ItemState::new(cache, base + 3);

    for i in 0..FULL_DATASET_ITEM_PARENTS {
        item0.update(i);
        item1.update(i);
        item2.update(i);
        item3.update(i);
    }

    Hash2048::from_hash512s([
        &item0.finish(),
        &item1.finish(),
        &item2.finish(),
        &item3.finish(),
    ])
}

/// Computes the 1024-byte full-dataset item at `index` from the light cache.
pub fn calculate_dataset_item_1024(context: &EpochContext, index: u32) -> Hash1024 {
    item_1024_from_cache(&context.light_cache, index)
}

/// Computes the 2048-byte full-dataset item at `index` from the light cache.
pub fn calculate_dataset_item_2048(context: &EpochContext, index: u32) -> Hash2048 {
    item_2048_from_cache(&context.light_cache, index)
}

/// Everything derived from an epoch number; immutable after construction
/// and shared by reference between all consumers of that epoch.
pub struct EpochContext {
    epoch_number: u32,
    light_cache: Vec<Hash512>,
    /// First 16 KiB of the full dataset as little-endian decoded words,
    /// read by the random cache loads of the inner loop.
    l1_cache: Vec<u32>,
    full_dataset_num_items: u32,
    /// Lazily filled dataset items; `None` means every lookup recomputes.
    full_dataset: Option<Vec<OnceCell<Hash1024>>>,
}

impl EpochContext {
    pub fn new(epoch_number: u32, full: bool) -> Result<Self, KawpowError> {
        let light_items = light_cache_num_items(epoch_number);
        let full_items = full_dataset_num_items(epoch_number);
        let epoch_seed = seed_from_epoch(epoch_number);

        debug!(
            "building light cache for epoch {} ({} items)",
            epoch_number, light_items
        );
        let light_cache = build_light_cache(light_items, &epoch_seed)?;

        let full_dataset = if full {
            let mut cells: Vec<OnceCell<Hash1024>> = Vec::new();
            cells
                .try_reserve_exact(full_items as usize)
                .map_err(|_| KawpowError::OutOfMemory)?;
            cells.resize_with(full_items as usize, OnceCell::new);
            Some(cells)
        } else {
            None
        };

        let head_items: Vec<Hash2048> = (0..(L1_CACHE_SIZE / Hash2048::SIZE) as u32)
            .into_par_iter()
            .map(|i| item_2048_from_cache(&light_cache, i))
            .collect();
        let mut l1_cache = Vec::with_capacity(L1_CACHE_SIZE / 4);
        for item in &head_items {
            for i in 0..Hash2048::SIZE / 4 {
                l1_cache.push(item.word32(i));
            }
        }
        debug!("epoch {} context ready", epoch_number);

        Ok(EpochContext {
            epoch_number,
            light_cache,
            l1_cache,
            full_dataset_num_items: full_items,
            full_dataset,
        })
    }

    pub fn epoch_number(&self) -> u32 {
        self.epoch_number
    }

    pub fn light_cache(&self) -> &[Hash512] {
        &self.light_cache
    }

    /// The precomputed dataset head as little-endian decoded 32-bit words.
    pub fn l1_cache(&self) -> &[u32] {
        &self.l1_cache
    }

    pub fn full_dataset_num_items(&self) -> u32 {
        self.full_dataset_num_items
    }

    /// Whether the context holds (lazily filled) full-dataset storage.
    pub fn is_full(&self) -> bool {
        self.full_dataset.is_some()
    }

    /// The full-dataset item at `index`: served from the precomputed head
    /// when possible, from the lazily filled dataset when one is held, and
    /// recomputed otherwise. Concurrent fills of the same slot produce
    /// identical bytes; the first one wins.
    pub fn lazy_lookup_1024(&self, index: u32) -> Hash1024 {
        const L1_ITEMS: u32 = (L1_CACHE_SIZE / Hash1024::SIZE) as u32;
        if index < L1_ITEMS {
            let words_start = (index as usize) * (Hash1024::SIZE / 4);
            let mut words = [0u32; Hash1024::SIZE / 4];
            words.copy_from_slice(&self.l1_cache[words_start..words_start + Hash1024::SIZE / 4]);
            return Hash1024::from_word32s(&words);
        }

        if let Some(dataset) = &self.full_dataset {
            return *dataset[index as usize]
                .get_or_init(|| item_1024_from_cache(&self.light_cache, index));
        }

        item_1024_from_cache(&self.light_cache, index)
    }
}

/// Shared slot for the most recently used epoch context. Callers needing
/// isolated lifetimes can hold their own cache instead of the process-wide
/// one behind [`get_epoch_context`].
pub struct EpochContextCache {
    shared: Mutex<Option<Arc<EpochContext>>>,
}

impl EpochContextCache {
    pub fn new() -> Self {
        EpochContextCache {
            shared: Mutex::new(None),
        }
    }

    /// Returns the cached context when epoch and dataset mode match,
    /// otherwise builds a fresh one and replaces the slot. The lock is held
    /// across construction so concurrent requesters of the same epoch wait
    /// instead of duplicating the build.
    pub fn get_context(
        &self,
        epoch_number: u32,
        full: bool,
    ) -> Result<Arc<EpochContext>, KawpowError> {
        let mut slot = self.shared.lock();
        if let Some(context) = slot.as_ref() {
            if context.epoch_number == epoch_number && context.is_full() == full {
                return Ok(context.clone());
            }
        }

        // Release the obsolete context before building the replacement.
        *slot = None;
        let context = Arc::new(EpochContext::new(epoch_number, full)?);
        *slot = Some(context.clone());
        Ok(context)
    }
}

impl Default for EpochContextCache {
    fn default() -> Self {
        Self::new()
    }
}

static SHARED_CACHE: Lazy<EpochContextCache> = Lazy::new(EpochContextCache::new);

thread_local! {
    static LOCAL_CONTEXT: RefCell<Option<Arc<EpochContext>>> = RefCell::new(None);
}

/// Process-wide epoch context lookup. A thread-local slot makes repeated
/// requests for the current epoch lock-free; the shared slot hands the same
/// context to every thread of the process.
pub fn get_epoch_context(epoch_number: u32, full: bool) -> Result<Arc<EpochContext>, KawpowError> {
    LOCAL_CONTEXT.with(|local| {
        let mut local = local.borrow_mut();
        if let Some(context) = local.as_ref() {
            if context.epoch_number == epoch_number && context.is_full() == full {
                return Ok(context.clone());
            }
        }

        *local = None;
        let context = SHARED_CACHE.get_context(epoch_number, full)?;
        *local = Some(context.clone());
        Ok(context)
    })
}

/// Plain-ethash seed: keccak512 over the header hash and little-endian nonce.
pub fn hash_seed(header_hash: &Hash256, nonce: u64) -> Hash512 {
    let mut data = [0u8; 40];
    data[..32].copy_from_slice(header_hash.as_bytes());
    LittleEndian::write_u64(&mut data[32..], nonce);
    keccak512(&data)
}

fn hash_mix(context: &EpochContext, seed: &Hash512) -> Hash256 {
    const NUM_WORDS: usize = Hash1024::SIZE / 4;
    let index_limit = context.full_dataset_num_items;
    let seed_init = seed.word32(0);

    let seed_words = seed.to_word32s();
    let mut mix = [0u32; NUM_WORDS];
    mix[..16].copy_from_slice(&seed_words);
    mix[16..].copy_from_slice(&seed_words);

    for i in 0..NUM_DATASET_ACCESSES {
        let p = fnv1(i ^ seed_init, mix[(i as usize) % NUM_WORDS]) % index_limit;
        let newdata = context.lazy_lookup_1024(p).to_word32s();
        for (m, n) in mix.iter_mut().zip(newdata.iter()) {
            *m = fnv1(*m, *n);
        }
    }

    let mut out = [0u32; 8];
    for (i, word) in out.iter_mut().enumerate() {
        let j = i * 4;
        *word = fnv1(fnv1(fnv1(mix[j], mix[j + 1]), mix[j + 2]), mix[j + 3]);
    }
    Hash256::from_word32s(&out)
}

fn hash_final(seed: &Hash512, mix_hash: &Hash256) -> Hash256 {
    let mut data = [0u8; 96];
    data[..64].copy_from_slice(seed.as_bytes());
    data[64..].copy_from_slice(mix_hash.as_bytes());
    keccak256(&data)
}

/// Plain-ethash hash of a header and nonce: `(final_hash, mix_hash)`.
pub fn hash(context: &EpochContext, header_hash: &Hash256, nonce: u64) -> (Hash256, Hash256) {
    let seed = hash_seed(header_hash, nonce);
    let mix_hash = hash_mix(context, &seed);
    (hash_final(&seed, &mix_hash), mix_hash)
}

/// Boundary check only, trusting the submitted mix hash. Cheap enough for
/// pre-filtering shares before the full recomputation.
pub fn verify_light(
    header_hash: &Hash256,
    mix_hash: &Hash256,
    nonce: u64,
    boundary: &Hash256,
) -> bool {
    let seed = hash_seed(header_hash, nonce);
    hash_final(&seed, mix_hash).less_or_equal(boundary)
}

/// Full plain-ethash verification against the boundary and submitted mix.
pub fn verify_full(
    context: &EpochContext,
    header_hash: &Hash256,
    mix_hash: &Hash256,
    nonce: u64,
    boundary: &Hash256,
) -> VerificationResult {
    let seed = hash_seed(header_hash, nonce);
    if !hash_final(&seed, mix_hash).less_or_equal(boundary) {
        return VerificationResult::InvalidNonce;
    }
    if hash_mix(context, &seed) != *mix_hash {
        return VerificationResult::InvalidMixHash;
    }
    VerificationResult::Ok
}

/// Boundary a final hash must not exceed for a given difficulty:
/// `floor((2^256 - 1) / difficulty)` as a big-endian 256-bit value.
pub fn boundary_from_difficulty(difficulty: &BigUint) -> Hash256 {
    let dividend = (BigUint::one() << 256u32) - 1u32;

    let mut out = Hash256::zero();
    if *difficulty > BigUint::one() {
        let quotient = dividend / difficulty;
        let bytes = quotient.to_bytes_be();
        out.0[Hash256::SIZE - bytes.len()..].copy_from_slice(&bytes);
    } else {
        out.0 = [0xff; Hash256::SIZE];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;
    use crate::VerificationResult;

    #[test]
    fn test_epoch_item_counts_are_prime() {
        // spot values
        assert_eq!(light_cache_num_items(0), 262139);
        assert_eq!(light_cache_num_items(1), 264179);
        assert_eq!(light_cache_num_items(3), 268283);
        assert_eq!(light_cache_num_items(32), 327673);
        assert_eq!(light_cache_num_items(1024), 2359267);
        assert_eq!(full_dataset_num_items(0), 8388593);
        assert_eq!(full_dataset_num_items(1), 8454143);
        assert_eq!(full_dataset_num_items(3), 8585209);
        assert_eq!(full_dataset_num_items(1024), 75497467);

        for epoch in 0..=1024u32 {
            let light = light_cache_num_items(epoch);
            let full = full_dataset_num_items(epoch);
            assert!(light & 1 == 1 && is_odd_prime(light));
            assert!(full & 1 == 1 && is_odd_prime(full));
            assert!(
                light as usize * Hash512::SIZE
                    <= LIGHT_CACHE_INIT_SIZE + epoch as usize * LIGHT_CACHE_GROWTH
            );
            assert!(
                full as usize * Hash1024::SIZE
                    <= FULL_DATASET_INIT_SIZE + epoch as usize * FULL_DATASET_GROWTH
            );
        }
    }

    #[test]
    fn test_find_largest_prime_edges() {
        assert_eq!(find_largest_prime(0), 0);
        assert_eq!(find_largest_prime(1), 0);
        // an even bound of 2 descends to 1, which trial division keeps
        assert_eq!(find_largest_prime(2), 1);
        assert_eq!(find_largest_prime(3), 3);
        assert_eq!(find_largest_prime(4), 3);
        assert_eq!(find_largest_prime(100), 97);
    }

    #[test]
    fn test_epoch_from_block() {
        assert_eq!(epoch_from_block(0), 0);
        assert_eq!(epoch_from_block(7499), 0);
        assert_eq!(epoch_from_block(7500), 1);
        assert_eq!(epoch_from_block(22500), 3);
    }

    #[test]
    fn test_seed_from_epoch() {
        assert_eq!(seed_from_epoch(0), Hash256::zero());
        assert_eq!(
            seed_from_epoch(1),
            keccak256_32(&Hash256::zero())
        );
        assert_eq!(
            seed_from_epoch(3).to_hex(),
            "356e5a2cc1eba076e650ac7473fccc37952b46bc2e419a200cec0c451dce2336"
        );
    }

    #[test]
    fn test_epoch_from_seed_round_trip() {
        // Walk the seed chain once; the thread-local cache keeps each
        // lookup O(1) after the first.
        let mut seed = Hash256::zero();
        for epoch in 0..30_000u32 {
            assert_eq!(epoch_from_seed(&seed), Some(epoch));
            seed = keccak256_32(&seed);
        }
        // the one-entry cache advances sequentially even past the scan bound
        assert_eq!(epoch_from_seed(&seed), Some(30_000));
        // a non-sequential query past the bound falls back to the scan and
        // misses
        let far = keccak256_32(&keccak256_32(&seed));
        assert_eq!(epoch_from_seed(&far), None);
        assert_eq!(epoch_from_seed(&keccak256(b"not an epoch seed")), None);
    }

    #[test]
    fn test_light_cache_contents() {
        let context = test_support::epoch0_context();
        let cache = context.light_cache();
        assert_eq!(cache.len(), 262139);
        assert_eq!(
            cache[0].to_hex(),
            "5e493e76a1318e50815c6ce77950425532964ebbb8dcf94718991fa9a82eaf37\
             658de68ca6fe078884e803da3a26a4aa56420a6867ebcd9ab0f29b08d1c48fed"
        );
        assert_eq!(
            cache[1].to_hex(),
            "47bcbf5825d4ba95ed8d9074291fa2242cd6aabab201fd923565086c6d19b93c\
             6936bba8def3c8e40f891288f9926eb87318c30b22611653439801d2a596a78c"
        );
        assert_eq!(
            cache[42].to_hex(),
            "0456beabdfa2df615e3270e101f457d3daf4eb11bd7f4ca440abf99076e7c92a\
             64877c6bce7750e3338e9a8201a68469788367d38bde65c33d2ed55bc1a5b954"
        );
        assert_eq!(
            cache[cache.len() - 1].to_hex(),
            "724f2f86c24c487809dc3897acbbd32d5d791e4536aa1520e65e93891a40dde5\
             887899ffc556cbd174f426e32ae2ab711be859601c024d1514b29a27370b662e"
        );
    }

    #[test]
    fn test_l1_cache_contents() {
        let context = test_support::epoch0_context();
        let l1 = context.l1_cache();
        assert_eq!(l1.len(), crate::L1_CACHE_SIZE / 4);
        assert_eq!(
            &l1[..8],
            &[
                690150178, 1181503948, 2248155602, 2118233073, 2193871115, 1791778428,
                1067701239, 724807309
            ]
        );
        assert_eq!(
            &l1[4088..4096],
            &[
                4245946955, 2423136806, 995622792, 1437744277, 2966650968, 1010418894,
                2452860578, 4192270981
            ]
        );
    }

    #[test]
    fn test_dataset_items() {
        let context = test_support::epoch0_context();
        let item0 = calculate_dataset_item_1024(&context, 0);
        assert_eq!(
            item0.to_hex(),
            "22db2229cc516c46d2210086f1ab417e0bd1c3827c5ecc6af7d3a33f8dae332b\
             ab5aa31fc58e71cff27666e81bf418775e74839743ca9d410fdf514d009bcec2\
             e5263184c4985ca0570d1ebdf507049e427dc86c7e96485739c0960a2ce4e6eb\
             386d5aa39471876225c23c5b69443f6d5db8120fe3204cedcfefd0347f69ec1d"
        );
        let far = calculate_dataset_item_1024(&context, 12345);
        assert_eq!(
            hex::encode(&far.as_bytes()[..32]),
            "e8ae10e1373d5c764d0c7ccfc6fbbbd7c51171c70ad78b2bc139e5140b2d3af3"
        );

        // a 2048-byte item is the fused pair of 1024-byte items
        let wide = calculate_dataset_item_2048(&context, 7);
        assert_eq!(
            hex::encode(&wide.as_bytes()[..32]),
            "42e55d40bcf6719b3f3303cd0522399a23bf4f1ae0d6358600d74b83fd433012"
        );
        let lo = calculate_dataset_item_1024(&context, 14);
        let hi = calculate_dataset_item_1024(&context, 15);
        assert_eq!(wide, Hash2048::from_hash1024s(&lo, &hi));

        // identical derivation from an independently built context
        let rebuilt = EpochContext::new(0, false).unwrap();
        assert_eq!(calculate_dataset_item_1024(&rebuilt, 12345), far);
    }

    #[test]
    fn test_lazy_lookup_serves_the_dataset_head() {
        let context = test_support::epoch0_context();
        for index in [0u32, 5, 127].iter().copied() {
            assert_eq!(
                context.lazy_lookup_1024(index),
                calculate_dataset_item_1024(&context, index)
            );
        }
        assert_eq!(
            context.lazy_lookup_1024(500),
            calculate_dataset_item_1024(&context, 500)
        );
    }

    #[test]
    fn test_ethash_hash_and_verify() {
        let context = test_support::epoch0_context();
        let header = Hash256::zero();
        let (final_hash, mix_hash) = hash(&context, &header, 0);
        assert_eq!(
            final_hash.to_hex(),
            "66168636ccf123558a858e585bf81400de28947be61d503c311dbb9d09703eed"
        );
        assert_eq!(
            mix_hash.to_hex(),
            "c763d8572dec8e75534d2007e265fa95f21be2912fa0625842683ef4329f9021"
        );

        // determinism
        assert_eq!(hash(&context, &header, 0), (final_hash, mix_hash));

        let boundary = final_hash;
        assert_eq!(
            verify_full(&context, &header, &mix_hash, 0, &boundary),
            VerificationResult::Ok
        );
        assert!(verify_light(&header, &mix_hash, 0, &boundary));

        // a lenient boundary exposes a bad mix as a mix failure
        let lenient = Hash256::from_bytes([0xff; 32]);
        let mut bad_mix = mix_hash;
        bad_mix.0[0] ^= 1;
        assert_eq!(
            verify_full(&context, &header, &bad_mix, 0, &lenient),
            VerificationResult::InvalidMixHash
        );
        // with an exact boundary the final hash moves first
        assert_eq!(
            verify_full(&context, &header, &bad_mix, 0, &boundary),
            VerificationResult::InvalidNonce
        );
    }

    #[test]
    fn test_context_registry_shares_one_instance() {
        let _guard = test_support::registry_lock();
        let first = get_epoch_context(0, false).unwrap();
        let second = get_epoch_context(0, false).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.epoch_number(), 0);
        assert!(!first.is_full());

        crossbeam_utils::thread::scope(|s| {
            let handle = s.spawn(|_| get_epoch_context(0, false).unwrap());
            let from_thread = handle.join().unwrap();
            assert!(Arc::ptr_eq(&first, &from_thread));
        })
        .unwrap();
    }

    #[test]
    fn test_explicit_context_cache() {
        let cache = EpochContextCache::new();
        let first = cache.get_context(0, false).unwrap();
        let second = cache.get_context(0, false).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_boundary_from_difficulty() {
        assert_eq!(
            boundary_from_difficulty(&BigUint::from(1u32)),
            Hash256::from_bytes([0xff; 32])
        );
        assert_eq!(
            boundary_from_difficulty(&BigUint::from(0u32)),
            Hash256::from_bytes([0xff; 32])
        );

        let half = boundary_from_difficulty(&BigUint::from(2u32));
        let mut expected = [0xffu8; 32];
        expected[0] = 0x7f;
        assert_eq!(half, Hash256::from_bytes(expected));

        let diff = BigUint::from(1u64 << 32);
        let shifted = boundary_from_difficulty(&diff);
        let mut expected = [0xffu8; 32];
        expected[..4].copy_from_slice(&[0, 0, 0, 0]);
        assert_eq!(shifted, Hash256::from_bytes(expected));
    }
}
