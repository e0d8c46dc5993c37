//! The keccak-f[1600] and keccak-f[800] permutations and the sponge-mode
//! Keccak-256 / Keccak-512 wrappers built on them (original Keccak padding,
//! not SHA-3).
//!
//! The permutations follow the "simple" implementation by Ronny Van Keer
//! from the Keccak reference code: two rounds unrolled per loop iteration,
//! state held in locals. On x86-64 a BMI/BMI2-compiled copy is selected
//! once at first use and dispatched through a function pointer; selection
//! never changes results.

use crate::hash_types::{Hash256, Hash512};
use byteorder::{ByteOrder, LittleEndian};
use once_cell::sync::Lazy;

const ROUND_CONSTANTS_64: [u64; 24] = [
    0x0000000000000001, 0x0000000000008082, 0x800000000000808a, 0x8000000080008000,
    0x000000000000808b, 0x0000000080000001, 0x8000000080008081, 0x8000000000008009,
    0x000000000000008a, 0x0000000000000088, 0x0000000080008009, 0x000000008000000a,
    0x000000008000808b, 0x800000000000008b, 0x8000000000008089, 0x8000000000008003,
    0x8000000000008002, 0x8000000000000080, 0x000000000000800a, 0x800000008000000a,
    0x8000000080008081, 0x8000000000008080, 0x0000000080000001, 0x8000000080008008,
];

const ROUND_CONSTANTS_32: [u32; 22] = [
    0x00000001, 0x00008082, 0x0000808A, 0x80008000, 0x0000808B, 0x80000001,
    0x80008081, 0x00008009, 0x0000008A, 0x00000088, 0x80008009, 0x8000000A,
    0x8000808B, 0x0000008B, 0x00008089, 0x00008003, 0x00008002, 0x00000080,
    0x0000800A, 0x8000000A, 0x80008081, 0x00008080,
];

type PermutationFn64 = fn(&mut [u64; 25]);
type PermutationFn32 = fn(&mut [u32; 25]);

fn keccakf1600_generic(state: &mut [u64; 25]) {
    keccakf1600_rounds(state);
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "bmi1,bmi2")]
unsafe fn keccakf1600_bmi(state: &mut [u64; 25]) {
    keccakf1600_rounds(state);
}

fn keccakf800_generic(state: &mut [u32; 25]) {
    keccakf800_rounds(state);
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "bmi1,bmi2")]
unsafe fn keccakf800_bmi(state: &mut [u32; 25]) {
    keccakf800_rounds(state);
}

// Some CPUs incorrectly report BMI2 but not BMI being available, so both
// flags are checked before switching implementations.
static KECCAKF1600_IMPL: Lazy<PermutationFn64> = Lazy::new(|| -> PermutationFn64 {
    #[cfg(target_arch = "x86_64")]
    {
        if std::is_x86_feature_detected!("bmi1") && std::is_x86_feature_detected!("bmi2") {
            return |state: &mut [u64; 25]| unsafe { keccakf1600_bmi(state) };
        }
    }
    keccakf1600_generic
});

static KECCAKF800_IMPL: Lazy<PermutationFn32> = Lazy::new(|| -> PermutationFn32 {
    #[cfg(target_arch = "x86_64")]
    {
        if std::is_x86_feature_detected!("bmi1") && std::is_x86_feature_detected!("bmi2") {
            return |state: &mut [u32; 25]| unsafe { keccakf800_bmi(state) };
        }
    }
    keccakf800_generic
});

/// The keccak-f[1600] permutation over 25 64-bit words.
pub fn keccakf1600(state: &mut [u64; 25]) {
    (*KECCAKF1600_IMPL)(state)
}

/// The keccak-f[800] permutation over 25 32-bit words, 22 rounds.
pub fn keccakf800(state: &mut [u32; 25]) {
    (*KECCAKF800_IMPL)(state)
}

/// Absorbs `input` at the bitrate for a `bits`-bit digest, applies the
/// original Keccak padding and squeezes `out.len()` words.
fn keccak_sponge(bits: usize, mut input: &[u8], out: &mut [u64]) {
    let block_size = (1600 - bits * 2) / 8;
    let block_words = block_size / 8;

    let mut state = [0u64; 25];

    while input.len() >= block_size {
        for i in 0..block_words {
            state[i] ^= LittleEndian::read_u64(&input[i * 8..]);
        }
        keccakf1600(&mut state);
        input = &input[block_size..];
    }

    let mut word_index = 0;
    while input.len() >= 8 {
        state[word_index] ^= LittleEndian::read_u64(input);
        word_index += 1;
        input = &input[8..];
    }

    let mut last_word = [0u8; 8];
    last_word[..input.len()].copy_from_slice(input);
    last_word[input.len()] = 0x01;
    state[word_index] ^= LittleEndian::read_u64(&last_word);
    state[block_words - 1] ^= 0x8000_0000_0000_0000;

    keccakf1600(&mut state);

    for (i, word) in out.iter_mut().enumerate() {
        *word = state[i];
    }
}

pub fn keccak256(input: &[u8]) -> Hash256 {
    let mut words = [0u64; 4];
    keccak_sponge(256, input, &mut words);
    let mut bytes = [0u8; 32];
    LittleEndian::write_u64_into(&words, &mut bytes);
    Hash256::from_bytes(bytes)
}

pub fn keccak512(input: &[u8]) -> Hash512 {
    let mut words = [0u64; 8];
    keccak_sponge(512, input, &mut words);
    let mut bytes = [0u8; 64];
    LittleEndian::write_u64_into(&words, &mut bytes);
    Hash512::from_bytes(bytes)
}

/// Keccak-256 of a fixed 256-bit digest, as used by the epoch seed chain.
pub fn keccak256_32(input: &Hash256) -> Hash256 {
    keccak256(input.as_bytes())
}

/// Keccak-512 of a fixed 512-bit digest, as used by the light cache chain.
pub fn keccak512_64(input: &Hash512) -> Hash512 {
    keccak512(input.as_bytes())
}

#[inline(always)]
fn keccakf1600_rounds(state: &mut [u64; 25]) {
    let mut aba = state[0];
    let mut abe = state[1];
    let mut abi = state[2];
    let mut abo = state[3];
    let mut abu = state[4];
    let mut aga = state[5];
    let mut age = state[6];
    let mut agi = state[7];
    let mut ago = state[8];
    let mut agu = state[9];
    let mut aka = state[10];
    let mut ake = state[11];
    let mut aki = state[12];
    let mut ako = state[13];
    let mut aku = state[14];
    let mut ama = state[15];
    let mut ame = state[16];
    let mut ami = state[17];
    let mut amo = state[18];
    let mut amu = state[19];
    let mut asa = state[20];
    let mut ase = state[21];
    let mut asi = state[22];
    let mut aso = state[23];
    let mut asu = state[24];
    let mut eba;
    let mut ebe;
    let mut ebi;
    let mut ebo;
    let mut ebu;
    let mut ega;
    let mut ege;
    let mut egi;
    let mut ego;
    let mut egu;
    let mut eka;
    let mut eke;
    let mut eki;
    let mut eko;
    let mut eku;
    let mut ema;
    let mut eme;
    let mut emi;
    let mut emo;
    let mut emu;
    let mut esa;
    let mut ese;
    let mut esi;
    let mut eso;
    let mut esu;
    let mut b0;
    let mut b1;
    let mut b2;
    let mut b3;
    let mut b4;
    let mut d0;
    let mut d1;
    let mut d2;
    let mut d3;
    let mut d4;

    for n in (0..24).step_by(2) {
        // round n: a -> e
        b0 = aba ^ aga ^ aka ^ ama ^ asa;
        b1 = abe ^ age ^ ake ^ ame ^ ase;
        b2 = abi ^ agi ^ aki ^ ami ^ asi;
        b3 = abo ^ ago ^ ako ^ amo ^ aso;
        b4 = abu ^ agu ^ aku ^ amu ^ asu;
        d0 = b4 ^ b1.rotate_left(1);
        d1 = b0 ^ b2.rotate_left(1);
        d2 = b1 ^ b3.rotate_left(1);
        d3 = b2 ^ b4.rotate_left(1);
        d4 = b3 ^ b0.rotate_left(1);

        b0 = aba ^ d0;
        b1 = (age ^ d1).rotate_left(44);
        b2 = (aki ^ d2).rotate_left(43);
        b3 = (amo ^ d3).rotate_left(21);
        b4 = (asu ^ d4).rotate_left(14);
        eba = b0 ^ (!b1 & b2) ^ ROUND_CONSTANTS_64[n];
        ebe = b1 ^ (!b2 & b3);
        ebi = b2 ^ (!b3 & b4);
        ebo = b3 ^ (!b4 & b0);
        ebu = b4 ^ (!b0 & b1);

        b0 = (abo ^ d3).rotate_left(28);
        b1 = (agu ^ d4).rotate_left(20);
        b2 = (aka ^ d0).rotate_left(3);
        b3 = (ame ^ d1).rotate_left(45);
        b4 = (asi ^ d2).rotate_left(61);
        ega = b0 ^ (!b1 & b2);
        ege = b1 ^ (!b2 & b3);
        egi = b2 ^ (!b3 & b4);
        ego = b3 ^ (!b4 & b0);
        egu = b4 ^ (!b0 & b1);

        b0 = (abe ^ d1).rotate_left(1);
        b1 = (agi ^ d2).rotate_left(6);
        b2 = (ako ^ d3).rotate_left(25);
        b3 = (amu ^ d4).rotate_left(8);
        b4 = (asa ^ d0).rotate_left(18);
        eka = b0 ^ (!b1 & b2);
        eke = b1 ^ (!b2 & b3);
        eki = b2 ^ (!b3 & b4);
        eko = b3 ^ (!b4 & b0);
        eku = b4 ^ (!b0 & b1);

        b0 = (abu ^ d4).rotate_left(27);
        b1 = (aga ^ d0).rotate_left(36);
        b2 = (ake ^ d1).rotate_left(10);
        b3 = (ami ^ d2).rotate_left(15);
        b4 = (aso ^ d3).rotate_left(56);
        ema = b0 ^ (!b1 & b2);
        eme = b1 ^ (!b2 & b3);
        emi = b2 ^ (!b3 & b4);
        emo = b3 ^ (!b4 & b0);
        emu = b4 ^ (!b0 & b1);

        b0 = (abi ^ d2).rotate_left(62);
        b1 = (ago ^ d3).rotate_left(55);
        b2 = (aku ^ d4).rotate_left(39);
        b3 = (ama ^ d0).rotate_left(41);
        b4 = (ase ^ d1).rotate_left(2);
        esa = b0 ^ (!b1 & b2);
        ese = b1 ^ (!b2 & b3);
        esi = b2 ^ (!b3 & b4);
        eso = b3 ^ (!b4 & b0);
        esu = b4 ^ (!b0 & b1);

        // round n + 1: e -> a
        b0 = eba ^ ega ^ eka ^ ema ^ esa;
        b1 = ebe ^ ege ^ eke ^ eme ^ ese;
        b2 = ebi ^ egi ^ eki ^ emi ^ esi;
        b3 = ebo ^ ego ^ eko ^ emo ^ eso;
        b4 = ebu ^ egu ^ eku ^ emu ^ esu;
        d0 = b4 ^ b1.rotate_left(1);
        d1 = b0 ^ b2.rotate_left(1);
        d2 = b1 ^ b3.rotate_left(1);
        d3 = b2 ^ b4.rotate_left(1);
        d4 = b3 ^ b0.rotate_left(1);

        b0 = eba ^ d0;
        b1 = (ege ^ d1).rotate_left(44);
        b2 = (eki ^ d2).rotate_left(43);
        b3 = (emo ^ d3).rotate_left(21);
        b4 = (esu ^ d4).rotate_left(14);
        aba = b0 ^ (!b1 & b2) ^ ROUND_CONSTANTS_64[n + 1];
        abe = b1 ^ (!b2 & b3);
        abi = b2 ^ (!b3 & b4);
        abo = b3 ^ (!b4 & b0);
        abu = b4 ^ (!b0 & b1);

        b0 = (ebo ^ d3).rotate_left(28);
        b1 = (egu ^ d4).rotate_left(20);
        b2 = (eka ^ d0).rotate_left(3);
        b3 = (eme ^ d1).rotate_left(45);
        b4 = (esi ^ d2).rotate_left(61);
        aga = b0 ^ (!b1 & b2);
        age = b1 ^ (!b2 & b3);
        agi = b2 ^ (!b3 & b4);
        ago = b3 ^ (!b4 & b0);
        agu = b4 ^ (!b0 & b1);

        b0 = (ebe ^ d1).rotate_left(1);
        b1 = (egi ^ d2).rotate_left(6);
        b2 = (eko ^ d3).rotate_left(25);
        b3 = (emu ^ d4).rotate_left(8);
        b4 = (esa ^ d0).rotate_left(18);
        aka = b0 ^ (!b1 & b2);
        ake = b1 ^ (!b2 & b3);
        aki = b2 ^ (!b3 & b4);
        ako = b3 ^ (!b4 & b0);
        aku = b4 ^ (!b0 & b1);

        b0 = (ebu ^ d4).rotate_left(27);
        b1 = (ega ^ d0).rotate_left(36);
        b2 = (eke ^ d1).rotate_left(10);
        b3 = (emi ^ d2).rotate_left(15);
        b4 = (eso ^ d3).rotate_left(56);
        ama = b0 ^ (!b1 & b2);
        ame = b1 ^ (!b2 & b3);
        ami = b2 ^ (!b3 & b4);
        amo = b3 ^ (!b4 & b0);
        amu = b4 ^ (!b0 & b1);

        b0 = (ebi ^ d2).rotate_left(62);
        b1 = (ego ^ d3).rotate_left(55);
        b2 = (eku ^ d4).rotate_left(39);
        b3 = (ema ^ d0).rotate_left(41);
        b4 = (ese ^ d1).rotate_left(2);
        asa = b0 ^ (!b1 & b2);
        ase = b1 ^ (!b2 & b3);
        asi = b2 ^ (!b3 & b4);
        aso = b3 ^ (!b4 & b0);
        asu = b4 ^ (!b0 & b1);
    }

    state[0] = aba;
    state[1] = abe;
    state[2] = abi;
    state[3] = abo;
    state[4] = abu;
    state[5] = aga;
    state[6] = age;
    state[7] = agi;
    state[8] = ago;
    state[9] = agu;
    state[10] = aka;
    state[11] = ake;
    state[12] = aki;
    state[13] = ako;
    state[14] = aku;
    state[15] = ama;
    state[16] = ame;
    state[17] = ami;
    state[18] = amo;
    state[19] = amu;
    state[20] = asa;
    state[21] = ase;
    state[22] = asi;
    state[23] = aso;
    state[24] = asu;
}

#[inline(always)]
fn keccakf800_rounds(state: &mut [u32; 25]) {
    let mut aba = state[0];
    let mut abe = state[1];
    let mut abi = state[2];
    let mut abo = state[3];
    let mut abu = state[4];
    let mut aga = state[5];
    let mut age = state[6];
    let mut agi = state[7];
    let mut ago = state[8];
    let mut agu = state[9];
    let mut aka = state[10];
    let mut ake = state[11];
    let mut aki = state[12];
    let mut ako = state[13];
    let mut aku = state[14];
    let mut ama = state[15];
    let mut ame = state[16];
    let mut ami = state[17];
    let mut amo = state[18];
    let mut amu = state[19];
    let mut asa = state[20];
    let mut ase = state[21];
    let mut asi = state[22];
    let mut aso = state[23];
    let mut asu = state[24];
    let mut eba;
    let mut ebe;
    let mut ebi;
    let mut ebo;
    let mut ebu;
    let mut ega;
    let mut ege;
    let mut egi;
    let mut ego;
    let mut egu;
    let mut eka;
    let mut eke;
    let mut eki;
    let mut eko;
    let mut eku;
    let mut ema;
    let mut eme;
    let mut emi;
    let mut emo;
    let mut emu;
    let mut esa;
    let mut ese;
    let mut esi;
    let mut eso;
    let mut esu;
    let mut b0;
    let mut b1;
    let mut b2;
    let mut b3;
    let mut b4;
    let mut d0;
    let mut d1;
    let mut d2;
    let mut d3;
    let mut d4;

    for n in (0..22).step_by(2) {
        // round n: a -> e
        b0 = aba ^ aga ^ aka ^ ama ^ asa;
        b1 = abe ^ age ^ ake ^ ame ^ ase;
        b2 = abi ^ agi ^ aki ^ ami ^ asi;
        b3 = abo ^ ago ^ ako ^ amo ^ aso;
        b4 = abu ^ agu ^ aku ^ amu ^ asu;
        d0 = b4 ^ b1.rotate_left(1);
        d1 = b0 ^ b2.rotate_left(1);
        d2 = b1 ^ b3.rotate_left(1);
        d3 = b2 ^ b4.rotate_left(1);
        d4 = b3 ^ b0.rotate_left(1);

        b0 = aba ^ d0;
        b1 = (age ^ d1).rotate_left(12);
        b2 = (aki ^ d2).rotate_left(11);
        b3 = (amo ^ d3).rotate_left(21);
        b4 = (asu ^ d4).rotate_left(14);
        eba = b0 ^ (!b1 & b2) ^ ROUND_CONSTANTS_32[n];
        ebe = b1 ^ (!b2 & b3);
        ebi = b2 ^ (!b3 & b4);
        ebo = b3 ^ (!b4 & b0);
        ebu = b4 ^ (!b0 & b1);

        b0 = (abo ^ d3).rotate_left(28);
        b1 = (agu ^ d4).rotate_left(20);
        b2 = (aka ^ d0).rotate_left(3);
        b3 = (ame ^ d1).rotate_left(13);
        b4 = (asi ^ d2).rotate_left(29);
        ega = b0 ^ (!b1 & b2);
        ege = b1 ^ (!b2 & b3);
        egi = b2 ^ (!b3 & b4);
        ego = b3 ^ (!b4 & b0);
        egu = b4 ^ (!b0 & b1);

        b0 = (abe ^ d1).rotate_left(1);
        b1 = (agi ^ d2).rotate_left(6);
        b2 = (ako ^ d3).rotate_left(25);
        b3 = (amu ^ d4).rotate_left(8);
        b4 = (asa ^ d0).rotate_left(18);
        eka = b0 ^ (!b1 & b2);
        eke = b1 ^ (!b2 & b3);
        eki = b2 ^ (!b3 & b4);
        eko = b3 ^ (!b4 & b0);
        eku = b4 ^ (!b0 & b1);

        b0 = (abu ^ d4).rotate_left(27);
        b1 = (aga ^ d0).rotate_left(4);
        b2 = (ake ^ d1).rotate_left(10);
        b3 = (ami ^ d2).rotate_left(15);
        b4 = (aso ^ d3).rotate_left(24);
        ema = b0 ^ (!b1 & b2);
        eme = b1 ^ (!b2 & b3);
        emi = b2 ^ (!b3 & b4);
        emo = b3 ^ (!b4 & b0);
        emu = b4 ^ (!b0 & b1);

        b0 = (abi ^ d2).rotate_left(30);
        b1 = (ago ^ d3).rotate_left(23);
        b2 = (aku ^ d4).rotate_left(7);
        b3 = (ama ^ d0).rotate_left(9);
        b4 = (ase ^ d1).rotate_left(2);
        esa = b0 ^ (!b1 & b2);
        ese = b1 ^ (!b2 & b3);
        esi = b2 ^ (!b3 & b4);
        eso = b3 ^ (!b4 & b0);
        esu = b4 ^ (!b0 & b1);

        // round n + 1: e -> a
        b0 = eba ^ ega ^ eka ^ ema ^ esa;
        b1 = ebe ^ ege ^ eke ^ eme ^ ese;
        b2 = ebi ^ egi ^ eki ^ emi ^ esi;
        b3 = ebo ^ ego ^ eko ^ emo ^ eso;
        b4 = ebu ^ egu ^ eku ^ emu ^ esu;
        d0 = b4 ^ b1.rotate_left(1);
        d1 = b0 ^ b2.rotate_left(1);
        d2 = b1 ^ b3.rotate_left(1);
        d3 = b2 ^ b4.rotate_left(1);
        d4 = b3 ^ b0.rotate_left(1);

        b0 = eba ^ d0;
        b1 = (ege ^ d1).rotate_left(12);
        b2 = (eki ^ d2).rotate_left(11);
        b3 = (emo ^ d3).rotate_left(21);
        b4 = (esu ^ d4).rotate_left(14);
        aba = b0 ^ (!b1 & b2) ^ ROUND_CONSTANTS_32[n + 1];
        abe = b1 ^ (!b2 & b3);
        abi = b2 ^ (!b3 & b4);
        abo = b3 ^ (!b4 & b0);
        abu = b4 ^ (!b0 & b1);

        b0 = (ebo ^ d3).rotate_left(28);
        b1 = (egu ^ d4).rotate_left(20);
        b2 = (eka ^ d0).rotate_left(3);
        b3 = (eme ^ d1).rotate_left(13);
        b4 = (esi ^ d2).rotate_left(29);
        aga = b0 ^ (!b1 & b2);
        age = b1 ^ (!b2 & b3);
        agi = b2 ^ (!b3 & b4);
        ago = b3 ^ (!b4 & b0);
        agu = b4 ^ (!b0 & b1);

        b0 = (ebe ^ d1).rotate_left(1);
        b1 = (egi ^ d2).rotate_left(6);
        b2 = (eko ^ d3).rotate_left(25);
        b3 = (emu ^ d4).rotate_left(8);
        b4 = (esa ^ d0).rotate_left(18);
        aka = b0 ^ (!b1 & b2);
        ake = b1 ^ (!b2 & b3);
        aki = b2 ^ (!b3 & b4);
        ako = b3 ^ (!b4 & b0);
        aku = b4 ^ (!b0 & b1);

        b0 = (ebu ^ d4).rotate_left(27);
        b1 = (ega ^ d0).rotate_left(4);
        b2 = (eke ^ d1).rotate_left(10);
        b3 = (emi ^ d2).rotate_left(15);
        b4 = (eso ^ d3).rotate_left(24);
        ama = b0 ^ (!b1 & b2);
        ame = b1 ^ (!b2 & b3);
        ami = b2 ^ (!b3 & b4);
        amo = b3 ^ (!b4 & b0);
        amu = b4 ^ (!b0 & b1);

        b0 = (ebi ^ d2).rotate_left(30);
        b1 = (ego ^ d3).rotate_left(23);
        b2 = (eku ^ d4).rotate_left(7);
        b3 = (ema ^ d0).rotate_left(9);
        b4 = (ese ^ d1).rotate_left(2);
        asa = b0 ^ (!b1 & b2);
        ase = b1 ^ (!b2 & b3);
        asi = b2 ^ (!b3 & b4);
        aso = b3 ^ (!b4 & b0);
        asu = b4 ^ (!b0 & b1);
    }

    state[0] = aba;
    state[1] = abe;
    state[2] = abi;
    state[3] = abo;
    state[4] = abu;
    state[5] = aga;
    state[6] = age;
    state[7] = agi;
    state[8] = ago;
    state[9] = agu;
    state[10] = aka;
    state[11] = ake;
    state[12] = aki;
    state[13] = ako;
    state[14] = aku;
    state[15] = ama;
    state[16] = ame;
    state[17] = ami;
    state[18] = amo;
    state[19] = amu;
    state[20] = asa;
    state[21] = ase;
    state[22] = asi;
    state[23] = aso;
    state[24] = asu;
}
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak256_reference_digests() {
        // Keccak (pre-SHA-3 padding) digests of the classic inputs.
        assert_eq!(
            keccak256(b"").to_hex(),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
        assert_eq!(
            keccak256(b"The quick brown fox jumps over the lazy dog").to_hex(),
            "4d741b6f1eb29cb2a9b9911c82f56fa8d73b04959d3d9d222895df6c0b28aa15"
        );
    }

    #[test]
    fn test_keccak512_empty_digest() {
        assert_eq!(
            keccak512(b"").to_hex(),
            "0eab42de4c3ceb9235fc91acffe746b29c29a8c366b7c60e4e67c466f36a4304\
             c00fa9caf9d87976ba469bcbe06713b435f091ef2769fb160cdab33d3670680e"
        );
    }

    #[test]
    fn test_multi_block_absorption() {
        // 512 bytes spans several rate blocks for both digest widths.
        let mut data = [0u8; 512];
        for (i, byte) in data.iter_mut().enumerate() {
            *byte = i as u8;
        }
        assert_eq!(
            keccak256(&data).to_hex(),
            "f55ba327291604f0e5be6651752398b7be2331aad65f5763ce067df95cc13be1"
        );
        assert_eq!(
            keccak512(&data).to_hex(),
            "6f317fd02d2e47a9a2e0aef8ad4f18d17656e8bcc2251599a5767a19fbeda91b\
             496fe56b286cdb26d74f42f0226f8f8da2f6c24987e55f1badb02c4b60991785"
        );
        // 200 bytes leaves a partial last word in the final block.
        assert_eq!(
            keccak256(&data[..200]).to_hex(),
            "bfb0aa97863e797943cf7c33bb7e880bb4543f3d2703c0923c6901c2af57b890"
        );
    }

    #[test]
    fn test_keccakf800_zero_state() {
        let mut state = [0u32; 25];
        keccakf800(&mut state);
        let expected: [u32; 25] = [
            0xe531d45d, 0xf404c6fb, 0x23a0bf99, 0xf1f8452f, 0x51ffd042,
            0xe539f578, 0xf00b80a7, 0xaf973664, 0xbf5af34c, 0x227a2424,
            0x88172715, 0x9f685884, 0xb15cd054, 0x1bf4fc0e, 0x6166fa91,
            0x1a9e599a, 0xa3970a1f, 0xab659687, 0xafab8d68, 0xe74b1015,
            0x34001a98, 0x4119eff3, 0x930a0e76, 0x87b28070, 0x11efe996,
        ];
        assert_eq!(state, expected);
    }

    #[test]
    fn test_keccakf1600_zero_state() {
        let mut state = [0u64; 25];
        keccakf1600(&mut state);
        let expected_head: [u64; 8] = [
            0xf1258f7940e1dde7, 0x84d5ccf933c0478a, 0xd598261ea65aa9ee, 0xbd1547306f80494d,
            0x8b284e056253d057, 0xff97a42d7f8e6fd4, 0x90fee5a0a44647c4, 0x8c5bda0cd6192e76,
        ];
        assert_eq!(&state[..8], &expected_head);
    }

    #[test]
    fn test_fixed_digest_wrappers() {
        let h = keccak256(b"seed chain");
        assert_eq!(keccak256_32(&h), keccak256(h.as_bytes()));
        let w = keccak512(b"cache chain");
        assert_eq!(keccak512_64(&w), keccak512(w.as_bytes()));
    }
}
