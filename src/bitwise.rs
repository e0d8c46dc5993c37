//! 32-bit bit manipulation primitives and the FNV mixing hashes.
//!
//! Everything here wraps modulo 2^32; the random math of the inner loop is
//! defined on exactly these semantics.

use bitintr::{Lzcnt, Popcnt};

/// FNV 32-bit prime.
pub const FNV_PRIME: u32 = 0x0100_0193;

/// FNV 32-bit offset basis.
pub const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;

/// Left circular rotation; the shift is reduced modulo 32.
#[inline(always)]
pub fn rotl32(n: u32, s: u32) -> u32 {
    n.rotate_left(s & 31)
}

/// Right circular rotation; the shift is reduced modulo 32.
#[inline(always)]
pub fn rotr32(n: u32, s: u32) -> u32 {
    n.rotate_right(s & 31)
}

/// Number of leading 0-bits, counted from the most significant bit.
/// Returns 32 for zero.
#[inline(always)]
pub fn clz32(v: u32) -> u32 {
    v.lzcnt()
}

/// Number of 1-bits.
#[inline(always)]
pub fn popcnt32(v: u32) -> u32 {
    v.popcnt()
}

/// Upper 32 bits of the 64-bit product of x and y.
#[inline(always)]
pub fn mul_hi32(x: u32, y: u32) -> u32 {
    ((u64::from(x) * u64::from(y)) >> 32) as u32
}

/// FNV-1 hash step.
///
/// See https://en.wikipedia.org/wiki/Fowler%E2%80%93Noll%E2%80%93Vo_hash_function#FNV-1_hash.
#[inline(always)]
pub fn fnv1(u: u32, v: u32) -> u32 {
    u.wrapping_mul(FNV_PRIME) ^ v
}

/// FNV-1a hash step.
///
/// See https://en.wikipedia.org/wiki/Fowler%E2%80%93Noll%E2%80%93Vo_hash_function#FNV-1a_hash.
#[inline(always)]
pub fn fnv1a(u: u32, v: u32) -> u32 {
    (u ^ v).wrapping_mul(FNV_PRIME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_rotations() {
        assert_eq!(rotl32(0x8000_0001, 1), 0x0000_0003);
        assert_eq!(rotr32(0x0000_0003, 1), 0x8000_0001);
        assert_eq!(rotl32(0x1234_5678, 32), 0x1234_5678);
        assert_eq!(rotl32(0x1234_5678, 33), rotl32(0x1234_5678, 1));
        assert_eq!(rotr32(0x1234_5678, 47), rotr32(0x1234_5678, 15));
    }

    #[test]
    fn test_clz_and_popcnt() {
        assert_eq!(clz32(0), 32);
        assert_eq!(clz32(1), 31);
        assert_eq!(clz32(0x8000_0000), 0);
        assert_eq!(clz32(0x0001_0000), 15);
        assert_eq!(popcnt32(0), 0);
        assert_eq!(popcnt32(0xffff_ffff), 32);
        assert_eq!(popcnt32(0x8000_0001), 2);
    }

    #[test]
    fn test_mul_hi32() {
        assert_eq!(mul_hi32(0, 0xffff_ffff), 0);
        assert_eq!(mul_hi32(0xffff_ffff, 0xffff_ffff), 0xffff_fffe);
        assert_eq!(mul_hi32(0x1234_5678, 0x9abc_def0), 0x0b00_ea4e);
    }

    #[test]
    fn test_fnv_reference_values() {
        assert_eq!(fnv1(FNV_OFFSET_BASIS, 0x1234_5678), 0x1738_0b67);
        assert_eq!(fnv1a(FNV_OFFSET_BASIS, 0x1234_5678), 0x6638_ba87);
        assert_eq!(fnv1(0xdead_beef, 0xcafe_babe), 0xb07d_2883);
        assert_eq!(fnv1a(0xdead_beef, 0xcafe_babe), 0x4faf_cb83);
    }

    #[test]
    fn test_fnv_matches_wide_oracle() {
        let mut rng = rand::thread_rng();
        for _ in 0..10_000 {
            let u: u32 = rng.gen();
            let v: u32 = rng.gen();
            let wide1 = ((u64::from(u) * u64::from(FNV_PRIME)) as u32) ^ v;
            let wide1a = ((u64::from(u ^ v) * u64::from(FNV_PRIME)) & 0xffff_ffff) as u32;
            assert_eq!(fnv1(u, v), wide1);
            assert_eq!(fnv1a(u, v), wide1a);
        }
    }
}
