//! Fixed-size digests with explicit little-endian word views.
//!
//! Digests are stored byte-for-byte as received from the network. Every
//! word-level read or write goes through an explicit little-endian
//! conversion so host endianness never leaks into results.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use std::fmt;

macro_rules! hash_type {
    ($name:ident, $size:expr) => {
        #[derive(Clone, Copy, PartialEq, Eq)]
        pub struct $name(pub [u8; $size]);

        impl $name {
            pub const SIZE: usize = $size;

            pub const fn zero() -> Self {
                $name([0u8; $size])
            }

            pub fn from_bytes(bytes: [u8; $size]) -> Self {
                $name(bytes)
            }

            pub fn as_bytes(&self) -> &[u8; $size] {
                &self.0
            }

            /// The i-th 32-bit word of the little-endian word view.
            pub fn word32(&self, i: usize) -> u32 {
                LittleEndian::read_u32(&self.0[i * 4..i * 4 + 4])
            }

            /// The i-th 64-bit word of the little-endian word view.
            pub fn word64(&self, i: usize) -> u64 {
                LittleEndian::read_u64(&self.0[i * 8..i * 8 + 8])
            }

            pub fn to_word32s(&self) -> [u32; $size / 4] {
                let mut words = [0u32; $size / 4];
                LittleEndian::read_u32_into(&self.0, &mut words);
                words
            }

            pub fn from_word32s(words: &[u32; $size / 4]) -> Self {
                let mut bytes = [0u8; $size];
                LittleEndian::write_u32_into(words, &mut bytes);
                $name(bytes)
            }

            pub fn to_hex(&self) -> String {
                hex::encode(&self.0[..])
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::zero()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}(0x{})", stringify!($name), self.to_hex())
            }
        }
    };
}

hash_type!(Hash256, 32);
hash_type!(Hash512, 64);
hash_type!(Hash1024, 128);
hash_type!(Hash2048, 256);

impl Hash256 {
    pub fn from_hex(input: &str) -> Option<Self> {
        let input = input.trim_start_matches("0x");
        let decoded = hex::decode(input).ok()?;
        if decoded.len() != Self::SIZE {
            return None;
        }
        let mut bytes = [0u8; Self::SIZE];
        bytes.copy_from_slice(&decoded);
        Some(Hash256(bytes))
    }

    /// 256-bit unsigned `self <= other` in big-endian byte order, as used
    /// for the boundary check.
    pub fn less_or_equal(&self, other: &Hash256) -> bool {
        for i in 0..4 {
            let a = BigEndian::read_u64(&self.0[i * 8..]);
            let b = BigEndian::read_u64(&other.0[i * 8..]);
            if a > b {
                return false;
            }
            if a < b {
                return true;
            }
        }
        true
    }

    /// Decodes a Bitcoin-style compact bits target into a boundary hash.
    ///
    /// Returns the boundary plus the negative and overflow flags the chain
    /// rules check before accepting a header.
    pub fn from_compact(nbits: u32) -> (Self, bool, bool) {
        let size = nbits >> 24;
        let mut word = nbits & 0x007f_ffff;

        let mut res = Hash256::zero();
        if size <= 3 {
            word >>= 8 * (3 - size);
            BigEndian::write_u32(&mut res.0[28..32], word);
        } else {
            BigEndian::write_u32(&mut res.0[28..32], word);
            res.shift_left(8 * (size - 3));
        }

        let negative = word != 0 && (nbits & 0x0080_0000) != 0;
        let overflow = word != 0
            && (size > 34 || (word > 0xff && size > 33) || (word > 0xffff && size > 32));
        (res, negative, overflow)
    }

    fn shift_left(&mut self, bits: u32) {
        if bits == 0 {
            return;
        }
        let mut tmp = [0u64; 4];
        for i in 0..4 {
            tmp[i] = BigEndian::read_u64(&self.0[i * 8..]);
        }
        self.0 = [0u8; Self::SIZE];

        let jump = (bits / 64) as usize;
        let shift = bits % 64;
        for i in (jump..4).rev() {
            if shift != 0 && i >= jump + 1 {
                let spill = tmp[i] >> (64 - shift);
                let idx = i - jump - 1;
                let prev = BigEndian::read_u64(&self.0[idx * 8..]);
                BigEndian::write_u64(&mut self.0[idx * 8..idx * 8 + 8], prev | spill);
            }
            let idx = i - jump;
            let prev = BigEndian::read_u64(&self.0[idx * 8..]);
            BigEndian::write_u64(&mut self.0[idx * 8..idx * 8 + 8], prev | (tmp[i] << shift));
        }
    }
}

impl Hash1024 {
    pub fn from_hash512s(a: &Hash512, b: &Hash512) -> Self {
        let mut bytes = [0u8; Self::SIZE];
        bytes[..Hash512::SIZE].copy_from_slice(a.as_bytes());
        bytes[Hash512::SIZE..].copy_from_slice(b.as_bytes());
        Hash1024(bytes)
    }
}

impl Hash2048 {
    pub fn from_hash1024s(a: &Hash1024, b: &Hash1024) -> Self {
        let mut bytes = [0u8; Self::SIZE];
        bytes[..Hash1024::SIZE].copy_from_slice(a.as_bytes());
        bytes[Hash1024::SIZE..].copy_from_slice(b.as_bytes());
        Hash2048(bytes)
    }

    pub fn from_hash512s(parts: [&Hash512; 4]) -> Self {
        let mut bytes = [0u8; Self::SIZE];
        for (chunk, part) in bytes.chunks_exact_mut(Hash512::SIZE).zip(parts.iter()) {
            chunk.copy_from_slice(part.as_bytes());
        }
        Hash2048(bytes)
    }
}
