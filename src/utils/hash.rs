use serde::{Deserialize, Serialize};
use std::fmt;

/// 128 bit signature of an individual, built from two 64 bit halves.
///
/// Identical signatures mean (with very high probability) equivalent
/// programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Signature {
    pub data: [u64; 2],
}

impl Signature {
    pub fn new(a: u64, b: u64) -> Self {
        Self { data: [a, b] }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}{:016x}", self.data[0], self.data[1])
    }
}

const C1: u64 = 0x87c3_7b91_1142_53d5;
const C2: u64 = 0x4cf5_ad43_2745_937f;

#[inline]
fn fmix64(mut k: u64) -> u64 {
    k ^= k >> 33;
    k = k.wrapping_mul(0xff51_afd7_ed55_8ccd);
    k ^= k >> 33;
    k = k.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    k ^= k >> 33;
    k
}

/// MurmurHash3 (x64, 128 bit variant) of `data`.
pub fn murmur3_128(data: &[u8], seed: u64) -> Signature {
    let len = data.len();
    let n_blocks = len / 16;

    let mut h1 = seed;
    let mut h2 = seed;

    for block in data.chunks_exact(16) {
        let mut k1 = u64::from_le_bytes([
            block[0], block[1], block[2], block[3], block[4], block[5], block[6], block[7],
        ]);
        let mut k2 = u64::from_le_bytes([
            block[8], block[9], block[10], block[11], block[12], block[13], block[14], block[15],
        ]);

        k1 = k1.wrapping_mul(C1).rotate_left(31).wrapping_mul(C2);
        h1 ^= k1;
        h1 = h1
            .rotate_left(27)
            .wrapping_add(h2)
            .wrapping_mul(5)
            .wrapping_add(0x52dc_e729);

        k2 = k2.wrapping_mul(C2).rotate_left(33).wrapping_mul(C1);
        h2 ^= k2;
        h2 = h2
            .rotate_left(31)
            .wrapping_add(h1)
            .wrapping_mul(5)
            .wrapping_add(0x3849_5ab5);
    }

    let tail = &data[n_blocks * 16..];
    let mut k1: u64 = 0;
    let mut k2: u64 = 0;

    for (i, &byte) in tail.iter().enumerate().rev() {
        if i >= 8 {
            k2 ^= u64::from(byte) << ((i - 8) * 8);
        } else {
            k1 ^= u64::from(byte) << (i * 8);
        }
    }
    if tail.len() > 8 {
        k2 = k2.wrapping_mul(C2).rotate_left(33).wrapping_mul(C1);
        h2 ^= k2;
    }
    if !tail.is_empty() {
        k1 = k1.wrapping_mul(C1).rotate_left(31).wrapping_mul(C2);
        h1 ^= k1;
    }

    h1 ^= len as u64;
    h2 ^= len as u64;

    h1 = h1.wrapping_add(h2);
    h2 = h2.wrapping_add(h1);

    h1 = fmix64(h1);
    h2 = fmix64(h2);

    h1 = h1.wrapping_add(h2);
    h2 = h2.wrapping_add(h1);

    Signature::new(h1, h2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_with_zero_seed_is_zero() {
        assert_eq!(murmur3_128(&[], 0), Signature::default());
    }

    #[test]
    fn test_known_vector() {
        // Reference value of MurmurHash3_x64_128("hello", seed 0).
        let h = murmur3_128(b"hello", 0);
        assert_eq!(h.data[0], 0xcbd8_a7b3_41bd_9b02);
        assert_eq!(h.data[1], 0x5b1e_906a_48ae_1d19);
    }

    #[test]
    fn test_different_inputs_differ() {
        let a = murmur3_128(b"abcdefghijklmnopq", 1973);
        let b = murmur3_128(b"abcdefghijklmnopr", 1973);
        assert_ne!(a, b);
        assert_ne!(a, Signature::default());
    }
}
