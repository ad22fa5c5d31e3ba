//! Mersenne Twister (MT19937).
//!
//! Standard twist/temper recurrence over 624 32-bit words. Seeding
//! differs from the textbook initializer in one place: the array-seeding
//! path keys the base expansion on a fold hash of the incoming words
//! instead of a fixed constant, so different byte seeds land in different
//! regions of the state space before the non-linear passes run.

use super::mix::{fold_hash_words, scalar_hash, words_from_bytes};
use super::BitSource;

const N: usize = 624;
const M: usize = 397;
const MATRIX_A: u32 = 0x9908_B0DF;
const UPPER_MASK: u32 = 0x8000_0000;
const LOWER_MASK: u32 = 0x7FFF_FFFF;

const TEMPERING_MASK_B: u32 = 0x9D2C_5680;
const TEMPERING_MASK_C: u32 = 0xEFC6_0000;

pub struct MersenneTwister {
    mt: [u32; N],
    mti: usize,
}

impl MersenneTwister {
    pub fn new() -> Self {
        // state is established by the first reseed; mti past the end
        // forces a twist on first use either way
        Self {
            mt: [0; N],
            mti: N + 1,
        }
    }

    /// Textbook 2002 initializer from a 32-bit base seed.
    fn init_scalar(&mut self, seed: u32) {
        self.mt[0] = seed;
        for i in 1..N {
            let prev = self.mt[i - 1];
            self.mt[i] = 1_812_433_253u32
                .wrapping_mul(prev ^ (prev >> 30))
                .wrapping_add(i as u32);
        }
        self.mti = N;
    }

    /// Array initializer: base expansion keyed on the word hash, then the
    /// two standard non-linear mixing passes over the key material.
    fn init_array(&mut self, key: &[u32]) {
        debug_assert!(!key.is_empty());
        self.init_scalar(scalar_hash(fold_hash_words(key) as i64) as u32);

        let mut i = 1;
        let mut j = 0;
        for _ in 0..N.max(key.len()) {
            let prev = self.mt[i - 1];
            self.mt[i] = (self.mt[i] ^ (prev ^ (prev >> 30)).wrapping_mul(1_664_525))
                .wrapping_add(key[j])
                .wrapping_add(j as u32);
            i += 1;
            j += 1;
            if i >= N {
                self.mt[0] = self.mt[N - 1];
                i = 1;
            }
            if j >= key.len() {
                j = 0;
            }
        }
        for _ in 0..N - 1 {
            let prev = self.mt[i - 1];
            self.mt[i] = (self.mt[i] ^ (prev ^ (prev >> 30)).wrapping_mul(1_566_083_941))
                .wrapping_sub(i as u32);
            i += 1;
            if i >= N {
                self.mt[0] = self.mt[N - 1];
                i = 1;
            }
        }
        self.mt[0] = 0x8000_0000; // MSB set, state guaranteed non-zero
    }

    fn twist(&mut self) {
        for kk in 0..N {
            let y = (self.mt[kk] & UPPER_MASK) | (self.mt[(kk + 1) % N] & LOWER_MASK);
            let mag = if y & 1 == 1 { MATRIX_A } else { 0 };
            self.mt[kk] = self.mt[(kk + M) % N] ^ (y >> 1) ^ mag;
        }
        self.mti = 0;
    }
}

impl Default for MersenneTwister {
    fn default() -> Self {
        Self::new()
    }
}

impl BitSource for MersenneTwister {
    fn next_bits(&mut self, bits: u32) -> u32 {
        if self.mti >= N {
            self.twist();
        }
        let mut y = self.mt[self.mti];
        self.mti += 1;

        y ^= y >> 11;
        y ^= (y << 7) & TEMPERING_MASK_B;
        y ^= (y << 15) & TEMPERING_MASK_C;
        y ^= y >> 18;

        y >> (32 - bits)
    }

    fn reseed_bytes(&mut self, bytes: &[u8]) {
        // words_from_bytes never returns an empty vector
        self.init_array(&words_from_bytes(bytes));
    }

    fn reseed_scalar(&mut self, seed: i64) {
        self.init_scalar(scalar_hash(seed) as u32);
    }

    fn entropy_bits(&self) -> usize {
        N * 32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_reference_sequence() {
        // published MT19937 output for base seed 5489
        let mut mt = MersenneTwister::new();
        mt.reseed_scalar(5489);
        let expected = [
            3499211612u32,
            581869302,
            3890346734,
            3586334585,
            545404204,
        ];
        for &want in &expected {
            assert_eq!(mt.next_bits(32), want);
        }
    }

    #[test]
    fn test_byte_seed_deterministic() {
        let mut a = MersenneTwister::new();
        let mut b = MersenneTwister::new();
        a.reseed_bytes(b"twister-seed");
        b.reseed_bytes(b"twister-seed");
        for _ in 0..700 {
            // spans a full regeneration of the word array
            assert_eq!(a.next_bits(32), b.next_bits(32));
        }
    }

    #[test]
    fn test_byte_seeds_diverge() {
        let mut a = MersenneTwister::new();
        let mut b = MersenneTwister::new();
        a.reseed_bytes(b"twister-seed");
        b.reseed_bytes(b"twister-seeD");
        let va: Vec<u32> = (0..4).map(|_| a.next_bits(32)).collect();
        let vb: Vec<u32> = (0..4).map(|_| b.next_bits(32)).collect();
        assert_ne!(va, vb);
    }

    #[test]
    fn test_narrow_width_takes_top_bits() {
        let mut full = MersenneTwister::new();
        full.reseed_scalar(5489);
        let word = full.next_bits(32);

        let mut narrow = MersenneTwister::new();
        narrow.reseed_scalar(5489);
        assert_eq!(narrow.next_bits(7), word >> 25);
    }
}
