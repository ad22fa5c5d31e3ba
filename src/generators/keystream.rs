//! Counter-mode keystream generator.
//!
//! Output bytes are keystream blocks of ChaCha20 addressed by a
//! monotonically increasing 64-bit counter. Reseeding re-derives the key
//! and leaves the counter alone, so reseeding with identical material can
//! never replay bytes that were already produced.

use super::BitSource;
use rand_chacha::ChaCha20Rng;
use rand_core::{RngCore, SeedableRng};

/// Domain separator for the baseline key of an unseeded generator.
const BASELINE_KEY_DOMAIN: &[u8] = b"ensemble-rng-keystream-v1";

pub struct Keystream {
    stream: ChaCha20Rng,
    counter: i64,
}

impl Keystream {
    pub fn new() -> Self {
        Self {
            stream: ChaCha20Rng::from_seed(*blake3::hash(BASELINE_KEY_DOMAIN).as_bytes()),
            counter: i64::MIN,
        }
    }
}

impl Default for Keystream {
    fn default() -> Self {
        Self::new()
    }
}

impl BitSource for Keystream {
    fn next_bits(&mut self, bits: u32) -> u32 {
        // address the block by the counter, always reading from the
        // start of that block
        self.stream.set_stream(self.counter as u64);
        self.stream.set_word_pos(0);
        let mut block = [0u8; 8];
        self.stream.fill_bytes(&mut block);
        self.counter = self.counter.wrapping_add(1);
        (u64::from_be_bytes(block) >> (64 - bits)) as u32
    }

    /// Re-keys the cipher from the seed bytes. The counter is deliberately
    /// untouched: it records how far the keystream has been consumed, not
    /// what the key is.
    fn reseed_bytes(&mut self, bytes: &[u8]) {
        self.stream = ChaCha20Rng::from_seed(*blake3::hash(bytes).as_bytes());
    }

    fn reseed_scalar(&mut self, seed: i64) {
        self.reseed_bytes(&seed.to_le_bytes());
    }

    fn entropy_bits(&self) -> usize {
        256
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_for_same_key() {
        let mut a = Keystream::new();
        let mut b = Keystream::new();
        a.reseed_bytes(b"stream-key");
        b.reseed_bytes(b"stream-key");
        for _ in 0..32 {
            assert_eq!(a.next_bits(32), b.next_bits(32));
        }
    }

    #[test]
    fn test_rekey_changes_output() {
        let mut a = Keystream::new();
        let mut b = Keystream::new();
        a.reseed_bytes(b"key-one");
        b.reseed_bytes(b"key-two");
        assert_ne!(a.next_bits(32), b.next_bits(32));
    }

    #[test]
    fn test_counter_survives_rekey() {
        // same key reapplied mid-stream must not replay earlier blocks
        let mut gen = Keystream::new();
        gen.reseed_bytes(b"replay-check");
        let first = gen.next_bits(32);
        gen.reseed_bytes(b"replay-check");
        let second = gen.next_bits(32);
        assert_ne!(first, second);
    }

    #[test]
    fn test_narrow_width_in_range() {
        let mut gen = Keystream::new();
        gen.reseed_bytes(b"width");
        for bits in 1..32 {
            assert!(gen.next_bits(bits) < 1 << bits);
        }
    }
}
