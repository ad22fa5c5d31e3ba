//! Generator contract and the concrete algorithm family.
//!
//! Every algorithm implements [`BitSource`]: draw the next 1–32 bits,
//! absorb seed material, and report its effective state size. Algorithms
//! are addressed by [`Algorithm`] tags; [`Algorithm::build`] is the only
//! way an instance comes into existence, so the set of algorithms is
//! closed and resolved at construction time with no runtime introspection.
//!
//! Instances are deterministic: `build()` establishes a fixed, documented
//! baseline state, and all variation comes from the seed material applied
//! afterwards. Scalar-state algorithms accumulate seeds additively;
//! array-state algorithms expand the incoming material over their word
//! arrays; the digest and keystream algorithms fold it into their
//! underlying primitive.

mod congruential;
mod digest;
mod keystream;
pub(crate) mod mix;
mod residue;
mod twister;
mod xorshift;

pub use congruential::{LinearCongruential, MultiplyWithCarry};
pub use digest::DigestChain;
pub use keystream::Keystream;
pub use residue::{CubicPolynomial, QuadraticResidue};
pub use twister::MersenneTwister;
pub use xorshift::{Xoroshiro128, Xorshift1024};

use serde::{Deserialize, Serialize};

/// Uniform bit-generation capability.
///
/// One `next_bits` call is one atomic state transition; callers that share
/// an instance across threads serialize access externally (the selector
/// engine holds its ensemble behind a single lock).
pub trait BitSource: Send {
    /// Returns the next `bits` bits (1..=32) as the low bits of a `u32`,
    /// cut from the top of the algorithm's output word.
    fn next_bits(&mut self, bits: u32) -> u32;

    /// Folds seed bytes into the current state. Augmentation, not reset:
    /// the resulting state depends on everything seeded before.
    fn reseed_bytes(&mut self, bytes: &[u8]);

    /// Compatibility path for callers holding only a single scalar.
    /// Weaker than the byte path; see the engine's scalar reseed.
    fn reseed_scalar(&mut self, seed: i64);

    /// Effective internal state size in bits.
    fn entropy_bits(&self) -> usize;
}

/// Tags for the closed set of generator algorithms.
///
/// An ensemble is an ordered list of tags; repeating a tag is meaningful
/// because every built instance holds its own state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Algorithm {
    /// 64-bit linear congruential recurrence.
    LinearCongruential,
    /// Multiply-with-carry recurrence.
    MultiplyWithCarry,
    /// Square-mod-M residue recurrence (Blum-Blum-Shub style).
    QuadraticResidue,
    /// Cubic polynomial recurrence with a trigonometric term.
    CubicPolynomial,
    /// 1024-bit xorshift* shift register.
    Xorshift1024,
    /// xoroshiro128+ shift register.
    Xoroshiro128,
    /// Mersenne Twister over 624 32-bit words.
    MersenneTwister,
    /// SHA-512 hash chain.
    DigestChain,
    /// ChaCha20 counter keystream.
    Keystream,
}

impl Algorithm {
    /// Builds a fresh instance of this algorithm at its baseline state.
    pub fn build(self) -> GeneratorInstance {
        let source: Box<dyn BitSource> = match self {
            Algorithm::LinearCongruential => Box::new(LinearCongruential::new()),
            Algorithm::MultiplyWithCarry => Box::new(MultiplyWithCarry::new()),
            Algorithm::QuadraticResidue => Box::new(QuadraticResidue::new()),
            Algorithm::CubicPolynomial => Box::new(CubicPolynomial::new()),
            Algorithm::Xorshift1024 => Box::new(Xorshift1024::new()),
            Algorithm::Xoroshiro128 => Box::new(Xoroshiro128::new()),
            Algorithm::MersenneTwister => Box::new(MersenneTwister::new()),
            Algorithm::DigestChain => Box::new(DigestChain::new()),
            Algorithm::Keystream => Box::new(Keystream::new()),
        };
        GeneratorInstance {
            algorithm: self,
            source,
            calls: 0,
        }
    }

    /// The default 13-slot ensemble composition. Duplicated tags are
    /// intentional: each slot receives diversified seed material and
    /// evolves independently.
    pub fn default_ensemble() -> Vec<Algorithm> {
        vec![
            Algorithm::QuadraticResidue,
            Algorithm::LinearCongruential,
            Algorithm::MersenneTwister,
            Algorithm::Xorshift1024,
            Algorithm::DigestChain,
            Algorithm::MultiplyWithCarry,
            Algorithm::LinearCongruential,
            Algorithm::Xorshift1024,
            Algorithm::MersenneTwister,
            Algorithm::QuadraticResidue,
            Algorithm::CubicPolynomial,
            Algorithm::Xoroshiro128,
            Algorithm::Keystream,
        ]
    }
}

/// One ensemble slot: an algorithm tag, its private state, and a call
/// counter.
pub struct GeneratorInstance {
    algorithm: Algorithm,
    source: Box<dyn BitSource>,
    calls: u64,
}

impl GeneratorInstance {
    /// Draws the next `bits` bits and counts the call.
    pub fn next_bits(&mut self, bits: u32) -> u32 {
        debug_assert!((1..=32).contains(&bits));
        self.calls += 1;
        self.source.next_bits(bits)
    }

    /// Two 32-bit draws concatenated high-to-low, with sign extension on
    /// both halves so the composition matches `(hi << 32) + lo` on signed
    /// words.
    pub fn next_long(&mut self) -> i64 {
        let hi = self.next_bits(32) as i32 as i64;
        let lo = self.next_bits(32) as i32 as i64;
        (hi << 32).wrapping_add(lo)
    }

    pub fn reseed_bytes(&mut self, bytes: &[u8]) {
        self.source.reseed_bytes(bytes);
    }

    pub fn reseed_scalar(&mut self, seed: i64) {
        self.source.reseed_scalar(seed);
    }

    /// Number of `next_bits` draws since construction.
    pub fn call_count(&self) -> u64 {
        self.calls
    }

    pub fn entropy_bits(&self) -> usize {
        self.source.entropy_bits()
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }
}

impl std::fmt::Debug for GeneratorInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorInstance")
            .field("algorithm", &self.algorithm)
            .field("calls", &self.calls)
            .finish_non_exhaustive()
    }
}
