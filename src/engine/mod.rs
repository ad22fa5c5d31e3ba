//! Selector engine over an ensemble of generators.
//!
//! Each call routes to one ensemble member chosen by the routing state,
//! and the call's own output advances the routing state. Predicting the
//! k-th output therefore requires the internal state of every member plus
//! the full routing history, not just one algorithm's state. This is the
//! engine's unpredictability property, not a cryptographic guarantee.
//!
//! # Seeding model
//!
//! Seed bytes are an augmentation, never a reset: every member folds the
//! material into its existing state, and the material itself is mutated
//! between members so that duplicate algorithm tags still receive
//! distinct effective seeds. A warm-up discard phase follows every
//! seeding so weak material cannot surface as early output.

mod config;

pub use config::{ConfigError, EngineConfig};

use crate::generators::mix::{fold_hash, scalar_hash};
use crate::generators::{Algorithm, GeneratorInstance};
use rand_core::RngCore;
use std::sync::{Mutex, MutexGuard};

/// Mask that clears the sign bit of a 32-bit word.
const SIGN_MASK: i32 = 0x7FFF_FFFF;

/// Bytes of OS entropy drawn for the default construction path.
const DEFAULT_SEED_LEN: usize = 32;

struct EngineState {
    members: Vec<GeneratorInstance>,
    /// Selects the member answering the next call; advanced by every
    /// call's own output and rewritten by every reseed.
    routing: i32,
    /// One slot per member, incremented on every call routed there.
    source_counts: Vec<u64>,
    total_calls: u64,
    entropy_updates: u64,
}

/// Composite generator engine.
///
/// All state lives behind one lock: the routing read-modify-write, the
/// member draw and the counter increment are observed as a single atomic
/// unit by concurrent callers, which keeps the counter-sum invariant
/// exact. The engine is `Sync`; share it with `Arc` and call `&self`
/// methods from any thread.
pub struct EnsembleRng {
    state: Mutex<EngineState>,
}

impl EnsembleRng {
    /// Builds an engine with the given composition and seeds it
    /// deterministically from `seed`.
    ///
    /// Two engines built with identical compositions and identical seed
    /// bytes produce identical output sequences.
    pub fn with_seed(algorithms: &[Algorithm], seed: &[u8]) -> Result<Self, ConfigError> {
        if algorithms.is_empty() {
            return Err(ConfigError::EmptyEnsemble);
        }
        let members: Vec<GeneratorInstance> = algorithms.iter().map(|a| a.build()).collect();
        let count = members.len();
        let mut state = EngineState {
            members,
            routing: 0,
            source_counts: vec![0; count],
            total_calls: 0,
            entropy_updates: 0,
        };
        Self::apply_seed(&mut state, seed);
        Ok(Self {
            state: Mutex::new(state),
        })
    }

    /// Builds an engine seeded from the host's entropy source.
    pub fn from_os_entropy(algorithms: &[Algorithm]) -> Result<Self, ConfigError> {
        let mut seed = [0u8; DEFAULT_SEED_LEN];
        rand_core::OsRng.fill_bytes(&mut seed);
        Self::with_seed(algorithms, &seed)
    }

    /// Builds an engine from a validated configuration, seeded from the
    /// host's entropy source.
    pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Self::from_os_entropy(&config.algorithms)
    }

    fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().expect("engine state lock poisoned")
    }

    /// One routed draw. Select, draw, count, advance — a single atomic
    /// unit under the engine lock.
    fn next_int_inner(state: &mut EngineState) -> i32 {
        let index = ((state.routing & SIGN_MASK) as usize) % state.members.len();
        let value = state.members[index].next_bits(32) as i32;
        state.source_counts[index] += 1;
        state.total_calls += 1;
        // the increment is masked non-negative so the routing state does
        // not average to zero; the eventual wrap into negative territory
        // is harmless because selection masks the sign bit again
        state.routing = state.routing.wrapping_add(value & SIGN_MASK);
        value
    }

    /// Seeds every member in index order, mutating the material between
    /// members. The first member sees the bytes exactly as given; each
    /// subsequent member sees the bytes XORed with the fold hash of the
    /// previous round, so duplicate tags never receive equal seeds.
    /// Ends with the warm-up discard phase.
    fn apply_seed(state: &mut EngineState, seed: &[u8]) {
        let mut material = seed.to_vec();
        state.routing = fold_hash(&material);
        for member in state.members.iter_mut() {
            member.reseed_bytes(&material);
            let h = fold_hash(&material);
            for b in material.iter_mut() {
                *b ^= h as u8;
            }
        }
        let discard = ((state.routing & 0xFFFF) as u64) + 1024 * state.members.len() as u64;
        for _ in 0..discard {
            Self::next_int_inner(state);
        }
        tracing::debug!(discard, "seed applied, warm-up complete");
    }

    /// Returns the next 32-bit value from one ensemble member, chosen by
    /// the routing state.
    pub fn next_int(&self) -> i32 {
        let mut state = self.lock();
        Self::next_int_inner(&mut state)
    }

    /// Returns the next `bits` bits (1..=32) as an unsigned value below
    /// `2^bits`.
    ///
    /// # Panics
    ///
    /// Panics if `bits` is outside `1..=32`.
    pub fn next_bits(&self, bits: u32) -> u32 {
        assert!((1..=32).contains(&bits), "bits must be in 1..=32");
        (self.next_int() as u32) >> (32 - bits)
    }

    /// Returns a 64-bit value composed from two consecutive draws.
    pub fn next_long(&self) -> i64 {
        let mut state = self.lock();
        let hi = Self::next_int_inner(&mut state) as i64;
        let lo = Self::next_int_inner(&mut state) as i64;
        (hi << 32).wrapping_add(lo)
    }

    /// Fills `dest` with output bytes, four per draw, low byte first.
    pub fn next_bytes(&self, dest: &mut [u8]) {
        let mut state = self.lock();
        let mut i = 0;
        while i < dest.len() {
            let mut word = Self::next_int_inner(&mut state);
            let take = (dest.len() - i).min(4);
            for _ in 0..take {
                dest[i] = word as u8;
                word >>= 8;
                i += 1;
            }
        }
    }

    /// Folds seed bytes into the whole ensemble and counts an entropy
    /// update. See the module docs for the augmentation model.
    pub fn reseed(&self, seed: &[u8]) {
        let mut state = self.lock();
        Self::apply_seed(&mut state, seed);
        state.entropy_updates += 1;
        tracing::info!(
            bytes = seed.len(),
            entropy_updates = state.entropy_updates,
            "ensemble reseeded"
        );
    }

    /// Seeds from the UTF-8 bytes of `text`.
    pub fn reseed_str(&self, text: &str) {
        self.reseed(text.as_bytes());
    }

    /// Compatibility path for callers holding only a single scalar.
    ///
    /// The scalar perturbs the routing state, one member is picked by the
    /// result, and every member is reseeded through its scalar path with
    /// a fresh 64-bit draw from the picked member. Considerably weaker
    /// than the byte path (no diversified material, no warm-up) and kept
    /// only for that class of caller.
    pub fn reseed_scalar(&self, seed: i64) {
        let mut state = self.lock();
        state.routing ^= scalar_hash(seed);
        let picked = ((state.routing & SIGN_MASK) as usize) % state.members.len();
        for i in 0..state.members.len() {
            let drawn = state.members[picked].next_long();
            state.members[i].reseed_scalar(drawn);
        }
    }

    /// Total routed calls, including warm-up discards.
    pub fn call_count(&self) -> u64 {
        self.lock().total_calls
    }

    /// Per-member routed-call counts, in ensemble order. Their sum equals
    /// [`call_count`](Self::call_count) at every observable point.
    pub fn source_counts(&self) -> Vec<u64> {
        self.lock().source_counts.clone()
    }

    /// Combined entropy-pool size of the ensemble, in bits.
    pub fn entropy_bits(&self) -> usize {
        self.lock().members.iter().map(|m| m.entropy_bits()).sum()
    }

    /// Number of reseed operations since construction (the construction
    /// seed itself is not counted).
    pub fn entropy_updates(&self) -> u64 {
        self.lock().entropy_updates
    }

    /// The ensemble composition, in order.
    pub fn algorithms(&self) -> Vec<Algorithm> {
        self.lock().members.iter().map(|m| m.algorithm()).collect()
    }

    /// Ensemble size.
    pub fn len(&self) -> usize {
        self.lock().members.len()
    }

    /// Always false: construction rejects empty ensembles.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl RngCore for EnsembleRng {
    fn next_u32(&mut self) -> u32 {
        self.next_int() as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.next_long() as u64
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.next_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.next_bytes(dest);
        Ok(())
    }
}

impl std::fmt::Debug for EnsembleRng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("EnsembleRng")
            .field("members", &state.members.len())
            .field("total_calls", &state.total_calls)
            .field("entropy_updates", &state.entropy_updates)
            .finish_non_exhaustive()
    }
}
