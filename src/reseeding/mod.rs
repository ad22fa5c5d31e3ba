//! Periodic reseeding of a running engine.
//!
//! Each cycle gathers bytes from the configured entropy sources, always
//! mixed with local material (a high-resolution timestamp and a host RNG
//! sample), folds everything through a persistent digest press and hands
//! the resulting buffer to the engine. Source failures are logged and
//! skipped — a cycle with zero working sources still reseeds, degraded
//! to the local material.

mod scheduler;

pub use scheduler::ReseedScheduler;

use crate::engine::{EngineConfig, EnsembleRng};
use crate::generators::{BitSource, DigestChain};
use crate::sources::{EntropySource, SourceError};
use rand_core::RngCore;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Default folded seed buffer size in bytes.
pub const DEFAULT_SEED_SIZE: usize = 2048;

/// Default wall-clock budget per source fetch.
pub const DEFAULT_SOURCE_BUDGET: Duration = Duration::from_secs(10);

/// Bytes of host randomness mixed into every cycle.
const HOST_SAMPLE_LEN: usize = 16;

/// Collects entropy and reseeds one engine.
///
/// The digest press persists across cycles, so even a cycle whose sources
/// all return bytes seen before folds into fresh history and produces a
/// seed buffer that has never been issued.
pub struct Reseeder {
    engine: Arc<EnsembleRng>,
    sources: Vec<Arc<dyn EntropySource>>,
    press: Mutex<DigestChain>,
    seed_size: usize,
    source_budget: Duration,
}

impl Reseeder {
    /// Builds a reseeder for `engine` over the given sources, with the
    /// default seed size and source budget.
    pub fn new(engine: Arc<EnsembleRng>, sources: Vec<Arc<dyn EntropySource>>) -> Self {
        Self {
            engine,
            sources,
            press: Mutex::new(DigestChain::new()),
            seed_size: DEFAULT_SEED_SIZE,
            source_budget: DEFAULT_SOURCE_BUDGET,
        }
    }

    /// Builds a reseeder with the buffer size and source budget taken
    /// from an engine configuration.
    pub fn from_config(
        engine: Arc<EnsembleRng>,
        sources: Vec<Arc<dyn EntropySource>>,
        config: &EngineConfig,
    ) -> Self {
        Self::new(engine, sources)
            .with_seed_size(config.seed_size)
            .with_source_budget(config.source_budget())
    }

    /// Overrides the folded seed buffer size.
    pub fn with_seed_size(mut self, seed_size: usize) -> Self {
        self.seed_size = seed_size;
        self
    }

    /// Overrides the per-source fetch budget.
    pub fn with_source_budget(mut self, budget: Duration) -> Self {
        self.source_budget = budget;
        self
    }

    /// Runs one full reseed cycle. Never fails: source errors are
    /// contained here and only reported.
    pub fn run_once(&self) {
        let material = self.collect();
        self.engine.reseed(&material);
    }

    /// Gathers local and source material and folds it into a seed buffer
    /// of the configured size.
    fn collect(&self) -> Vec<u8> {
        let mut gathered = local_material();
        let mut contributed = 0usize;

        for source in &self.sources {
            match fetch_with_budget(Arc::clone(source), self.source_budget) {
                Ok(bytes) => {
                    tracing::debug!(
                        source = source.name(),
                        bytes = bytes.len(),
                        "entropy source contributed"
                    );
                    gathered.extend_from_slice(&bytes);
                    contributed += 1;
                }
                Err(e) => {
                    tracing::warn!(source = source.name(), error = %e, "entropy source skipped");
                }
            }
        }
        if contributed == 0 && !self.sources.is_empty() {
            tracing::warn!("all entropy sources failed; reseeding from local material only");
        }

        let mut press = self.press.lock().expect("seed press lock poisoned");
        press.reseed_bytes(&gathered);

        let mut seed = vec![0u8; self.seed_size];
        for chunk in seed.chunks_mut(4) {
            let word = press.next_bits(32).to_be_bytes();
            chunk.copy_from_slice(&word[..chunk.len()]);
        }
        seed
    }
}

/// Local per-cycle material: nanosecond timestamp plus a host RNG sample.
fn local_material() -> Vec<u8> {
    let mut material = Vec::with_capacity(16 + HOST_SAMPLE_LEN);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    material.extend_from_slice(&nanos.to_le_bytes());

    let mut host = [0u8; HOST_SAMPLE_LEN];
    if let Err(e) = rand_core::OsRng.try_fill_bytes(&mut host) {
        // keep the timestamp contribution even if the host RNG is down
        tracing::warn!(error = %e, "host randomness unavailable for reseed cycle");
    } else {
        material.extend_from_slice(&host);
    }
    material
}

/// Runs one fetch on a helper thread and bounds the wait. A source that
/// overruns its budget is reported as timed out and its (eventual) result
/// discarded.
fn fetch_with_budget(
    source: Arc<dyn EntropySource>,
    budget: Duration,
) -> Result<Vec<u8>, SourceError> {
    let (tx, rx) = mpsc::channel();
    let worker = Arc::clone(&source);
    thread::Builder::new()
        .name(format!("entropy-fetch-{}", source.name()))
        .spawn(move || {
            let _ = tx.send(worker.fetch());
        })
        .map_err(|e| SourceError::Unavailable(e.to_string()))?;

    match rx.recv_timeout(budget) {
        Ok(result) => result,
        Err(_) => Err(SourceError::TimedOut {
            budget_ms: budget.as_millis() as u64,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::Algorithm;
    use crate::sources::{FailingSource, StaticSource};

    fn test_engine() -> Arc<EnsembleRng> {
        Arc::new(
            EnsembleRng::with_seed(
                &[Algorithm::LinearCongruential, Algorithm::Xoroshiro128],
                b"reseeder-test",
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_cycle_increments_entropy_updates() {
        let engine = test_engine();
        let reseeder = Reseeder::new(
            engine.clone(),
            vec![
                Arc::new(FailingSource::new("down")),
                Arc::new(StaticSource::new("up", vec![7; 32])),
            ],
        )
        .with_seed_size(256);

        assert_eq!(engine.entropy_updates(), 0);
        reseeder.run_once();
        assert_eq!(engine.entropy_updates(), 1);
        reseeder.run_once();
        assert_eq!(engine.entropy_updates(), 2);
    }

    #[test]
    fn test_all_sources_failing_still_reseeds() {
        let engine = test_engine();
        let reseeder = Reseeder::new(
            engine.clone(),
            vec![
                Arc::new(FailingSource::new("down-1")),
                Arc::new(FailingSource::new("down-2")),
            ],
        )
        .with_seed_size(128);

        reseeder.run_once();
        assert_eq!(engine.entropy_updates(), 1);
    }

    #[test]
    fn test_reseed_changes_sequence() {
        let engine = test_engine();
        let witness = EnsembleRng::with_seed(
            &[Algorithm::LinearCongruential, Algorithm::Xoroshiro128],
            b"reseeder-test",
        )
        .unwrap();

        let reseeder = Reseeder::new(engine.clone(), vec![]).with_seed_size(64);
        reseeder.run_once();

        let reseeded: Vec<i32> = (0..8).map(|_| engine.next_int()).collect();
        let untouched: Vec<i32> = (0..8).map(|_| witness.next_int()).collect();
        assert_ne!(reseeded, untouched);
    }

    #[test]
    fn test_seed_buffers_never_repeat() {
        let engine = test_engine();
        let reseeder = Reseeder::new(
            engine,
            vec![Arc::new(StaticSource::new("constant", vec![42; 16]))],
        )
        .with_seed_size(128);

        // identical source output on both cycles, yet the persistent
        // press must fold history so the buffers differ
        let first = reseeder.collect();
        let second = reseeder.collect();
        assert_eq!(first.len(), 128);
        assert_ne!(first, second);
    }

    #[test]
    fn test_from_config_applies_settings() {
        let config = EngineConfig {
            seed_size: 96,
            source_budget_ms: 250,
            ..Default::default()
        };
        let reseeder = Reseeder::from_config(test_engine(), vec![], &config);
        assert_eq!(reseeder.seed_size, 96);
        assert_eq!(reseeder.source_budget, Duration::from_millis(250));
        assert_eq!(reseeder.collect().len(), 96);
    }

    #[test]
    fn test_hung_source_is_bounded() {
        struct StallingSource;
        impl EntropySource for StallingSource {
            fn name(&self) -> &str {
                "stalling"
            }
            fn fetch(&self) -> Result<Vec<u8>, SourceError> {
                thread::sleep(Duration::from_secs(30));
                Ok(vec![0])
            }
        }

        let result = fetch_with_budget(Arc::new(StallingSource), Duration::from_millis(50));
        assert!(matches!(result, Err(SourceError::TimedOut { .. })));
    }
}
