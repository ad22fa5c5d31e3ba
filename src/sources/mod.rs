//! Entropy-source collaborators.
//!
//! A source hands back opaque bytes or fails; nothing else is assumed.
//! Sources are read-only with respect to the engine — they feed the
//! reseed cycle and can never mutate generator state directly. Real
//! deployments plug in network- or hardware-backed sources through this
//! trait; the crate ships a host-RNG source and deterministic doubles for
//! exercising the scheduler.

use rand_core::RngCore;
use thiserror::Error;

/// Errors a source can report for one fetch.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("entropy source unavailable: {0}")]
    Unavailable(String),
    #[error("entropy source exceeded its {budget_ms} ms budget")]
    TimedOut { budget_ms: u64 },
    #[error("entropy source returned no bytes")]
    Empty,
}

/// Trait for entropy-source collaborators.
///
/// `fetch` may block; the reseed scheduler bounds each call with a
/// per-source time budget, so a hung source costs one cycle, not the
/// scheduler.
pub trait EntropySource: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Fetches fresh bytes from the source.
    fn fetch(&self) -> Result<Vec<u8>, SourceError>;
}

/// Source backed by the host's cryptographically strong RNG.
pub struct OsRandomSource {
    bytes_per_fetch: usize,
}

impl OsRandomSource {
    pub fn new(bytes_per_fetch: usize) -> Self {
        Self { bytes_per_fetch }
    }
}

impl Default for OsRandomSource {
    fn default() -> Self {
        Self::new(64)
    }
}

impl EntropySource for OsRandomSource {
    fn name(&self) -> &str {
        "os-random"
    }

    fn fetch(&self) -> Result<Vec<u8>, SourceError> {
        let mut bytes = vec![0u8; self.bytes_per_fetch];
        rand_core::OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| SourceError::Unavailable(e.to_string()))?;
        Ok(bytes)
    }
}

/// Source that always returns the same bytes. For tests and scheduler
/// plumbing checks, not entropy.
pub struct StaticSource {
    name: String,
    bytes: Vec<u8>,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

impl EntropySource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> Result<Vec<u8>, SourceError> {
        if self.bytes.is_empty() {
            return Err(SourceError::Empty);
        }
        Ok(self.bytes.clone())
    }
}

/// Source that always fails. Exercises the degraded reseed path.
pub struct FailingSource {
    name: String,
}

impl FailingSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl EntropySource for FailingSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> Result<Vec<u8>, SourceError> {
        Err(SourceError::Unavailable("always fails".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os_random_source_fetches() {
        let source = OsRandomSource::new(32);
        let bytes = source.fetch().unwrap();
        assert_eq!(bytes.len(), 32);
    }

    #[test]
    fn test_static_source_round_trip() {
        let source = StaticSource::new("fixed", vec![1, 2, 3]);
        assert_eq!(source.name(), "fixed");
        assert_eq!(source.fetch().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_static_source_errors() {
        let source = StaticSource::new("hollow", vec![]);
        assert!(matches!(source.fetch(), Err(SourceError::Empty)));
    }

    #[test]
    fn test_failing_source_errors() {
        let source = FailingSource::new("down");
        assert!(matches!(source.fetch(), Err(SourceError::Unavailable(_))));
    }
}
