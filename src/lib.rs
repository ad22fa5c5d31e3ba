//! Ensemble RNG Library
//!
//! A composite pseudo-random engine: many independent bit-generation
//! algorithms behind one interface, where the choice of which algorithm
//! answers each call is itself driven by prior output, and externally
//! gathered entropy is periodically folded into the whole ensemble
//! without resetting its accumulated state.
//!
//! # Architecture
//!
//! The system follows an explicit data flow:
//!
//! ```text
//! caller → engine (routing state) → one generator → value
//!                     ↑                                ↓
//!                     └──────── routing update ────────┘
//!
//! scheduler tick → entropy sources → seed fold → engine → all generators
//! ```
//!
//! # Design Principles
//!
//! - **Seed augmentation**: reseeding folds new entropy into existing
//!   state; it never resets a generator
//! - **Output-driven routing**: predicting future output requires every
//!   member's state plus the full routing history
//! - **Degraded over dead**: a reseed cycle survives any number of
//!   failed entropy sources
//! - **No cryptographic claims**: the routing feedback raises prediction
//!   cost, it does not certify unpredictability
//!
//! # Example
//!
//! ```no_run
//! use ensemble_rng::{
//!     engine::EnsembleRng,
//!     generators::Algorithm,
//!     reseeding::{Reseeder, ReseedScheduler},
//!     sources::OsRandomSource,
//! };
//! use std::sync::Arc;
//!
//! // Build an engine with the default ensemble, seeded from the host.
//! let engine = Arc::new(
//!     EnsembleRng::from_os_entropy(&Algorithm::default_ensemble()).unwrap(),
//! );
//!
//! // Keep it topped up with fresh entropy every five minutes.
//! let reseeder = Arc::new(Reseeder::new(
//!     engine.clone(),
//!     vec![Arc::new(OsRandomSource::default())],
//! ));
//! let _scheduler = ReseedScheduler::start(reseeder);
//!
//! // Draw values from any thread.
//! let value = engine.next_int();
//! let dice = engine.next_bits(3);
//! println!("value={value} dice={dice}");
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod engine;
pub mod generators;
pub mod reseeding;
pub mod sources;

// Re-export commonly used types at crate root
pub use engine::{ConfigError, EngineConfig, EnsembleRng};
pub use generators::{Algorithm, BitSource, GeneratorInstance};
pub use reseeding::{ReseedScheduler, Reseeder};
pub use sources::{EntropySource, SourceError};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
