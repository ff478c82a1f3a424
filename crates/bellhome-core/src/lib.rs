//! # bellhome-core
//!
//! **A classical Bell experiment you can cheat at home.**
//!
//! `bellhome-core` simulates two devices, Alice and Bob, that play the CHSH game
//! with a deterministic local-hidden-variable strategy. Each device derives its
//! measurement settings from locally generated raw bits, but an adversary nudges
//! those bits toward the settings the hidden variable "expects", flipping any
//! single raw bit with probability at most `epsilon`. The resulting CHSH score
//! shows how much a small per-bit bias buys against the classical bound of 2.
//!
//! ## Quick Start
//!
//! ```
//! use bellhome_core::{MemoryStore, RunConfig, run_experiment};
//!
//! let config = RunConfig::new(2_000, 1, 0.2).unwrap();
//! let mut store = MemoryStore::new();
//! let manifest = run_experiment(config, &mut store).unwrap();
//!
//! assert_eq!(manifest.chsh.rounds, 2_000);
//! assert!((-4.0..=4.0).contains(&manifest.chsh.score));
//! ```
//!
//! ## Architecture
//!
//! ```text
//! seeds → raw bits ─┐
//!                   ├→ BiasInjector → questions → LocalStrategy → answers ─┐
//! seeds → targets ──┘                               ↑                      ├→ CHSH
//!           └──────── hidden variable ──────────────┘    (other party) ────┘
//! ```
//!
//! Every stage is a pure, seeded transform. Sequences travel between stages
//! through an [`ArtifactStore`]: [`MemoryStore`] keeps them in memory,
//! [`DirStore`] persists them as line-wrapped `'0'`/`'1'` text files.

pub mod audit;
pub mod bias;
pub mod chsh;
pub mod codec;
pub mod config;
pub mod device;
pub mod error;
pub mod manifest;
pub mod party;
pub mod store;
pub mod strategy;
pub mod stream;
pub mod target;

pub use audit::{average_bias, flip_count, flip_rate};
pub use bias::{BiasInjector, Injection};
pub use chsh::{CLASSICAL_BOUND, CLASSICAL_WIN_RATE, ChshReport, compute_chsh};
pub use codec::{BitCodec, LINE_WIDTH, LineCodec};
pub use config::{DEFAULT_EPSILON, DEFAULT_GROUP_SIZE, DEFAULT_ROUNDS, RunConfig};
pub use device::BellDevice;
pub use error::{BellError, Result};
pub use manifest::{
    MANIFEST_FILE, PartyReport, RunManifest, artifact_digests, read_manifest, run_experiment,
    write_manifest,
};
pub use party::{Party, StrategyTable};
pub use store::{
    Artifact, ArtifactKind, ArtifactStore, DirStore, MemoryStore, remove_data_files,
};
pub use strategy::{additional_flips, answer_questions};
pub use stream::{ADDITIONAL_FLIPS_SEED, DeterministicStream, PartySeeds, SEED_RANGE, SeedBook};
pub use target::{hidden_variable, hidden_variable_for, target_settings};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
