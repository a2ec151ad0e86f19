//! Thought Link Core Library
//!
//! Core types and algorithms for mining candidate pairs from a corpus of
//! embedded "thought units" without ever materializing the full O(n²)
//! similarity matrix.
//!
//! # Architecture
//!
//! This crate defines:
//! - Domain types (`ThoughtUnit`, `CandidatePair`, `MiningProgress`, etc.)
//! - The `MiningStore` storage trait (implemented by `thought-link-storage`)
//! - The batch miner (`mine_batch`) and its run driver (`MiningRunner`)
//! - The distribution sketch builder and calculator
//! - The relative-threshold API consumed by external sampling logic
//!
//! All work per invocation is bounded: a batch touches at most
//! `source_batch_size × dest_sample_size × max_rounds` similarity
//! computations regardless of corpus size.
//!
//! # Example
//!
//! ```
//! use thought_link_core::stubs::MemoryMiningStore;
//! use thought_link_core::miner::{mine_batch, MiningParams};
//!
//! let store = MemoryMiningStore::new();
//! let params = MiningParams::default();
//! let outcome = mine_batch(&store, 0, &params).unwrap();
//! assert!(outcome.exhausted); // empty corpus
//! ```

pub mod config;
pub mod error;
pub mod miner;
pub mod runner;
pub mod sampling;
pub mod similarity;
pub mod sketch;
pub mod stats;
pub mod store;
pub mod stubs;
pub mod thresholds;
pub mod types;

// Re-exports for convenience
pub use error::{CoreError, CoreResult};
pub use miner::{mine_batch, BatchOutcome, MiningParams};
pub use runner::MiningRunner;
pub use sketch::{build_sketch, compute_distribution, RunSelector, SketchOutcome, SketchParams};
pub use store::MiningStore;
pub use thresholds::{relative_thresholds, BandStrategy, ThresholdConfig};
pub use types::{
    CandidatePair, DistributionSummary, MiningProgress, MiningStatus, ScoreStatus,
    SimilaritySample, ThoughtId, ThoughtUnit,
};
