//! Storage trait abstraction for the mining engine.
//!
//! The `MiningStore` trait is the narrow contract between the algorithms in
//! this crate and the backing store. It exists for:
//!
//! 1. **Testing**: the in-memory stub in [`crate::stubs`] implements it
//!    without any I/O
//! 2. **Flexibility**: alternative backends (the production RocksDB store
//!    lives in `thought-link-storage`)
//! 3. **Object safety**: all methods take `&self` and return concrete
//!    types, so `&dyn MiningStore` works everywhere
//!
//! Implementors must be `Send + Sync`; the miner may be driven by a small
//! pool of workers sharing one store handle.

use uuid::Uuid;

use crate::error::CoreResult;
use crate::types::{
    CandidatePair, DistributionSummary, MiningProgress, ScoreStatus, SimilaritySample, ThoughtId,
    ThoughtUnit,
};

/// Storage contract for thought units, candidate pairs, mining progress,
/// similarity samples, and the singleton distribution cache.
///
/// Every read method is bounded by an explicit `limit` on the mining path;
/// per-call cost must stay independent of corpus size (keyset pagination,
/// never offset-based paging).
pub trait MiningStore: Send + Sync {
    // ========================================================================
    // Thought units (read side; ingestion owns writes)
    // ========================================================================

    /// Keyset page: up to `limit` thought units with id strictly greater
    /// than `after_id`, ordered by id ascending.
    fn list_after(&self, after_id: ThoughtId, limit: usize) -> CoreResult<Vec<ThoughtUnit>>;

    /// Range scan over the sampling-key index: up to `limit` units whose
    /// sampling key is >= `cutoff`, ordered by sampling key ascending.
    fn sample_by_key(&self, cutoff: f64, limit: usize) -> CoreResult<Vec<ThoughtUnit>>;

    /// Total number of thought units in the corpus.
    fn count_thoughts(&self) -> CoreResult<u64>;

    // ========================================================================
    // Candidate pairs
    // ========================================================================

    /// Insert candidate pairs, silently ignoring any whose unordered pair
    /// key already exists. Returns the number of newly inserted pairs.
    ///
    /// This is the idempotence safety net: retrying a batch after a
    /// mid-call failure can never duplicate rows.
    fn upsert_candidates(&self, pairs: &[CandidatePair]) -> CoreResult<u64>;

    /// Up to `limit` pairs still awaiting the downstream scorer.
    fn pending_candidates(&self, limit: usize) -> CoreResult<Vec<CandidatePair>>;

    /// Record the downstream scorer's verdict for a pair. The id order of
    /// `a` and `b` does not matter.
    fn mark_scored(
        &self,
        a: ThoughtId,
        b: ThoughtId,
        score: f32,
        status: ScoreStatus,
    ) -> CoreResult<()>;

    // ========================================================================
    // Similarity samples (sketch pool)
    // ========================================================================

    /// Append observations to a sketch run's pool. Append-only.
    fn append_samples(&self, run_id: Uuid, samples: &[SimilaritySample]) -> CoreResult<()>;

    /// Similarity values recorded for a run, optionally capped at `limit`.
    fn samples_for_run(&self, run_id: Uuid, limit: Option<usize>) -> CoreResult<Vec<f32>>;

    /// The most recently started sketch run, if any exist.
    fn latest_sample_run(&self) -> CoreResult<Option<Uuid>>;

    // ========================================================================
    // Mining progress
    // ========================================================================

    /// Fetch the progress row for a run.
    fn get_progress(&self, run_id: Uuid) -> CoreResult<Option<MiningProgress>>;

    /// Write a progress row unconditionally (initial insert, status-only
    /// transitions).
    fn put_progress(&self, progress: &MiningProgress) -> CoreResult<()>;

    /// Conditionally advance a progress row: succeeds only if the stored
    /// `last_source_id` still equals `expected_last`, otherwise fails with
    /// `CoreError::ProgressConflict`. Prevents two workers from
    /// double-processing the same source range.
    fn advance_progress(
        &self,
        progress: &MiningProgress,
        expected_last: ThoughtId,
    ) -> CoreResult<()>;

    // ========================================================================
    // Distribution cache (singleton)
    // ========================================================================

    /// Read the cached distribution summary, if one has been computed.
    fn load_distribution(&self) -> CoreResult<Option<DistributionSummary>>;

    /// Replace the cached distribution summary.
    fn store_distribution(&self, summary: &DistributionSummary) -> CoreResult<()>;
}
