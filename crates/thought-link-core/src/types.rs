//! Domain types for the candidate mining engine.
//!
//! All persisted types derive `Serialize`/`Deserialize`; the storage layer
//! wraps them in versioned bincode. Validation lives on the types themselves
//! so both the miner and the store can reject bad data before touching disk.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};

/// Identifier of a thought unit. Monotonically increasing, assigned by the
/// ingestion collaborator; used for keyset pagination.
pub type ThoughtId = u64;

/// Number of percentile steps in a distribution ladder (p0..p100).
pub const PERCENTILE_STEPS: usize = 101;

// ============================================================================
// ThoughtUnit
// ============================================================================

/// An indexed, immutable-once-created embedding unit.
///
/// The `sampling_key` is drawn uniformly from [0, 1) exactly once at
/// creation. Its distribution is uniform regardless of insertion order, so
/// range scans over it approximate uniform random sampling without a full
/// shuffle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThoughtUnit {
    /// Monotonically increasing identifier (keyset paging key).
    pub id: ThoughtId,
    /// Fixed-dimension embedding vector.
    pub embedding: Vec<f32>,
    /// Origin group (document of origin). Units sharing an origin are never
    /// paired with each other.
    pub origin: Uuid,
    /// Uniform random sampling key in [0, 1), assigned at creation.
    pub sampling_key: f64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl ThoughtUnit {
    /// Create a new thought unit, drawing the sampling key from the thread
    /// RNG.
    pub fn new(id: ThoughtId, embedding: Vec<f32>, origin: Uuid) -> Self {
        let sampling_key = rand::thread_rng().gen::<f64>();
        Self::with_sampling_key(id, embedding, origin, sampling_key)
    }

    /// Create a thought unit with an explicit sampling key (deterministic
    /// ingestion, tests).
    pub fn with_sampling_key(
        id: ThoughtId,
        embedding: Vec<f32>,
        origin: Uuid,
        sampling_key: f64,
    ) -> Self {
        Self {
            id,
            embedding,
            origin,
            sampling_key,
            created_at: Utc::now(),
        }
    }

    /// Validate invariants before persistence.
    pub fn validate(&self) -> CoreResult<()> {
        if self.embedding.is_empty() {
            return Err(CoreError::invalid_parameter(
                "embedding",
                "thought unit embedding must not be empty",
            ));
        }
        if !(0.0..1.0).contains(&self.sampling_key) {
            return Err(CoreError::invalid_parameter(
                "sampling_key",
                format!("must be in [0, 1), got {}", self.sampling_key),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// CandidatePair
// ============================================================================

/// Downstream scoring status of a candidate pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoreStatus {
    /// Awaiting the downstream scorer.
    Pending,
    /// Claimed by a scorer worker.
    Processing,
    /// Scored successfully.
    Completed,
    /// Scoring failed.
    Failed,
}

/// One retained (A, B) match produced by the miner.
///
/// Stored undirected with `thought_a < thought_b`; the unordered pair is
/// unique in the store, which makes re-mining the same slice idempotent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CandidatePair {
    /// Lower thought id of the pair.
    pub thought_a: ThoughtId,
    /// Higher thought id of the pair.
    pub thought_b: ThoughtId,
    /// Similarity in [0, 1] at mining time.
    pub similarity: f32,
    /// Downstream scoring status.
    pub status: ScoreStatus,
    /// Score assigned by the downstream scorer, if any.
    pub score: Option<f32>,
    /// When the pair was mined.
    pub created_at: DateTime<Utc>,
    /// When the pair was scored, if it has been.
    pub scored_at: Option<DateTime<Utc>>,
}

impl CandidatePair {
    /// Create a pending pair, normalizing the ids to smaller-first.
    pub fn new(a: ThoughtId, b: ThoughtId, similarity: f32) -> Self {
        let (thought_a, thought_b) = if a <= b { (a, b) } else { (b, a) };
        Self {
            thought_a,
            thought_b,
            similarity,
            status: ScoreStatus::Pending,
            score: None,
            created_at: Utc::now(),
            scored_at: None,
        }
    }

    /// The unordered pair key `(smaller, larger)`.
    pub fn key(&self) -> (ThoughtId, ThoughtId) {
        (self.thought_a, self.thought_b)
    }

    /// Validate invariants before persistence.
    pub fn validate(&self) -> CoreResult<()> {
        if self.thought_a >= self.thought_b {
            return Err(CoreError::invalid_parameter(
                "thought_a",
                format!(
                    "pair must satisfy thought_a < thought_b, got ({}, {})",
                    self.thought_a, self.thought_b
                ),
            ));
        }
        if !(0.0..=1.0).contains(&self.similarity) {
            return Err(CoreError::invalid_parameter(
                "similarity",
                format!("must be in [0, 1], got {}", self.similarity),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// MiningParams
// ============================================================================

/// Parameter snapshot for a mining run.
///
/// Captured into [`MiningProgress`] when a run starts so that a resumed run
/// continues with identical behavior.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MiningParams {
    /// Source items consumed per batch (keyset page size).
    pub source_batch_size: usize,
    /// Destination items drawn per sampling round.
    pub dest_sample_size: usize,
    /// Best matches kept per source item.
    pub k: usize,
    /// Lower percentile bound of the kept band, as a fraction in [0, 1).
    pub band_low: f64,
    /// Upper percentile bound of the kept band, as a fraction in (0, 1].
    pub band_high: f64,
    /// Maximum sampling rounds per batch before accepting a low yield.
    pub max_rounds: u32,
    /// Base seed; each round derives its own seed from it.
    pub seed: u64,
}

impl Default for MiningParams {
    fn default() -> Self {
        Self {
            source_batch_size: 50,
            dest_sample_size: 200,
            k: 5,
            band_low: 0.10,
            band_high: 0.35,
            max_rounds: 3,
            seed: 0,
        }
    }
}

impl MiningParams {
    /// Reject invalid parameters synchronously, before any store access.
    pub fn validate(&self) -> CoreResult<()> {
        if self.source_batch_size == 0 {
            return Err(CoreError::invalid_parameter(
                "source_batch_size",
                "must be greater than zero",
            ));
        }
        if self.dest_sample_size == 0 {
            return Err(CoreError::invalid_parameter(
                "dest_sample_size",
                "must be greater than zero",
            ));
        }
        if self.k == 0 {
            return Err(CoreError::invalid_parameter("k", "must be greater than zero"));
        }
        if self.max_rounds == 0 {
            return Err(CoreError::invalid_parameter(
                "max_rounds",
                "must be greater than zero",
            ));
        }
        if !(0.0..1.0).contains(&self.band_low) {
            return Err(CoreError::invalid_parameter(
                "band_low",
                format!("must be in [0, 1), got {}", self.band_low),
            ));
        }
        if !(0.0..=1.0).contains(&self.band_high) {
            return Err(CoreError::invalid_parameter(
                "band_high",
                format!("must be in (0, 1], got {}", self.band_high),
            ));
        }
        if self.band_low >= self.band_high {
            return Err(CoreError::invalid_parameter(
                "band_low",
                format!(
                    "must be below band_high, got [{}, {})",
                    self.band_low, self.band_high
                ),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// MiningProgress
// ============================================================================

/// Status of a mining run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MiningStatus {
    /// The run is active and may process batches.
    InProgress,
    /// The corpus has been exhausted.
    Completed,
    /// Manually paused between batches; resumable.
    Paused,
    /// An unrecoverable error occurred; `error` holds the message.
    Failed,
}

/// Resumable checkpoint for one mining run.
///
/// `last_source_id` only increases within a run; a fresh run starts a new
/// row rather than mutating history. The checkpoint is only advanced after
/// a batch's candidate pairs are fully committed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MiningProgress {
    /// Run identifier.
    pub run_id: Uuid,
    /// Last fully processed source id; the next batch starts strictly after
    /// this.
    pub last_source_id: ThoughtId,
    /// Running total of source items processed.
    pub sources_processed: u64,
    /// Running total of candidate pairs inserted.
    pub pairs_inserted: u64,
    /// Parameter snapshot the run was started with.
    pub params: MiningParams,
    /// Current status.
    pub status: MiningStatus,
    /// Captured error message when `status == Failed`.
    pub error: Option<String>,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Last checkpoint update.
    pub updated_at: DateTime<Utc>,
}

impl MiningProgress {
    /// Create a fresh `InProgress` row starting from source id 0.
    pub fn new(run_id: Uuid, params: MiningParams) -> Self {
        let now = Utc::now();
        Self {
            run_id,
            last_source_id: 0,
            sources_processed: 0,
            pairs_inserted: 0,
            params,
            status: MiningStatus::InProgress,
            error: None,
            started_at: now,
            updated_at: now,
        }
    }
}

// ============================================================================
// SimilaritySample
// ============================================================================

/// One observation in the global distribution sketch pool.
///
/// Append-only within a run; old runs may be pruned by age. Never updated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimilaritySample {
    /// Sketch run this observation belongs to.
    pub run_id: Uuid,
    /// Observed similarity in [0, 1].
    pub value: f32,
    /// Pair that produced the observation, for debugging.
    pub pair: Option<(ThoughtId, ThoughtId)>,
    /// When the observation was recorded.
    pub created_at: DateTime<Utc>,
}

impl SimilaritySample {
    /// Create a sample tagged with its producing pair.
    pub fn new(run_id: Uuid, value: f32, pair: (ThoughtId, ThoughtId)) -> Self {
        Self {
            run_id,
            value,
            pair: Some(pair),
            created_at: Utc::now(),
        }
    }
}

// ============================================================================
// DistributionSummary
// ============================================================================

/// Cached approximate summary of the global similarity distribution.
///
/// Always marked `approximate`: it is computed from a bounded random sample
/// of the pair space, never from full enumeration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DistributionSummary {
    /// Number of observations the summary was computed from.
    pub sample_count: u64,
    /// Percentile ladder p0..p100 (always 101 entries).
    pub percentiles: Vec<f32>,
    /// Mean of the observations.
    pub mean: f32,
    /// Population standard deviation of the observations.
    pub std_dev: f32,
    /// Sketch run the summary was computed from.
    pub run_id: Uuid,
    /// When the summary was computed.
    pub computed_at: DateTime<Utc>,
    /// Always true; this is a sketch, not an exact distribution.
    pub approximate: bool,
}

impl DistributionSummary {
    /// Look up a percentile (clamped to p100).
    pub fn percentile(&self, p: u8) -> f32 {
        let idx = (p as usize).min(PERCENTILE_STEPS - 1);
        self.percentiles[idx]
    }

    /// Whether the summary is older than `max_age`.
    pub fn is_stale(&self, max_age: Duration) -> bool {
        Utc::now() - self.computed_at > max_age
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_pair_normalizes_order() {
        let pair = CandidatePair::new(42, 7, 0.5);
        assert_eq!(pair.thought_a, 7);
        assert_eq!(pair.thought_b, 42);
        assert_eq!(pair.key(), (7, 42));
        assert!(pair.validate().is_ok());
    }

    #[test]
    fn test_candidate_pair_rejects_self_pair() {
        let pair = CandidatePair::new(9, 9, 0.5);
        assert!(pair.validate().is_err());
    }

    #[test]
    fn test_candidate_pair_rejects_out_of_range_similarity() {
        let pair = CandidatePair::new(1, 2, 1.5);
        assert!(pair.validate().is_err());
    }

    #[test]
    fn test_thought_unit_sampling_key_in_range() {
        for _ in 0..100 {
            let unit = ThoughtUnit::new(1, vec![0.1, 0.2], Uuid::new_v4());
            assert!(unit.validate().is_ok());
            assert!((0.0..1.0).contains(&unit.sampling_key));
        }
    }

    #[test]
    fn test_thought_unit_rejects_empty_embedding() {
        let unit = ThoughtUnit::with_sampling_key(1, vec![], Uuid::new_v4(), 0.5);
        assert!(unit.validate().is_err());
    }

    #[test]
    fn test_mining_params_default_is_valid() {
        assert!(MiningParams::default().validate().is_ok());
    }

    #[test]
    fn test_mining_params_rejects_zero_batch() {
        let params = MiningParams {
            source_batch_size: 0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_mining_params_rejects_inverted_band() {
        let params = MiningParams {
            band_low: 0.5,
            band_high: 0.2,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_progress_starts_in_progress() {
        let progress = MiningProgress::new(Uuid::new_v4(), MiningParams::default());
        assert_eq!(progress.status, MiningStatus::InProgress);
        assert_eq!(progress.last_source_id, 0);
        assert_eq!(progress.sources_processed, 0);
    }

    #[test]
    fn test_distribution_percentile_clamps() {
        let summary = DistributionSummary {
            sample_count: 3,
            percentiles: (0..=100).map(|p| p as f32 / 100.0).collect(),
            mean: 0.5,
            std_dev: 0.1,
            run_id: Uuid::new_v4(),
            computed_at: Utc::now(),
            approximate: true,
        };
        assert!((summary.percentile(50) - 0.5).abs() < f32::EPSILON);
        assert!((summary.percentile(200) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_distribution_staleness() {
        let mut summary = DistributionSummary {
            sample_count: 1,
            percentiles: vec![0.0; PERCENTILE_STEPS],
            mean: 0.0,
            std_dev: 0.0,
            run_id: Uuid::new_v4(),
            computed_at: Utc::now(),
            approximate: true,
        };
        assert!(!summary.is_stale(Duration::hours(1)));
        summary.computed_at = Utc::now() - Duration::hours(2);
        assert!(summary.is_stale(Duration::hours(1)));
    }

    #[test]
    fn test_mining_progress_serde_round_trip() {
        let progress = MiningProgress::new(Uuid::new_v4(), MiningParams::default());
        let json = serde_json::to_string(&progress).expect("serialize");
        let back: MiningProgress = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(progress, back);
    }
}
