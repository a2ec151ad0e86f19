//! Distribution Sketch Builder and Calculator.
//!
//! [`build_sketch`] draws independent random source/destination samples and
//! appends their pairwise similarities to a run-tagged observation pool;
//! [`compute_distribution`] turns a run's pool into the cached approximate
//! percentile ladder consumed by the threshold API. Neither ever touches
//! more than a bounded number of pairs.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::sampling::{round_seed, sample_with_wrap};
use crate::similarity::pair_similarity;
use crate::stats::{mean_and_std, percentile_ladder};
use crate::store::MiningStore;
use crate::types::{DistributionSummary, SimilaritySample};

/// Parameters for one sketch-building pass.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SketchParams {
    /// Base seed; each round derives disjoint source and destination seeds.
    pub seed: u64,
    /// Source units drawn per round.
    pub src_sample_size: usize,
    /// Destination units drawn per round.
    pub dst_sample_size: usize,
    /// Number of independent rounds.
    pub rounds: u32,
    /// Skip pairs sharing an origin group.
    pub exclude_same_origin: bool,
}

impl Default for SketchParams {
    fn default() -> Self {
        Self {
            seed: 0,
            src_sample_size: 50,
            dst_sample_size: 50,
            rounds: 4,
            exclude_same_origin: true,
        }
    }
}

impl SketchParams {
    /// Reject invalid parameters synchronously, before any store access.
    pub fn validate(&self) -> CoreResult<()> {
        if self.src_sample_size == 0 {
            return Err(CoreError::invalid_parameter(
                "src_sample_size",
                "must be greater than zero",
            ));
        }
        if self.dst_sample_size == 0 {
            return Err(CoreError::invalid_parameter(
                "dst_sample_size",
                "must be greater than zero",
            ));
        }
        if self.rounds == 0 {
            return Err(CoreError::invalid_parameter(
                "rounds",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// Result of one sketch-building pass.
#[derive(Clone, Debug, PartialEq)]
pub struct SketchOutcome {
    /// Freshly generated run id all appended samples are tagged with.
    pub run_id: Uuid,
    /// Observations appended.
    pub inserted_samples: u64,
    /// Fraction of the theoretical full pair space this sketch covered.
    /// Observability only.
    pub coverage_estimate: f64,
}

/// Which sketch run a distribution computation targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunSelector {
    /// A specific sketch run.
    Run(Uuid),
    /// The most recently started sketch run.
    Latest,
}

/// Build a similarity distribution sketch: for each round, draw an
/// independent source sample and destination sample (disjoint seed
/// offsets), compute all pairwise similarities, and append every value to
/// the observation pool under a fresh run id.
///
/// The sample is unbiased by construction; given a fixed seed over an
/// unchanged corpus, two invocations observe the same pairs.
pub fn build_sketch(store: &dyn MiningStore, params: &SketchParams) -> CoreResult<SketchOutcome> {
    params.validate()?;

    let run_id = Uuid::new_v4();
    let mut inserted_samples = 0u64;

    for round in 0..params.rounds {
        // Disjoint seed offsets keep source and destination draws
        // independent of each other and of every other round.
        let src_seed = round_seed(params.seed, round * 2);
        let dst_seed = round_seed(params.seed, round * 2 + 1);

        let sources = sample_with_wrap(store, src_seed, params.src_sample_size)?;
        let dests = sample_with_wrap(store, dst_seed, params.dst_sample_size)?;

        let mut samples = Vec::with_capacity(sources.len() * dests.len());
        for src in &sources {
            for dst in &dests {
                if src.id == dst.id {
                    continue;
                }
                if params.exclude_same_origin && src.origin == dst.origin {
                    continue;
                }
                let sim = pair_similarity(&src.embedding, &dst.embedding)?;
                samples.push(SimilaritySample::new(run_id, sim, (src.id, dst.id)));
            }
        }

        debug!(round, samples = samples.len(), "sketch round sampled");
        if !samples.is_empty() {
            store.append_samples(run_id, &samples)?;
            inserted_samples += samples.len() as u64;
        }
    }

    let n = store.count_thoughts()?;
    let total_pairs = if n < 2 { 0 } else { n * (n - 1) / 2 };
    let coverage_estimate = if total_pairs == 0 {
        0.0
    } else {
        (inserted_samples as f64 / total_pairs as f64).min(1.0)
    };

    info!(
        %run_id,
        inserted_samples,
        coverage_estimate,
        rounds = params.rounds,
        "built similarity sketch"
    );

    Ok(SketchOutcome {
        run_id,
        inserted_samples,
        coverage_estimate,
    })
}

/// Compute the approximate global similarity distribution for a sketch run
/// and replace the cached summary.
///
/// When `sample_limit` is set and the pool exceeds it, a bounded random
/// subsample (seeded by the run id, so the result is reproducible) is used
/// instead of the full pool.
///
/// # Errors
/// - `CoreError::NoSampleRuns` when `Latest` is requested and no run exists
/// - `CoreError::NoSamples` when the target run has no observations —
///   callers must `build_sketch` first rather than operate on stale
///   defaults
pub fn compute_distribution(
    store: &dyn MiningStore,
    target: RunSelector,
    sample_limit: Option<usize>,
) -> CoreResult<DistributionSummary> {
    let run_id = match target {
        RunSelector::Run(id) => id,
        RunSelector::Latest => store
            .latest_sample_run()?
            .ok_or(CoreError::NoSampleRuns)?,
    };

    let mut values = store.samples_for_run(run_id, None)?;
    if values.is_empty() {
        return Err(CoreError::NoSamples { run_id });
    }

    if let Some(limit) = sample_limit {
        if values.len() > limit {
            let seed = u64::from_le_bytes(
                run_id.as_bytes()[..8]
                    .try_into()
                    .unwrap_or([0u8; 8]),
            );
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            values.shuffle(&mut rng);
            values.truncate(limit);
        }
    }

    let percentiles = percentile_ladder(&values)?;
    let (mean, std_dev) = mean_and_std(&values)?;

    let summary = DistributionSummary {
        sample_count: values.len() as u64,
        percentiles,
        mean,
        std_dev,
        run_id,
        computed_at: chrono::Utc::now(),
        approximate: true,
    };
    store.store_distribution(&summary)?;

    info!(
        %run_id,
        sample_count = summary.sample_count,
        mean = summary.mean,
        std_dev = summary.std_dev,
        "computed approximate similarity distribution"
    );
    Ok(summary)
}
