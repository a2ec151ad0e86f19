//! Candidate Mining Batch Runner.
//!
//! Consumes a keyset page of source units, draws a seed-derived random
//! sample of destination units, computes all cross similarities (excluding
//! self and same-origin pairs), keeps only pairs inside a per-batch
//! percentile band, ranks survivors per source and keeps the best `k`, and
//! persists the result idempotently.
//!
//! Work per invocation is capped at
//! `source_batch_size × dest_sample_size × max_rounds` similarity
//! computations regardless of corpus size; the backing store enforces a
//! hard per-call execution ceiling, so nothing here may scale with corpus
//! depth.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use crate::error::CoreResult;
use crate::sampling::{round_seed, sample_with_wrap};
use crate::similarity::pair_similarity;
use crate::stats::band_cutoffs;
use crate::store::MiningStore;
use crate::types::{CandidatePair, ThoughtId};

pub use crate::types::MiningParams;

/// Result of one `mine_batch` invocation.
#[derive(Clone, Debug, PartialEq)]
pub struct BatchOutcome {
    /// Cursor after this batch. Equals the input cursor when the corpus was
    /// exhausted, otherwise strictly greater.
    pub new_last_source_id: ThoughtId,
    /// Newly inserted candidate pairs (pairs already present are not
    /// counted).
    pub inserted: u64,
    /// Source units consumed by this batch.
    pub sources_processed: u64,
    /// Sampling rounds actually used (<= `max_rounds`).
    pub rounds_used: u32,
    /// Lower band cutoff of the last executed round.
    pub band_low_used: f32,
    /// Upper band cutoff of the last executed round.
    pub band_high_used: f32,
    /// True when no source units remained past the cursor.
    pub exhausted: bool,
}

impl BatchOutcome {
    fn exhausted_at(cursor: ThoughtId) -> Self {
        Self {
            new_last_source_id: cursor,
            inserted: 0,
            sources_processed: 0,
            rounds_used: 0,
            band_low_used: 0.0,
            band_high_used: 0.0,
            exhausted: true,
        }
    }
}

/// Mine one batch of candidate pairs starting strictly after
/// `last_source_id`.
///
/// Failure semantics: if this returns an error, no checkpoint has been
/// advanced; the caller retries with the same cursor, and the store's
/// unordered-pair uniqueness makes the retry safe.
///
/// A source unit left with fewer than `k` matches after all rounds is
/// reported in the aggregate counts but never blocks progress.
pub fn mine_batch(
    store: &dyn MiningStore,
    last_source_id: ThoughtId,
    params: &MiningParams,
) -> CoreResult<BatchOutcome> {
    params.validate()?;

    let sources = store.list_after(last_source_id, params.source_batch_size)?;
    if sources.is_empty() {
        debug!(last_source_id, "no source units remain, batch exhausted");
        return Ok(BatchOutcome::exhausted_at(last_source_id));
    }

    // Yield target: a source counts as satisfied once it has accumulated at
    // least ceil(k/2) candidates across rounds; a round's sample is accepted
    // once at least half the batch is satisfied.
    let min_per_source = (params.k + 1) / 2;
    let mut found_per_source: HashMap<ThoughtId, usize> = HashMap::new();
    let mut seen_pairs: HashSet<(ThoughtId, ThoughtId)> = HashSet::new();

    let mut inserted = 0u64;
    let mut rounds_used = 0u32;
    let mut band_low_used = 0.0f32;
    let mut band_high_used = 0.0f32;

    for round in 0..params.max_rounds {
        rounds_used = round + 1;
        let seed = round_seed(params.seed, round);
        let dests = sample_with_wrap(store, seed, params.dest_sample_size)?;

        // Full batch × sample similarity matrix, minus self and same-origin
        // pairs.
        let mut all_sims: Vec<f32> = Vec::with_capacity(sources.len() * dests.len());
        let mut per_source: Vec<Vec<(ThoughtId, f32)>> = vec![Vec::new(); sources.len()];
        for (s_idx, src) in sources.iter().enumerate() {
            for dst in &dests {
                if src.id == dst.id || src.origin == dst.origin {
                    continue;
                }
                let sim = pair_similarity(&src.embedding, &dst.embedding)?;
                all_sims.push(sim);
                per_source[s_idx].push((dst.id, sim));
            }
        }

        if all_sims.is_empty() {
            debug!(round, "sample produced no valid cross-origin pairs, retrying");
            continue;
        }

        // The band adapts to THIS batch's distribution, not the global one.
        let (lo, hi) = band_cutoffs(&all_sims, params.band_low, params.band_high)?;
        band_low_used = lo;
        band_high_used = hi;

        let mut batch_pairs: Vec<CandidatePair> = Vec::new();
        for (s_idx, src) in sources.iter().enumerate() {
            // Later rounds only top a source up to k total; a source never
            // keeps more than k candidates per batch.
            let already = found_per_source.get(&src.id).copied().unwrap_or(0);
            let remaining = params.k.saturating_sub(already);
            if remaining == 0 {
                continue;
            }

            let mut survivors: Vec<(ThoughtId, f32)> = per_source[s_idx]
                .iter()
                .filter(|(_, sim)| *sim >= lo && *sim < hi)
                .copied()
                .collect();
            survivors.sort_by(|a, b| b.1.total_cmp(&a.1));

            for (dst_id, sim) in survivors.into_iter().take(remaining) {
                let pair = CandidatePair::new(src.id, dst_id, sim);
                *found_per_source.entry(src.id).or_insert(0) += 1;
                // The mirror pair may already be kept when both ends are in
                // the source batch; insert each unordered pair once.
                if seen_pairs.insert(pair.key()) {
                    batch_pairs.push(pair);
                }
            }
        }

        if !batch_pairs.is_empty() {
            inserted += store.upsert_candidates(&batch_pairs)?;
        }

        let satisfied = sources
            .iter()
            .filter(|s| found_per_source.get(&s.id).copied().unwrap_or(0) >= min_per_source)
            .count();
        debug!(
            round,
            sample_size = dests.len(),
            band_low = lo,
            band_high = hi,
            satisfied,
            batch = sources.len(),
            "mining round finished"
        );

        if satisfied * 2 >= sources.len() {
            break;
        }
        if round + 1 == params.max_rounds {
            warn!(
                satisfied,
                batch = sources.len(),
                max_rounds = params.max_rounds,
                "insufficient candidate yield after all sampling rounds, accepting partial result"
            );
        }
    }

    let new_last_source_id = sources
        .last()
        .map(|s| s.id)
        .unwrap_or(last_source_id);

    info!(
        last_source_id,
        new_last_source_id,
        sources = sources.len(),
        inserted,
        rounds_used,
        "mined batch"
    );

    Ok(BatchOutcome {
        new_last_source_id,
        inserted,
        sources_processed: sources.len() as u64,
        rounds_used,
        band_low_used,
        band_high_used,
        exhausted: false,
    })
}
