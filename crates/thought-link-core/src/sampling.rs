//! Deterministic pseudo-random sampling over the sampling-key index.
//!
//! Every item carries a uniform random sampling key in [0, 1) assigned at
//! creation. Selecting items whose key is >= a seed-derived cutoff, ordered
//! by key, is a reproducible substitute for true random sampling: the same
//! seed always yields the same sample over an unchanged corpus.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::CoreResult;
use crate::store::MiningStore;
use crate::types::ThoughtUnit;

/// Stride used to derive per-round seeds. Large odd constant so successive
/// rounds land on unrelated cutoffs.
pub const ROUND_SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Derive the seed for a given round of a run.
#[inline]
pub fn round_seed(seed: u64, round: u32) -> u64 {
    seed.wrapping_add(ROUND_SEED_STRIDE.wrapping_mul(round as u64))
}

/// Map a seed to a sampling-key cutoff in [0, 1).
pub fn cutoff_for_seed(seed: u64) -> f64 {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.gen::<f64>()
}

/// Draw up to `limit` items at a seed-derived cutoff, wrapping around to the
/// start of the keyspace when the cutoff lands near 1.0 and the tail page
/// comes up short. Duplicates from the wrap are dropped, so the result never
/// contains the same item twice.
pub fn sample_with_wrap(
    store: &dyn MiningStore,
    seed: u64,
    limit: usize,
) -> CoreResult<Vec<ThoughtUnit>> {
    let cutoff = cutoff_for_seed(seed);
    let mut items = store.sample_by_key(cutoff, limit)?;

    if items.len() < limit {
        let missing = limit - items.len();
        let head = store.sample_by_key(0.0, missing)?;
        for unit in head {
            if items.iter().all(|existing| existing.id != unit.id) {
                items.push(unit);
            }
        }
    }
    Ok(items)
}
