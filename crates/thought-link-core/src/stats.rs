//! Percentile and summary statistics over bounded in-memory batches.
//!
//! Everything here is a sort-and-slice over one batch's similarity values;
//! batch sizes are bounded upstream, so these never see unbounded input.

use crate::error::{CoreError, CoreResult};
use crate::types::PERCENTILE_STEPS;

/// Percentile of an ascending-sorted slice with linear interpolation
/// between closest ranks. `q` is a fraction in [0, 1].
fn percentile_of_sorted(sorted: &[f32], q: f64) -> f32 {
    debug_assert!(!sorted.is_empty());
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    let frac = (rank - lo as f64) as f32;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Compute the full p0..p100 percentile ladder of a value set.
///
/// Returns exactly [`PERCENTILE_STEPS`] entries.
///
/// # Errors
/// `CoreError::EmptyInput` when `values` is empty.
pub fn percentile_ladder(values: &[f32]) -> CoreResult<Vec<f32>> {
    if values.is_empty() {
        return Err(CoreError::EmptyInput {
            what: "percentile ladder",
        });
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f32::total_cmp);

    let ladder = (0..PERCENTILE_STEPS)
        .map(|p| percentile_of_sorted(&sorted, p as f64 / 100.0))
        .collect();
    Ok(ladder)
}

/// Derive the [low, high) band cutoffs of a batch's similarity values.
///
/// `low` and `high` are percentile fractions in [0, 1]. The cutoffs adapt
/// to this batch's distribution, not the global one.
///
/// # Errors
/// `CoreError::EmptyInput` when `values` is empty.
pub fn band_cutoffs(values: &[f32], low: f64, high: f64) -> CoreResult<(f32, f32)> {
    if values.is_empty() {
        return Err(CoreError::EmptyInput {
            what: "band cutoffs",
        });
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f32::total_cmp);

    Ok((
        percentile_of_sorted(&sorted, low),
        percentile_of_sorted(&sorted, high),
    ))
}

/// Mean and population standard deviation of a value set.
///
/// # Errors
/// `CoreError::EmptyInput` when `values` is empty.
pub fn mean_and_std(values: &[f32]) -> CoreResult<(f32, f32)> {
    if values.is_empty() {
        return Err(CoreError::EmptyInput {
            what: "mean and standard deviation",
        });
    }
    let n = values.len() as f64;
    let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n;
    let variance = values
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    Ok((mean as f32, variance.sqrt() as f32))
}
