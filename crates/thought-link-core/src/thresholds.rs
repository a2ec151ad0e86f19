//! Relative threshold API.
//!
//! Maps named band strategies onto percentile pairs of the cached global
//! distribution. Pure function over the summary; no I/O. A span ceiling
//! guards against accidentally requesting most of the corpus.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::DistributionSummary;

/// Configuration for the threshold API.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Maximum allowed percentile span as a fraction of the full range.
    /// Requests wider than this are rejected.
    pub max_band_span: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self { max_band_span: 0.8 }
    }
}

/// Named percentile band strategies consumed by external sampling logic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BandStrategy {
    /// Dissimilar-but-not-noise region: p10-p40.
    LowBand,
    /// Middling similarity: p35-p65.
    MidBand,
    /// Near-duplicates and strong matches: p60-p90.
    HighBand,
    /// Caller-chosen percentile pair.
    Custom { low: u8, high: u8 },
}

impl BandStrategy {
    /// The (low, high) percentile pair of this strategy.
    pub fn percentiles(&self) -> (u8, u8) {
        match self {
            BandStrategy::LowBand => (10, 40),
            BandStrategy::MidBand => (35, 65),
            BandStrategy::HighBand => (60, 90),
            BandStrategy::Custom { low, high } => (*low, *high),
        }
    }
}

/// Resolve a band strategy against a cached distribution summary, returning
/// the `(low_similarity, high_similarity)` cutoffs.
///
/// # Errors
/// - `CoreError::InvalidParameter` for inverted or out-of-range percentile
///   pairs
/// - `CoreError::BandTooWide` when the requested span exceeds
///   `config.max_band_span` (asking for p0-p100 must fail with the default
///   ceiling)
pub fn relative_thresholds(
    strategy: BandStrategy,
    distribution: &DistributionSummary,
    config: &ThresholdConfig,
) -> CoreResult<(f32, f32)> {
    let (low, high) = strategy.percentiles();

    if high > 100 {
        return Err(CoreError::invalid_parameter(
            "high",
            format!("percentile must be <= 100, got {}", high),
        ));
    }
    if low >= high {
        return Err(CoreError::invalid_parameter(
            "low",
            format!("percentile band must satisfy low < high, got p{}-p{}", low, high),
        ));
    }

    let span = (high - low) as f64 / 100.0;
    if span > config.max_band_span {
        return Err(CoreError::BandTooWide {
            low,
            high,
            span,
            max_span: config.max_band_span,
        });
    }

    Ok((distribution.percentile(low), distribution.percentile(high)))
}
