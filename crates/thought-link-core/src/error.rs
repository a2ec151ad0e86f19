//! Error types for thought-link-core.
//!
//! One unified [`CoreError`] for the crate, plus the module-local
//! [`SimilarityError`](crate::similarity::SimilarityError) which converts
//! into it. Library code never panics; everything returns [`CoreResult`].

use thiserror::Error;
use uuid::Uuid;

use crate::similarity::SimilarityError;
use crate::types::MiningStatus;

/// Unified error type for the mining core.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A caller-supplied parameter failed validation. Rejected before any
    /// store access.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        name: &'static str,
        message: String,
    },

    /// Similarity computation failed (empty vector, dimension mismatch).
    #[error(transparent)]
    Similarity(#[from] SimilarityError),

    /// A statistic was requested over an empty value set.
    #[error("cannot compute {what} over an empty value set")]
    EmptyInput { what: &'static str },

    /// The backing store failed. Transient store failures surface here
    /// unchanged; nothing has been mutated and the call is safe to retry.
    #[error("storage operation failed: {message}")]
    Storage { message: String },

    /// Conditional checkpoint advance failed because another worker moved
    /// the cursor first.
    #[error(
        "progress conflict for run {run_id}: expected last_source_id {expected}, found {actual}"
    )]
    ProgressConflict {
        run_id: Uuid,
        expected: u64,
        actual: u64,
    },

    /// No mining progress row exists for the requested run.
    #[error("mining run {run_id} not found")]
    RunNotFound { run_id: Uuid },

    /// The run is not in a status that permits the requested operation.
    #[error("mining run {run_id} is {status:?}, cannot {operation}")]
    RunNotActive {
        run_id: Uuid,
        status: MiningStatus,
        operation: &'static str,
    },

    /// No similarity samples exist for the requested sketch run. Callers
    /// must build a sketch first rather than operate on stale defaults.
    #[error("no similarity samples recorded for run {run_id}; build a sketch first")]
    NoSamples { run_id: Uuid },

    /// No sketch run exists at all (`RunSelector::Latest` with an empty pool).
    #[error("no sketch runs recorded; build a sketch first")]
    NoSampleRuns,

    /// A requested percentile band is wider than the configured ceiling.
    #[error("band p{low}-p{high} spans {span:.2} of the similarity range, exceeding the {max_span:.2} ceiling")]
    BandTooWide {
        low: u8,
        high: u8,
        span: f64,
        max_span: f64,
    },
}

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Shorthand for parameter validation failures.
    pub fn invalid_parameter(name: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parameter_display() {
        let err = CoreError::invalid_parameter("source_batch_size", "must be greater than zero");
        assert_eq!(
            err.to_string(),
            "invalid parameter 'source_batch_size': must be greater than zero"
        );
    }

    #[test]
    fn test_band_too_wide_display() {
        let err = CoreError::BandTooWide {
            low: 0,
            high: 100,
            span: 1.0,
            max_span: 0.8,
        };
        let msg = err.to_string();
        assert!(msg.contains("p0-p100"), "unexpected message: {}", msg);
        assert!(msg.contains("0.80"), "unexpected message: {}", msg);
    }

    #[test]
    fn test_similarity_error_converts() {
        let err: CoreError = SimilarityError::EmptyVector.into();
        assert!(matches!(err, CoreError::Similarity(_)));
    }
}
