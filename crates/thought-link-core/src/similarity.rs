//! Dense vector similarity primitives.
//!
//! Cosine similarity with explicit validation errors, plus the [0, 1]
//! remapping used for persisted candidate similarities.

use thiserror::Error;

/// Errors from similarity computation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimilarityError {
    /// One of the input vectors was empty.
    #[error("cannot compute similarity of an empty vector")]
    EmptyVector,

    /// Input vectors had different dimensions.
    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// L2 norm (Euclidean length) of a vector.
#[inline]
pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Dot product without validation. Caller ensures equal lengths.
#[inline]
fn dot_unchecked(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Cosine similarity between two dense vectors.
///
/// Returns a value in [-1, 1]. Zero-magnitude vectors yield 0.0 rather than
/// dividing by zero.
///
/// # Errors
/// - `SimilarityError::EmptyVector` if either vector is empty
/// - `SimilarityError::DimensionMismatch` if lengths differ
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, SimilarityError> {
    if a.is_empty() || b.is_empty() {
        return Err(SimilarityError::EmptyVector);
    }
    if a.len() != b.len() {
        return Err(SimilarityError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let denom = l2_norm(a) * l2_norm(b);
    if denom <= f32::EPSILON {
        return Ok(0.0);
    }
    Ok(dot_unchecked(a, b) / denom)
}

/// Map a cosine value from [-1, 1] into [0, 1], clamping float noise.
#[inline]
pub fn unit_interval(cos: f32) -> f32 {
    ((cos + 1.0) / 2.0).clamp(0.0, 1.0)
}

/// Similarity between two embeddings as stored on candidate pairs: cosine
/// remapped into [0, 1].
pub fn pair_similarity(a: &[f32], b: &[f32]) -> Result<f32, SimilarityError> {
    Ok(unit_interval(cosine_similarity(a, b)?))
}
