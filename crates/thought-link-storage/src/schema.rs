//! Key format functions for the mining store.
//!
//! All keys are fixed-size with big-endian integer components, so
//! lexicographic key order equals numeric order and every scan is a bounded
//! range scan. Key parsing panics on malformed input: a wrong-size key in a
//! CF means corrupted storage or wrong-CF access, and silently degrading
//! would hide it.

use thought_link_core::ThoughtId;
use uuid::Uuid;

/// Key for the singleton distribution cache.
pub const DISTRIBUTION_KEY: &[u8] = b"current";

// =============================================================================
// THOUGHTS (id, 8 bytes BE)
// =============================================================================

/// Key for the thoughts CF.
#[inline]
pub fn thought_key(id: ThoughtId) -> [u8; 8] {
    id.to_be_bytes()
}

/// Parse a thoughts CF key.
///
/// # Panics
/// Panics if the key is not exactly 8 bytes.
#[inline]
pub fn parse_thought_key(key: &[u8]) -> ThoughtId {
    let bytes: [u8; 8] = key.try_into().unwrap_or_else(|_| {
        panic!(
            "STORAGE ERROR: thoughts key must be 8 bytes, got {} bytes: {:02x?}",
            key.len(),
            key
        )
    });
    ThoughtId::from_be_bytes(bytes)
}

// =============================================================================
// SAMPLING INDEX (key bits 8 BE + id 8 BE = 16 bytes)
// =============================================================================

/// Key for the sampling index CF.
///
/// The sampling key is in [0, 1), so its IEEE-754 bits are non-negative and
/// their big-endian byte order equals numeric order.
#[inline]
pub fn sampling_index_key(sampling_key: f64, id: ThoughtId) -> [u8; 16] {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&sampling_key.to_bits().to_be_bytes());
    key[8..].copy_from_slice(&id.to_be_bytes());
    key
}

/// Prefix of the sampling index keyspace at a given cutoff; scanning forward
/// from here visits exactly the items with sampling key >= cutoff.
#[inline]
pub fn sampling_index_cutoff(cutoff: f64) -> [u8; 8] {
    cutoff.to_bits().to_be_bytes()
}

/// Parse a sampling index key back to (sampling_key, id).
///
/// # Panics
/// Panics if the key is not exactly 16 bytes.
#[inline]
pub fn parse_sampling_index_key(key: &[u8]) -> (f64, ThoughtId) {
    if key.len() != 16 {
        panic!(
            "STORAGE ERROR: sampling_index key must be 16 bytes, got {} bytes: {:02x?}",
            key.len(),
            key
        );
    }
    let bits = u64::from_be_bytes(key[..8].try_into().expect("checked length"));
    let id = ThoughtId::from_be_bytes(key[8..].try_into().expect("checked length"));
    (f64::from_bits(bits), id)
}

// =============================================================================
// CANDIDATES (id_a 8 BE + id_b 8 BE = 16 bytes, a < b)
// =============================================================================

/// Key for the candidates CF. Normalizes to smaller-id-first, so the
/// unordered pair maps to exactly one key.
#[inline]
pub fn candidate_key(a: ThoughtId, b: ThoughtId) -> [u8; 16] {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&lo.to_be_bytes());
    key[8..].copy_from_slice(&hi.to_be_bytes());
    key
}

/// Parse a candidates CF key back to (id_a, id_b).
///
/// # Panics
/// Panics if the key is not exactly 16 bytes.
#[inline]
pub fn parse_candidate_key(key: &[u8]) -> (ThoughtId, ThoughtId) {
    if key.len() != 16 {
        panic!(
            "STORAGE ERROR: candidates key must be 16 bytes, got {} bytes: {:02x?}",
            key.len(),
            key
        );
    }
    let a = ThoughtId::from_be_bytes(key[..8].try_into().expect("checked length"));
    let b = ThoughtId::from_be_bytes(key[8..].try_into().expect("checked length"));
    (a, b)
}

// =============================================================================
// MINING PROGRESS / SAMPLE RUNS (run uuid, 16 bytes)
// =============================================================================

/// Key for the mining_progress and sample_runs CFs.
#[inline]
pub fn run_key(run_id: &Uuid) -> [u8; 16] {
    *run_id.as_bytes()
}

/// Parse a run-keyed CF key back to a Uuid.
///
/// # Panics
/// Panics if the key is not exactly 16 bytes.
#[inline]
pub fn parse_run_key(key: &[u8]) -> Uuid {
    Uuid::from_slice(key).unwrap_or_else(|e| {
        panic!(
            "STORAGE ERROR: run key must be a 16-byte uuid, got {} bytes ({}): {:02x?}",
            key.len(),
            e,
            key
        )
    })
}

// =============================================================================
// SIMILARITY SAMPLES (run uuid 16 + seq 8 BE = 24 bytes)
// =============================================================================

/// Key for the similarity_samples CF.
#[inline]
pub fn sample_key(run_id: &Uuid, seq: u64) -> [u8; 24] {
    let mut key = [0u8; 24];
    key[..16].copy_from_slice(run_id.as_bytes());
    key[16..].copy_from_slice(&seq.to_be_bytes());
    key
}

/// Prefix covering every sample of a run.
#[inline]
pub fn sample_run_prefix(run_id: &Uuid) -> [u8; 16] {
    *run_id.as_bytes()
}

/// Parse a similarity_samples key back to (run_id, seq).
///
/// # Panics
/// Panics if the key is not exactly 24 bytes.
#[inline]
pub fn parse_sample_key(key: &[u8]) -> (Uuid, u64) {
    if key.len() != 24 {
        panic!(
            "STORAGE ERROR: similarity_samples key must be 24 bytes, got {} bytes: {:02x?}",
            key.len(),
            key
        );
    }
    let run_id = Uuid::from_slice(&key[..16]).unwrap_or_else(|e| {
        panic!(
            "STORAGE ERROR: invalid uuid in similarity_samples key ({}): {:02x?}",
            e, key
        )
    });
    let seq = u64::from_be_bytes(key[16..].try_into().expect("checked length"));
    (run_id, seq)
}
