//! In-memory stub implementation of `MiningStore`.
//!
//! `MemoryMiningStore` is a thread-safe in-memory implementation of the
//! [`MiningStore`] trait intended for tests and prototyping. All scans are
//! O(n) over `BTreeMap`s; there is no persistence. For production use the
//! RocksDB store in `thought-link-storage`.

use std::collections::{BTreeMap, HashMap};

use parking_lot::Mutex;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::store::MiningStore;
use crate::types::{
    CandidatePair, DistributionSummary, MiningProgress, ScoreStatus, SimilaritySample, ThoughtId,
    ThoughtUnit,
};

#[derive(Default)]
struct Inner {
    thoughts: BTreeMap<ThoughtId, ThoughtUnit>,
    candidates: BTreeMap<(ThoughtId, ThoughtId), CandidatePair>,
    samples: HashMap<Uuid, Vec<SimilaritySample>>,
    /// Sketch runs in first-append order; the last entry is the latest run.
    sample_runs: Vec<Uuid>,
    progress: HashMap<Uuid, MiningProgress>,
    distribution: Option<DistributionSummary>,
}

/// In-memory `MiningStore` for tests.
///
/// A single mutex guards all collections so the conditional
/// `advance_progress` is atomic, mirroring the semantics the RocksDB store
/// provides.
#[derive(Default)]
pub struct MemoryMiningStore {
    inner: Mutex<Inner>,
}

impl MemoryMiningStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a thought unit (the ingestion surface, here for tests).
    pub fn put_thought(&self, unit: &ThoughtUnit) -> CoreResult<()> {
        unit.validate()?;
        self.inner.lock().thoughts.insert(unit.id, unit.clone());
        Ok(())
    }

    /// Total number of persisted candidate pairs.
    pub fn candidate_count(&self) -> usize {
        self.inner.lock().candidates.len()
    }

    /// Snapshot of all persisted candidate pairs, ordered by pair key.
    pub fn all_candidates(&self) -> Vec<CandidatePair> {
        self.inner.lock().candidates.values().cloned().collect()
    }
}

impl MiningStore for MemoryMiningStore {
    fn list_after(&self, after_id: ThoughtId, limit: usize) -> CoreResult<Vec<ThoughtUnit>> {
        let inner = self.inner.lock();
        let Some(start) = after_id.checked_add(1) else {
            return Ok(Vec::new());
        };
        Ok(inner
            .thoughts
            .range(start..)
            .take(limit)
            .map(|(_, unit)| unit.clone())
            .collect())
    }

    fn sample_by_key(&self, cutoff: f64, limit: usize) -> CoreResult<Vec<ThoughtUnit>> {
        let inner = self.inner.lock();
        let mut eligible: Vec<&ThoughtUnit> = inner
            .thoughts
            .values()
            .filter(|unit| unit.sampling_key >= cutoff)
            .collect();
        eligible.sort_by(|a, b| a.sampling_key.total_cmp(&b.sampling_key));
        Ok(eligible.into_iter().take(limit).cloned().collect())
    }

    fn count_thoughts(&self) -> CoreResult<u64> {
        Ok(self.inner.lock().thoughts.len() as u64)
    }

    fn upsert_candidates(&self, pairs: &[CandidatePair]) -> CoreResult<u64> {
        let mut inner = self.inner.lock();
        let mut inserted = 0u64;
        for pair in pairs {
            pair.validate()?;
            if !inner.candidates.contains_key(&pair.key()) {
                inner.candidates.insert(pair.key(), pair.clone());
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    fn pending_candidates(&self, limit: usize) -> CoreResult<Vec<CandidatePair>> {
        let inner = self.inner.lock();
        Ok(inner
            .candidates
            .values()
            .filter(|p| p.status == ScoreStatus::Pending)
            .take(limit)
            .cloned()
            .collect())
    }

    fn mark_scored(
        &self,
        a: ThoughtId,
        b: ThoughtId,
        score: f32,
        status: ScoreStatus,
    ) -> CoreResult<()> {
        let key = if a <= b { (a, b) } else { (b, a) };
        let mut inner = self.inner.lock();
        let pair = inner.candidates.get_mut(&key).ok_or(CoreError::Storage {
            message: format!("candidate pair ({}, {}) not found", key.0, key.1),
        })?;
        pair.score = Some(score);
        pair.status = status;
        pair.scored_at = Some(chrono::Utc::now());
        Ok(())
    }

    fn append_samples(&self, run_id: Uuid, samples: &[SimilaritySample]) -> CoreResult<()> {
        let mut inner = self.inner.lock();
        if !inner.sample_runs.contains(&run_id) {
            inner.sample_runs.push(run_id);
        }
        inner
            .samples
            .entry(run_id)
            .or_default()
            .extend_from_slice(samples);
        Ok(())
    }

    fn samples_for_run(&self, run_id: Uuid, limit: Option<usize>) -> CoreResult<Vec<f32>> {
        let inner = self.inner.lock();
        let values = inner
            .samples
            .get(&run_id)
            .map(|s| s.iter().map(|sample| sample.value))
            .into_iter()
            .flatten();
        Ok(match limit {
            Some(cap) => values.take(cap).collect(),
            None => values.collect(),
        })
    }

    fn latest_sample_run(&self) -> CoreResult<Option<Uuid>> {
        Ok(self.inner.lock().sample_runs.last().copied())
    }

    fn get_progress(&self, run_id: Uuid) -> CoreResult<Option<MiningProgress>> {
        Ok(self.inner.lock().progress.get(&run_id).cloned())
    }

    fn put_progress(&self, progress: &MiningProgress) -> CoreResult<()> {
        self.inner
            .lock()
            .progress
            .insert(progress.run_id, progress.clone());
        Ok(())
    }

    fn advance_progress(
        &self,
        progress: &MiningProgress,
        expected_last: ThoughtId,
    ) -> CoreResult<()> {
        let mut inner = self.inner.lock();
        let stored = inner
            .progress
            .get(&progress.run_id)
            .ok_or(CoreError::RunNotFound {
                run_id: progress.run_id,
            })?;
        if stored.last_source_id != expected_last {
            return Err(CoreError::ProgressConflict {
                run_id: progress.run_id,
                expected: expected_last,
                actual: stored.last_source_id,
            });
        }
        inner.progress.insert(progress.run_id, progress.clone());
        Ok(())
    }

    fn load_distribution(&self) -> CoreResult<Option<DistributionSummary>> {
        Ok(self.inner.lock().distribution.clone())
    }

    fn store_distribution(&self, summary: &DistributionSummary) -> CoreResult<()> {
        self.inner.lock().distribution = Some(summary.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MiningParams;

    fn unit(id: ThoughtId, key: f64) -> ThoughtUnit {
        ThoughtUnit::with_sampling_key(id, vec![1.0, 0.0], Uuid::new_v4(), key)
    }

    #[test]
    fn test_list_after_is_keyset_paged() {
        let store = MemoryMiningStore::new();
        for i in 1..=10 {
            store.put_thought(&unit(i, i as f64 / 11.0)).unwrap();
        }
        let page = store.list_after(3, 4).unwrap();
        let ids: Vec<_> = page.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![4, 5, 6, 7]);

        assert!(store.list_after(10, 4).unwrap().is_empty());
        assert!(store.list_after(u64::MAX, 4).unwrap().is_empty());
    }

    #[test]
    fn test_sample_by_key_orders_by_key() {
        let store = MemoryMiningStore::new();
        store.put_thought(&unit(1, 0.9)).unwrap();
        store.put_thought(&unit(2, 0.2)).unwrap();
        store.put_thought(&unit(3, 0.5)).unwrap();

        let sample = store.sample_by_key(0.3, 10).unwrap();
        let ids: Vec<_> = sample.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_upsert_ignores_duplicates() {
        let store = MemoryMiningStore::new();
        let pair = CandidatePair::new(1, 2, 0.5);
        assert_eq!(store.upsert_candidates(&[pair.clone()]).unwrap(), 1);
        assert_eq!(store.upsert_candidates(&[pair]).unwrap(), 0);
        assert_eq!(store.candidate_count(), 1);
    }

    #[test]
    fn test_mark_scored_either_order() {
        let store = MemoryMiningStore::new();
        store
            .upsert_candidates(&[CandidatePair::new(5, 3, 0.4)])
            .unwrap();
        store
            .mark_scored(5, 3, 0.87, ScoreStatus::Completed)
            .unwrap();

        let pairs = store.all_candidates();
        assert_eq!(pairs[0].score, Some(0.87));
        assert_eq!(pairs[0].status, ScoreStatus::Completed);
        assert!(pairs[0].scored_at.is_some());
        assert!(store.pending_candidates(10).unwrap().is_empty());
    }

    #[test]
    fn test_advance_progress_conflict() {
        let store = MemoryMiningStore::new();
        let mut progress = MiningProgress::new(Uuid::new_v4(), MiningParams::default());
        store.put_progress(&progress).unwrap();

        progress.last_source_id = 50;
        store.advance_progress(&progress, 0).unwrap();

        // Advancing from a stale cursor must conflict.
        let mut stale = progress.clone();
        stale.last_source_id = 75;
        let err = store.advance_progress(&stale, 0).unwrap_err();
        assert!(matches!(err, CoreError::ProgressConflict { .. }));
    }

    #[test]
    fn test_latest_sample_run_tracks_first_append_order() {
        let store = MemoryMiningStore::new();
        assert!(store.latest_sample_run().unwrap().is_none());

        let run_a = Uuid::new_v4();
        let run_b = Uuid::new_v4();
        store
            .append_samples(run_a, &[SimilaritySample::new(run_a, 0.5, (1, 2))])
            .unwrap();
        store
            .append_samples(run_b, &[SimilaritySample::new(run_b, 0.6, (1, 3))])
            .unwrap();
        // A late append to an earlier run does not change recency.
        store
            .append_samples(run_a, &[SimilaritySample::new(run_a, 0.7, (2, 3))])
            .unwrap();

        assert_eq!(store.latest_sample_run().unwrap(), Some(run_b));
        assert_eq!(store.samples_for_run(run_a, None).unwrap().len(), 2);
        assert_eq!(store.samples_for_run(run_a, Some(1)).unwrap().len(), 1);
    }
}
