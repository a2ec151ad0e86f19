//! RocksDB-backed implementation of the `MiningStore` trait.
//!
//! # Thread Safety
//!
//! RocksDB's `DB` is internally thread-safe for concurrent reads and
//! writes; the store can be shared across threads via `Arc`. The only
//! operation needing extra coordination is the conditional progress
//! advance, which holds a mutex across its read-compare-write so it
//! behaves as a single-process compare-and-swap.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rocksdb::{Cache, ColumnFamily, Direction, IteratorMode, Options, WriteBatch, DB};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};
use uuid::Uuid;

use thought_link_core::store::MiningStore;
use thought_link_core::types::{
    CandidatePair, DistributionSummary, MiningProgress, ScoreStatus, SimilaritySample, ThoughtId,
    ThoughtUnit,
};
use thought_link_core::{CoreError, CoreResult};

use crate::column_families::{
    get_cf_descriptors, ALL_CFS, CF_CANDIDATES, CF_DISTRIBUTION, CF_MINING_PROGRESS,
    CF_SAMPLE_RUNS, CF_SAMPLING_INDEX, CF_SIMILARITY_SAMPLES, CF_THOUGHTS,
};
use crate::config::MiningStoreConfig;
use crate::error::{MiningStoreError, MiningStoreResult, STORAGE_VERSION};
use crate::schema::{
    candidate_key, parse_sample_key, parse_sampling_index_key, run_key, sample_key,
    sample_run_prefix, sampling_index_cutoff, sampling_index_key, thought_key, DISTRIBUTION_KEY,
};

/// Storage health snapshot. Counts are exact but taken without a snapshot,
/// so they may drift under concurrent writes; use for monitoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreHealth {
    /// Whether all column families are accessible.
    pub is_healthy: bool,
    /// Number of thought units.
    pub thought_count: u64,
    /// Number of candidate pairs.
    pub candidate_count: u64,
    /// Number of similarity samples across all runs.
    pub sample_count: u64,
}

/// RocksDB-backed mining store.
pub struct RocksDbMiningStore {
    /// The RocksDB database instance.
    db: DB,
    /// Shared block cache (kept alive for the DB lifetime).
    #[allow(dead_code)]
    cache: Cache,
    /// Database path.
    path: PathBuf,
    /// Guards the read-compare-write of `advance_progress`.
    progress_lock: Mutex<()>,
    /// Next append sequence per sketch run, recovered lazily from disk.
    sample_seq: Mutex<HashMap<Uuid, u64>>,
}

impl RocksDbMiningStore {
    /// Open a mining store at the given path with default configuration.
    ///
    /// Creates the database and all 7 column families if they don't exist.
    pub fn open<P: AsRef<Path>>(path: P) -> MiningStoreResult<Self> {
        Self::open_with_config(path, MiningStoreConfig::default())
    }

    /// Open a mining store with custom configuration.
    pub fn open_with_config<P: AsRef<Path>>(
        path: P,
        config: MiningStoreConfig,
    ) -> MiningStoreResult<Self> {
        let path_buf = path.as_ref().to_path_buf();
        let path_str = path_buf.to_string_lossy().to_string();

        info!(
            "Opening RocksDbMiningStore at '{}' with cache_size={}MB",
            path_str,
            config.block_cache_size / (1024 * 1024)
        );

        let cache = Cache::new_lru_cache(config.block_cache_size);

        let mut db_opts = Options::default();
        db_opts.create_if_missing(config.create_if_missing);
        db_opts.create_missing_column_families(true);
        db_opts.set_max_open_files(config.max_open_files);
        if !config.enable_wal {
            db_opts.set_manual_wal_flush(true);
        }

        let cf_descriptors = get_cf_descriptors(&cache);
        let db = DB::open_cf_descriptors(&db_opts, &path_str, cf_descriptors).map_err(|e| {
            error!("Failed to open RocksDB at '{}': {}", path_str, e);
            MiningStoreError::OpenFailed {
                path: path_str.clone(),
                message: e.to_string(),
            }
        })?;

        Ok(Self {
            db,
            cache,
            path: path_buf,
            progress_lock: Mutex::new(()),
            sample_seq: Mutex::new(HashMap::new()),
        })
    }

    /// Database path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get a column family handle by name.
    fn get_cf(&self, name: &str) -> MiningStoreResult<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| MiningStoreError::ColumnFamilyNotFound {
                name: name.to_string(),
            })
    }

    /// Serialize a value with the storage version prefix.
    fn serialize_value<T: Serialize>(value: &T) -> MiningStoreResult<Vec<u8>> {
        let mut result = vec![STORAGE_VERSION];
        let encoded = bincode::serialize(value).map_err(|e| MiningStoreError::Serialization {
            type_name: std::any::type_name::<T>(),
            message: e.to_string(),
        })?;
        result.extend(encoded);
        Ok(result)
    }

    /// Deserialize a value, checking the storage version prefix.
    fn deserialize_value<T: for<'de> Deserialize<'de>>(
        data: &[u8],
        cf: &'static str,
        key: &str,
    ) -> MiningStoreResult<T> {
        if data.is_empty() {
            return Err(MiningStoreError::Deserialization {
                cf,
                key: key.to_string(),
                message: "empty value".to_string(),
            });
        }
        let version = data[0];
        if version != STORAGE_VERSION {
            return Err(MiningStoreError::VersionMismatch {
                cf,
                expected: STORAGE_VERSION,
                actual: version,
            });
        }
        bincode::deserialize(&data[1..]).map_err(|e| MiningStoreError::Deserialization {
            cf,
            key: key.to_string(),
            message: e.to_string(),
        })
    }

    /// Verify all column families are accessible and return counts.
    pub fn health_check(&self) -> MiningStoreResult<StoreHealth> {
        for cf_name in ALL_CFS {
            self.get_cf(cf_name)?;
        }
        Ok(StoreHealth {
            is_healthy: true,
            thought_count: self.count_cf(CF_THOUGHTS)?,
            candidate_count: self.count_cf(CF_CANDIDATES)?,
            sample_count: self.count_cf(CF_SIMILARITY_SAMPLES)?,
        })
    }

    fn count_cf(&self, cf_name: &'static str) -> MiningStoreResult<u64> {
        let cf = self.get_cf(cf_name)?;
        let mut count = 0u64;
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            item.map_err(|e| MiningStoreError::rocksdb_op("iterate", cf_name, None, e))?;
            count += 1;
        }
        Ok(count)
    }

    // ========================================================================
    // Thought units (ingestion surface)
    // ========================================================================

    /// Store a thought unit and its sampling-index entry atomically.
    pub fn put_thought(&self, unit: &ThoughtUnit) -> MiningStoreResult<()> {
        self.put_thoughts(std::slice::from_ref(unit))
    }

    /// Store a batch of thought units in one write batch.
    pub fn put_thoughts(&self, units: &[ThoughtUnit]) -> MiningStoreResult<()> {
        let thoughts_cf = self.get_cf(CF_THOUGHTS)?;
        let index_cf = self.get_cf(CF_SAMPLING_INDEX)?;

        let mut batch = WriteBatch::default();
        for unit in units {
            unit.validate()
                .map_err(|e| MiningStoreError::ValidationFailed(e.to_string()))?;
            let data = Self::serialize_value(unit)?;
            batch.put_cf(thoughts_cf, thought_key(unit.id), &data);
            batch.put_cf(index_cf, sampling_index_key(unit.sampling_key, unit.id), b"");
        }

        self.db
            .write(batch)
            .map_err(|e| MiningStoreError::rocksdb_op("write", CF_THOUGHTS, None, e))?;
        debug!(count = units.len(), "stored thought units");
        Ok(())
    }

    /// Fetch a thought unit by id.
    pub fn get_thought(&self, id: ThoughtId) -> MiningStoreResult<Option<ThoughtUnit>> {
        let cf = self.get_cf(CF_THOUGHTS)?;
        let key = thought_key(id);
        let data = self
            .db
            .get_pinned_cf(cf, key)
            .map_err(|e| MiningStoreError::rocksdb_op("get", CF_THOUGHTS, Some(&id.to_string()), e))?;
        match data {
            Some(data) => Ok(Some(Self::deserialize_value(
                &data,
                CF_THOUGHTS,
                &id.to_string(),
            )?)),
            None => Ok(None),
        }
    }

    fn list_after_impl(
        &self,
        after_id: ThoughtId,
        limit: usize,
    ) -> MiningStoreResult<Vec<ThoughtUnit>> {
        let Some(start) = after_id.checked_add(1) else {
            return Ok(Vec::new());
        };
        let cf = self.get_cf(CF_THOUGHTS)?;
        let start_key = thought_key(start);

        let mut results = Vec::with_capacity(limit);
        let iter = self
            .db
            .iterator_cf(cf, IteratorMode::From(&start_key, Direction::Forward));
        for item in iter.take(limit) {
            let (key, value) =
                item.map_err(|e| MiningStoreError::rocksdb_op("iterate", CF_THOUGHTS, None, e))?;
            let id = crate::schema::parse_thought_key(&key);
            results.push(Self::deserialize_value(&value, CF_THOUGHTS, &id.to_string())?);
        }
        Ok(results)
    }

    fn sample_by_key_impl(&self, cutoff: f64, limit: usize) -> MiningStoreResult<Vec<ThoughtUnit>> {
        let index_cf = self.get_cf(CF_SAMPLING_INDEX)?;
        let start = sampling_index_cutoff(cutoff.max(0.0));

        let mut results = Vec::with_capacity(limit);
        let iter = self
            .db
            .iterator_cf(index_cf, IteratorMode::From(&start, Direction::Forward));
        for item in iter.take(limit) {
            let (key, _) = item
                .map_err(|e| MiningStoreError::rocksdb_op("iterate", CF_SAMPLING_INDEX, None, e))?;
            let (sampling_key, id) = parse_sampling_index_key(&key);
            let unit = self
                .get_thought(id)?
                .ok_or_else(|| MiningStoreError::IndexCorrupted {
                    cf: CF_SAMPLING_INDEX,
                    message: format!(
                        "index entry (key={}, id={}) points at a missing thought",
                        sampling_key, id
                    ),
                })?;
            results.push(unit);
        }
        Ok(results)
    }

    // ========================================================================
    // Candidate pairs
    // ========================================================================

    fn upsert_candidates_impl(&self, pairs: &[CandidatePair]) -> MiningStoreResult<u64> {
        let cf = self.get_cf(CF_CANDIDATES)?;

        let mut batch = WriteBatch::default();
        let mut inserted = 0u64;
        for pair in pairs {
            pair.validate()
                .map_err(|e| MiningStoreError::ValidationFailed(e.to_string()))?;
            let key = candidate_key(pair.thought_a, pair.thought_b);

            // Unordered-pair uniqueness: silently skip pairs already
            // present, so retried batches never duplicate rows.
            let exists = self
                .db
                .get_pinned_cf(cf, key)
                .map_err(|e| {
                    MiningStoreError::rocksdb_op(
                        "get",
                        CF_CANDIDATES,
                        Some(&format!("({}, {})", pair.thought_a, pair.thought_b)),
                        e,
                    )
                })?
                .is_some();
            if exists {
                continue;
            }

            batch.put_cf(cf, key, Self::serialize_value(pair)?);
            inserted += 1;
        }

        if inserted > 0 {
            self.db
                .write(batch)
                .map_err(|e| MiningStoreError::rocksdb_op("write", CF_CANDIDATES, None, e))?;
        }
        debug!(inserted, total = pairs.len(), "upserted candidate pairs");
        Ok(inserted)
    }

    fn pending_candidates_impl(&self, limit: usize) -> MiningStoreResult<Vec<CandidatePair>> {
        let cf = self.get_cf(CF_CANDIDATES)?;

        // Full scan filtered by status. O(n) over candidates; acceptable for
        // the scorer's batch sizes. A status index would be needed if this
        // becomes hot.
        let mut results = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (key, value) =
                item.map_err(|e| MiningStoreError::rocksdb_op("iterate", CF_CANDIDATES, None, e))?;
            let (a, b) = crate::schema::parse_candidate_key(&key);
            let pair: CandidatePair =
                Self::deserialize_value(&value, CF_CANDIDATES, &format!("({}, {})", a, b))?;
            if pair.status == ScoreStatus::Pending {
                if results.len() >= limit {
                    break;
                }
                results.push(pair);
            }
        }
        Ok(results)
    }

    fn mark_scored_impl(
        &self,
        a: ThoughtId,
        b: ThoughtId,
        score: f32,
        status: ScoreStatus,
    ) -> MiningStoreResult<()> {
        let cf = self.get_cf(CF_CANDIDATES)?;
        let key = candidate_key(a, b);
        let key_str = format!("({}, {})", a.min(b), a.max(b));

        let data = self
            .db
            .get_pinned_cf(cf, key)
            .map_err(|e| MiningStoreError::rocksdb_op("get", CF_CANDIDATES, Some(&key_str), e))?
            .ok_or(MiningStoreError::NotFound {
                what: "candidate pair",
                key: key_str.clone(),
            })?;

        let mut pair: CandidatePair = Self::deserialize_value(&data, CF_CANDIDATES, &key_str)?;
        pair.score = Some(score);
        pair.status = status;
        pair.scored_at = Some(Utc::now());

        self.db
            .put_cf(cf, key, Self::serialize_value(&pair)?)
            .map_err(|e| MiningStoreError::rocksdb_op("put", CF_CANDIDATES, Some(&key_str), e))?;
        Ok(())
    }

    // ========================================================================
    // Similarity samples
    // ========================================================================

    /// Recover the next append sequence for a run from disk.
    fn recover_next_seq(&self, run_id: &Uuid) -> MiningStoreResult<u64> {
        let cf = self.get_cf(CF_SIMILARITY_SAMPLES)?;
        let upper = sample_key(run_id, u64::MAX);
        let prefix = sample_run_prefix(run_id);

        let mut iter = self
            .db
            .iterator_cf(cf, IteratorMode::From(&upper, Direction::Reverse));
        if let Some(item) = iter.next() {
            let (key, _) = item.map_err(|e| {
                MiningStoreError::rocksdb_op("iterate", CF_SIMILARITY_SAMPLES, None, e)
            })?;
            if key.len() == 24 && key[..16] == prefix {
                let (_, seq) = parse_sample_key(&key);
                return Ok(seq.saturating_add(1));
            }
        }
        Ok(0)
    }

    fn append_samples_impl(
        &self,
        run_id: Uuid,
        samples: &[SimilaritySample],
    ) -> MiningStoreResult<()> {
        if samples.is_empty() {
            return Ok(());
        }
        let samples_cf = self.get_cf(CF_SIMILARITY_SAMPLES)?;
        let runs_cf = self.get_cf(CF_SAMPLE_RUNS)?;

        let mut seq_map = self.sample_seq.lock();
        let next_seq = match seq_map.get(&run_id) {
            Some(&seq) => seq,
            None => self.recover_next_seq(&run_id)?,
        };

        let mut batch = WriteBatch::default();
        if next_seq == 0 {
            // First append registers the run so `latest` resolution and
            // age-based pruning never scan the sample pool itself.
            batch.put_cf(runs_cf, run_key(&run_id), Self::serialize_value(&Utc::now())?);
        }
        for (offset, sample) in samples.iter().enumerate() {
            let key = sample_key(&run_id, next_seq + offset as u64);
            batch.put_cf(samples_cf, key, Self::serialize_value(sample)?);
        }

        self.db.write(batch).map_err(|e| {
            MiningStoreError::rocksdb_op("write", CF_SIMILARITY_SAMPLES, None, e)
        })?;
        seq_map.insert(run_id, next_seq + samples.len() as u64);
        debug!(%run_id, appended = samples.len(), "appended similarity samples");
        Ok(())
    }

    fn samples_for_run_impl(
        &self,
        run_id: Uuid,
        limit: Option<usize>,
    ) -> MiningStoreResult<Vec<f32>> {
        let cf = self.get_cf(CF_SIMILARITY_SAMPLES)?;
        let start = sample_key(&run_id, 0);
        let prefix = sample_run_prefix(&run_id);

        let mut values = Vec::new();
        for item in self
            .db
            .iterator_cf(cf, IteratorMode::From(&start, Direction::Forward))
        {
            let (key, value) = item.map_err(|e| {
                MiningStoreError::rocksdb_op("iterate", CF_SIMILARITY_SAMPLES, None, e)
            })?;
            if key.len() != 24 || key[..16] != prefix {
                break;
            }
            let (_, seq) = parse_sample_key(&key);
            let sample: SimilaritySample =
                Self::deserialize_value(&value, CF_SIMILARITY_SAMPLES, &format!("seq:{}", seq))?;
            values.push(sample.value);
            if let Some(cap) = limit {
                if values.len() >= cap {
                    break;
                }
            }
        }
        Ok(values)
    }

    fn latest_sample_run_impl(&self) -> MiningStoreResult<Option<Uuid>> {
        let cf = self.get_cf(CF_SAMPLE_RUNS)?;

        let mut latest: Option<(DateTime<Utc>, Uuid)> = None;
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (key, value) =
                item.map_err(|e| MiningStoreError::rocksdb_op("iterate", CF_SAMPLE_RUNS, None, e))?;
            let run_id = crate::schema::parse_run_key(&key);
            let started: DateTime<Utc> =
                Self::deserialize_value(&value, CF_SAMPLE_RUNS, &run_id.to_string())?;
            // Ties on the registered timestamp break on the run id, so the
            // answer never depends on iteration order.
            if latest.map_or(true, |(ts, id)| (started, run_id) > (ts, id)) {
                latest = Some((started, run_id));
            }
        }
        Ok(latest.map(|(_, run_id)| run_id))
    }

    /// Delete all samples of sketch runs first appended before `older_than`.
    /// Returns the number of runs pruned.
    pub fn prune_sample_runs(&self, older_than: DateTime<Utc>) -> MiningStoreResult<u64> {
        let runs_cf = self.get_cf(CF_SAMPLE_RUNS)?;
        let samples_cf = self.get_cf(CF_SIMILARITY_SAMPLES)?;

        let mut aged_out = Vec::new();
        for item in self.db.iterator_cf(runs_cf, IteratorMode::Start) {
            let (key, value) =
                item.map_err(|e| MiningStoreError::rocksdb_op("iterate", CF_SAMPLE_RUNS, None, e))?;
            let run_id = crate::schema::parse_run_key(&key);
            let started: DateTime<Utc> =
                Self::deserialize_value(&value, CF_SAMPLE_RUNS, &run_id.to_string())?;
            if started < older_than {
                aged_out.push(run_id);
            }
        }

        if aged_out.is_empty() {
            return Ok(0);
        }

        let mut batch = WriteBatch::default();
        let mut seq_map = self.sample_seq.lock();
        for run_id in &aged_out {
            // delete_range is exclusive of the upper bound; the final key
            // at seq u64::MAX is deleted explicitly.
            let from = sample_key(run_id, 0);
            let to = sample_key(run_id, u64::MAX);
            batch.delete_range_cf(samples_cf, from, to);
            batch.delete_cf(samples_cf, to);
            batch.delete_cf(runs_cf, run_key(run_id));
            seq_map.remove(run_id);
        }
        self.db
            .write(batch)
            .map_err(|e| MiningStoreError::rocksdb_op("write", CF_SIMILARITY_SAMPLES, None, e))?;

        info!(pruned = aged_out.len(), "pruned aged-out sketch runs");
        Ok(aged_out.len() as u64)
    }

    // ========================================================================
    // Mining progress
    // ========================================================================

    fn get_progress_impl(&self, run_id: Uuid) -> MiningStoreResult<Option<MiningProgress>> {
        let cf = self.get_cf(CF_MINING_PROGRESS)?;
        let data = self.db.get_pinned_cf(cf, run_key(&run_id)).map_err(|e| {
            MiningStoreError::rocksdb_op("get", CF_MINING_PROGRESS, Some(&run_id.to_string()), e)
        })?;
        match data {
            Some(data) => Ok(Some(Self::deserialize_value(
                &data,
                CF_MINING_PROGRESS,
                &run_id.to_string(),
            )?)),
            None => Ok(None),
        }
    }

    fn put_progress_impl(&self, progress: &MiningProgress) -> MiningStoreResult<()> {
        let cf = self.get_cf(CF_MINING_PROGRESS)?;
        self.db
            .put_cf(cf, run_key(&progress.run_id), Self::serialize_value(progress)?)
            .map_err(|e| {
                MiningStoreError::rocksdb_op(
                    "put",
                    CF_MINING_PROGRESS,
                    Some(&progress.run_id.to_string()),
                    e,
                )
            })
    }

    // ========================================================================
    // Distribution cache
    // ========================================================================

    fn load_distribution_impl(&self) -> MiningStoreResult<Option<DistributionSummary>> {
        let cf = self.get_cf(CF_DISTRIBUTION)?;
        let data = self.db.get_pinned_cf(cf, DISTRIBUTION_KEY).map_err(|e| {
            MiningStoreError::rocksdb_op("get", CF_DISTRIBUTION, Some("current"), e)
        })?;
        match data {
            Some(data) => Ok(Some(Self::deserialize_value(
                &data,
                CF_DISTRIBUTION,
                "current",
            )?)),
            None => Ok(None),
        }
    }

    fn store_distribution_impl(&self, summary: &DistributionSummary) -> MiningStoreResult<()> {
        let cf = self.get_cf(CF_DISTRIBUTION)?;
        self.db
            .put_cf(cf, DISTRIBUTION_KEY, Self::serialize_value(summary)?)
            .map_err(|e| {
                MiningStoreError::rocksdb_op("put", CF_DISTRIBUTION, Some("current"), e)
            })
    }
}

impl MiningStore for RocksDbMiningStore {
    fn list_after(&self, after_id: ThoughtId, limit: usize) -> CoreResult<Vec<ThoughtUnit>> {
        Ok(self.list_after_impl(after_id, limit)?)
    }

    fn sample_by_key(&self, cutoff: f64, limit: usize) -> CoreResult<Vec<ThoughtUnit>> {
        Ok(self.sample_by_key_impl(cutoff, limit)?)
    }

    fn count_thoughts(&self) -> CoreResult<u64> {
        Ok(self.count_cf(CF_THOUGHTS)?)
    }

    fn upsert_candidates(&self, pairs: &[CandidatePair]) -> CoreResult<u64> {
        Ok(self.upsert_candidates_impl(pairs)?)
    }

    fn pending_candidates(&self, limit: usize) -> CoreResult<Vec<CandidatePair>> {
        Ok(self.pending_candidates_impl(limit)?)
    }

    fn mark_scored(
        &self,
        a: ThoughtId,
        b: ThoughtId,
        score: f32,
        status: ScoreStatus,
    ) -> CoreResult<()> {
        Ok(self.mark_scored_impl(a, b, score, status)?)
    }

    fn append_samples(&self, run_id: Uuid, samples: &[SimilaritySample]) -> CoreResult<()> {
        Ok(self.append_samples_impl(run_id, samples)?)
    }

    fn samples_for_run(&self, run_id: Uuid, limit: Option<usize>) -> CoreResult<Vec<f32>> {
        Ok(self.samples_for_run_impl(run_id, limit)?)
    }

    fn latest_sample_run(&self) -> CoreResult<Option<Uuid>> {
        Ok(self.latest_sample_run_impl()?)
    }

    fn get_progress(&self, run_id: Uuid) -> CoreResult<Option<MiningProgress>> {
        Ok(self.get_progress_impl(run_id)?)
    }

    fn put_progress(&self, progress: &MiningProgress) -> CoreResult<()> {
        Ok(self.put_progress_impl(progress)?)
    }

    fn advance_progress(
        &self,
        progress: &MiningProgress,
        expected_last: ThoughtId,
    ) -> CoreResult<()> {
        // Single-process CAS: the mutex makes read-compare-write atomic
        // against other in-process workers.
        let _guard = self.progress_lock.lock();

        let stored = self
            .get_progress_impl(progress.run_id)?
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
        Ok(self.put_progress_impl(progress)?)
    }

    fn load_distribution(&self) -> CoreResult<Option<DistributionSummary>> {
        Ok(self.load_distribution_impl()?)
    }

    fn store_distribution(&self, summary: &DistributionSummary) -> CoreResult<()> {
        Ok(self.store_distribution_impl(summary)?)
    }
}
