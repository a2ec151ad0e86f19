//! Integration tests driving the core mining and sketch algorithms against
//! the RocksDB store, plus round trips for each column family.

use chrono::{Duration, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tempfile::TempDir;
use uuid::Uuid;

use thought_link_core::store::MiningStore;
use thought_link_core::types::{
    CandidatePair, MiningParams, MiningProgress, MiningStatus, ScoreStatus, SimilaritySample,
    ThoughtUnit,
};
use thought_link_core::{
    build_sketch, compute_distribution, CoreError, MiningRunner, RunSelector, SketchParams,
};

use crate::config::MiningStoreConfig;
use crate::store::RocksDbMiningStore;

fn open_store() -> (RocksDbMiningStore, TempDir) {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let dir = TempDir::new().expect("create temp dir");
    let store = RocksDbMiningStore::open(dir.path()).expect("open store");
    (store, dir)
}

fn seed_corpus(store: &RocksDbMiningStore, n: u64, origins: usize, seed: u64) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let groups: Vec<Uuid> = (0..origins).map(|_| Uuid::new_v4()).collect();
    let units: Vec<ThoughtUnit> = (1..=n)
        .map(|id| {
            let embedding: Vec<f32> = (0..8).map(|_| rng.gen_range(-1.0..1.0)).collect();
            ThoughtUnit::with_sampling_key(
                id,
                embedding,
                groups[(id as usize - 1) % origins],
                rng.gen::<f64>(),
            )
        })
        .collect();
    store.put_thoughts(&units).expect("seed corpus");
}

#[test]
fn test_open_and_health_check() {
    let (store, _dir) = open_store();
    let health = store.health_check().unwrap();
    assert!(health.is_healthy);
    assert_eq!(health.thought_count, 0);
    assert_eq!(health.candidate_count, 0);
    assert_eq!(health.sample_count, 0);
}

#[test]
fn test_open_with_custom_config() {
    let dir = TempDir::new().unwrap();
    let config = MiningStoreConfig {
        block_cache_size: 8 * 1024 * 1024,
        max_open_files: 100,
        ..Default::default()
    };
    let store = RocksDbMiningStore::open_with_config(dir.path(), config).unwrap();
    assert!(store.health_check().unwrap().is_healthy);
}

#[test]
fn test_thought_round_trip_and_persistence() {
    let dir = TempDir::new().unwrap();
    let unit = ThoughtUnit::with_sampling_key(7, vec![0.1, 0.2, 0.3], Uuid::new_v4(), 0.42);
    {
        let store = RocksDbMiningStore::open(dir.path()).unwrap();
        store.put_thought(&unit).unwrap();
        assert_eq!(store.get_thought(7).unwrap(), Some(unit.clone()));
    }
    // Survives a close and reopen.
    let store = RocksDbMiningStore::open(dir.path()).unwrap();
    assert_eq!(store.get_thought(7).unwrap(), Some(unit));
    assert_eq!(store.get_thought(8).unwrap(), None);
}

#[test]
fn test_put_thought_rejects_invalid_unit() {
    let (store, _dir) = open_store();
    let unit = ThoughtUnit::with_sampling_key(1, vec![], Uuid::new_v4(), 0.5);
    assert!(store.put_thought(&unit).is_err());
}

#[test]
fn test_list_after_keyset_pagination() {
    let (store, _dir) = open_store();
    seed_corpus(&store, 10, 2, 1);

    let page = store.list_after(0, 4).unwrap();
    assert_eq!(page.iter().map(|u| u.id).collect::<Vec<_>>(), vec![1, 2, 3, 4]);

    let page = store.list_after(4, 4).unwrap();
    assert_eq!(page.iter().map(|u| u.id).collect::<Vec<_>>(), vec![5, 6, 7, 8]);

    let page = store.list_after(8, 4).unwrap();
    assert_eq!(page.iter().map(|u| u.id).collect::<Vec<_>>(), vec![9, 10]);

    assert!(store.list_after(10, 4).unwrap().is_empty());
    assert!(store.list_after(u64::MAX, 4).unwrap().is_empty());
    assert_eq!(store.count_thoughts().unwrap(), 10);
}

#[test]
fn test_sample_by_key_orders_by_sampling_key() {
    let (store, _dir) = open_store();
    let origin = Uuid::new_v4();
    for (id, key) in [(1u64, 0.9), (2, 0.1), (3, 0.5), (4, 0.3)] {
        store
            .put_thought(&ThoughtUnit::with_sampling_key(id, vec![1.0], origin, key))
            .unwrap();
    }

    let sampled = store.sample_by_key(0.2, 10).unwrap();
    assert_eq!(sampled.iter().map(|u| u.id).collect::<Vec<_>>(), vec![4, 3, 1]);

    // Limit is respected within the ordered scan.
    let sampled = store.sample_by_key(0.0, 2).unwrap();
    assert_eq!(sampled.iter().map(|u| u.id).collect::<Vec<_>>(), vec![2, 4]);
}

#[test]
fn test_upsert_candidates_is_idempotent() {
    let (store, _dir) = open_store();

    let pairs = vec![
        CandidatePair::new(1, 2, 0.4),
        CandidatePair::new(5, 3, 0.6), // stored normalized as (3, 5)
    ];
    assert_eq!(store.upsert_candidates(&pairs).unwrap(), 2);

    // A retried batch plus the same pair in the opposite order inserts
    // nothing new.
    let retry = vec![CandidatePair::new(2, 1, 0.9), CandidatePair::new(3, 5, 0.1)];
    assert_eq!(store.upsert_candidates(&retry).unwrap(), 0);

    let pending = store.pending_candidates(10).unwrap();
    assert_eq!(pending.len(), 2);
    // The original similarity survives the ignored re-insert.
    let first = pending.iter().find(|p| p.key() == (1, 2)).unwrap();
    assert!((first.similarity - 0.4).abs() < f32::EPSILON);
}

#[test]
fn test_mark_scored_updates_status() {
    let (store, _dir) = open_store();
    store
        .upsert_candidates(&[CandidatePair::new(1, 2, 0.4)])
        .unwrap();

    // Id order does not matter for the caller.
    store.mark_scored(2, 1, 0.87, ScoreStatus::Completed).unwrap();

    assert!(store.pending_candidates(10).unwrap().is_empty());

    let err = store
        .mark_scored(8, 9, 0.5, ScoreStatus::Completed)
        .unwrap_err();
    assert!(matches!(err, CoreError::Storage { .. }));
}

#[test]
fn test_pending_candidates_respects_limit() {
    let (store, _dir) = open_store();
    let pairs: Vec<CandidatePair> = (1..=6)
        .map(|i| CandidatePair::new(i, i + 100, 0.5))
        .collect();
    store.upsert_candidates(&pairs).unwrap();
    store.mark_scored(1, 101, 0.9, ScoreStatus::Completed).unwrap();

    let pending = store.pending_candidates(3).unwrap();
    assert_eq!(pending.len(), 3);
    assert!(pending.iter().all(|p| p.status == ScoreStatus::Pending));

    // "Up to limit" includes the degenerate zero limit.
    assert!(store.pending_candidates(0).unwrap().is_empty());
}

#[test]
fn test_progress_round_trip_and_cas() {
    let (store, _dir) = open_store();
    let run_id = Uuid::new_v4();
    let progress = MiningProgress::new(run_id, MiningParams::default());
    store.put_progress(&progress).unwrap();
    assert_eq!(store.get_progress(run_id).unwrap(), Some(progress.clone()));

    let mut advanced = progress.clone();
    advanced.last_source_id = 50;
    advanced.sources_processed = 50;
    store.advance_progress(&advanced, 0).unwrap();

    // A worker still holding the old checkpoint loses the race.
    let mut stale = progress;
    stale.last_source_id = 40;
    let err = store.advance_progress(&stale, 0).unwrap_err();
    assert!(matches!(
        err,
        CoreError::ProgressConflict {
            expected: 0,
            actual: 50,
            ..
        }
    ));

    assert_eq!(store.get_progress(run_id).unwrap().unwrap().last_source_id, 50);
}

#[test]
fn test_advance_progress_unknown_run() {
    let (store, _dir) = open_store();
    let progress = MiningProgress::new(Uuid::new_v4(), MiningParams::default());
    assert!(matches!(
        store.advance_progress(&progress, 0).unwrap_err(),
        CoreError::RunNotFound { .. }
    ));
}

#[test]
fn test_samples_append_and_read_per_run() {
    let (store, _dir) = open_store();
    let run_a = Uuid::new_v4();
    let run_b = Uuid::new_v4();

    let batch_a: Vec<SimilaritySample> = [0.1f32, 0.2, 0.3]
        .iter()
        .map(|&v| SimilaritySample::new(run_a, v, (1, 2)))
        .collect();
    store.append_samples(run_a, &batch_a).unwrap();
    store
        .append_samples(run_b, &[SimilaritySample::new(run_b, 0.9, (3, 4))])
        .unwrap();
    // Second append to the same run continues the sequence.
    store
        .append_samples(run_a, &[SimilaritySample::new(run_a, 0.4, (5, 6))])
        .unwrap();

    assert_eq!(store.samples_for_run(run_a, None).unwrap(), vec![0.1, 0.2, 0.3, 0.4]);
    assert_eq!(store.samples_for_run(run_b, None).unwrap(), vec![0.9]);
    assert_eq!(store.samples_for_run(run_a, Some(2)).unwrap(), vec![0.1, 0.2]);
    assert!(store.samples_for_run(Uuid::new_v4(), None).unwrap().is_empty());
}

#[test]
fn test_sample_sequence_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let run_id = Uuid::new_v4();
    {
        let store = RocksDbMiningStore::open(dir.path()).unwrap();
        store
            .append_samples(run_id, &[SimilaritySample::new(run_id, 0.5, (1, 2))])
            .unwrap();
    }
    // Reopening recovers the next sequence from disk rather than
    // overwriting the first observation.
    let store = RocksDbMiningStore::open(dir.path()).unwrap();
    store
        .append_samples(run_id, &[SimilaritySample::new(run_id, 0.7, (3, 4))])
        .unwrap();
    assert_eq!(store.samples_for_run(run_id, None).unwrap(), vec![0.5, 0.7]);
}

#[test]
fn test_latest_sample_run_tracks_first_append() {
    let (store, _dir) = open_store();
    assert_eq!(store.latest_sample_run().unwrap(), None);

    let run_a = Uuid::new_v4();
    store
        .append_samples(run_a, &[SimilaritySample::new(run_a, 0.1, (1, 2))])
        .unwrap();
    std::thread::sleep(std::time::Duration::from_millis(5));

    let run_b = Uuid::new_v4();
    store
        .append_samples(run_b, &[SimilaritySample::new(run_b, 0.2, (3, 4))])
        .unwrap();
    std::thread::sleep(std::time::Duration::from_millis(5));

    // A later append to an older run does not change its start time.
    store
        .append_samples(run_a, &[SimilaritySample::new(run_a, 0.3, (5, 6))])
        .unwrap();

    assert_eq!(store.latest_sample_run().unwrap(), Some(run_b));
}

#[test]
fn test_latest_sample_run_is_stable_under_close_registrations() {
    let (store, _dir) = open_store();

    // Runs registered back to back may share a timestamp at the clock's
    // granularity; the winner must still be deterministic.
    let runs: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
    for run_id in &runs {
        store
            .append_samples(*run_id, &[SimilaritySample::new(*run_id, 0.5, (1, 2))])
            .unwrap();
    }

    let first = store.latest_sample_run().unwrap().expect("runs exist");
    assert!(runs.contains(&first));
    for _ in 0..10 {
        assert_eq!(store.latest_sample_run().unwrap(), Some(first));
    }
}

#[test]
fn test_prune_sample_runs_by_age() {
    let (store, _dir) = open_store();
    let run_a = Uuid::new_v4();
    let run_b = Uuid::new_v4();
    store
        .append_samples(run_a, &[SimilaritySample::new(run_a, 0.1, (1, 2))])
        .unwrap();
    std::thread::sleep(std::time::Duration::from_millis(5));
    let midpoint = Utc::now();
    std::thread::sleep(std::time::Duration::from_millis(5));
    store
        .append_samples(run_b, &[SimilaritySample::new(run_b, 0.2, (3, 4))])
        .unwrap();

    assert_eq!(store.prune_sample_runs(midpoint).unwrap(), 1);
    assert!(store.samples_for_run(run_a, None).unwrap().is_empty());
    assert_eq!(store.samples_for_run(run_b, None).unwrap(), vec![0.2]);
    assert_eq!(store.latest_sample_run().unwrap(), Some(run_b));

    // Nothing older remains.
    assert_eq!(store.prune_sample_runs(midpoint).unwrap(), 0);
    // Everything ages out eventually.
    assert_eq!(store.prune_sample_runs(Utc::now() + Duration::hours(1)).unwrap(), 1);
    assert_eq!(store.latest_sample_run().unwrap(), None);
}

#[test]
fn test_distribution_cache_round_trip() {
    let (store, _dir) = open_store();
    assert!(store.load_distribution().unwrap().is_none());

    let summary = thought_link_core::types::DistributionSummary {
        sample_count: 3,
        percentiles: (0..=100).map(|p| p as f32 / 100.0).collect(),
        mean: 0.5,
        std_dev: 0.2,
        run_id: Uuid::new_v4(),
        computed_at: Utc::now(),
        approximate: true,
    };
    store.store_distribution(&summary).unwrap();
    assert_eq!(store.load_distribution().unwrap(), Some(summary.clone()));

    // Singleton: a second write replaces the first.
    let mut replacement = summary;
    replacement.mean = 0.6;
    store.store_distribution(&replacement).unwrap();
    assert_eq!(store.load_distribution().unwrap(), Some(replacement));
}

#[test]
fn test_mining_run_end_to_end() {
    let (store, _dir) = open_store();
    seed_corpus(&store, 30, 5, 99);

    let params = MiningParams {
        source_batch_size: 8,
        dest_sample_size: 16,
        k: 3,
        max_rounds: 2,
        ..Default::default()
    };

    let runner = MiningRunner::new(&store);
    let run_id = runner.start_run(params.clone()).unwrap();
    runner.run_to_completion(run_id).unwrap();

    let progress = runner.progress(run_id).unwrap();
    assert_eq!(progress.status, MiningStatus::Completed);
    assert_eq!(progress.last_source_id, 30);
    assert_eq!(progress.sources_processed, 30);

    let pending = store.pending_candidates(10_000).unwrap();
    assert_eq!(pending.len() as u64, progress.pairs_inserted);
    for pair in &pending {
        assert!(pair.thought_a < pair.thought_b);
        assert!((0.0..=1.0).contains(&pair.similarity));
        let a = store.get_thought(pair.thought_a).unwrap().unwrap();
        let b = store.get_thought(pair.thought_b).unwrap().unwrap();
        assert_ne!(a.origin, b.origin);
    }
}

#[test]
fn test_mining_resume_across_reopen() {
    let dir = TempDir::new().unwrap();
    let params = MiningParams {
        source_batch_size: 4,
        dest_sample_size: 8,
        k: 2,
        max_rounds: 2,
        ..Default::default()
    };

    let run_id;
    {
        let store = RocksDbMiningStore::open(dir.path()).unwrap();
        seed_corpus(&store, 12, 3, 7);
        let runner = MiningRunner::new(&store);
        run_id = runner.start_run(params).unwrap();
        runner.run_next_batch(run_id).unwrap();
    }

    // A new process picks the checkpoint up from disk and finishes.
    let store = RocksDbMiningStore::open(dir.path()).unwrap();
    let runner = MiningRunner::new(&store);
    assert!(runner.progress(run_id).unwrap().last_source_id >= 4);
    runner.run_to_completion(run_id).unwrap();
    assert_eq!(runner.progress(run_id).unwrap().status, MiningStatus::Completed);
}

#[test]
fn test_sketch_and_distribution_against_rocksdb() {
    let (store, _dir) = open_store();
    seed_corpus(&store, 25, 5, 11);

    let params = SketchParams {
        seed: 42,
        src_sample_size: 6,
        dst_sample_size: 6,
        rounds: 2,
        exclude_same_origin: true,
    };
    let outcome = build_sketch(&store, &params).unwrap();
    assert!(outcome.inserted_samples > 0);

    let summary = compute_distribution(&store, RunSelector::Latest, None).unwrap();
    assert_eq!(summary.run_id, outcome.run_id);
    assert_eq!(summary.sample_count, outcome.inserted_samples);
    assert!(summary.percentile(10) <= summary.percentile(90));

    let cached = store.load_distribution().unwrap().expect("cache written");
    assert_eq!(cached, summary);
}
