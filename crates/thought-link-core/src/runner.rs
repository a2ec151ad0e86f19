//! Mining run driver.
//!
//! Wraps [`mine_batch`](crate::miner::mine_batch) with resumable progress
//! bookkeeping: an external driver loop calls [`MiningRunner::run_next_batch`]
//! until the run completes. A small pool of workers may share one runner;
//! the conditional checkpoint advance keeps them from double-processing a
//! source range.

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::miner::{mine_batch, BatchOutcome, MiningParams};
use crate::store::MiningStore;
use crate::types::{MiningProgress, MiningStatus};

/// Progress-tracked driver for mining runs.
pub struct MiningRunner<'a> {
    store: &'a dyn MiningStore,
}

impl<'a> MiningRunner<'a> {
    /// Create a runner over a store handle.
    pub fn new(store: &'a dyn MiningStore) -> Self {
        Self { store }
    }

    /// Start a fresh run: validates the parameters and writes a new
    /// `InProgress` progress row starting at source id 0.
    pub fn start_run(&self, params: MiningParams) -> CoreResult<Uuid> {
        params.validate()?;
        let run_id = Uuid::new_v4();
        let progress = MiningProgress::new(run_id, params);
        self.store.put_progress(&progress)?;
        info!(%run_id, "started mining run");
        Ok(run_id)
    }

    /// Process the next batch of an active run.
    ///
    /// On success the checkpoint is advanced with a conditional write; a
    /// `ProgressConflict` means another worker claimed the same range first
    /// and the caller should simply call again. When the corpus is
    /// exhausted the run transitions to `Completed`. On an unrecoverable
    /// error the run transitions to `Failed` with the captured message and
    /// the error propagates.
    pub fn run_next_batch(&self, run_id: Uuid) -> CoreResult<BatchOutcome> {
        let progress = self
            .store
            .get_progress(run_id)?
            .ok_or(CoreError::RunNotFound { run_id })?;

        if progress.status != MiningStatus::InProgress {
            return Err(CoreError::RunNotActive {
                run_id,
                status: progress.status,
                operation: "run next batch",
            });
        }

        let outcome = match mine_batch(self.store, progress.last_source_id, &progress.params) {
            Ok(outcome) => outcome,
            Err(err) => {
                self.mark_failed(&progress, &err);
                return Err(err);
            }
        };

        let mut updated = progress.clone();
        updated.updated_at = chrono::Utc::now();

        if outcome.exhausted {
            updated.status = MiningStatus::Completed;
            self.store.put_progress(&updated)?;
            info!(
                %run_id,
                sources_processed = updated.sources_processed,
                pairs_inserted = updated.pairs_inserted,
                "mining run completed"
            );
            return Ok(outcome);
        }

        updated.last_source_id = outcome.new_last_source_id;
        updated.sources_processed += outcome.sources_processed;
        updated.pairs_inserted += outcome.inserted;
        self.store
            .advance_progress(&updated, progress.last_source_id)?;
        Ok(outcome)
    }

    /// Drive the run until the corpus is exhausted. Returns the number of
    /// batches processed.
    pub fn run_to_completion(&self, run_id: Uuid) -> CoreResult<u64> {
        let mut batches = 0u64;
        loop {
            let outcome = self.run_next_batch(run_id)?;
            if outcome.exhausted {
                return Ok(batches);
            }
            batches += 1;
        }
    }

    /// Pause an active run between batches. Only `InProgress` runs can be
    /// paused.
    pub fn pause(&self, run_id: Uuid) -> CoreResult<()> {
        self.transition(run_id, MiningStatus::InProgress, MiningStatus::Paused, "pause")
    }

    /// Resume a paused run; the next batch re-reads the checkpoint and
    /// continues.
    pub fn resume(&self, run_id: Uuid) -> CoreResult<()> {
        self.transition(run_id, MiningStatus::Paused, MiningStatus::InProgress, "resume")
    }

    /// Fetch the progress row for inspection.
    pub fn progress(&self, run_id: Uuid) -> CoreResult<MiningProgress> {
        self.store
            .get_progress(run_id)?
            .ok_or(CoreError::RunNotFound { run_id })
    }

    fn transition(
        &self,
        run_id: Uuid,
        from: MiningStatus,
        to: MiningStatus,
        operation: &'static str,
    ) -> CoreResult<()> {
        let mut progress = self
            .store
            .get_progress(run_id)?
            .ok_or(CoreError::RunNotFound { run_id })?;
        if progress.status != from {
            return Err(CoreError::RunNotActive {
                run_id,
                status: progress.status,
                operation,
            });
        }
        progress.status = to;
        progress.updated_at = chrono::Utc::now();
        self.store.put_progress(&progress)?;
        info!(%run_id, ?to, "mining run status changed");
        Ok(())
    }

    /// Record an unrecoverable failure on the progress row so a human or a
    /// retry policy can inspect and resume.
    fn mark_failed(&self, progress: &MiningProgress, err: &CoreError) {
        let mut failed = progress.clone();
        failed.status = MiningStatus::Failed;
        failed.error = Some(err.to_string());
        failed.updated_at = chrono::Utc::now();
        warn!(run_id = %progress.run_id, error = %err, "mining run failed");
        if let Err(secondary) = self.store.put_progress(&failed) {
            error!(
                run_id = %progress.run_id,
                error = %secondary,
                "could not record run failure"
            );
        }
    }
}
