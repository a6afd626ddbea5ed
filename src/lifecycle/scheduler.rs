use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::config::LifecycleConfig;
use crate::error::Result;
use crate::store::{Assignment, AssignmentId, AssignmentStatus, AssignmentStore};

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PassReport {
    /// Records the pass looked at.
    pub examined: usize,
    pub opened: usize,
    pub closed: usize,
    /// Records that could not be evaluated and were left as they were.
    pub skipped: usize,
}

impl PassReport {
    pub fn changed(&self) -> usize {
        self.opened + self.closed
    }
}

/// Drives assignment status forward as time passes.
///
/// The scheduler owns no records. It holds a handle to the
/// [`AssignmentStore`] and periodically converges every non-terminal record
/// to the status its dates dictate. Passes are single-flight: a pass started
/// while another is running waits for it to finish.
pub struct LifecycleScheduler {
    store: AssignmentStore,
    config: LifecycleConfig,
    pass_guard: Mutex<()>,
}

impl LifecycleScheduler {
    pub fn new(store: AssignmentStore, config: LifecycleConfig) -> Self {
        Self {
            store,
            config,
            pass_guard: Mutex::new(()),
        }
    }

    /// Mark an assignment completed, whatever its current status.
    ///
    /// Completing an already completed assignment succeeds without changing
    /// it. A pass that reaches the record afterwards leaves it alone.
    pub async fn complete(&self, id: AssignmentId) -> Result<Assignment> {
        let assignment = self.store.complete(id).await?;
        tracing::info!(assignment_id = %id, "Assignment completed");
        Ok(assignment)
    }

    /// Run one reconciliation pass over every non-terminal assignment.
    ///
    /// `now` is sampled once, after the pass lock is taken. Each record is
    /// evaluated under its own write lock, so creates and completions can land
    /// between records. A record that fails evaluation is logged and skipped;
    /// the next pass retries it.
    pub async fn run_pass(&self) -> PassReport {
        let _guard = self.pass_guard.lock().await;
        let now = self.store.now();
        let ids = self.store.reconcilable_ids().await;
        let report = self.reconcile_ids(ids, now).await;

        tracing::debug!(
            now = %now,
            examined = report.examined,
            opened = report.opened,
            closed = report.closed,
            skipped = report.skipped,
            "Reconciliation pass finished"
        );
        report
    }

    /// Evaluate each id against the same `now`. Failures are isolated per
    /// record: they are counted as skipped and never stop the loop.
    async fn reconcile_ids(&self, ids: Vec<AssignmentId>, now: DateTime<Utc>) -> PassReport {
        let mut report = PassReport::default();

        for id in ids {
            report.examined += 1;
            match self.store.reconcile(id, now).await {
                Ok(Some(change)) => {
                    match change.to {
                        AssignmentStatus::Open => report.opened += 1,
                        AssignmentStatus::Closed => report.closed += 1,
                        _ => {}
                    }
                    tracing::debug!(
                        assignment_id = %id,
                        from = %change.from,
                        to = %change.to,
                        "Assignment status advanced"
                    );
                }
                Ok(None) => {}
                Err(e) => {
                    report.skipped += 1;
                    tracing::warn!(
                        assignment_id = %id,
                        error = %e,
                        "Skipping assignment during reconciliation"
                    );
                }
            }
        }

        report
    }

    /// Periodic reconciliation loop.
    ///
    /// Runs a pass on every tick until `shutdown` is cancelled. The first
    /// tick fires immediately. A pass already in progress when shutdown is
    /// requested runs to completion before the loop exits.
    pub async fn run(&self, shutdown: CancellationToken) {
        let mut interval = tokio::time::interval(self.config.interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            interval_ms = self.config.interval_ms,
            "Lifecycle scheduler started"
        );

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = interval.tick() => {
                    let report = self.run_pass().await;
                    if report.changed() > 0 || report.skipped > 0 {
                        tracing::info!(
                            opened = report.opened,
                            closed = report.closed,
                            skipped = report.skipped,
                            "Reconciled assignment statuses"
                        );
                    }
                }
            }
        }

        tracing::info!("Lifecycle scheduler stopped");
    }

    /// Spawn [`run`](Self::run) onto the tokio runtime.
    pub fn spawn(self: &Arc<Self>, shutdown: CancellationToken) -> JoinHandle<()> {
        let scheduler = Arc::clone(self);
        tokio::spawn(async move {
            scheduler.run(shutdown).await;
        })
    }
}
