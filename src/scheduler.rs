// src/scheduler.rs
// Background loops: periodic collection and a daily retention sweep.

use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::pipeline::Pipeline;
use crate::reconcile::Reconciler;

#[derive(Clone, Copy, Debug)]
pub struct SchedulerCfg {
    pub interval_secs: u64,
}

/// Spawn the periodic collection loop. Runs once immediately, then on every
/// tick. A failed run (storage down) is logged and retried next tick.
pub fn spawn_collector_task(pipeline: Arc<Pipeline>, cfg: SchedulerCfg) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker =
            tokio::time::interval(std::time::Duration::from_secs(cfg.interval_secs.max(1)));
        loop {
            ticker.tick().await;
            match pipeline.run_once().await {
                Ok(summary) => {
                    tracing::info!(
                        target: "scheduler",
                        retained = summary.retained,
                        inserted = summary.inserted,
                        updated = summary.updated,
                        "scheduled collection tick"
                    );
                }
                Err(e) => {
                    tracing::error!(target: "scheduler", error = %e, "scheduled run aborted");
                }
            }
        }
    })
}

/// Spawn the daily retention sweep.
pub fn spawn_retention_task(reconciler: Reconciler, retention_days: i64) -> JoinHandle<()> {
    let period = std::time::Duration::from_secs(24 * 3600);
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(period).await;
            let deleted = reconciler.retention_sweep(retention_days).await;
            tracing::info!(target: "scheduler", deleted, "retention sweep tick");
        }
    })
}
