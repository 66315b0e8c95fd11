// src/pipeline.rs
// One full collection run: concurrent adapter fan-out (all-settled), reduce,
// reconcile. Per-adapter and per-record failures are absorbed into the
// summary; only storage unavailability aborts a run.

use anyhow::{bail, Result};
use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::collect::adapters::SourceAdapter;
use crate::collect::reduce;
use crate::model::RawSignal;
use crate::reconcile::Reconciler;
use crate::store::Storage;

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "collect_signals_total",
            "Raw signals fetched across all adapters."
        );
        describe_counter!(
            "collect_retained_total",
            "Signals surviving dedup/rank per run."
        );
        describe_counter!(
            "collect_adapter_errors_total",
            "Adapter fetch failures (timeouts included)."
        );
        describe_counter!("collect_runs_total", "Completed pipeline runs.");
        describe_counter!(
            "collect_persist_failed_total",
            "Per-record storage failures during reconciliation."
        );
        describe_gauge!(
            "collect_last_run_ts",
            "Unix ts when the pipeline last finished."
        );
    });
}

/// Observability contract of a run: per-source counts, totals, and
/// human-readable error notes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub per_source: Vec<(String, usize)>,
    pub fetched: usize,
    pub retained: usize,
    pub inserted: usize,
    pub updated: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

pub struct Pipeline {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    store: Arc<dyn Storage>,
    reconciler: Reconciler,
    top_n: usize,
    fetch_timeout: Duration,
}

impl Pipeline {
    pub fn new(
        adapters: Vec<Arc<dyn SourceAdapter>>,
        store: Arc<dyn Storage>,
        top_n: usize,
        fetch_timeout: Duration,
    ) -> Self {
        let reconciler = Reconciler::new(store.clone());
        Self {
            adapters,
            store,
            reconciler,
            top_n,
            fetch_timeout,
        }
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Execute one collection run. Fails only when storage is unreachable;
    /// everything else degrades into summary counts and error notes.
    pub async fn run_once(&self) -> Result<RunSummary> {
        ensure_metrics_described();

        if !self.store.health_check().await {
            bail!("storage health check failed, aborting run before any writes");
        }

        let mut summary = RunSummary::default();
        let mut merged: Vec<RawSignal> = Vec::new();

        // All-settled join: every adapter either contributes signals or an
        // error note, independently of the others.
        let fetches = self.adapters.iter().map(|adapter| {
            let adapter = adapter.clone();
            let timeout = self.fetch_timeout;
            async move {
                let name = adapter.name();
                let outcome = match tokio::time::timeout(timeout, adapter.fetch()).await {
                    Ok(Ok(signals)) => Ok(signals),
                    Ok(Err(e)) => Err(format!("{name}: {e:#}")),
                    Err(_) => Err(format!("{name}: fetch timed out after {timeout:?}")),
                };
                (name, outcome)
            }
        });

        for (name, outcome) in futures::future::join_all(fetches).await {
            match outcome {
                Ok(signals) => {
                    tracing::info!(source = name, count = signals.len(), "adapter fetched");
                    summary.per_source.push((name.to_string(), signals.len()));
                    merged.extend(signals);
                }
                Err(note) => {
                    tracing::warn!(source = name, error = %note, "adapter failed");
                    counter!("collect_adapter_errors_total").increment(1);
                    summary.per_source.push((name.to_string(), 0));
                    summary.errors.push(note);
                }
            }
        }

        summary.fetched = merged.len();
        counter!("collect_signals_total").increment(merged.len() as u64);

        let retained = reduce(merged, self.top_n);
        summary.retained = retained.len();
        counter!("collect_retained_total").increment(retained.len() as u64);

        let report = self.reconciler.upsert_all(&retained).await;
        summary.inserted = report.inserted;
        summary.updated = report.updated;
        summary.failed = report.failed;
        counter!("collect_persist_failed_total").increment(report.failed as u64);

        counter!("collect_runs_total").increment(1);
        gauge!("collect_last_run_ts").set(chrono::Utc::now().timestamp() as f64);

        tracing::info!(
            fetched = summary.fetched,
            retained = summary.retained,
            inserted = summary.inserted,
            updated = summary.updated,
            failed = summary.failed,
            errors = summary.errors.len(),
            "collection run finished"
        );

        Ok(summary)
    }
}
