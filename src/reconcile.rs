// src/reconcile.rs
// Persistence reconciliation: decide insert vs update per surviving record,
// tolerate per-record failures, and expose the read/retention paths.

use chrono::{Duration, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::model::{
    truncate_text, AreaTag, HotKeyRecord, ScoredSignal, HOT_KEY_DESC_MAX_LENGTH,
    HOT_KEY_MAX_LENGTH,
};
use crate::store::{HotKeyPatch, NewHotKey, Storage, StoreError};

/// Outcome counters for one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpsertReport {
    pub inserted: usize,
    pub updated: usize,
    pub failed: usize,
}

/// Sole writer to the durable table.
#[derive(Clone)]
pub struct Reconciler {
    store: Arc<dyn Storage>,
}

impl Reconciler {
    pub fn new(store: Arc<dyn Storage>) -> Self {
        Self { store }
    }

    /// Upsert every record in order. Found rows get a fresh description and
    /// `updated_at`, keeping their original `created_at`; absent rows are
    /// inserted. A failure on one record is counted and logged, never fatal
    /// for the rest of the batch.
    pub async fn upsert_all(&self, records: &[ScoredSignal]) -> UpsertReport {
        let mut report = UpsertReport::default();

        for rec in records {
            match self.upsert_one(rec).await {
                Ok(UpsertOutcome::Inserted) => report.inserted += 1,
                Ok(UpsertOutcome::Updated) => report.updated += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(
                        error = %e,
                        keyword = %rec.signal.keyword,
                        area = %rec.signal.area,
                        "hot key upsert failed"
                    );
                }
            }
        }

        tracing::info!(
            inserted = report.inserted,
            updated = report.updated,
            failed = report.failed,
            "reconciliation pass finished"
        );
        report
    }

    async fn upsert_one(&self, rec: &ScoredSignal) -> Result<UpsertOutcome, StoreError> {
        let area = rec.signal.area;
        let hot_key = truncate_text(&rec.signal.keyword, HOT_KEY_MAX_LENGTH);
        let hot_key_desc = truncate_text(
            rec.signal.description.as_deref().unwrap_or_default(),
            HOT_KEY_DESC_MAX_LENGTH,
        );
        let now = Utc::now();

        if let Some(existing) = self.store.find_by_area_and_key(area, &hot_key).await? {
            self.store
                .update(
                    existing.id,
                    HotKeyPatch {
                        hot_key_desc,
                        updated_at: now,
                    },
                )
                .await?;
            return Ok(UpsertOutcome::Updated);
        }

        let insert = self
            .store
            .insert(NewHotKey {
                area,
                hot_key: hot_key.clone(),
                hot_key_desc: hot_key_desc.clone(),
                created_at: now,
                updated_at: now,
            })
            .await;

        match insert {
            Ok(_) => Ok(UpsertOutcome::Inserted),
            // A concurrent run won the read-then-write race; treat the
            // constraint hit as "row exists" and update instead.
            Err(StoreError::UniqueViolation { .. }) => {
                if let Some(existing) = self.store.find_by_area_and_key(area, &hot_key).await? {
                    self.store
                        .update(
                            existing.id,
                            HotKeyPatch {
                                hot_key_desc,
                                updated_at: now,
                            },
                        )
                        .await?;
                    Ok(UpsertOutcome::Updated)
                } else {
                    Err(StoreError::Io("row vanished after unique conflict".into()))
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Delete rows whose `updated_at` is older than `max_age_days`. Returns
    /// the removed count; a storage error is logged and reported as 0.
    pub async fn retention_sweep(&self, max_age_days: i64) -> u64 {
        let cutoff = Utc::now() - Duration::days(max_age_days);
        match self.store.delete_older_than(cutoff).await {
            Ok(n) => {
                tracing::info!(deleted = n, max_age_days, "retention sweep finished");
                n
            }
            Err(e) => {
                tracing::warn!(error = %e, "retention sweep failed");
                0
            }
        }
    }

    /// Read path ordered by `updated_at` descending.
    pub async fn query(
        &self,
        area: Option<AreaTag>,
        limit: usize,
    ) -> Result<Vec<HotKeyRecord>, StoreError> {
        self.store.list_by_area(area, limit).await
    }
}

enum UpsertOutcome {
    Inserted,
    Updated,
}
