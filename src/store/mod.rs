// src/store/mod.rs
// Storage abstraction for the hot-key table. The reconciler is the only
// writer; the HTTP read path and retention sweep go through the same trait.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

use crate::model::{AreaTag, HotKeyRecord};

/// Storage-layer failures. `UniqueViolation` is surfaced separately so the
/// reconciler can fall back to an update instead of counting a failure.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage unavailable")]
    Unavailable,
    #[error("unique constraint violation on ({area}, {key})")]
    UniqueViolation { area: AreaTag, key: String },
    #[error("row {0} not found")]
    NotFound(i64),
    #[error("storage i/o error: {0}")]
    Io(String),
}

/// Candidate row for insertion. `id` is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewHotKey {
    pub area: AreaTag,
    pub hot_key: String,
    pub hot_key_desc: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields the reconciler is allowed to touch on an existing row.
/// `created_at` is deliberately absent.
#[derive(Debug, Clone)]
pub struct HotKeyPatch {
    pub hot_key_desc: String,
    pub updated_at: DateTime<Utc>,
}

/// Aggregate table stats for the status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub total_count: usize,
    pub area_distribution: HashMap<String, usize>,
}

#[async_trait]
pub trait Storage: Send + Sync {
    /// Exact-match lookup on the `(area, hot_key)` identity.
    async fn find_by_area_and_key(
        &self,
        area: AreaTag,
        key: &str,
    ) -> Result<Option<HotKeyRecord>, StoreError>;

    /// Insert a new row. Returns `UniqueViolation` when `(area, hot_key)`
    /// already exists.
    async fn insert(&self, row: NewHotKey) -> Result<HotKeyRecord, StoreError>;

    /// Patch an existing row by id.
    async fn update(&self, id: i64, patch: HotKeyPatch) -> Result<HotKeyRecord, StoreError>;

    /// Delete rows with `updated_at` strictly older than `cutoff`.
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError>;

    /// Read path, ordered by `updated_at` descending. `None` area spans all.
    async fn list_by_area(
        &self,
        area: Option<AreaTag>,
        limit: usize,
    ) -> Result<Vec<HotKeyRecord>, StoreError>;

    /// Connectivity probe. A run aborts before writing when this is false.
    async fn health_check(&self) -> bool;

    /// Row count and per-area distribution.
    async fn stats(&self) -> Result<StoreStats, StoreError>;
}
