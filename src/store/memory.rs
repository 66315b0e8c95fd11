// src/store/memory.rs
// Mutex-guarded in-memory table. Enforces the (area, hot_key) unique
// constraint the same way a real backend would, so the reconciler's
// insert-conflict fallback is exercised identically in tests and dev runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::model::{AreaTag, HotKeyRecord};
use crate::store::{HotKeyPatch, NewHotKey, Storage, StoreError, StoreStats};

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    // Test hooks: flip to simulate an unhealthy or write-failing backend.
    unavailable: AtomicBool,
    fail_writes: AtomicBool,
}

#[derive(Debug, Default)]
struct Inner {
    rows: Vec<HotKeyRecord>,
    next_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `health_check` report false until re-enabled.
    pub fn set_unavailable(&self, v: bool) {
        self.unavailable.store(v, Ordering::SeqCst);
    }

    /// Make every write return an i/o error until re-enabled.
    pub fn set_fail_writes(&self, v: bool) {
        self.fail_writes.store(v, Ordering::SeqCst);
    }

    fn check_up(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable);
        }
        Ok(())
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        self.check_up()?;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Io("simulated write failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for MemoryStore {
    async fn find_by_area_and_key(
        &self,
        area: AreaTag,
        key: &str,
    ) -> Result<Option<HotKeyRecord>, StoreError> {
        self.check_up()?;
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner
            .rows
            .iter()
            .find(|r| r.area == area && r.hot_key == key)
            .cloned())
    }

    async fn insert(&self, row: NewHotKey) -> Result<HotKeyRecord, StoreError> {
        self.check_writable()?;
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        if inner
            .rows
            .iter()
            .any(|r| r.area == row.area && r.hot_key == row.hot_key)
        {
            return Err(StoreError::UniqueViolation {
                area: row.area,
                key: row.hot_key,
            });
        }
        inner.next_id += 1;
        let record = HotKeyRecord {
            id: inner.next_id,
            area: row.area,
            hot_key: row.hot_key,
            hot_key_desc: row.hot_key_desc,
            created_at: row.created_at,
            updated_at: row.updated_at,
        };
        inner.rows.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: i64, patch: HotKeyPatch) -> Result<HotKeyRecord, StoreError> {
        self.check_writable()?;
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        let row = inner
            .rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::NotFound(id))?;
        row.hot_key_desc = patch.hot_key_desc;
        row.updated_at = patch.updated_at;
        Ok(row.clone())
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        self.check_writable()?;
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        let before = inner.rows.len();
        inner.rows.retain(|r| r.updated_at >= cutoff);
        Ok((before - inner.rows.len()) as u64)
    }

    async fn list_by_area(
        &self,
        area: Option<AreaTag>,
        limit: usize,
    ) -> Result<Vec<HotKeyRecord>, StoreError> {
        self.check_up()?;
        let inner = self.inner.lock().expect("store mutex poisoned");
        let mut rows: Vec<HotKeyRecord> = inner
            .rows
            .iter()
            .filter(|r| area.map_or(true, |a| r.area == a))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        rows.truncate(limit);
        Ok(rows)
    }

    async fn health_check(&self) -> bool {
        !self.unavailable.load(Ordering::SeqCst)
    }

    async fn stats(&self) -> Result<StoreStats, StoreError> {
        self.check_up()?;
        let inner = self.inner.lock().expect("store mutex poisoned");
        let mut area_distribution: HashMap<String, usize> = HashMap::new();
        for r in &inner.rows {
            *area_distribution.entry(r.area.to_string()).or_default() += 1;
        }
        Ok(StoreStats {
            total_count: inner.rows.len(),
            area_distribution,
        })
    }
}
