//! In-memory record storage.

use async_trait::async_trait;
use seed_core::Record;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::store::{StorageBackend, StoreError};

/// Store that keeps the collection in process memory.
///
/// Counts flushes so callers can check how often the driver persisted, and
/// can be told to fail every flush or only the next few.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<Record>>,
    flushes: AtomicUsize,
    fail_flush: AtomicBool,
    fail_next: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing collection.
    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Self::default()
        }
    }

    /// Snapshot of the stored collection.
    pub fn records(&self) -> Vec<Record> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    /// Number of successful flushes.
    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }

    /// Make every later flush fail.
    pub fn fail_flushes(&self, fail: bool) {
        self.fail_flush.store(fail, Ordering::SeqCst);
    }

    /// Make only the next `count` flushes fail.
    pub fn fail_next_flushes(&self, count: usize) {
        self.fail_next.store(count, Ordering::SeqCst);
    }
}

#[async_trait]
impl StorageBackend for MemoryStore {
    async fn load(&self) -> Result<Vec<Record>, StoreError> {
        self.records
            .lock()
            .map(|records| records.clone())
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn flush(&self, records: &[Record]) -> Result<(), StoreError> {
        if self.fail_flush.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("flush disabled".to_string()));
        }
        let failing = self
            .fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(StoreError::Backend("flush failed".to_string()));
        }
        let mut stored = self
            .records
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        *stored = records.to_vec();
        self.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
