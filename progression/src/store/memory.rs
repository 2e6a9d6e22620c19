//! In-memory progress store.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use super::{ProgressStore, StoreError, StoreKey, StoredSnapshot};
use crate::snapshot::ProgressSnapshot;

/// Progress store backed by a concurrent map.
///
/// Used for tests and for hosts that persist elsewhere. Save failures can be
/// switched on to exercise the warning path.
pub struct InMemoryProgressStore {
    entries: DashMap<StoreKey, String>,
    fail_saves: AtomicBool,
    fail_loads: AtomicBool,
    save_count: AtomicU32,
}

impl InMemoryProgressStore {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            fail_saves: AtomicBool::new(false),
            fail_loads: AtomicBool::new(false),
            save_count: AtomicU32::new(0),
        }
    }

    /// Make every subsequent save fail.
    pub fn with_failing_saves(self, failing: bool) -> Self {
        self.set_failing_saves(failing);
        self
    }

    /// Make every subsequent load fail.
    pub fn with_failing_loads(self, failing: bool) -> Self {
        self.fail_loads.store(failing, Ordering::SeqCst);
        self
    }

    pub fn set_failing_saves(&self, failing: bool) {
        self.fail_saves.store(failing, Ordering::SeqCst);
    }

    /// Put raw text under a key, bypassing serialization.
    pub fn insert_raw(&self, key: &StoreKey, raw: impl Into<String>) {
        self.entries.insert(key.clone(), raw.into());
    }

    /// Raw text stored under a key.
    pub fn raw(&self, key: &StoreKey) -> Option<String> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> u32 {
        self.save_count.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for InMemoryProgressStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProgressStore for InMemoryProgressStore {
    fn id(&self) -> &str {
        "memory"
    }

    async fn load(&self, key: &StoreKey) -> Result<Option<StoredSnapshot>, StoreError> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store loads disabled".to_string()));
        }
        Ok(self.raw(key).map(StoredSnapshot::new))
    }

    async fn save(&self, key: &StoreKey, snapshot: &ProgressSnapshot) -> Result<(), StoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store saves disabled".to_string()));
        }
        let json = snapshot.to_json()?;
        self.entries.insert(key.clone(), json);
        self.save_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
