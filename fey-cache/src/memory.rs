//! In-memory cache store.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use fey_core::error::Result;
use fey_core::traits::CacheStore;
use fey_core::types::CacheEntry;

/// In-memory backend for the TTL cache.
///
/// Thread-safe. Like the SQL table it stands in for, it keeps expired rows
/// until they are overwritten.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryCacheStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored rows, live or expired.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if the store holds no rows.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns the number of rows stored under `key` (0 or 1).
    pub fn rows_for(&self, key: &str) -> usize {
        usize::from(self.entries.read().contains_key(key))
    }

}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn load(&self, key: &str) -> Result<Option<CacheEntry>> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn upsert(&self, entry: CacheEntry) -> Result<()> {
        self.entries.write().insert(entry.key.clone(), entry);
        Ok(())
    }
}
