//! Expiry-aware cache over a raw store.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use fey_core::clock::SystemClock;
use fey_core::error::{FeyError, Result};
use fey_core::traits::{CacheStore, Clock};
use fey_core::types::CacheEntry;

use crate::memory::MemoryCacheStore;

/// Outcome of a cache read.
#[derive(Clone, Debug, PartialEq)]
pub enum CacheLookup {
    /// A live value was found.
    Hit(serde_json::Value),
    /// No row, or the row has expired.
    Miss,
    /// The store could not be read.
    Error(String),
}

impl CacheLookup {
    /// Collapses the lookup into a value, treating errors as misses.
    pub fn into_value(self) -> Option<serde_json::Value> {
        match self {
            CacheLookup::Hit(value) => Some(value),
            CacheLookup::Miss | CacheLookup::Error(_) => None,
        }
    }
}

/// Key-value cache with per-entry TTL.
///
/// Cheap to clone; clones share the store and clock.
#[derive(Clone)]
pub struct TtlCache {
    store: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
}

impl TtlCache {
    /// Creates a cache over `store` using the system clock.
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    /// Creates a cache over `store` using a custom clock.
    pub fn with_clock(store: Arc<dyn CacheStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Creates a cache over a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryCacheStore::new()))
    }

    /// The clock used for expiry decisions.
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Reads `key`, distinguishing misses from store failures.
    #[instrument(skip(self))]
    pub async fn lookup(&self, key: &str) -> CacheLookup {
        match self.store.load(key).await {
            Ok(Some(entry)) if entry.is_expired_at(self.clock.now()) => {
                debug!(key, expires_at = %entry.expires_at, "Cache expired");
                CacheLookup::Miss
            }
            Ok(Some(entry)) => {
                debug!(key, "Cache hit");
                CacheLookup::Hit(entry.value)
            }
            Ok(None) => {
                debug!(key, "Cache miss");
                CacheLookup::Miss
            }
            Err(e) => CacheLookup::Error(e.to_string()),
        }
    }

    /// Reads `key`. Store failures are logged and reported as absent.
    pub async fn get(&self, key: &str) -> Option<serde_json::Value> {
        match self.lookup(key).await {
            CacheLookup::Error(detail) => {
                warn!(key, error = %detail, "Cache read failed, treating as miss");
                None
            }
            lookup => lookup.into_value(),
        }
    }

    /// Reads `key` as `T`. A stored value of the wrong shape counts as absent.
    pub async fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get(key).await?;
        match serde_json::from_value(value) {
            Ok(typed) => Some(typed),
            Err(e) => {
                warn!(key, error = %e, "Cached value has unexpected shape, treating as miss");
                None
            }
        }
    }

    /// Writes `value` under `key` for `ttl`, overwriting any existing row.
    ///
    /// Returns whether the write succeeded. Failures are logged, never raised.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Duration) -> bool {
        match self.try_set(key, value, ttl).await {
            Ok(()) => true,
            Err(e) => {
                warn!(key, error = %e, "Error setting cache");
                false
            }
        }
    }

    /// Fallible form of [`set`](Self::set).
    #[instrument(skip(self, value))]
    pub async fn try_set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<()> {
        let now = self.clock.now();
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| FeyError::ValidationError(format!("TTL out of range: {ttl:?}")))?;

        let entry = CacheEntry {
            key: key.to_string(),
            value: serde_json::to_value(value)?,
            updated_at: now,
            expires_at,
        };

        self.store.upsert(entry).await?;
        debug!(key, %expires_at, "Cached data");
        Ok(())
    }
}

impl std::fmt::Debug for TtlCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache").finish_non_exhaustive()
    }
}
