//! Cache entry type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A row of the shared key-value cache.
///
/// There is at most one row per key; writes overwrite it. A row past its
/// `expires_at` is still stored but readers treat it as absent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Unique key (upsert target)
    pub key: String,
    /// Opaque payload
    pub value: serde_json::Value,
    /// Time of the last write
    pub updated_at: DateTime<Utc>,
    /// Time after which the entry is no longer valid
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Returns true if the entry has expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}
