//! Common traits for the FEY dashboard.
//!
//! Storage and time are abstracted so the cache, the history and the API can
//! run against in-memory backends and a manual clock in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::{CacheEntry, RateSnapshot};

// ═══════════════════════════════════════════════════════════════════════════════
// CLOCK TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Returns the current UTC time.
    fn now(&self) -> DateTime<Utc>;

    /// Returns the current time as epoch milliseconds.
    fn now_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CACHE STORE TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Raw key-value storage behind the TTL cache.
///
/// Stores do not interpret expiry; they hand back whatever row exists and the
/// cache decides whether it is still live.
///
/// Implementations might use:
/// - In-memory storage (for testing/development)
/// - libSQL / Turso (for production)
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Loads the row for `key`, live or expired.
    async fn load(&self, key: &str) -> Result<Option<CacheEntry>>;

    /// Inserts the row, or overwrites the existing row with the same key.
    async fn upsert(&self, entry: CacheEntry) -> Result<()>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// RATE HISTORY TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Append-only storage for conversion rate snapshots.
#[async_trait]
pub trait RateHistory: Send + Sync {
    /// Appends a snapshot. Failures propagate: history points are authoritative.
    async fn record(&self, snapshot: &RateSnapshot) -> Result<()>;

    /// Returns up to `limit` snapshots ordered by timestamp ascending.
    async fn list(&self, limit: usize) -> Result<Vec<RateSnapshot>>;

    /// Returns the total number of snapshots.
    async fn count(&self) -> Result<u64>;
}
