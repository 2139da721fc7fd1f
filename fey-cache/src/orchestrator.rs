//! Cached-fetch orchestration: check, fetch on miss, populate, return.

use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::cache::TtlCache;

impl TtlCache {
    /// Returns the live cached value for `key`, or runs `fetcher` and caches its result.
    ///
    /// A cache read failure behaves like a miss and a failed write is ignored.
    /// Errors from `fetcher` are returned unchanged; nothing is retried.
    pub async fn cached_fetch<T, E, F, Fut>(&self, key: &str, ttl: Duration, fetcher: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.cached_fetch_when(key, ttl, fetcher, |_| true).await
    }

    /// Like [`cached_fetch`](Self::cached_fetch), but a fresh value is only
    /// stored when `keep` accepts it.
    pub async fn cached_fetch_when<T, E, F, Fut, K>(
        &self,
        key: &str,
        ttl: Duration,
        fetcher: F,
        keep: K,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        K: FnOnce(&T) -> bool,
    {
        if let Some(cached) = self.get_as::<T>(key).await {
            return Ok(cached);
        }

        let fresh = fetcher().await?;

        if keep(&fresh) {
            self.set(key, &fresh, ttl).await;
        } else {
            debug!(key, "Fresh value not cached");
        }

        Ok(fresh)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use fey_core::clock::ManualClock;
    use fey_core::error::FeyError;

    use super::*;
    use crate::cache::tests::BrokenStore;
    use crate::memory::MemoryCacheStore;

    const TTL: Duration = Duration::from_secs(60);

    fn counting_fetcher(
        calls: &AtomicUsize,
        value: u64,
    ) -> impl FnOnce() -> std::future::Ready<Result<u64, FeyError>> + '_ {
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            std::future::ready(Ok(value))
        }
    }

    #[tokio::test]
    async fn test_hit_skips_fetcher() {
        let cache = TtlCache::in_memory();
        cache.set("k", &7u64, TTL).await;

        let calls = AtomicUsize::new(0);
        let value = cache.cached_fetch("k", TTL, counting_fetcher(&calls, 99)).await.unwrap();

        assert_eq!(value, 7);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_miss_populates_once() {
        let cache = TtlCache::in_memory();
        let calls = AtomicUsize::new(0);

        let first = cache.cached_fetch("k", TTL, counting_fetcher(&calls, 42)).await.unwrap();
        let second = cache.cached_fetch("k", TTL, counting_fetcher(&calls, 43)).await.unwrap();

        assert_eq!(first, 42);
        assert_eq!(second, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.get_as::<u64>("k").await, Some(42));
    }

    #[tokio::test]
    async fn test_refetches_after_expiry() {
        let clock = Arc::new(ManualClock::starting_now());
        let cache = TtlCache::with_clock(Arc::new(MemoryCacheStore::new()), clock.clone());
        let calls = AtomicUsize::new(0);

        cache.cached_fetch("k", Duration::from_secs(1), counting_fetcher(&calls, 1)).await.unwrap();
        clock.advance(Duration::from_secs(2));
        let value = cache
            .cached_fetch("k", Duration::from_secs(1), counting_fetcher(&calls, 2))
            .await
            .unwrap();

        assert_eq!(value, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fetcher_error_propagates_and_caches_nothing() {
        let cache = TtlCache::in_memory();

        let result: Result<u64, FeyError> = cache
            .cached_fetch("k", TTL, || async { Err(FeyError::HttpError("down".into())) })
            .await;

        assert!(matches!(result, Err(FeyError::HttpError(_))));
        assert!(cache.get("k").await.is_none());
    }

    #[tokio::test]
    async fn test_broken_cache_still_serves_fresh_values() {
        let cache = TtlCache::new(Arc::new(BrokenStore));
        let calls = AtomicUsize::new(0);

        let value = cache.cached_fetch("k", TTL, counting_fetcher(&calls, 5)).await.unwrap();
        assert_eq!(value, 5);

        cache.cached_fetch("k", TTL, counting_fetcher(&calls, 5)).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_keep_predicate_skips_store() {
        let cache = TtlCache::in_memory();
        let calls = AtomicUsize::new(0);

        let value = cache
            .cached_fetch_when("k", TTL, counting_fetcher(&calls, 0), |v| *v > 0)
            .await
            .unwrap();

        assert_eq!(value, 0);
        assert!(cache.get("k").await.is_none());
    }
}
