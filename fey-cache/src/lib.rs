//! # FEY Cache
//!
//! Advisory key-value cache with per-entry TTL, backed by a shared table.
//!
//! - [`TtlCache`]: expiry-aware reads and writes over any [`CacheStore`](fey_core::CacheStore)
//! - [`MemoryCacheStore`]: in-process backend for development and tests
//! - [`LibsqlCacheStore`]: the `api_cache` table on libSQL / Turso
//! - [`TtlCache::cached_fetch`]: check, fetch on miss, populate, return
//!
//! Cache failures never reach callers. Reads that fail are misses; writes that
//! fail are logged and dropped.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use fey_cache::TtlCache;
//!
//! let cache = TtlCache::in_memory();
//! let total: u64 = cache
//!     .cached_fetch("dune_fey_awarded_v4", Duration::from_secs(1800), || async {
//!         dune.total_fey_awarded().await
//!     })
//!     .await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod cache;
mod libsql_store;
mod memory;
mod orchestrator;

pub use cache::{CacheLookup, TtlCache};
pub use libsql_store::LibsqlCacheStore;
pub use memory::MemoryCacheStore;
