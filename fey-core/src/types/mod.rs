//! Domain types for the FEY dashboard.
//!
//! - [`CacheEntry`]: One row of the shared key-value cache
//! - [`RateSnapshot`]: One sample of the xFEY → FEY conversion
//! - [`ProbeResult`]: Best-effort count produced by the fallback prober
//! - [`FeyAwarded`], [`PoolStats`], [`LaunchpadCount`]: Records served to the dashboard

mod cache;
mod rate;
mod dashboard;

pub use cache::*;
pub use rate::*;
pub use dashboard::*;
