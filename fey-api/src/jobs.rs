//! Data pipelines behind the routes and the background snapshot task.
//!
//! Each function takes the shared state and returns domain values; the
//! handlers decide how failures are rendered.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

use fey_core::constants::*;
use fey_core::error::{FeyError, Result};
use fey_core::traits::{Clock, RateHistory};
use fey_core::types::{FeyAwarded, LaunchpadCount, PoolStats, RateSnapshot};

use crate::state::AppState;

/// Which stage of the snapshot job failed.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Reading the conversion rate failed
    #[error("failed to fetch conversion rate: {0}")]
    Rate(FeyError),
    /// Persisting the snapshot failed
    #[error("failed to save snapshot: {0}")]
    Store(FeyError),
}

impl SnapshotError {
    /// Returns true if the next scheduled run may succeed without intervention.
    pub fn is_recoverable(&self) -> bool {
        match self {
            SnapshotError::Rate(e) | SnapshotError::Store(e) => e.is_recoverable(),
        }
    }
}

/// Total FEY awarded, served from cache for 30 minutes.
pub async fn fey_awarded(state: &AppState) -> Result<FeyAwarded> {
    state
        .cache
        .cached_fetch(DUNE_CACHE_KEY, Duration::from_secs(DUNE_CACHE_TTL_SECONDS), || {
            fetch_fey_awarded(state)
        })
        .await
}

/// Fetches the total from Dune regardless of the cache and overwrites the
/// cached entry.
#[instrument(skip(state))]
pub async fn refresh_fey_awarded(state: &AppState) -> Result<FeyAwarded> {
    let fresh = fetch_fey_awarded(state).await?;
    state
        .cache
        .set(DUNE_CACHE_KEY, &fresh, Duration::from_secs(DUNE_CACHE_TTL_SECONDS))
        .await;
    info!(total = fresh.total_fey_awarded, "Refreshed FEY awarded");
    Ok(fresh)
}

async fn fetch_fey_awarded(state: &AppState) -> Result<FeyAwarded> {
    let dune = state
        .dune
        .as_ref()
        .ok_or_else(|| FeyError::ConfigError("DUNE_API_KEY not configured".into()))?;

    let total = dune.total_fey_awarded().await?;
    Ok(FeyAwarded {
        total_fey_awarded: total,
        last_updated: state.cache.clock().now_millis(),
    })
}

/// Reads `previewRedeem` for the sample amount and appends a snapshot to
/// the history.
#[instrument(skip(state))]
pub async fn record_rate_snapshot(state: &AppState) -> std::result::Result<RateSnapshot, SnapshotError> {
    let fey_amount = state
        .rpc
        .preview_redeem(XFEY_CONTRACT_ADDRESS, SAMPLE_XFEY_AMOUNT)
        .await
        .map_err(SnapshotError::Rate)?;

    let snapshot = RateSnapshot::from_amounts(SAMPLE_XFEY_AMOUNT, fey_amount, state.cache.clock().now())
        .map_err(SnapshotError::Rate)?;

    state.history.record(&snapshot).await.map_err(SnapshotError::Store)?;

    info!(
        fey_amount,
        gains_percent = snapshot.gains_percent,
        "Recorded rate snapshot"
    );
    Ok(snapshot)
}

/// Launchpad token count: cache first, then the fallback prober.
///
/// Only plausible counts are cached; the "none" result is recomputed on the
/// next request. A missing Alchemy key is a configuration error, but only
/// once the cache has missed.
pub async fn launchpad_count(state: &AppState) -> Result<LaunchpadCount> {
    state
        .cache
        .cached_fetch_when(
            LAUNCHPAD_CACHE_KEY,
            Duration::from_secs(LAUNCHPAD_CACHE_TTL_SECONDS),
            || probe_launchpad(state),
            |count: &LaunchpadCount| !count.is_unknown(),
        )
        .await
}

async fn probe_launchpad(state: &AppState) -> Result<LaunchpadCount> {
    let prober = state
        .prober
        .as_ref()
        .ok_or_else(|| FeyError::ConfigError("ALCHEMY_API_KEY not configured".into()))?;

    let result = prober.run(LAUNCHPAD_ADDRESS).await;
    Ok(LaunchpadCount::from_probe(result, state.cache.clock().now_millis()))
}

/// Pool volume and TVL, served from cache for 30 minutes.
pub async fn pool_volume(state: &AppState) -> Result<PoolStats> {
    state
        .cache
        .cached_fetch(VOLUME_CACHE_KEY, Duration::from_secs(VOLUME_CACHE_TTL_SECONDS), || {
            fetch_pool_volume(state)
        })
        .await
}

async fn fetch_pool_volume(state: &AppState) -> Result<PoolStats> {
    let subgraph = state
        .subgraph
        .as_ref()
        .ok_or_else(|| FeyError::ConfigError("THEGRAPH_API_KEY not configured".into()))?;

    subgraph
        .pool_stats(FEY_POOL_ID, state.cache.clock().now_millis())
        .await
}

/// Records a rate snapshot every `interval` until the task is aborted.
///
/// The first snapshot is taken immediately. Failures are logged and the
/// loop keeps going.
pub fn spawn_snapshot_task(state: Arc<AppState>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match record_rate_snapshot(&state).await {
                Err(e) if e.is_recoverable() => {
                    warn!(error = %e, "Scheduled rate snapshot failed, retrying next tick");
                }
                Err(e) => error!(error = %e, "Scheduled rate snapshot failed"),
                Ok(_) => {}
            }
        }
    })
}
