//! API route handlers.

use std::sync::{Arc, OnceLock};
use std::time::Instant;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{error, warn};

use fey_core::constants::{DEFAULT_HISTORY_LIMIT, LAUNCHPAD_ADDRESS};
use fey_core::traits::{Clock, RateHistory};
use fey_core::types::{FeyAwarded, PoolStats};

use crate::dto::*;
use crate::error::ApiError;
use crate::jobs::{self, SnapshotError};
use crate::state::AppState;

type Result<T> = std::result::Result<T, ApiError>;

const HISTORY_CACHE_CONTROL: &str = "public, s-maxage=300, stale-while-revalidate=600";

static START_TIME: OnceLock<Instant> = OnceLock::new();

fn iso(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let start = START_TIME.get_or_init(Instant::now);

    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        uptime_seconds: start.elapsed().as_secs(),
        backend: state.backend.into(),
    })
}

/// GET /api/dune
pub async fn get_fey_awarded(State(state): State<Arc<AppState>>) -> Result<Json<FeyAwarded>> {
    jobs::fey_awarded(&state).await.map(Json).map_err(|e| {
        error!(error = %e, "Error fetching Dune data");
        ApiError::internal("Failed to fetch Dune data")
    })
}

/// GET /api/cron-dune-refresh
pub async fn refresh_fey_awarded(State(state): State<Arc<AppState>>) -> Result<Json<RefreshResponse>> {
    let fresh = jobs::refresh_fey_awarded(&state).await.map_err(|e| {
        error!(error = %e, "Error refreshing Dune data");
        ApiError::internal("Failed to refresh Dune data")
    })?;

    Ok(Json(RefreshResponse {
        success: true,
        total_fey_awarded: fresh.total_fey_awarded,
        timestamp: iso(state.cache.clock().now()),
    }))
}

/// GET /api/cron
pub async fn record_snapshot(State(state): State<Arc<AppState>>) -> Result<Json<SnapshotResponse>> {
    let snapshot = jobs::record_rate_snapshot(&state).await.map_err(|e| {
        error!(error = %e, "Error in snapshot job");
        match e {
            SnapshotError::Rate(_) => ApiError::internal("Failed to fetch conversion rate"),
            SnapshotError::Store(_) => ApiError::internal("Failed to save to database"),
        }
    })?;

    Ok(Json(SnapshotResponse {
        success: true,
        fey_amount: snapshot.fey_amount,
        percentage_gain: snapshot.gains_percent,
        timestamp: iso(snapshot.timestamp),
    }))
}

/// GET /api/history?limit=N
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    params: std::result::Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Response> {
    let Query(params) = params.map_err(|e| {
        warn!(error = %e, "Rejected history query");
        ApiError::bad_request("Invalid limit parameter").with_details(e.body_text())
    })?;
    let limit = params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);

    let snapshots = state.history.list(limit).await.map_err(|e| {
        error!(error = %e, "Error fetching history");
        ApiError::internal("Failed to fetch historical data")
    })?;

    let points: Vec<HistoryPoint> = snapshots.into_iter().map(HistoryPoint::from).collect();

    Ok(([(header::CACHE_CONTROL, HISTORY_CACHE_CONTROL)], Json(points)).into_response())
}

/// GET /api/launchpad-count
pub async fn get_launchpad_count(State(state): State<Arc<AppState>>) -> Result<Response> {
    let count = jobs::launchpad_count(&state).await.map_err(|e| {
        if e.is_config_error() {
            ApiError::from(e)
        } else {
            error!(error = %e, "Error probing launchpad");
            ApiError::internal("Failed to fetch launchpad count")
        }
    })?;

    if count.is_unknown() {
        warn!(address = LAUNCHPAD_ADDRESS, "No strategy produced a launchpad count");
        let body = UnknownLaunchpadResponse {
            token_count: 0,
            launchpad_address: LAUNCHPAD_ADDRESS.into(),
            source: count.source,
            error: None,
            last_updated: count.last_updated,
        };
        return Ok(Json(body).into_response());
    }

    Ok(Json(count).into_response())
}

/// GET /api/thegraph-volume
pub async fn get_pool_volume(State(state): State<Arc<AppState>>) -> Result<Json<PoolStats>> {
    jobs::pool_volume(&state).await.map(Json).map_err(|e| {
        error!(error = %e, "Error fetching volume data");
        ApiError::internal("Failed to fetch volume data").with_details(e.to_string())
    })
}
