//! DTOs for API requests and responses.
//!
//! Field names are camelCase to match what the dashboard frontend reads.

use serde::{Deserialize, Serialize};
use fey_core::types::RateSnapshot;

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Status
    pub status: String,
    /// Version
    pub version: String,
    /// Uptime in seconds
    pub uptime_seconds: u64,
    /// Persistence backend: `libsql` or `memory`
    pub backend: String,
}

/// Response of the forced Dune refresh.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    /// Always true on success
    pub success: bool,
    /// Freshly fetched total
    pub total_fey_awarded: u64,
    /// ISO-8601 time of the refresh
    pub timestamp: String,
}

/// Response of the rate snapshot job.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotResponse {
    /// Always true on success
    pub success: bool,
    /// FEY redeemable for the sample xFEY amount
    pub fey_amount: u64,
    /// Gain over the sample amount, in percent
    pub percentage_gain: f64,
    /// ISO-8601 time of the snapshot
    pub timestamp: String,
}

/// Query parameters for the history endpoint.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Maximum number of points (default 100)
    pub limit: Option<usize>,
}

/// One point of the conversion rate chart.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPoint {
    /// xFEY amount sampled
    pub x_fey_amount: u64,
    /// FEY it redeemed for
    pub fey_amount: u64,
    /// FEY per xFEY
    pub conversion_rate: f64,
    /// `feyAmount - xFeyAmount`
    pub total_gain: i64,
    /// Gain in percent
    pub percentage_gain: f64,
    /// Epoch milliseconds
    pub timestamp: i64,
}

impl From<RateSnapshot> for HistoryPoint {
    fn from(snapshot: RateSnapshot) -> Self {
        let total_gain = snapshot
            .total_gain()
            .clamp(i64::MIN as i128, i64::MAX as i128) as i64;

        Self {
            x_fey_amount: snapshot.xfey_amount,
            fey_amount: snapshot.fey_amount,
            conversion_rate: snapshot.conversion_rate,
            total_gain,
            percentage_gain: snapshot.gains_percent,
            timestamp: snapshot.timestamp.timestamp_millis(),
        }
    }
}

/// Launchpad response when no strategy produced a count.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnknownLaunchpadResponse {
    /// Always 0
    pub token_count: u64,
    /// Address that was probed
    pub launchpad_address: String,
    /// Always `none`
    pub source: String,
    /// Always null, so the UI shows 0 instead of an error
    pub error: Option<String>,
    /// Epoch milliseconds of the probe
    pub last_updated: i64,
}
