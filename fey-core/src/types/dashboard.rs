//! Records served to the dashboard and cached between requests.
//!
//! Field names follow the frontend's camelCase JSON.

use serde::{Deserialize, Serialize};

use crate::constants::PROBE_SOURCE_NONE;

/// Best-effort count produced by the fallback prober.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    /// The count
    pub value: u64,
    /// Which strategy produced it
    pub source: String,
}

impl ProbeResult {
    /// Creates a result attributed to `source`.
    pub fn new(value: u64, source: impl Into<String>) -> Self {
        Self {
            value,
            source: source.into(),
        }
    }

    /// The "unknown" sentinel returned when every strategy failed.
    pub fn none() -> Self {
        Self::new(0, PROBE_SOURCE_NONE)
    }

    /// Returns true if this is the "unknown" sentinel.
    pub fn is_none(&self) -> bool {
        self.source == PROBE_SOURCE_NONE
    }
}

/// Total FEY awarded, as computed by the Dune query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeyAwarded {
    /// Rounded total
    pub total_fey_awarded: u64,
    /// Epoch milliseconds of the fetch
    pub last_updated: i64,
}

/// Pool statistics from the subgraph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolStats {
    /// Cumulative volume in USD
    #[serde(rename = "volumeUSD")]
    pub volume_usd: f64,
    /// Cumulative transaction count
    pub tx_count: u64,
    /// Current TVL in USD
    #[serde(rename = "totalValueLockedUSD")]
    pub total_value_locked_usd: f64,
    /// Symbol of token0
    pub token0_symbol: String,
    /// Symbol of token1
    pub token1_symbol: String,
    /// Epoch milliseconds of the fetch
    pub last_updated: i64,
}

/// Launchpad token count as served and cached.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchpadCount {
    /// Number of tokens launched
    pub token_count: u64,
    /// Strategy that produced the count
    pub source: String,
    /// Epoch milliseconds of the probe
    pub last_updated: i64,
}

impl LaunchpadCount {
    /// Wraps a probe result with its timestamp.
    pub fn from_probe(result: ProbeResult, last_updated: i64) -> Self {
        Self {
            token_count: result.value,
            source: result.source,
            last_updated,
        }
    }

    /// Returns true if no strategy produced a count.
    pub fn is_unknown(&self) -> bool {
        self.source == PROBE_SOURCE_NONE
    }
}
