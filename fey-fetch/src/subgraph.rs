//! The Graph subgraph client.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use fey_core::constants::{DEFAULT_REQUEST_TIMEOUT_SECONDS, DEFAULT_SUBGRAPH_URL};
use fey_core::error::{FeyError, Result};
use fey_core::types::PoolStats;

use crate::http::{build_client, ensure_success, lenient_f64, lenient_u64, read_json, request_error};

const SERVICE: &str = "The Graph";

const POOL_QUERY: &str = r#"query Pool($id: ID!) {
  pools(where: { id: $id }) {
    volumeUSD
    txCount
    totalValueLockedUSD
    token0 { symbol }
    token1 { symbol }
  }
}"#;

/// Subgraph client configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubgraphConfig {
    /// Gateway URL of the subgraph
    pub url: String,
    /// Gateway API key, sent as a bearer token
    pub api_key: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl SubgraphConfig {
    /// Creates a configuration for the default subgraph.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            url: DEFAULT_SUBGRAPH_URL.into(),
            api_key: api_key.into(),
            timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECONDS,
        }
    }

    /// Overrides the subgraph URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

#[derive(Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<PoolsData>,
    #[serde(default)]
    errors: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct PoolsData {
    #[serde(default)]
    pools: Vec<RawPool>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPool {
    #[serde(rename = "volumeUSD")]
    volume_usd: serde_json::Value,
    tx_count: serde_json::Value,
    #[serde(rename = "totalValueLockedUSD")]
    total_value_locked_usd: serde_json::Value,
    token0: RawToken,
    token1: RawToken,
}

#[derive(Deserialize)]
struct RawToken {
    symbol: String,
}

/// Client for a Uniswap-style pool subgraph.
pub struct SubgraphClient {
    config: SubgraphConfig,
    http_client: reqwest::Client,
}

impl SubgraphClient {
    /// Creates a client with custom configuration.
    pub fn with_config(config: SubgraphConfig) -> Result<Self> {
        Ok(Self {
            http_client: build_client(config.timeout_seconds)?,
            config,
        })
    }

    /// Fetches volume, transaction count and TVL for `pool_id`.
    ///
    /// `fetched_at` (epoch ms) is stamped onto the returned record.
    #[instrument(skip(self))]
    pub async fn pool_stats(&self, pool_id: &str, fetched_at: i64) -> Result<PoolStats> {
        let body = serde_json::json!({
            "query": POOL_QUERY,
            "operationName": "Pool",
            "variables": { "id": pool_id },
        });

        let response = self
            .http_client
            .post(&self.config.url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| request_error(SERVICE, e))?;

        let response: GraphqlResponse = read_json(SERVICE, ensure_success(SERVICE, response)?).await?;

        if let Some(errors) = response.errors {
            return Err(FeyError::GraphqlError(errors.to_string()));
        }

        let pool = response
            .data
            .and_then(|d| d.pools.into_iter().next())
            .ok_or_else(|| FeyError::NotFound(format!("pool {pool_id}")))?;

        let stats = PoolStats {
            volume_usd: number_field(&pool.volume_usd, "volumeUSD")?,
            tx_count: lenient_u64(&pool.tx_count)
                .ok_or_else(|| malformed("txCount", &pool.tx_count))?,
            total_value_locked_usd: number_field(&pool.total_value_locked_usd, "totalValueLockedUSD")?,
            token0_symbol: pool.token0.symbol,
            token1_symbol: pool.token1.symbol,
            last_updated: fetched_at,
        };

        debug!(volume_usd = stats.volume_usd, tx_count = stats.tx_count, "Fetched pool stats");
        Ok(stats)
    }
}

fn number_field(value: &serde_json::Value, name: &str) -> Result<f64> {
    lenient_f64(value).ok_or_else(|| malformed(name, value))
}

fn malformed(name: &str, value: &serde_json::Value) -> FeyError {
    FeyError::MalformedResponse(format!("{name} is not numeric: {value}"))
}
