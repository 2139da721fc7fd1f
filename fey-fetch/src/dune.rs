//! Dune query results client.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use fey_core::constants::{
    DEFAULT_DUNE_BASE_URL, DEFAULT_DUNE_QUERY_ID, DEFAULT_REQUEST_TIMEOUT_SECONDS, DUNE_RESULT_LIMIT,
};
use fey_core::error::{FeyError, Result};

use crate::http::{build_client, ensure_success, lenient_f64, read_json, request_error};

const SERVICE: &str = "Dune";

/// Dune client configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DuneConfig {
    /// API root, e.g. `https://api.dune.com/api/v1`
    pub base_url: String,
    /// Value of the `X-Dune-API-Key` header
    pub api_key: String,
    /// Saved query whose latest results are read
    pub query_id: u64,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl DuneConfig {
    /// Creates a configuration for the default endpoint and query.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_DUNE_BASE_URL.into(),
            api_key: api_key.into(),
            query_id: DEFAULT_DUNE_QUERY_ID,
            timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECONDS,
        }
    }

    /// Overrides the API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Deserialize)]
struct QueryResultsResponse {
    #[serde(default)]
    result: Option<QueryResult>,
}

#[derive(Deserialize)]
struct QueryResult {
    #[serde(default)]
    rows: Vec<serde_json::Map<String, serde_json::Value>>,
}

/// Client for Dune's query results API.
pub struct DuneClient {
    config: DuneConfig,
    http_client: reqwest::Client,
}

impl DuneClient {
    /// Creates a client with custom configuration.
    pub fn with_config(config: DuneConfig) -> Result<Self> {
        Ok(Self {
            http_client: build_client(config.timeout_seconds)?,
            config,
        })
    }

    /// Reads `total_fey` from the first result row, rounded.
    ///
    /// An empty result set or a missing column counts as zero.
    #[instrument(skip(self), fields(query_id = self.config.query_id))]
    pub async fn total_fey_awarded(&self) -> Result<u64> {
        let rows = self.latest_rows().await?;

        let Some(raw) = rows.first().and_then(|row| row.get("total_fey")) else {
            debug!("Dune query returned no total_fey");
            return Ok(0);
        };

        if raw.is_null() {
            return Ok(0);
        }

        let total = lenient_f64(raw)
            .ok_or_else(|| FeyError::MalformedResponse(format!("total_fey is not numeric: {raw}")))?;

        if !total.is_finite() || total < 0.0 {
            return Err(FeyError::MalformedResponse(format!("total_fey out of range: {total}")));
        }

        debug!(total, "Dune query returned total_fey");
        Ok(total.round() as u64)
    }

    async fn latest_rows(&self) -> Result<Vec<serde_json::Map<String, serde_json::Value>>> {
        let url = format!(
            "{}/query/{}/results",
            self.config.base_url.trim_end_matches('/'),
            self.config.query_id
        );

        let response = self
            .http_client
            .get(url)
            .query(&[("limit", DUNE_RESULT_LIMIT)])
            .header("X-Dune-API-Key", &self.config.api_key)
            .send()
            .await
            .map_err(|e| request_error(SERVICE, e))?;

        let body: QueryResultsResponse = read_json(SERVICE, ensure_success(SERVICE, response)?).await?;
        Ok(body.result.map(|r| r.rows).unwrap_or_default())
    }
}
