//! JSON-RPC client for Base.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use fey_core::constants::{DEFAULT_BASE_RPC_URL, DEFAULT_REQUEST_TIMEOUT_SECONDS, PREVIEW_REDEEM_SIGNATURE};
use fey_core::error::{FeyError, Result};

use crate::abi::{decode_uint, encode_call, function_selector};
use crate::http::{build_client, ensure_success, read_json, request_error};

const SERVICE: &str = "RPC";

/// RPC client configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RpcConfig {
    /// JSON-RPC endpoint URL
    pub rpc_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_BASE_RPC_URL.into(),
            timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECONDS,
        }
    }
}

impl RpcConfig {
    /// Creates a configuration for the given endpoint.
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            ..Default::default()
        }
    }

    /// Overrides the request timeout.
    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

/// JSON-RPC client.
pub struct RpcClient {
    config: RpcConfig,
    http_client: reqwest::Client,
    next_id: AtomicU64,
}

impl RpcClient {
    /// Creates a client for the given endpoint with default settings.
    pub fn new(rpc_url: impl Into<String>) -> Result<Self> {
        Self::with_config(RpcConfig::new(rpc_url))
    }

    /// Creates a client with custom configuration.
    pub fn with_config(config: RpcConfig) -> Result<Self> {
        Ok(Self {
            http_client: build_client(config.timeout_seconds)?,
            config,
            next_id: AtomicU64::new(1),
        })
    }

    /// `eth_call` against the latest block; returns the raw hex result.
    #[instrument(skip(self))]
    pub async fn eth_call(&self, to: &str, data: &str) -> Result<String> {
        let params = serde_json::json!([{ "to": to, "data": data }, "latest"]);
        self.request_string("eth_call", params).await
    }

    /// `eth_getStorageAt` against the latest block; returns the raw hex word.
    #[instrument(skip(self))]
    pub async fn get_storage_at(&self, address: &str, slot: u64) -> Result<String> {
        let params = serde_json::json!([address, format!("0x{slot:x}"), "latest"]);
        self.request_string("eth_getStorageAt", params).await
    }

    /// `eth_call` decoded as a single `uint256`; `None` if the call returned no data.
    pub async fn call_uint(&self, to: &str, data: &str) -> Result<Option<u64>> {
        decode_uint(&self.eth_call(to, data).await?)
    }

    /// Asks an ERC-4626 vault how many assets `shares` redeem for.
    #[instrument(skip(self))]
    pub async fn preview_redeem(&self, vault: &str, shares: u64) -> Result<u64> {
        let data = encode_call(function_selector(PREVIEW_REDEEM_SIGNATURE), &[shares]);
        let assets = self
            .call_uint(vault, &data)
            .await?
            .ok_or_else(|| FeyError::MalformedResponse("previewRedeem returned no data".into()))?;

        debug!(shares, assets, "previewRedeem");
        Ok(assets)
    }

    async fn request_string(&self, method: &str, params: serde_json::Value) -> Result<String> {
        match self.request(method, params).await? {
            serde_json::Value::String(s) => Ok(s),
            other => Err(FeyError::MalformedResponse(format!(
                "{method} result is not a string: {other}"
            ))),
        }
    }

    async fn request(&self, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": self.next_id.fetch_add(1, Ordering::Relaxed),
            "method": method,
            "params": params,
        });

        let response = self
            .http_client
            .post(&self.config.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| request_error(SERVICE, e))?;

        let response: RpcResponse = read_json(SERVICE, ensure_success(SERVICE, response)?).await?;

        if let Some(error) = response.error {
            warn!(method, code = error.code, message = %error.message, "RPC error");
            return Err(FeyError::RpcError(format!("{} (code {})", error.message, error.code)));
        }

        response
            .result
            .ok_or_else(|| FeyError::MalformedResponse(format!("{method} response has no result")))
    }
}
