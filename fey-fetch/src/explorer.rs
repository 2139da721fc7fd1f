//! Basescan (Etherscan-compatible) API client.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, instrument};

use fey_core::constants::{
    DEFAULT_EXPLORER_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECONDS, EXPLORER_PLACEHOLDER_API_KEY,
};
use fey_core::error::{FeyError, Result};

use crate::http::{build_client, ensure_success, read_json, request_error};

const SERVICE: &str = "Basescan";

/// Block explorer client configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExplorerConfig {
    /// API root, e.g. `https://api.basescan.org/api`
    pub base_url: String,
    /// API key (the public placeholder works at a reduced rate limit)
    pub api_key: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_EXPLORER_BASE_URL.into(),
            api_key: EXPLORER_PLACEHOLDER_API_KEY.into(),
            timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECONDS,
        }
    }
}

impl ExplorerConfig {
    /// Creates a configuration, falling back to the public placeholder key.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.unwrap_or_else(|| EXPLORER_PLACEHOLDER_API_KEY.into()),
            ..Default::default()
        }
    }

    /// Overrides the API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// An internal (contract-to-contract) transaction.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalTransaction {
    /// Call type: `call`, `create`, `create2`, ...
    #[serde(rename = "type", default, deserialize_with = "null_as_empty")]
    pub kind: String,
    /// `"0"` on success
    #[serde(default, deserialize_with = "null_as_empty")]
    pub is_error: String,
    /// Address of the created contract, empty for plain calls
    #[serde(default, deserialize_with = "null_as_empty")]
    pub contract_address: String,
}

impl InternalTransaction {
    /// Returns true if this internal transaction deployed a contract.
    pub fn is_contract_creation(&self) -> bool {
        self.kind == "create"
            || self.kind == "create2"
            || (self.is_error == "0" && !self.contract_address.is_empty())
    }
}

/// A normal transaction.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// `"0"` on success
    #[serde(default, deserialize_with = "null_as_empty")]
    pub is_error: String,
}

impl Transaction {
    /// Returns true if the transaction did not revert.
    pub fn succeeded(&self) -> bool {
        self.is_error == "0"
    }
}

/// An emitted event log.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Hash of the emitting transaction
    #[serde(default, deserialize_with = "null_as_empty")]
    pub transaction_hash: String,
}

// Explorer rows sometimes carry `null` where a string is expected.
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
struct Envelope {
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    result: serde_json::Value,
}

/// Client for the block explorer's account and logs modules.
pub struct ExplorerClient {
    config: ExplorerConfig,
    http_client: reqwest::Client,
}

impl ExplorerClient {
    /// Creates a client with custom configuration.
    pub fn with_config(config: ExplorerConfig) -> Result<Self> {
        Ok(Self {
            http_client: build_client(config.timeout_seconds)?,
            config,
        })
    }

    /// Lists internal transactions involving `address`, oldest first.
    #[instrument(skip(self))]
    pub async fn internal_transactions(&self, address: &str) -> Result<Vec<InternalTransaction>> {
        self.fetch_list(&[
            ("module", "account"),
            ("action", "txlistinternal"),
            ("address", address),
            ("startblock", "0"),
            ("endblock", "99999999"),
            ("sort", "asc"),
        ])
        .await
    }

    /// Lists normal transactions involving `address`, oldest first.
    #[instrument(skip(self))]
    pub async fn transactions(&self, address: &str) -> Result<Vec<Transaction>> {
        self.fetch_list(&[
            ("module", "account"),
            ("action", "txlist"),
            ("address", address),
            ("startblock", "0"),
            ("endblock", "99999999"),
            ("sort", "asc"),
        ])
        .await
    }

    /// Lists event logs emitted by `address`.
    #[instrument(skip(self))]
    pub async fn logs(&self, address: &str) -> Result<Vec<LogEntry>> {
        self.fetch_list(&[
            ("module", "logs"),
            ("action", "getLogs"),
            ("address", address),
            ("fromBlock", "0"),
            ("toBlock", "latest"),
        ])
        .await
    }

    async fn fetch_list<T: DeserializeOwned>(&self, params: &[(&str, &str)]) -> Result<Vec<T>> {
        let response = self
            .http_client
            .get(&self.config.base_url)
            .query(params)
            .query(&[("apikey", self.config.api_key.as_str())])
            .send()
            .await
            .map_err(|e| request_error(SERVICE, e))?;

        let envelope: Envelope = read_json(SERVICE, ensure_success(SERVICE, response)?).await?;

        if envelope.status != "1" {
            return Err(FeyError::ExplorerError(format!(
                "status {}: {} {}",
                envelope.status, envelope.message, envelope.result
            )));
        }

        match envelope.result {
            serde_json::Value::Array(items) => {
                debug!(count = items.len(), "Explorer list");
                serde_json::from_value(serde_json::Value::Array(items))
                    .map_err(|e| FeyError::MalformedResponse(format!("{SERVICE}: {e}")))
            }
            other => Err(FeyError::ExplorerError(format!("result is not a list: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> ExplorerClient {
        let config = ExplorerConfig::new(Some("scan-key".into()))
            .with_base_url(format!("{}/api", server.uri()));
        ExplorerClient::with_config(config).unwrap()
    }

    #[test]
    fn test_placeholder_key() {
        assert_eq!(ExplorerConfig::new(None).api_key, "YourApiKeyToken");
    }

    #[test]
    fn test_contract_creation_classification() {
        let create = InternalTransaction { kind: "create2".into(), ..Default::default() };
        let deployed = InternalTransaction {
            kind: "call".into(),
            is_error: "0".into(),
            contract_address: "0xnew".into(),
            ..Default::default()
        };
        let call = InternalTransaction { kind: "call".into(), is_error: "0".into(), ..Default::default() };

        assert!(create.is_contract_creation());
        assert!(deployed.is_contract_creation());
        assert!(!call.is_contract_creation());
    }

    #[tokio::test]
    async fn test_internal_transactions() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api"))
            .and(query_param("action", "txlistinternal"))
            .and(query_param("address", "0xlaunchpad"))
            .and(query_param("apikey", "scan-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "1",
                "message": "OK",
                "result": [
                    {"hash": "0x1", "type": "create2", "isError": "0", "contractAddress": "0xa"},
                    {"hash": "0x2", "type": "call", "isError": "0", "contractAddress": ""},
                    {"hash": "0x3", "type": "call", "isError": "0", "contractAddress": null}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let txs = client_for(&server).await.internal_transactions("0xlaunchpad").await.unwrap();
        assert_eq!(txs.len(), 3);
        assert_eq!(txs.iter().filter(|t| t.is_contract_creation()).count(), 1);
    }

    #[test]
    fn test_null_fields_decode_as_empty() {
        let tx: InternalTransaction = serde_json::from_value(json!({
            "type": null,
            "isError": "0",
            "contractAddress": null
        }))
        .unwrap();
        assert!(tx.kind.is_empty());
        assert!(tx.contract_address.is_empty());
        assert!(!tx.is_contract_creation());

        let log: LogEntry = serde_json::from_value(json!({"transactionHash": null})).unwrap();
        assert!(log.transaction_hash.is_empty());
    }

    #[tokio::test]
    async fn test_logs() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("module", "logs"))
            .and(query_param("toBlock", "latest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "1",
                "message": "OK",
                "result": [
                    {"transactionHash": "0xaa", "topics": ["0x01"]},
                    {"transactionHash": "0xaa", "topics": ["0x02"]}
                ]
            })))
            .mount(&server)
            .await;

        let logs = client_for(&server).await.logs("0xlaunchpad").await.unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[1].transaction_hash, "0xaa");
    }

    #[tokio::test]
    async fn test_status_zero_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "0",
                "message": "NOTOK",
                "result": "Invalid API Key"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).await.transactions("0xlaunchpad").await.unwrap_err();
        assert!(matches!(err, FeyError::ExplorerError(ref m) if m.contains("NOTOK")));
    }
}
