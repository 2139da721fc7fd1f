//! App state: config, cache, history and the external clients.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use fey_cache::{LibsqlCacheStore, TtlCache};
use fey_core::constants::*;
use fey_core::error::{FeyError, Result};
use fey_core::traits::RateHistory;
use fey_fetch::{
    DuneClient, DuneConfig, ExplorerClient, ExplorerConfig, RpcClient, RpcConfig, SubgraphClient,
    SubgraphConfig,
};
use fey_history::{LibsqlRateHistory, MemoryRateHistory};
use fey_probe::{launchpad_probes, FallbackProber};

/// Server configuration, read once at startup.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Public Base RPC, used for `previewRedeem`
    pub rpc_url: String,
    /// Alchemy key; the launchpad prober is disabled without it
    pub alchemy_api_key: Option<String>,
    /// Alchemy Base endpoint, the key is appended as a path segment
    pub alchemy_base_url: String,
    /// Dune API key
    pub dune_api_key: Option<String>,
    /// Dune API root
    pub dune_base_url: String,
    /// Dune query holding the FEY awarded total
    pub dune_query_id: u64,
    /// The Graph gateway key
    pub thegraph_api_key: Option<String>,
    /// Pool subgraph URL
    pub subgraph_url: String,
    /// Basescan key; the public placeholder is used without it
    pub basescan_api_key: Option<String>,
    /// Basescan API root
    pub basescan_base_url: String,
    /// libSQL / Turso database URL; in-memory stores without it
    pub database_url: Option<String>,
    /// libSQL auth token
    pub database_auth_token: Option<String>,
    /// Timeout applied to every outbound request and probe attempt
    pub request_timeout_seconds: u64,
    /// Interval of the background rate snapshot, if enabled
    pub snapshot_interval_seconds: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_BASE_RPC_URL.into(),
            alchemy_api_key: None,
            alchemy_base_url: DEFAULT_ALCHEMY_BASE_URL.into(),
            dune_api_key: None,
            dune_base_url: DEFAULT_DUNE_BASE_URL.into(),
            dune_query_id: DEFAULT_DUNE_QUERY_ID,
            thegraph_api_key: None,
            subgraph_url: DEFAULT_SUBGRAPH_URL.into(),
            basescan_api_key: None,
            basescan_base_url: DEFAULT_EXPLORER_BASE_URL.into(),
            database_url: None,
            database_auth_token: None,
            request_timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECONDS,
            snapshot_interval_seconds: None,
        }
    }
}

impl ApiConfig {
    /// Reads the configuration from the environment, loading `.env` first.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    ///
    /// Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let url_var = |name: &str, default: String| -> Result<String> {
            match var(name) {
                Some(value) => validate_url(name, &value),
                None => Ok(default),
            }
        };

        Ok(Self {
            rpc_url: url_var("BASE_RPC_URL", defaults.rpc_url)?,
            alchemy_api_key: var("ALCHEMY_API_KEY"),
            alchemy_base_url: url_var("ALCHEMY_BASE_URL", defaults.alchemy_base_url)?,
            dune_api_key: var("DUNE_API_KEY"),
            dune_base_url: url_var("DUNE_BASE_URL", defaults.dune_base_url)?,
            dune_query_id: parse_var("DUNE_QUERY_ID", var("DUNE_QUERY_ID"))?
                .unwrap_or(defaults.dune_query_id),
            thegraph_api_key: var("THEGRAPH_API_KEY"),
            subgraph_url: url_var("THEGRAPH_SUBGRAPH_URL", defaults.subgraph_url)?,
            basescan_api_key: var("BASESCAN_API_KEY"),
            basescan_base_url: url_var("BASESCAN_BASE_URL", defaults.basescan_base_url)?,
            database_url: var("DATABASE_URL"),
            database_auth_token: var("DATABASE_AUTH_TOKEN"),
            request_timeout_seconds: parse_var("REQUEST_TIMEOUT_SECONDS", var("REQUEST_TIMEOUT_SECONDS"))?
                .unwrap_or(defaults.request_timeout_seconds),
            snapshot_interval_seconds: parse_var(
                "SNAPSHOT_INTERVAL_SECONDS",
                var("SNAPSHOT_INTERVAL_SECONDS"),
            )?
            .filter(|secs| *secs > 0),
        })
    }

    /// Alchemy endpoint with the key appended, if a key is configured.
    pub fn alchemy_url(&self) -> Option<String> {
        self.alchemy_api_key
            .as_ref()
            .map(|key| format!("{}/{}", self.alchemy_base_url.trim_end_matches('/'), key))
    }

    /// The shared outbound timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

fn validate_url(name: &str, value: &str) -> Result<String> {
    let parsed = url::Url::parse(value)
        .map_err(|e| FeyError::ConfigError(format!("{name} is not a valid URL: {e}")))?;

    match parsed.scheme() {
        "http" | "https" | "libsql" | "wss" | "ws" => Ok(value.to_string()),
        other => Err(FeyError::ConfigError(format!("{name} has unsupported scheme {other}"))),
    }
}

fn parse_var(name: &str, value: Option<String>) -> Result<Option<u64>> {
    value
        .map(|v| {
            v.parse::<u64>()
                .map_err(|_| FeyError::ConfigError(format!("{name} must be a non-negative integer, got {v}")))
        })
        .transpose()
}

/// Shared state behind every handler.
pub struct AppState {
    /// Configuration the state was built from
    pub config: ApiConfig,
    /// TTL cache (the `api_cache` table); also owns the clock
    pub cache: TtlCache,
    /// Conversion rate history (the `fey_rates` table)
    pub history: Arc<dyn RateHistory>,
    /// Public Base RPC
    pub rpc: RpcClient,
    /// Dune client, absent without an API key
    pub dune: Option<DuneClient>,
    /// Subgraph client, absent without an API key
    pub subgraph: Option<SubgraphClient>,
    /// Launchpad prober, absent without an Alchemy key
    pub prober: Option<FallbackProber>,
    /// Which persistence backend is in use
    pub backend: &'static str,
}

impl AppState {
    /// Connects to the configured database (or falls back to memory) and
    /// builds the external clients.
    pub async fn connect(config: ApiConfig) -> Result<Self> {
        let Some(url) = config.database_url.clone() else {
            warn!("DATABASE_URL not set, using in-memory cache and history");
            return Self::with_parts(config, TtlCache::in_memory(), Arc::new(MemoryRateHistory::new()));
        };

        let token = config.database_auth_token.clone().unwrap_or_default();
        let db = libsql::Builder::new_remote(url, token)
            .build()
            .await
            .map_err(|e| FeyError::StorageError(format!("failed to open database: {e}")))?;
        let conn = db
            .connect()
            .map_err(|e| FeyError::StorageError(format!("failed to connect to database: {e}")))?;

        let cache = TtlCache::new(Arc::new(LibsqlCacheStore::new(conn.clone()).await?));
        let history = Arc::new(LibsqlRateHistory::new(conn).await?);

        info!("Connected to libSQL database");
        let mut state = Self::with_parts(config, cache, history)?;
        state.backend = "libsql";
        Ok(state)
    }

    /// Builds the state from ready-made stores.
    pub fn with_parts(config: ApiConfig, cache: TtlCache, history: Arc<dyn RateHistory>) -> Result<Self> {
        let timeout = config.request_timeout_seconds;

        let rpc = RpcClient::with_config(RpcConfig::new(&config.rpc_url).with_timeout(timeout))?;

        let dune = config
            .dune_api_key
            .as_ref()
            .map(|key| {
                DuneClient::with_config(DuneConfig {
                    base_url: config.dune_base_url.clone(),
                    api_key: key.clone(),
                    query_id: config.dune_query_id,
                    timeout_seconds: timeout,
                })
            })
            .transpose()?;

        let subgraph = config
            .thegraph_api_key
            .as_ref()
            .map(|key| {
                SubgraphClient::with_config(SubgraphConfig {
                    url: config.subgraph_url.clone(),
                    api_key: key.clone(),
                    timeout_seconds: timeout,
                })
            })
            .transpose()?;

        let prober = match config.alchemy_url() {
            Some(alchemy_url) => {
                let rpc = Arc::new(RpcClient::with_config(RpcConfig::new(alchemy_url).with_timeout(timeout))?);
                let explorer = Arc::new(ExplorerClient::with_config(ExplorerConfig {
                    base_url: config.basescan_base_url.clone(),
                    api_key: config
                        .basescan_api_key
                        .clone()
                        .unwrap_or_else(|| EXPLORER_PLACEHOLDER_API_KEY.into()),
                    timeout_seconds: timeout,
                })?);
                Some(FallbackProber::new(launchpad_probes(rpc, explorer)).with_attempt_timeout(config.request_timeout()))
            }
            None => None,
        };

        Ok(Self {
            config,
            cache,
            history,
            rpc,
            dune,
            subgraph,
            prober,
            backend: "memory",
        })
    }
}
