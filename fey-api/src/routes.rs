//! API route configuration.

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::handlers;
use crate::state::AppState;

/// Creates the API router with all routes configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))

        // Rewards (Dune)
        .route("/api/dune", get(handlers::get_fey_awarded))
        .route("/api/cron-dune-refresh", get(handlers::refresh_fey_awarded))

        // Conversion rate
        .route("/api/cron", get(handlers::record_snapshot))
        .route("/api/history", get(handlers::get_history))

        // Launchpad and pool analytics
        .route("/api/launchpad-count", get(handlers::get_launchpad_count))
        .route("/api/thegraph-volume", get(handlers::get_pool_volume))

        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use fey_cache::{MemoryCacheStore, TtlCache};
    use fey_core::clock::ManualClock;
    use fey_core::constants::LAUNCHPAD_CACHE_KEY;
    use fey_core::error::{FeyError, Result as FeyResult};
    use fey_core::traits::RateHistory;
    use fey_core::types::{LaunchpadCount, RateSnapshot};
    use fey_history::MemoryRateHistory;
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::ServiceExt;
    use wiremock::matchers::{body_partial_json, method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::state::ApiConfig;

    struct Harness {
        state: Arc<AppState>,
        clock: Arc<ManualClock>,
    }

    impl Harness {
        fn new(config: ApiConfig) -> Self {
            Self::with_history(config, Arc::new(MemoryRateHistory::new()))
        }

        fn with_history(config: ApiConfig, history: Arc<dyn RateHistory>) -> Self {
            let clock = Arc::new(ManualClock::starting_now());
            let cache = TtlCache::with_clock(Arc::new(MemoryCacheStore::new()), clock.clone());
            let state = Arc::new(AppState::with_parts(config, cache, history).unwrap());
            Self { state, clock }
        }

        async fn get(&self, uri: &str) -> (StatusCode, Option<String>, Value) {
            let response = create_router(self.state.clone())
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();

            let status = response.status();
            let cache_control = response
                .headers()
                .get(header::CACHE_CONTROL)
                .map(|v| v.to_str().unwrap().to_string());
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            (status, cache_control, body)
        }
    }

    struct FailingHistory;

    #[async_trait]
    impl RateHistory for FailingHistory {
        async fn record(&self, _snapshot: &RateSnapshot) -> FeyResult<()> {
            Err(FeyError::StorageError("disk full".into()))
        }

        async fn list(&self, _limit: usize) -> FeyResult<Vec<RateSnapshot>> {
            Err(FeyError::StorageError("connection reset".into()))
        }

        async fn count(&self) -> FeyResult<u64> {
            Err(FeyError::StorageError("connection reset".into()))
        }
    }

    fn rpc_result(result: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({"jsonrpc": "2.0", "id": 1, "result": result}))
    }

    #[tokio::test]
    async fn test_health_check() {
        let harness = Harness::new(ApiConfig::default());
        let (status, _, body) = harness.get("/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["backend"], "memory");
    }

    #[tokio::test]
    async fn test_dune_is_cached() {
        let dune = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": {"rows": [{"total_fey": "123456.7"}]}
            })))
            .expect(1)
            .mount(&dune)
            .await;

        let harness = Harness::new(ApiConfig {
            dune_api_key: Some("dune-key".into()),
            dune_base_url: dune.uri(),
            ..Default::default()
        });

        let (status, _, first) = harness.get("/api/dune").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["totalFeyAwarded"], 123_457);

        harness.clock.advance(Duration::from_secs(60));
        let (_, _, second) = harness.get("/api/dune").await;
        assert_eq!(second, first);
    }

    #[tokio::test]
    async fn test_dune_failure() {
        let dune = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&dune)
            .await;

        let harness = Harness::new(ApiConfig {
            dune_api_key: Some("dune-key".into()),
            dune_base_url: dune.uri(),
            ..Default::default()
        });

        let (status, _, body) = harness.get("/api/dune").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Failed to fetch Dune data"}));
    }

    #[tokio::test]
    async fn test_dune_refresh_bypasses_cache() {
        let dune = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": {"rows": [{"total_fey": 500}]}
            })))
            .expect(3)
            .mount(&dune)
            .await;

        let harness = Harness::new(ApiConfig {
            dune_api_key: Some("dune-key".into()),
            dune_base_url: dune.uri(),
            ..Default::default()
        });

        harness.get("/api/dune").await;
        let (status, _, body) = harness.get("/api/cron-dune-refresh").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["totalFeyAwarded"], 500);
        assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));

        harness.get("/api/cron-dune-refresh").await;
        // Served from the refreshed entry.
        harness.get("/api/dune").await;
    }

    #[tokio::test]
    async fn test_dune_refresh_failure() {
        let harness = Harness::new(ApiConfig::default());
        let (status, _, body) = harness.get("/api/cron-dune-refresh").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to refresh Dune data");
    }

    #[tokio::test]
    async fn test_cron_then_history() {
        let rpc = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(rpc_result("0x1017df"))
            .mount(&rpc)
            .await;

        let harness = Harness::new(ApiConfig {
            rpc_url: rpc.uri(),
            ..Default::default()
        });

        let (status, _, body) = harness.get("/api/cron").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["feyAmount"], 1_054_687);

        harness.clock.advance(Duration::from_secs(600));
        harness.get("/api/cron").await;

        let (status, cache_control, history) = harness.get("/api/history").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            cache_control.as_deref(),
            Some("public, s-maxage=300, stale-while-revalidate=600")
        );

        let points = history.as_array().unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0]["xFeyAmount"], 1_000_000);
        assert_eq!(points[0]["totalGain"], 54_687);
        assert!(points[0]["timestamp"].as_i64().unwrap() < points[1]["timestamp"].as_i64().unwrap());

        let (_, _, limited) = harness.get("/api/history?limit=1").await;
        assert_eq!(limited.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cron_rpc_error() {
        let rpc = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0", "id": 1, "error": {"code": -32000, "message": "execution reverted"}
            })))
            .mount(&rpc)
            .await;

        let harness = Harness::new(ApiConfig {
            rpc_url: rpc.uri(),
            ..Default::default()
        });

        let (status, _, body) = harness.get("/api/cron").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to fetch conversion rate");
    }

    #[tokio::test]
    async fn test_cron_store_error() {
        let rpc = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(rpc_result("0x0f4240"))
            .mount(&rpc)
            .await;

        let config = ApiConfig {
            rpc_url: rpc.uri(),
            ..Default::default()
        };
        let harness = Harness::with_history(config, Arc::new(FailingHistory));

        let (status, _, body) = harness.get("/api/cron").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to save to database");

        let (status, _, body) = harness.get("/api/history").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to fetch historical data");
    }

    #[tokio::test]
    async fn test_history_rejects_bad_limit_as_json() {
        let harness = Harness::new(ApiConfig::default());

        for uri in ["/api/history?limit=abc", "/api/history?limit=-5"] {
            let (status, _, body) = harness.get(uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body["error"], "Invalid limit parameter");
            assert!(body["details"].as_str().unwrap().starts_with("Failed to deserialize query string"));
        }
    }

    #[tokio::test]
    async fn test_launchpad_without_alchemy_key() {
        let harness = Harness::new(ApiConfig::default());
        let (status, _, body) = harness.get("/api/launchpad-count").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Configuration error"}));
    }

    #[tokio::test]
    async fn test_launchpad_cache_checked_before_config() {
        let harness = Harness::new(ApiConfig::default());
        let cached = LaunchpadCount {
            token_count: 17,
            source: "tokenCount".into(),
            last_updated: 5,
        };
        assert!(harness.state.cache.set(LAUNCHPAD_CACHE_KEY, &cached, Duration::from_secs(120)).await);

        let (status, _, body) = harness.get("/api/launchpad-count").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tokenCount"], 17);
    }

    #[tokio::test]
    async fn test_launchpad_probe_result_is_cached() {
        let alchemy = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"method": "eth_call"})))
            .respond_with(rpc_result("0x2a"))
            .expect(1)
            .mount(&alchemy)
            .await;

        let harness = Harness::new(ApiConfig {
            alchemy_api_key: Some("alchemy-key".into()),
            alchemy_base_url: alchemy.uri(),
            ..Default::default()
        });

        let (status, _, body) = harness.get("/api/launchpad-count").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tokenCount"], 42);
        assert_eq!(body["source"], "tokenCount");

        let (_, _, again) = harness.get("/api/launchpad-count").await;
        assert_eq!(again, body);
    }

    #[tokio::test]
    async fn test_launchpad_sentinel_is_not_cached() {
        let alchemy = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&alchemy)
            .await;

        let explorer = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("apikey", "YourApiKeyToken"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "0", "message": "NOTOK", "result": "Max rate limit reached"
            })))
            .mount(&explorer)
            .await;

        let harness = Harness::new(ApiConfig {
            alchemy_api_key: Some("alchemy-key".into()),
            alchemy_base_url: alchemy.uri(),
            basescan_base_url: explorer.uri(),
            ..Default::default()
        });

        let (status, _, body) = harness.get("/api/launchpad-count").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tokenCount"], 0);
        assert_eq!(body["source"], "none");
        assert!(body["error"].is_null());
        assert_eq!(body["launchpadAddress"], "0x8EEF0dC80ADf57908bB1be0236c2a72a7e379C2d");

        assert!(harness.state.cache.get(LAUNCHPAD_CACHE_KEY).await.is_none());
    }

    #[tokio::test]
    async fn test_volume() {
        let graph = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"pools": [{
                    "volumeUSD": "2500.5",
                    "txCount": "31",
                    "totalValueLockedUSD": "1000",
                    "token0": {"symbol": "WETH"},
                    "token1": {"symbol": "FEY"}
                }]}
            })))
            .expect(1)
            .mount(&graph)
            .await;

        let harness = Harness::new(ApiConfig {
            thegraph_api_key: Some("graph-key".into()),
            subgraph_url: graph.uri(),
            ..Default::default()
        });

        let (status, _, body) = harness.get("/api/thegraph-volume").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["volumeUSD"], 2500.5);
        assert_eq!(body["txCount"], 31);
        assert_eq!(body["token1Symbol"], "FEY");

        harness.get("/api/thegraph-volume").await;
    }

    #[tokio::test]
    async fn test_volume_failure_has_details() {
        let graph = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errors": [{"message": "bad indexers"}]
            })))
            .mount(&graph)
            .await;

        let harness = Harness::new(ApiConfig {
            thegraph_api_key: Some("graph-key".into()),
            subgraph_url: graph.uri(),
            ..Default::default()
        });

        let (status, _, body) = harness.get("/api/thegraph-volume").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to fetch volume data");
        assert!(body["details"].as_str().unwrap().contains("bad indexers"));
    }
}
