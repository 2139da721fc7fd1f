//! # FEY API Server
//!
//! REST API behind the FEY dashboard frontend.
//!
//! ## Endpoints
//!
//! - `GET /health` - Liveness and version
//! - `GET /api/dune` - Total FEY awarded (cached 30 minutes)
//! - `GET /api/cron-dune-refresh` - Force a Dune refresh
//! - `GET /api/cron` - Record an xFEY → FEY conversion snapshot
//! - `GET /api/history` - Conversion snapshots, oldest first
//! - `GET /api/launchpad-count` - Launchpad token count (cached 2 minutes)
//! - `GET /api/thegraph-volume` - Pool volume and TVL (cached 30 minutes)
//!
//! ## Example
//!
//! ```rust,ignore
//! use fey_api::{ApiConfig, ApiServer};
//!
//! let config = ApiConfig::from_env()?;
//! let server = ApiServer::connect(config).await?;
//! server.run(([0, 0, 0, 0], 3001)).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod dto;
mod error;
mod handlers;
pub mod jobs;
mod routes;
mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{ApiConfig, AppState};

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use fey_core::error::Result;

/// API server for the FEY dashboard.
pub struct ApiServer {
    state: Arc<AppState>,
}

impl ApiServer {
    /// Creates a server over an existing state.
    pub fn new(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    /// Connects the configured stores and clients.
    pub async fn connect(config: ApiConfig) -> Result<Self> {
        Ok(Self::new(AppState::connect(config).await?))
    }

    /// Shared state.
    pub fn state(&self) -> Arc<AppState> {
        self.state.clone()
    }

    /// Creates the router with all routes configured.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        create_router(self.state.clone())
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Runs the server on the given address.
    ///
    /// Starts the background snapshot task first when an interval is configured.
    pub async fn run(self, addr: impl Into<SocketAddr>) -> std::io::Result<()> {
        let addr = addr.into();

        let snapshots = self.state.config.snapshot_interval_seconds.map(|secs| {
            info!(interval_seconds = secs, "Starting rate snapshot task");
            jobs::spawn_snapshot_task(self.state.clone(), Duration::from_secs(secs))
        });

        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("FEY API server listening on {}", addr);

        let result = axum::serve(listener, self.router()).await;

        if let Some(handle) = snapshots {
            handle.abort();
        }
        result
    }
}
