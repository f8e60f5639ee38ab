//! API Server Module
//!
//! This module wires the REST handlers into an axum router, applies the
//! HTTP middleware stack and serves it on the configured address.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use std::{sync::Arc, time::Duration};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

use super::handlers;
use crate::{
    config::{ApiConfig, Config, NetworkInfo},
    contract::TokenBackend,
};

/// Shared application state that is accessible across all request handlers
///
/// - `backend`: Performs the contract reads and writes
/// - `network`: Static details of the configured chain, reported by the health check
pub struct AppState<B> {
    pub(super) backend: Arc<B>,
    pub(super) network: NetworkInfo,
}

impl<B> AppState<B> {
    pub fn new(backend: Arc<B>, network: NetworkInfo) -> Self {
        Self { backend, network }
    }
}

// Manual impl: deriving would require `B: Clone`.
impl<B> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            network: self.network.clone(),
        }
    }
}

/// Build the router with every endpoint and the middleware stack
pub fn router<B: TokenBackend>(state: AppState<B>, api: &ApiConfig) -> Router {
    Router::new()
        .route("/", get(handlers::health::<B>))
        .route("/api/token/info", get(handlers::token_info::<B>))
        .route("/api/balance/:address", get(handlers::balance::<B>))
        .route("/api/mint", post(handlers::mint::<B>))
        .route("/api/transfer", post(handlers::transfer::<B>))
        .route("/api/burn", post(handlers::burn::<B>))
        .route("/api/transaction/:tx_hash", get(handlers::transaction_status::<B>))
        .route("/api/gas/estimate", post(handlers::estimate_gas::<B>))
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(DefaultBodyLimit::max(api.max_request_size))
        .layer(TimeoutLayer::new(Duration::from_secs(api.request_timeout_secs)))
        .layer(middleware::map_response(handlers::envelope_errors))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// The main API server struct
///
/// Encapsulates the server configuration and application state.
pub struct Server<B> {
    config: Config,
    state: AppState<B>,
}

impl<B: TokenBackend> Server<B> {
    /// Creates a new API server around a connected contract backend
    pub fn new(config: Config, backend: B) -> Self {
        let state = AppState::new(Arc::new(backend), config.network_info());
        Self { config, state }
    }

    /// Starts the API server and serves until Ctrl-C
    ///
    /// # Returns
    /// `Ok(())` after a graceful shutdown, or an error if binding fails
    pub async fn start(self) -> anyhow::Result<()> {
        let app = router(self.state, &self.config.api);

        let addr = format!("{}:{}", self.config.api.host, self.config.api.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!(address = %addr, "API server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("API server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
