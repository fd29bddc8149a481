//! HTTP API
//!
//! Serves the options REST API together with operational endpoints.
//!
//! # Endpoints
//!
//! - `GET /` - Service metadata
//! - `GET /api/expiry-dates` - Expiry dates for a symbol
//! - `GET /api/option-chain` - Traded option chain for an expiry
//! - `GET /api/option-chain/ce` - Call side only
//! - `GET /api/option-chain/pe` - Put side only
//! - `GET /api/current-market` - Market snapshot at the nearest expiry
//! - `GET /healthz` - Liveness probe (simple OK)
//! - `GET /metrics` - Prometheus metrics in text format

pub mod error;
pub mod handlers;
pub mod responses;

use std::net::SocketAddr;

use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use handlers::{OptionsQuery, routes};

use crate::application::services::OptionsService;

/// Build the API router.
///
/// Cross-origin requests are allowed from any origin.
pub fn create_router(service: OptionsService) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(routes::INDEX, get(handlers::index_handler))
        .route(routes::EXPIRY_DATES, get(handlers::expiry_dates_handler))
        .route(routes::OPTION_CHAIN, get(handlers::option_chain_handler))
        .route(routes::OPTION_CHAIN_CE, get(handlers::ce_options_handler))
        .route(routes::OPTION_CHAIN_PE, get(handlers::pe_options_handler))
        .route(routes::CURRENT_MARKET, get(handlers::current_market_handler))
        .route(routes::HEALTHZ, get(handlers::liveness_handler))
        .route(routes::METRICS, get(handlers::metrics_handler))
        .with_state(service)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}

// =============================================================================
// API Server
// =============================================================================

/// HTTP server for the options API.
pub struct ApiServer {
    addr: SocketAddr,
    router: Router,
    cancel: CancellationToken,
}

impl ApiServer {
    /// Create a new server.
    #[must_use]
    pub const fn new(addr: SocketAddr, router: Router, cancel: CancellationToken) -> Self {
        Self {
            addr,
            router,
            cancel,
        }
    }

    /// Run the server until cancelled.
    ///
    /// # Errors
    ///
    /// Returns `ApiServerError` if binding fails or the HTTP server
    /// encounters a fatal error while running.
    pub async fn run(self) -> Result<(), ApiServerError> {
        let listener = TcpListener::bind(self.addr)
            .await
            .map_err(|e| ApiServerError::BindFailed(self.addr, e.to_string()))?;

        tracing::info!(addr = %self.addr, "API server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(self.cancel.cancelled_owned())
            .await
            .map_err(|e| ApiServerError::ServerFailed(e.to_string()))?;

        tracing::info!("API server stopped");
        Ok(())
    }
}

/// API server errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiServerError {
    /// Failed to bind the listener.
    #[error("failed to bind to {0}: {1}")]
    BindFailed(SocketAddr, String),

    /// Server error.
    #[error("server error: {0}")]
    ServerFailed(String),
}
