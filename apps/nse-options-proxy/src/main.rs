//! NSE Options Proxy Binary
//!
//! Starts the option chain REST API.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin nse-options-proxy
//! ```
//!
//! # Environment Variables
//!
//! All optional.
//! - `NSE_PROXY_HOST`: Bind address (default: 0.0.0.0)
//! - `NSE_PROXY_PORT`: Bind port (default: 5000)
//! - `NSE_BASE_URL`: NSE website base URL (default: <https://www.nseindia.com>)
//! - `NSE_DEFAULT_SYMBOL`: Symbol used when a request omits one (default: NIFTY)
//! - `NSE_REQUEST_TIMEOUT_SECS`: Upstream request timeout (default: 30)
//! - `OTEL_ENABLED`: Enable OpenTelemetry export (default: false)
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP endpoint (default: <http://localhost:4317>)
//! - `OTEL_SERVICE_NAME`: Service name (default: nse-options-proxy)
//! - `RUST_LOG`: Log level (default: info)

use std::sync::Arc;

use anyhow::Context;
use nse_options_proxy::infrastructure::http::routes;
use nse_options_proxy::infrastructure::telemetry;
use nse_options_proxy::{
    ApiServer, NseClient, NseClientConfig, OptionsService, ProxyConfig, create_router,
    init_metrics,
};
use tokio::signal;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    // Initialize telemetry (tracing + optional OpenTelemetry)
    let _telemetry_guard = telemetry::init();

    tracing::info!("Starting NSE Options Proxy");

    // Initialize Prometheus metrics
    if let Err(e) = init_metrics() {
        tracing::warn!(error = %e, "Metrics recorder unavailable");
    }

    let config = ProxyConfig::from_env().context("invalid configuration")?;
    log_config(&config);

    let shutdown_token = CancellationToken::new();

    let client = NseClient::new(NseClientConfig::from(&config.upstream));
    let service = OptionsService::new(Arc::new(client), config.upstream.default_symbol.clone());
    let router = create_router(service);

    let server = ApiServer::new(config.server.addr(), router, shutdown_token.clone());
    let mut server_handle = tokio::spawn(server.run());

    log_routes(&config);
    tracing::info!("Options proxy ready");

    tokio::select! {
        () = await_shutdown(shutdown_token.clone()) => {}
        // Server exited on its own (bind failure or fatal error).
        result = &mut server_handle => {
            shutdown_token.cancel();
            result
                .context("API server task panicked")?
                .context("API server failed")?;
            return Ok(());
        }
    }

    server_handle
        .await
        .context("API server task panicked")?
        .context("API server failed")?;

    tracing::info!("Options proxy stopped");
    Ok(())
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Log the parsed configuration.
fn log_config(config: &ProxyConfig) {
    tracing::info!(
        addr = %config.server.addr(),
        base_url = %config.upstream.base_url,
        default_symbol = %config.upstream.default_symbol,
        timeout_secs = config.upstream.request_timeout.as_secs(),
        "Configuration loaded"
    );
}

/// Log the served routes.
fn log_routes(config: &ProxyConfig) {
    for route in [
        routes::INDEX,
        routes::EXPIRY_DATES,
        routes::OPTION_CHAIN,
        routes::OPTION_CHAIN_CE,
        routes::OPTION_CHAIN_PE,
        routes::CURRENT_MARKET,
        routes::HEALTHZ,
        routes::METRICS,
    ] {
        tracing::info!(route, "Route registered");
    }
    tracing::info!(url = %format!("http://{}", config.server.addr()), "Serving API");
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
#[allow(clippy::expect_used)]
async fn await_shutdown(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }

    shutdown_token.cancel();
    tracing::info!("Graceful shutdown started");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::{Layer, Registry};

    use super::*;

    /// Records the level of every event it sees.
    #[derive(Clone, Default)]
    struct Levels(Arc<Mutex<Vec<Level>>>);

    impl<S: Subscriber> Layer<S> for Levels {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            self.0.lock().unwrap().push(*event.metadata().level());
        }
    }

    #[test]
    fn routes_are_logged_at_info() {
        let levels = Levels::default();
        let subscriber = Registry::default().with(levels.clone());

        tracing::subscriber::with_default(subscriber, || log_routes(&ProxyConfig::default()));

        let seen = levels.0.lock().unwrap();
        assert_eq!(seen.len(), 9);
        assert!(seen.iter().all(|level| *level == Level::INFO));
    }
}
