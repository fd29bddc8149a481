#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::items_after_statements
    )
)]

//! NSE Options Proxy - Option Chain REST Facade
//!
//! An HTTP service that fetches expiry dates and option chains from the NSE
//! India website and serves them back through a simplified JSON API.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Expiry dates and option chain shaping
//!   - `expiry`: `DD-Mon-YYYY` parsing, chronological ordering, dedupe
//!   - `option_chain`: Traded-contract filtering and CE/PE partitioning
//!
//! - **Application**: Use cases and port definitions
//!   - `ports`: `OptionsDataPort` and `UpstreamError`
//!   - `services`: `OptionsService` (chains, side views, current market)
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `nse`: Browser-like session bootstrap and API client
//!   - `http`: axum router, handlers and response envelopes
//!   - `config`: Configuration from environment variables
//!   - `metrics`, `telemetry`: Prometheus metrics, tracing
//!
//! # Data Flow
//!
//! ```text
//! Client ──► axum router ──► OptionsService ──► NseClient ──► NSE website
//!                                                  │
//!                                      (per-call NseSession:
//!                                       homepage, option-chain page,
//!                                       then one JSON API request)
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Expiry and option chain types with no I/O.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::expiry::{ExpiryDate, ExpiryDateError};
pub use domain::option_chain::{MarketSnapshot, OptionChain, OptionRecord, OptionSide};

// Application
pub use application::ports::{OptionsDataPort, UpstreamError};
pub use application::services::{CurrentMarket, OptionsService, SideView};

// Infrastructure config
pub use infrastructure::config::{ConfigError, ProxyConfig, ServerSettings, UpstreamSettings};

// HTTP API
pub use infrastructure::http::{ApiError, ApiServer, ApiServerError, create_router};

// NSE adapter
pub use infrastructure::nse::{NseClient, NseClientConfig};

// Metrics
pub use infrastructure::metrics::init_metrics;

// Telemetry
pub use infrastructure::telemetry::{TelemetryConfig, TelemetryGuard, init as init_telemetry};
