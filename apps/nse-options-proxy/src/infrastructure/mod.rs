//! Infrastructure Layer - Adapters and external integrations.
//!
//! This layer contains the concrete implementations of the port interfaces
//! defined in the application layer.

/// Configuration loaded from the environment.
pub mod config;

/// HTTP API server (axum router, handlers, responses).
pub mod http;

/// Prometheus metrics instrumentation.
pub mod metrics;

/// NSE website adapter (session bootstrap, API client).
pub mod nse;

/// Logging and OpenTelemetry tracing integration.
pub mod telemetry;
