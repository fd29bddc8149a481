//! Prometheus Metrics Module
//!
//! Exposes application metrics via Prometheus format for monitoring.
//!
//! # Metrics Categories
//!
//! - **API**: Requests served per route and status
//! - **Upstream**: NSE requests per endpoint and outcome, with latency
//! - **Sessions**: Session bootstrap successes and failures
//!
//! # Integration
//!
//! Metrics are exposed at `/metrics` on the API server port.

use std::sync::OnceLock;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

// =============================================================================
// Global Metrics Handle
// =============================================================================

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the Prometheus metrics recorder.
///
/// Subsequent calls return the handle installed by the first one.
///
/// # Errors
///
/// Returns `BuildError` if another global recorder is already installed.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    if let Some(handle) = PROMETHEUS_HANDLE.get() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    register_metrics();
    Ok(PROMETHEUS_HANDLE.get_or_init(|| handle).clone())
}

/// Get the Prometheus handle for rendering metrics.
///
/// Returns `None` if metrics have not been initialized.
#[must_use]
pub fn get_metrics_handle() -> Option<PrometheusHandle> {
    PROMETHEUS_HANDLE.get().cloned()
}

// =============================================================================
// Metric Registration
// =============================================================================

fn register_metrics() {
    describe_counter!(
        "nse_proxy_api_requests_total",
        "Total API requests served by route and status"
    );
    describe_counter!(
        "nse_proxy_upstream_requests_total",
        "Total requests sent to NSE by endpoint and outcome"
    );
    describe_histogram!(
        "nse_proxy_upstream_request_seconds",
        "Latency of requests sent to NSE"
    );
    describe_counter!(
        "nse_proxy_sessions_total",
        "Total NSE session bootstraps by outcome"
    );
}

// =============================================================================
// Metric Recording Functions
// =============================================================================

/// Upstream endpoints hit by the proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamEndpoint {
    /// Site root page (cookie bootstrap).
    Homepage,
    /// Option chain HTML page (cookie bootstrap).
    OptionChainPage,
    /// Contract info API (expiry dates).
    ContractInfo,
    /// Option chain API.
    OptionChain,
}

impl UpstreamEndpoint {
    /// Metric label for the endpoint.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Homepage => "homepage",
            Self::OptionChainPage => "option_chain_page",
            Self::ContractInfo => "contract_info",
            Self::OptionChain => "option_chain",
        }
    }
}

/// Record an API request.
pub fn record_api_request(route: &'static str, status: u16) {
    counter!(
        "nse_proxy_api_requests_total",
        "route" => route,
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record a request to the upstream.
pub fn record_upstream_request(endpoint: UpstreamEndpoint, outcome: &'static str, duration: Duration) {
    counter!(
        "nse_proxy_upstream_requests_total",
        "endpoint" => endpoint.as_str(),
        "outcome" => outcome
    )
    .increment(1);
    histogram!(
        "nse_proxy_upstream_request_seconds",
        "endpoint" => endpoint.as_str()
    )
    .record(duration.as_secs_f64());
}

/// Record a session bootstrap attempt.
pub fn record_session(success: bool) {
    counter!(
        "nse_proxy_sessions_total",
        "outcome" => if success { "ok" } else { "error" }
    )
    .increment(1);
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_endpoint_as_str() {
        assert_eq!(UpstreamEndpoint::Homepage.as_str(), "homepage");
        assert_eq!(
            UpstreamEndpoint::OptionChainPage.as_str(),
            "option_chain_page"
        );
        assert_eq!(UpstreamEndpoint::ContractInfo.as_str(), "contract_info");
        assert_eq!(UpstreamEndpoint::OptionChain.as_str(), "option_chain");
    }

    #[test]
    fn recording_without_recorder_is_noop() {
        record_api_request("/api/expiry-dates", 200);
        record_upstream_request(
            UpstreamEndpoint::ContractInfo,
            "ok",
            Duration::from_millis(5),
        );
        record_session(false);
    }
}
