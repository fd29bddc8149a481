//! Port Interfaces
//!
//! Defines the interfaces (ports) for external systems following
//! the Hexagonal Architecture pattern.
//!
//! ## Driven Ports (Outbound)
//!
//! - `OptionsDataPort`: source of expiry dates and option chains
//!   (implemented by the NSE website client)

use async_trait::async_trait;

use crate::domain::expiry::{ExpiryDate, ExpiryDateError};
use crate::domain::option_chain::OptionChain;

/// Errors raised while retrieving or transforming upstream data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpstreamError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {message}")]
    Client {
        /// Error details.
        message: String,
    },

    /// Transport-level failure (DNS, TLS, connection reset, timeout).
    #[error("network error: {message}")]
    Network {
        /// Error details.
        message: String,
    },

    /// Upstream answered with a non-success status.
    #[error("upstream returned HTTP {status} for {url}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// Response body was not the expected JSON.
    #[error("invalid upstream JSON: {message}")]
    JsonParse {
        /// Error details.
        message: String,
    },

    /// An expiry date did not match `DD-Mon-YYYY`.
    #[error(transparent)]
    InvalidExpiryDate(#[from] ExpiryDateError),

    /// The upstream listed no expiries for the symbol.
    #[error("No expiry dates available for {symbol}")]
    NoExpiryDates {
        /// Symbol that was queried.
        symbol: String,
    },
}

impl UpstreamError {
    /// Short label for metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Client { .. } => "client",
            Self::Network { .. } => "network",
            Self::Status { .. } => "status",
            Self::JsonParse { .. } => "json",
            Self::InvalidExpiryDate(_) => "expiry_date",
            Self::NoExpiryDates { .. } => "no_expiry_dates",
        }
    }
}

/// Port for fetching options data from the upstream provider.
///
/// Implementations must not share session state between calls: every call
/// establishes and releases its own upstream session.
#[async_trait]
pub trait OptionsDataPort: Send + Sync {
    /// Unique expiry dates for a symbol, ascending.
    async fn expiry_dates(&self, symbol: &str) -> Result<Vec<ExpiryDate>, UpstreamError>;

    /// Traded option chain for a symbol and expiry.
    async fn option_chain(&self, symbol: &str, expiry: &str)
    -> Result<OptionChain, UpstreamError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_error_messages() {
        let err = UpstreamError::Status {
            status: 401,
            url: "https://www.nseindia.com/api/option-chain-v3".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "upstream returned HTTP 401 for https://www.nseindia.com/api/option-chain-v3"
        );

        let err = UpstreamError::NoExpiryDates {
            symbol: "NIFTY".to_string(),
        };
        assert!(err.to_string().starts_with("No expiry dates available"));
    }

    #[test]
    fn expiry_error_is_transparent() {
        let inner = ExpiryDateError::InvalidFormat {
            value: "bad".to_string(),
            reason: "input contains invalid characters".to_string(),
        };
        let err = UpstreamError::from(inner.clone());
        assert_eq!(err.to_string(), inner.to_string());
        assert_eq!(err.kind(), "expiry_date");
    }
}
