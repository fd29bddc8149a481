//! Response Envelopes
//!
//! JSON bodies returned by the API. Every body carries `success` and a
//! generation `timestamp`.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::application::services::{CurrentMarket, SideView};
use crate::domain::expiry::ExpiryDate;
use crate::domain::option_chain::{MarketSnapshot, OptionChain, OptionRecord, OptionSide};

/// Human-readable name reported by `/`.
pub const SERVICE_NAME: &str = "NSE Options API";

/// Routes listed by `/`.
pub const ENDPOINTS: [&str; 5] = [
    "GET /api/expiry-dates?symbol=<symbol> - Get all expiry dates",
    "GET /api/option-chain?expiry=<date>&symbol=<symbol> - Get option chain for expiry",
    "GET /api/option-chain/ce?expiry=<date>&symbol=<symbol> - Get only CE options",
    "GET /api/option-chain/pe?expiry=<date>&symbol=<symbol> - Get only PE options",
    "GET /api/current-market?symbol=<symbol> - Get market data at the nearest expiry",
];

/// Body of `GET /`.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceInfo {
    /// Always "healthy".
    pub status: &'static str,
    /// Service name.
    pub service: &'static str,
    /// Crate version.
    pub version: &'static str,
    /// Route descriptions.
    pub endpoints: &'static [&'static str],
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            status: "healthy",
            service: SERVICE_NAME,
            version: env!("CARGO_PKG_VERSION"),
            endpoints: &ENDPOINTS,
        }
    }
}

/// Body of `GET /api/expiry-dates`.
#[derive(Debug, Clone, Serialize)]
pub struct ExpiryDatesResponse {
    /// Always true.
    pub success: bool,
    /// Queried symbol.
    pub symbol: String,
    /// Unique expiries, ascending.
    #[serde(rename = "expiryDates")]
    pub expiry_dates: Vec<String>,
    /// Number of expiries.
    pub count: usize,
    /// Generation time.
    pub timestamp: DateTime<Utc>,
}

impl ExpiryDatesResponse {
    /// Build the response from parsed expiries.
    #[must_use]
    pub fn new(symbol: String, dates: Vec<ExpiryDate>) -> Self {
        let expiry_dates: Vec<String> = dates.into_iter().map(ExpiryDate::into_string).collect();
        Self {
            success: true,
            symbol,
            count: expiry_dates.len(),
            expiry_dates,
            timestamp: Utc::now(),
        }
    }
}

/// Body of `GET /api/option-chain`.
#[derive(Debug, Clone, Serialize)]
pub struct OptionChainEnvelope {
    /// Always true.
    pub success: bool,
    /// Queried symbol.
    pub symbol: String,
    /// Queried expiry.
    pub expiry: String,
    /// Full chain.
    pub data: OptionChain,
    /// Generation time.
    pub timestamp: DateTime<Utc>,
}

impl OptionChainEnvelope {
    /// Wrap a chain.
    #[must_use]
    pub fn new(symbol: String, expiry: String, data: OptionChain) -> Self {
        Self {
            success: true,
            symbol,
            expiry,
            data,
            timestamp: Utc::now(),
        }
    }
}

/// Body of `GET /api/option-chain/ce` and `/pe`.
#[derive(Debug, Clone, Serialize)]
pub struct OptionSideEnvelope {
    /// Always true.
    pub success: bool,
    /// Queried symbol.
    pub symbol: String,
    /// Queried expiry.
    pub expiry: String,
    /// "CE" or "PE".
    #[serde(rename = "optionType")]
    pub option_type: OptionSide,
    /// Underlying snapshot.
    #[serde(rename = "marketData")]
    pub market_data: MarketSnapshot,
    /// Traded contracts on the side.
    pub options: Vec<OptionRecord>,
    /// Number of contracts.
    pub count: usize,
    /// Generation time.
    pub timestamp: DateTime<Utc>,
}

impl OptionSideEnvelope {
    /// Wrap a side view.
    #[must_use]
    pub fn new(symbol: String, expiry: String, view: SideView) -> Self {
        Self {
            success: true,
            symbol,
            expiry,
            option_type: view.side,
            market_data: view.market_data,
            count: view.options.len(),
            options: view.options,
            timestamp: Utc::now(),
        }
    }
}

/// Body of `GET /api/current-market`.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentMarketResponse {
    /// Always true.
    pub success: bool,
    /// Queried symbol.
    pub symbol: String,
    /// Snapshot at the nearest expiry.
    #[serde(rename = "marketData")]
    pub market_data: MarketSnapshot,
    /// Nearest expiry.
    #[serde(rename = "nearestExpiry")]
    pub nearest_expiry: String,
    /// Generation time.
    pub timestamp: DateTime<Utc>,
}

impl CurrentMarketResponse {
    /// Build the response from a market lookup.
    #[must_use]
    pub fn new(symbol: String, market: CurrentMarket) -> Self {
        Self {
            success: true,
            symbol,
            market_data: market.market_data,
            nearest_expiry: market.nearest_expiry.into_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Body of every failed request.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    /// Always false.
    pub success: bool,
    /// Error description.
    pub error: String,
    /// Example of a valid request, for parameter errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    /// Generation time.
    pub timestamp: DateTime<Utc>,
}

impl ErrorBody {
    /// Build an error body.
    #[must_use]
    pub fn new(error: String, example: Option<String>) -> Self {
        Self {
            success: false,
            error,
            example,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn service_info_lists_endpoints() {
        let value = serde_json::to_value(ServiceInfo::default()).unwrap();
        assert_eq!(value["status"], "healthy");
        assert_eq!(value["service"], SERVICE_NAME);
        assert_eq!(value["endpoints"].as_array().unwrap().len(), ENDPOINTS.len());
    }

    #[test]
    fn expiry_dates_response_counts() {
        let dates = vec![
            ExpiryDate::parse("27-Jun-2025").unwrap(),
            ExpiryDate::parse("04-Jul-2025").unwrap(),
        ];
        let value =
            serde_json::to_value(ExpiryDatesResponse::new("NIFTY".to_string(), dates)).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["expiryDates"], json!(["27-Jun-2025", "04-Jul-2025"]));
        assert_eq!(value["count"], 2);
    }

    #[test]
    fn error_body_omits_missing_example() {
        let value = serde_json::to_value(ErrorBody::new("boom".to_string(), None)).unwrap();
        assert_eq!(value["success"], false);
        assert!(value.get("example").is_none());
        assert!(value["timestamp"].is_string());
    }
}
