//! NSE Website Client
//!
//! Implements `OptionsDataPort` against the NSE website. Every call opens a
//! fresh `NseSession`, issues one API request and drops the session.

use std::time::Duration;

use async_trait::async_trait;

use super::api_types::{ContractInfoResponse, OptionChainResponse};
use super::session::NseSession;
use crate::application::ports::{OptionsDataPort, UpstreamError};
use crate::domain::expiry::{self, ExpiryDate};
use crate::domain::option_chain::{MarketSnapshot, OptionChain};
use crate::infrastructure::config::UpstreamSettings;
use crate::infrastructure::metrics::UpstreamEndpoint;

/// Contract info API path.
pub const CONTRACT_INFO_PATH: &str = "/api/option-chain-contract-info";

/// Option chain API path.
pub const OPTION_CHAIN_PATH: &str = "/api/option-chain-v3";

/// Instrument type sent with every chain request.
const INSTRUMENT_TYPE: &str = "Indices";

/// Configuration for the NSE client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NseClientConfig {
    /// Base URL of the NSE website.
    pub base_url: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl Default for NseClientConfig {
    fn default() -> Self {
        Self::from(&UpstreamSettings::default())
    }
}

impl From<&UpstreamSettings> for NseClientConfig {
    fn from(settings: &UpstreamSettings) -> Self {
        Self {
            base_url: settings.base_url.clone(),
            request_timeout: settings.request_timeout,
        }
    }
}

/// Client for the NSE option chain APIs.
#[derive(Debug, Clone)]
pub struct NseClient {
    config: NseClientConfig,
}

impl NseClient {
    /// Create a new client.
    #[must_use]
    pub const fn new(config: NseClientConfig) -> Self {
        Self { config }
    }

    async fn open_session(&self) -> Result<NseSession, UpstreamError> {
        NseSession::bootstrap(&self.config.base_url, self.config.request_timeout).await
    }

    async fn fetch_expiry_dates(&self, symbol: &str) -> Result<Vec<ExpiryDate>, UpstreamError> {
        let session = self.open_session().await?;
        let info: ContractInfoResponse = session
            .get_json(
                CONTRACT_INFO_PATH,
                &[("symbol", symbol)],
                UpstreamEndpoint::ContractInfo,
            )
            .await?;
        drop(session);

        let listed = info.expiry_dates.len();
        let dates = expiry::sort_unique(info.expiry_dates)?;
        tracing::debug!(symbol, listed, unique = dates.len(), "Parsed expiry dates");
        Ok(dates)
    }

    async fn fetch_option_chain(
        &self,
        symbol: &str,
        expiry: &str,
    ) -> Result<OptionChain, UpstreamError> {
        let session = self.open_session().await?;
        let response: OptionChainResponse = session
            .get_json(
                OPTION_CHAIN_PATH,
                &[
                    ("type", INSTRUMENT_TYPE),
                    ("symbol", symbol),
                    ("expiry", expiry),
                ],
                UpstreamEndpoint::OptionChain,
            )
            .await?;
        drop(session);

        let Some(records) = response.records else {
            tracing::warn!(symbol, expiry, "Option chain response has no records");
            return Ok(OptionChain::from_rows(
                expiry,
                MarketSnapshot::default(),
                Vec::new(),
            ));
        };

        let (snapshot, rows) = records.into_parts();
        Ok(OptionChain::from_rows(expiry, snapshot, rows))
    }
}

#[async_trait]
impl OptionsDataPort for NseClient {
    async fn expiry_dates(&self, symbol: &str) -> Result<Vec<ExpiryDate>, UpstreamError> {
        self.fetch_expiry_dates(symbol).await.inspect_err(|e| {
            tracing::error!(symbol, error = %e, "Failed to fetch expiry dates");
        })
    }

    async fn option_chain(
        &self,
        symbol: &str,
        expiry: &str,
    ) -> Result<OptionChain, UpstreamError> {
        self.fetch_option_chain(symbol, expiry)
            .await
            .inspect_err(|e| {
                tracing::error!(symbol, expiry, error = %e, "Failed to fetch option chain");
            })
    }
}
