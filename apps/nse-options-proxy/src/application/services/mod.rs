//! Application Services
//!
//! `OptionsService` turns API-level requests (optional symbol, expiry,
//! side) into calls on the `OptionsDataPort` and shapes the results.

use std::sync::Arc;

use crate::application::ports::{OptionsDataPort, UpstreamError};
use crate::domain::expiry::ExpiryDate;
use crate::domain::option_chain::{MarketSnapshot, OptionChain, OptionRecord, OptionSide};

/// Market snapshot taken at the nearest expiry.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentMarket {
    /// Earliest listed expiry.
    pub nearest_expiry: ExpiryDate,
    /// Snapshot from that expiry's chain.
    pub market_data: MarketSnapshot,
}

/// One side of a chain with its snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct SideView {
    /// Which side.
    pub side: OptionSide,
    /// Underlying snapshot.
    pub market_data: MarketSnapshot,
    /// Traded contracts on this side.
    pub options: Vec<OptionRecord>,
}

/// Options lookups on behalf of the HTTP API.
#[derive(Clone)]
pub struct OptionsService {
    port: Arc<dyn OptionsDataPort>,
    default_symbol: String,
}

impl OptionsService {
    /// Create a new service over a data port.
    pub fn new(port: Arc<dyn OptionsDataPort>, default_symbol: impl Into<String>) -> Self {
        Self {
            port,
            default_symbol: default_symbol.into(),
        }
    }

    /// Symbol used when a request does not name one.
    #[must_use]
    pub fn default_symbol(&self) -> &str {
        &self.default_symbol
    }

    /// Resolve a requested symbol, falling back to the default when absent
    /// or blank.
    #[must_use]
    pub fn resolve_symbol(&self, requested: Option<&str>) -> String {
        requested
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(self.default_symbol.as_str())
            .to_string()
    }

    /// Unique expiry dates for a symbol, ascending.
    pub async fn expiry_dates(&self, symbol: &str) -> Result<Vec<ExpiryDate>, UpstreamError> {
        let dates = self.port.expiry_dates(symbol).await?;
        tracing::debug!(symbol, count = dates.len(), "Expiry dates fetched");
        Ok(dates)
    }

    /// Full traded chain for an expiry.
    pub async fn option_chain(
        &self,
        symbol: &str,
        expiry: &str,
    ) -> Result<OptionChain, UpstreamError> {
        let chain = self.port.option_chain(symbol, expiry).await?;
        tracing::debug!(
            symbol,
            expiry,
            total_ce = chain.total_ce,
            total_pe = chain.total_pe,
            "Option chain fetched"
        );
        Ok(chain)
    }

    /// One side of the chain for an expiry.
    pub async fn option_side(
        &self,
        symbol: &str,
        expiry: &str,
        side: OptionSide,
    ) -> Result<SideView, UpstreamError> {
        let chain = self.option_chain(symbol, expiry).await?;
        let (market_data, options) = chain.into_side(side);
        Ok(SideView {
            side,
            market_data,
            options,
        })
    }

    /// Market snapshot at the nearest expiry.
    ///
    /// Looks up the expiry list first, then fetches the chain of its
    /// earliest entry.
    pub async fn current_market(&self, symbol: &str) -> Result<CurrentMarket, UpstreamError> {
        let nearest_expiry = self
            .port
            .expiry_dates(symbol)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| UpstreamError::NoExpiryDates {
                symbol: symbol.to_string(),
            })?;

        let chain = self
            .port
            .option_chain(symbol, nearest_expiry.as_str())
            .await?;

        Ok(CurrentMarket {
            nearest_expiry,
            market_data: chain.market_data,
        })
    }
}

impl std::fmt::Debug for OptionsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptionsService")
            .field("default_symbol", &self.default_symbol)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::expiry::sort_unique;
    use crate::domain::option_chain::StrikeRow;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    // Mock data port
    struct MockPort {
        expiries: Vec<&'static str>,
        fail_chain: bool,
        chain_calls: Mutex<Vec<(String, String)>>,
    }

    impl MockPort {
        fn new(expiries: Vec<&'static str>) -> Self {
            Self {
                expiries,
                fail_chain: false,
                chain_calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl OptionsDataPort for MockPort {
        async fn expiry_dates(&self, _symbol: &str) -> Result<Vec<ExpiryDate>, UpstreamError> {
            Ok(sort_unique(&self.expiries)?)
        }

        async fn option_chain(
            &self,
            symbol: &str,
            expiry: &str,
        ) -> Result<OptionChain, UpstreamError> {
            self.chain_calls
                .lock()
                .unwrap()
                .push((symbol.to_string(), expiry.to_string()));

            if self.fail_chain {
                return Err(UpstreamError::Status {
                    status: 503,
                    url: "http://upstream/api/option-chain-v3".to_string(),
                });
            }

            let rows = vec![StrikeRow {
                strike_price: json!(20000),
                call: json!({ "lastPrice": 10 }).as_object().cloned(),
                put: json!({ "lastPrice": 4 }).as_object().cloned(),
            }];
            let snapshot = MarketSnapshot {
                underlying_value: json!(20050.0),
                ..MarketSnapshot::default()
            };
            Ok(OptionChain::from_rows(expiry, snapshot, rows))
        }
    }

    fn service(port: MockPort) -> (OptionsService, Arc<MockPort>) {
        let port = Arc::new(port);
        let dyn_port: Arc<dyn OptionsDataPort> = port.clone();
        (OptionsService::new(dyn_port, "NIFTY"), port)
    }

    #[test]
    fn resolve_symbol_defaults() {
        let (svc, _) = service(MockPort::new(vec![]));
        assert_eq!(svc.resolve_symbol(None), "NIFTY");
        assert_eq!(svc.resolve_symbol(Some("")), "NIFTY");
        assert_eq!(svc.resolve_symbol(Some("  ")), "NIFTY");
        assert_eq!(svc.resolve_symbol(Some("BANKNIFTY")), "BANKNIFTY");
        assert_eq!(svc.default_symbol(), "NIFTY");
    }

    #[tokio::test]
    async fn current_market_uses_nearest_expiry() {
        let (svc, port) = service(MockPort::new(vec![
            "10-Jul-2025",
            "27-Jun-2025",
            "03-Jul-2025",
        ]));

        let market = svc.current_market("NIFTY").await.unwrap();

        assert_eq!(market.nearest_expiry.as_str(), "27-Jun-2025");
        assert_eq!(market.market_data.underlying_value, json!(20050.0));
        assert_eq!(
            *port.chain_calls.lock().unwrap(),
            vec![("NIFTY".to_string(), "27-Jun-2025".to_string())]
        );
    }

    #[tokio::test]
    async fn current_market_without_expiries_fails() {
        let (svc, port) = service(MockPort::new(vec![]));

        let err = svc.current_market("FINNIFTY").await.unwrap_err();

        assert_eq!(
            err,
            UpstreamError::NoExpiryDates {
                symbol: "FINNIFTY".to_string()
            }
        );
        assert!(port.chain_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn option_side_selects_puts() {
        let (svc, _) = service(MockPort::new(vec![]));

        let view = svc
            .option_side("NIFTY", "27-Jun-2025", OptionSide::Put)
            .await
            .unwrap();

        assert_eq!(view.side, OptionSide::Put);
        assert_eq!(view.options.len(), 1);
        assert!(view.options.iter().all(|r| r.side == OptionSide::Put));
    }

    #[tokio::test]
    async fn chain_errors_propagate() {
        let mut port = MockPort::new(vec!["27-Jun-2025"]);
        port.fail_chain = true;
        let (svc, _) = service(port);

        let err = svc.current_market("NIFTY").await.unwrap_err();
        assert!(matches!(err, UpstreamError::Status { status: 503, .. }));

        let err = svc.option_chain("NIFTY", "27-Jun-2025").await.unwrap_err();
        assert_eq!(err.kind(), "status");
    }

    #[tokio::test]
    async fn invalid_expiry_dates_propagate() {
        let (svc, _) = service(MockPort::new(vec!["not-a-date"]));

        let err = svc.expiry_dates("NIFTY").await.unwrap_err();
        assert!(matches!(err, UpstreamError::InvalidExpiryDate(_)));
    }
}
