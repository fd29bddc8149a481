//! HTTP Handlers

use axum::Json;
use axum::extract::{FromRequestParts, Query, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::IntoResponse;

use super::error::ApiError;
use super::responses::{
    CurrentMarketResponse, ExpiryDatesResponse, OptionChainEnvelope, OptionSideEnvelope,
    ServiceInfo,
};
use crate::application::services::OptionsService;
use crate::domain::option_chain::OptionSide;
use crate::infrastructure::metrics::{get_metrics_handle, record_api_request};

/// Route paths.
pub mod routes {
    /// Service metadata.
    pub const INDEX: &str = "/";
    /// Expiry dates.
    pub const EXPIRY_DATES: &str = "/api/expiry-dates";
    /// Full option chain.
    pub const OPTION_CHAIN: &str = "/api/option-chain";
    /// Call side of the chain.
    pub const OPTION_CHAIN_CE: &str = "/api/option-chain/ce";
    /// Put side of the chain.
    pub const OPTION_CHAIN_PE: &str = "/api/option-chain/pe";
    /// Market snapshot at the nearest expiry.
    pub const CURRENT_MARKET: &str = "/api/current-market";
    /// Liveness probe.
    pub const HEALTHZ: &str = "/healthz";
    /// Prometheus metrics.
    pub const METRICS: &str = "/metrics";
}

/// Query string accepted by the API routes.
///
/// When a parameter is repeated the first occurrence wins; unknown
/// parameters are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionsQuery {
    /// Underlying symbol; the configured default when absent.
    pub symbol: Option<String>,
    /// Expiry in `DD-Mon-YYYY`.
    pub expiry: Option<String>,
}

impl OptionsQuery {
    /// Collect the known parameters from decoded query pairs.
    #[must_use]
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "symbol" => &mut query.symbol,
                "expiry" => &mut query.expiry,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        query
    }

    /// The expiry, or a parameter error naming `route`.
    fn require_expiry(&self, route: &str) -> Result<String, ApiError> {
        self.expiry
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ApiError::missing_expiry(route))
    }
}

impl<S: Send + Sync> FromRequestParts<S> for OptionsQuery {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
            .map_err(|e| ApiError::InvalidQuery {
                message: e.body_text(),
            })?;
        Ok(Self::from_pairs(pairs))
    }
}

/// Record the outcome of a handler before returning it.
fn observe<T>(route: &'static str, result: Result<T, ApiError>) -> Result<T, ApiError> {
    let status = match &result {
        Ok(_) => StatusCode::OK,
        Err(e) => e.status(),
    };
    record_api_request(route, status.as_u16());
    result
}

pub(super) async fn index_handler() -> impl IntoResponse {
    record_api_request(routes::INDEX, StatusCode::OK.as_u16());
    Json(ServiceInfo::default())
}

pub(super) async fn expiry_dates_handler(
    State(service): State<OptionsService>,
    query: OptionsQuery,
) -> Result<Json<ExpiryDatesResponse>, ApiError> {
    observe(routes::EXPIRY_DATES, expiry_dates(&service, &query).await)
}

async fn expiry_dates(
    service: &OptionsService,
    query: &OptionsQuery,
) -> Result<Json<ExpiryDatesResponse>, ApiError> {
    let symbol = service.resolve_symbol(query.symbol.as_deref());
    let dates = service.expiry_dates(&symbol).await?;
    Ok(Json(ExpiryDatesResponse::new(symbol, dates)))
}

pub(super) async fn option_chain_handler(
    State(service): State<OptionsService>,
    query: OptionsQuery,
) -> Result<Json<OptionChainEnvelope>, ApiError> {
    observe(routes::OPTION_CHAIN, option_chain(&service, &query).await)
}

async fn option_chain(
    service: &OptionsService,
    query: &OptionsQuery,
) -> Result<Json<OptionChainEnvelope>, ApiError> {
    let expiry = query.require_expiry(routes::OPTION_CHAIN)?;
    let symbol = service.resolve_symbol(query.symbol.as_deref());
    let chain = service.option_chain(&symbol, &expiry).await?;
    Ok(Json(OptionChainEnvelope::new(symbol, expiry, chain)))
}

pub(super) async fn ce_options_handler(
    State(service): State<OptionsService>,
    query: OptionsQuery,
) -> Result<Json<OptionSideEnvelope>, ApiError> {
    let result = side_options(&service, &query, OptionSide::Call, routes::OPTION_CHAIN_CE).await;
    observe(routes::OPTION_CHAIN_CE, result)
}

pub(super) async fn pe_options_handler(
    State(service): State<OptionsService>,
    query: OptionsQuery,
) -> Result<Json<OptionSideEnvelope>, ApiError> {
    let result = side_options(&service, &query, OptionSide::Put, routes::OPTION_CHAIN_PE).await;
    observe(routes::OPTION_CHAIN_PE, result)
}

async fn side_options(
    service: &OptionsService,
    query: &OptionsQuery,
    side: OptionSide,
    route: &str,
) -> Result<Json<OptionSideEnvelope>, ApiError> {
    let expiry = query.require_expiry(route)?;
    let symbol = service.resolve_symbol(query.symbol.as_deref());
    let view = service.option_side(&symbol, &expiry, side).await?;
    Ok(Json(OptionSideEnvelope::new(symbol, expiry, view)))
}

pub(super) async fn current_market_handler(
    State(service): State<OptionsService>,
    query: OptionsQuery,
) -> Result<Json<CurrentMarketResponse>, ApiError> {
    observe(routes::CURRENT_MARKET, current_market(&service, &query).await)
}

async fn current_market(
    service: &OptionsService,
    query: &OptionsQuery,
) -> Result<Json<CurrentMarketResponse>, ApiError> {
    let symbol = service.resolve_symbol(query.symbol.as_deref());
    let market = service.current_market(&symbol).await?;
    Ok(Json(CurrentMarketResponse::new(symbol, market)))
}

pub(super) async fn liveness_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub(super) async fn metrics_handler() -> impl IntoResponse {
    get_metrics_handle().map_or_else(
        || {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                [("content-type", "text/plain")],
                "Metrics not initialized".to_string(),
            )
        },
        |handle| {
            (
                StatusCode::OK,
                [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
                handle.render(),
            )
        },
    )
}
