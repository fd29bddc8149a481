//! Browser-like NSE session.
//!
//! NSE's JSON APIs reject requests that do not carry the cookies set by its
//! HTML pages. A session therefore starts by visiting the site root and the
//! option chain page with browser headers, letting the cookie store collect
//! whatever the server issues, before any API call is made.

use std::time::{Duration, Instant};

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, REFERER, USER_AGENT};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::application::ports::UpstreamError;
use crate::infrastructure::metrics::{self, UpstreamEndpoint};

/// User agent presented to NSE.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Path of the option chain HTML page.
pub const OPTION_CHAIN_PAGE_PATH: &str = "/option-chain";

/// An HTTP client holding NSE session cookies.
///
/// Dropping the session discards its cookies.
#[derive(Debug)]
pub struct NseSession {
    client: Client,
    base_url: String,
    opened_at: Instant,
}

impl NseSession {
    /// Open a session: build the client and collect cookies from the site
    /// root and the option chain page.
    ///
    /// Only transport failures abort the bootstrap; the navigation responses
    /// are not inspected.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamError::Client` if the client cannot be built and
    /// `UpstreamError::Network` if either navigation fails.
    pub async fn bootstrap(base_url: &str, timeout: Duration) -> Result<Self, UpstreamError> {
        let result = Self::bootstrap_inner(base_url, timeout).await;
        metrics::record_session(result.is_ok());
        if let Err(e) = &result {
            tracing::warn!(error = %e, base_url, "NSE session bootstrap failed");
        }
        result
    }

    async fn bootstrap_inner(base_url: &str, timeout: Duration) -> Result<Self, UpstreamError> {
        let base_url = base_url.trim_end_matches('/').to_string();

        let client = Client::builder()
            .default_headers(browser_headers(&base_url)?)
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .map_err(|e| UpstreamError::Client {
                message: e.to_string(),
            })?;

        let session = Self {
            client,
            base_url,
            opened_at: Instant::now(),
        };

        session.navigate("/", UpstreamEndpoint::Homepage).await?;
        session
            .navigate(OPTION_CHAIN_PAGE_PATH, UpstreamEndpoint::OptionChainPage)
            .await?;

        tracing::debug!(base_url = %session.base_url, "NSE session opened");
        Ok(session)
    }

    /// GET a JSON API path and deserialize the body.
    ///
    /// # Errors
    ///
    /// Returns `Network` on transport failure, `Status` on a non-success
    /// status, and `JsonParse` if the body is not the expected JSON.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        endpoint: UpstreamEndpoint,
    ) -> Result<T, UpstreamError> {
        let url = self.url(path);
        let started = Instant::now();

        let outcome = self.fetch_json(&url, query).await;

        let label = match &outcome {
            Ok(_) => "ok",
            Err(e) => e.kind(),
        };
        metrics::record_upstream_request(endpoint, label, started.elapsed());
        tracing::debug!(
            url = %url,
            endpoint = endpoint.as_str(),
            outcome = label,
            elapsed_ms = started.elapsed().as_millis(),
            "NSE API request finished"
        );

        outcome
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, UpstreamError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(network_error)?;

        let response = ensure_success(response)?;

        let text = response.text().await.map_err(network_error)?;
        serde_json::from_str(&text).map_err(|e| UpstreamError::JsonParse {
            message: e.to_string(),
        })
    }

    async fn navigate(&self, path: &str, endpoint: UpstreamEndpoint) -> Result<(), UpstreamError> {
        let url = self.url(path);
        let started = Instant::now();

        let result = match self.client.get(&url).send().await {
            Ok(response) => {
                tracing::trace!(url = %url, status = response.status().as_u16(), "Navigated");
                // Drain the body so cookies set late in the response are kept.
                response.bytes().await.map(|_| ()).map_err(network_error)
            }
            Err(e) => Err(network_error(e)),
        };

        let label = if result.is_ok() { "ok" } else { "network" };
        metrics::record_upstream_request(endpoint, label, started.elapsed());
        result
    }

    fn url(&self, path: &str) -> String {
        if path == "/" {
            format!("{}/", self.base_url)
        } else {
            format!("{}{path}", self.base_url)
        }
    }
}

impl Drop for NseSession {
    fn drop(&mut self) {
        tracing::debug!(
            base_url = %self.base_url,
            lifetime_ms = self.opened_at.elapsed().as_millis(),
            "NSE session closed"
        );
    }
}

/// Headers impersonating a desktop browser.
fn browser_headers(base_url: &str) -> Result<HeaderMap, UpstreamError> {
    let referer = format!("{base_url}{OPTION_CHAIN_PAGE_PATH}");
    let referer = HeaderValue::from_str(&referer).map_err(|e| UpstreamError::Client {
        message: format!("invalid referer '{referer}': {e}"),
    })?;

    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(REFERER, referer);
    Ok(headers)
}

fn ensure_success(response: Response) -> Result<Response, UpstreamError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    Err(UpstreamError::Status {
        status: status.as_u16(),
        url: response.url().to_string(),
    })
}

fn network_error(e: reqwest::Error) -> UpstreamError {
    UpstreamError::Network {
        message: e.to_string(),
    }
}
