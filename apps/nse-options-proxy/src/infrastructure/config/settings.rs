//! Proxy Configuration Settings
//!
//! Configuration types for the options proxy, loaded from environment variables.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Default NSE website base URL.
pub const DEFAULT_BASE_URL: &str = "https://www.nseindia.com";

/// Default underlying symbol.
pub const DEFAULT_SYMBOL: &str = "NIFTY";

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    /// Bind address.
    pub host: IpAddr,
    /// Bind port.
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: 5000,
        }
    }
}

impl ServerSettings {
    /// Socket address to bind.
    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Upstream (NSE website) settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamSettings {
    /// Base URL of the NSE website, without trailing slash.
    pub base_url: String,
    /// Symbol used when a request omits one.
    pub default_symbol: String,
    /// Timeout applied to every upstream HTTP request.
    pub request_timeout: Duration,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            default_symbol: DEFAULT_SYMBOL.to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Complete proxy configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyConfig {
    /// HTTP listener settings.
    pub server: ServerSettings,
    /// Upstream settings.
    pub upstream: UpstreamSettings,
}

impl ProxyConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to a value that cannot be used.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup.
    ///
    /// Unset keys fall back to defaults; set keys must be valid.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for unparsable or empty values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_defaults = ServerSettings::default();
        let upstream_defaults = UpstreamSettings::default();

        let server = ServerSettings {
            host: parse_var(&lookup, "NSE_PROXY_HOST")?.unwrap_or(server_defaults.host),
            port: parse_var(&lookup, "NSE_PROXY_PORT")?.unwrap_or(server_defaults.port),
        };

        let base_url = match lookup("NSE_BASE_URL") {
            Some(url) => non_empty("NSE_BASE_URL", &url)?
                .trim_end_matches('/')
                .to_string(),
            None => upstream_defaults.base_url,
        };

        let default_symbol = match lookup("NSE_DEFAULT_SYMBOL") {
            Some(symbol) => non_empty("NSE_DEFAULT_SYMBOL", &symbol)?.to_string(),
            None => upstream_defaults.default_symbol,
        };

        let request_timeout = match parse_var::<u64, _>(&lookup, "NSE_REQUEST_TIMEOUT_SECS")? {
            Some(0) => {
                return Err(ConfigError::InvalidValue {
                    key: "NSE_REQUEST_TIMEOUT_SECS".to_string(),
                    value: "0".to_string(),
                });
            }
            Some(secs) => Duration::from_secs(secs),
            None => upstream_defaults.request_timeout,
        };

        Ok(Self {
            server,
            upstream: UpstreamSettings {
                base_url,
                default_symbol,
                request_timeout,
            },
        })
    }
}

/// Configuration error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Environment variable holds an unusable value.
    #[error("invalid value for environment variable {key}: '{value}'")]
    InvalidValue {
        /// Variable name.
        key: String,
        /// Offending value.
        value: String,
    },
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw.clone(),
            })
        })
        .transpose()
}

fn non_empty<'a>(key: &str, value: &'a str) -> Result<&'a str, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        });
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ProxyConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ProxyConfig::default());
        assert_eq!(config.server.addr().to_string(), "0.0.0.0:5000");
        assert_eq!(config.upstream.base_url, "https://www.nseindia.com");
        assert_eq!(config.upstream.default_symbol, "NIFTY");
        assert_eq!(config.upstream.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn overrides_are_applied() {
        let config = ProxyConfig::from_lookup(lookup(&[
            ("NSE_PROXY_HOST", "127.0.0.1"),
            ("NSE_PROXY_PORT", "8080"),
            ("NSE_BASE_URL", "http://localhost:9999/"),
            ("NSE_DEFAULT_SYMBOL", "BANKNIFTY"),
            ("NSE_REQUEST_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.server.addr().to_string(), "127.0.0.1:8080");
        assert_eq!(config.upstream.base_url, "http://localhost:9999");
        assert_eq!(config.upstream.default_symbol, "BANKNIFTY");
        assert_eq!(config.upstream.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = ProxyConfig::from_lookup(lookup(&[("NSE_PROXY_PORT", "http")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: "NSE_PROXY_PORT".to_string(),
                value: "http".to_string(),
            }
        );
    }

    #[test]
    fn empty_base_url_is_rejected() {
        let err = ProxyConfig::from_lookup(lookup(&[("NSE_BASE_URL", "  ")])).unwrap_err();
        assert!(err.to_string().contains("NSE_BASE_URL"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err =
            ProxyConfig::from_lookup(lookup(&[("NSE_REQUEST_TIMEOUT_SECS", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
