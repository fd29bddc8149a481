//! API Errors
//!
//! Maps request validation and upstream failures onto HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use super::responses::ErrorBody;
use crate::application::ports::UpstreamError;

/// Example expiry used in parameter error hints.
pub const EXAMPLE_EXPIRY: &str = "27-Jun-2025";

/// Errors returned by API handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A required query parameter is absent or blank.
    #[error("{name} parameter is required")]
    MissingParameter {
        /// Parameter name.
        name: &'static str,
        /// Example of a valid request.
        example: String,
    },

    /// The query string could not be decoded.
    #[error("invalid query string: {message}")]
    InvalidQuery {
        /// Decoder message.
        message: String,
    },

    /// Fetching or transforming upstream data failed.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl ApiError {
    /// Missing `expiry` on the given route.
    #[must_use]
    pub fn missing_expiry(route: &str) -> Self {
        Self::MissingParameter {
            name: "expiry",
            example: format!("{route}?expiry={EXAMPLE_EXPIRY}"),
        }
    }

    /// HTTP status for the error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingParameter { .. } | Self::InvalidQuery { .. } => StatusCode::BAD_REQUEST,
            Self::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        let body = match self {
            Self::MissingParameter { name, example } => {
                tracing::warn!(parameter = name, "Rejected request without required parameter");
                ErrorBody::new(message, Some(example))
            }
            Self::InvalidQuery { message: detail } => {
                tracing::warn!(error = %detail, "Rejected request with undecodable query");
                ErrorBody::new(message, None)
            }
            Self::Upstream(e) => {
                tracing::error!(error = %e, kind = e.kind(), "Request failed");
                ErrorBody::new(message, None)
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_expiry_is_bad_request() {
        let err = ApiError::missing_expiry("/api/option-chain/ce");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "expiry parameter is required");
        let ApiError::MissingParameter { example, .. } = err else {
            panic!("expected MissingParameter");
        };
        assert_eq!(example, "/api/option-chain/ce?expiry=27-Jun-2025");
    }

    #[test]
    fn invalid_query_is_bad_request() {
        let err = ApiError::InvalidQuery {
            message: "bad escape".to_string(),
        };
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "invalid query string: bad escape");
    }

    #[test]
    fn upstream_error_is_internal() {
        let err = ApiError::from(UpstreamError::NoExpiryDates {
            symbol: "NIFTY".to_string(),
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "No expiry dates available for NIFTY");
    }
}
