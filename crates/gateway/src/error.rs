// ABOUTME: Gateway error type and its mapping onto HTTP responses.
// ABOUTME: Validation errors become 422, upstream and malformed-feed errors become 502 with a generic detail.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use euraxess_feed::FeedError;
use euraxess_fetch::UpstreamFetchError;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Which upstream call a fetch failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    Feed,
    Page,
}

impl Upstream {
    fn detail(self) -> &'static str {
        match self {
            Upstream::Feed => "Failed to fetch euraxess feed",
            Upstream::Page => "Failed to fetch job URL",
        }
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    /// A request parameter was missing or out of range.
    #[error("{0}")]
    Validation(String),

    #[error("{}", .upstream.detail())]
    Upstream {
        upstream: Upstream,
        #[source]
        source: UpstreamFetchError,
    },

    #[error("Failed to parse euraxess feed")]
    MalformedFeed(#[from] FeedError),
}

impl GatewayError {
    pub fn validation(msg: impl Into<String>) -> Self {
        GatewayError::Validation(msg.into())
    }

    pub fn feed(source: UpstreamFetchError) -> Self {
        GatewayError::Upstream {
            upstream: Upstream::Feed,
            source,
        }
    }

    pub fn page(source: UpstreamFetchError) -> Self {
        GatewayError::Upstream {
            upstream: Upstream::Page,
            source,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            GatewayError::Upstream { .. } | GatewayError::MalformedFeed(_) => {
                StatusCode::BAD_GATEWAY
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        // Causes stay in the log; clients only see the generic detail.
        match &self {
            GatewayError::Validation(msg) => debug!("rejected request: {}", msg),
            GatewayError::Upstream {
                upstream: Upstream::Feed,
                source,
            } => error!(url = %source.url, kind = %source.kind, "feed fetch failed: {}", source),
            GatewayError::Upstream {
                upstream: Upstream::Page,
                source,
            } => warn!(url = %source.url, kind = %source.kind, "page fetch failed: {}", source),
            GatewayError::MalformedFeed(err) => error!("feed parse failed: {}", err),
        }

        let body = ErrorBody {
            detail: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            GatewayError::validation("limit must be between 1 and 500").status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            GatewayError::feed(UpstreamFetchError::timeout("http://feed", "FetchFeed", None)).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            GatewayError::from(FeedError::malformed("unclosed tag")).status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_upstream_detail_hides_cause() {
        let err = GatewayError::page(UpstreamFetchError::timeout("http://job", "FetchPage", None));
        assert_eq!(err.to_string(), "Failed to fetch job URL");

        let err = GatewayError::feed(UpstreamFetchError::timeout("http://feed", "FetchFeed", None));
        assert_eq!(err.to_string(), "Failed to fetch euraxess feed");
    }

    #[test]
    fn test_validation_detail_is_message() {
        let err = GatewayError::validation("url query parameter is required");
        assert_eq!(err.to_string(), "url query parameter is required");
    }
}
