// ABOUTME: Error types for upstream fetches including ErrorKind and UpstreamFetchError.
// ABOUTME: Provides categorized errors with convenience constructors and boolean helpers.

use std::fmt;

use crate::resource::BlockedRedirect;

/// Categories of upstream fetch failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidUrl,
    Connect,
    Timeout,
    Status,
    Body,
    Blocked,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::InvalidUrl => "invalid URL",
            ErrorKind::Connect => "connection error",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Status => "unexpected status",
            ErrorKind::Body => "body error",
            ErrorKind::Blocked => "private network blocked",
        };
        write!(f, "{}", s)
    }
}

/// Failure reaching an upstream URL (the feed or a job page).
#[derive(Debug, thiserror::Error)]
pub struct UpstreamFetchError {
    pub kind: ErrorKind,
    pub url: String,
    pub op: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for UpstreamFetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "upstream: {} {}: {}", self.op, self.url, self.kind)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl UpstreamFetchError {
    fn new(
        kind: ErrorKind,
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            kind,
            url: url.into(),
            op: op.into(),
            source,
        }
    }

    /// Create an InvalidUrl error.
    pub fn invalid_url(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorKind::InvalidUrl, url, op, source)
    }

    /// Create a Connect error.
    pub fn connect(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorKind::Connect, url, op, source)
    }

    /// Create a Timeout error.
    pub fn timeout(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorKind::Timeout, url, op, source)
    }

    /// Create a Status error for a non-success response.
    pub fn status(url: impl Into<String>, op: impl Into<String>, status: u16) -> Self {
        Self::new(
            ErrorKind::Status,
            url,
            op,
            Some(anyhow::anyhow!("HTTP status {}", status)),
        )
    }

    /// Create a Body error.
    pub fn body(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorKind::Body, url, op, source)
    }

    /// Create a Blocked error for a private-network destination.
    pub fn blocked(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorKind::Blocked, url, op, source)
    }

    /// Classifies a reqwest send/read error.
    pub fn from_reqwest(url: impl Into<String>, op: impl Into<String>, err: reqwest::Error) -> Self {
        let kind = if is_blocked_redirect(&err) {
            ErrorKind::Blocked
        } else if err.is_timeout() {
            ErrorKind::Timeout
        } else if err.is_body() || err.is_decode() {
            ErrorKind::Body
        } else {
            ErrorKind::Connect
        };
        Self::new(kind, url, op, Some(anyhow::Error::new(err)))
    }

    /// Returns true if this is an InvalidUrl error.
    pub fn is_invalid_url(&self) -> bool {
        self.kind == ErrorKind::InvalidUrl
    }

    /// Returns true if this is a Connect error.
    pub fn is_connect(&self) -> bool {
        self.kind == ErrorKind::Connect
    }

    /// Returns true if this is a Timeout error.
    pub fn is_timeout(&self) -> bool {
        self.kind == ErrorKind::Timeout
    }

    /// Returns true if this is a Status error.
    pub fn is_status(&self) -> bool {
        self.kind == ErrorKind::Status
    }

    /// Returns true if this is a Body error.
    pub fn is_body(&self) -> bool {
        self.kind == ErrorKind::Body
    }

    /// Returns true if this is a Blocked error.
    pub fn is_blocked(&self) -> bool {
        self.kind == ErrorKind::Blocked
    }
}

/// True when a redirect policy refused a hop to a private address.
fn is_blocked_redirect(err: &reqwest::Error) -> bool {
    if !err.is_redirect() {
        return false;
    }
    let mut source = std::error::Error::source(err);
    while let Some(inner) = source {
        if inner.is::<BlockedRedirect>() {
            return true;
        }
        source = inner.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_cause() {
        let err = UpstreamFetchError::status("https://example.com/feed", "FetchFeed", 503);
        assert_eq!(
            err.to_string(),
            "upstream: FetchFeed https://example.com/feed: unexpected status: HTTP status 503"
        );
        assert!(err.is_status());
    }

    #[test]
    fn test_display_without_cause() {
        let err = UpstreamFetchError::invalid_url("", "FetchPage", None);
        assert_eq!(err.to_string(), "upstream: FetchPage : invalid URL");
        assert!(err.is_invalid_url());
        assert!(!err.is_timeout());
    }
}
