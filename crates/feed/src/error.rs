// ABOUTME: Error types for feed parsing operations.
// ABOUTME: Provides FeedError, raised only when the feed text is not well-formed XML.

use std::fmt;
use thiserror::Error;

/// Errors that can occur during feed parsing.
///
/// Field-level anomalies inside a well-formed document (missing title, bad date)
/// are never errors; they degrade to absent values on the record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    /// The feed text could not be tokenized or structured as XML.
    #[error("malformed feed: {0}")]
    Malformed(String),
}

impl FeedError {
    /// Creates a Malformed error from an underlying reader error.
    pub fn malformed(err: impl fmt::Display) -> Self {
        FeedError::Malformed(err.to_string())
    }

    /// Returns true if this is a Malformed error.
    pub fn is_malformed(&self) -> bool {
        matches!(self, FeedError::Malformed(_))
    }
}
