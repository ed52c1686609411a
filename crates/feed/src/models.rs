// ABOUTME: Normalized record model produced from feed items.
// ABOUTME: JobRecord is the flat, serializable shape served by the gateway.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Source label stamped on every record built from the EURAXESS feed.
pub const SOURCE_EURAXESS: &str = "euraxess";

/// One normalized feed entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub source: String,
    pub source_ref: Option<String>,
    pub url: Option<String>,
    pub title: Option<String>,
    pub description_raw: String,
    /// Serialized as an ISO-8601 calendar date (`2024-01-15`).
    pub posted_date: Option<NaiveDate>,
    /// The item exactly as it appeared in the feed, as a generic field mapping.
    pub raw: Map<String, Value>,
}
