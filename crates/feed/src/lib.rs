// ABOUTME: Feed normalization library for the EURAXESS gateway.
// ABOUTME: Parses RSS job feeds into JobRecord values with flexible dates and a bounded memo cache.

pub mod cache;
pub mod error;
pub mod models;
pub mod parser;
pub mod time_parse;
pub mod xml;

pub use cache::{FeedParser, DEFAULT_CACHE_CAPACITY};
pub use error::FeedError;
pub use models::{JobRecord, SOURCE_EURAXESS};
pub use parser::parse_job_feed;
pub use time_parse::parse_flexible_date;
