// ABOUTME: Upstream HTTP access for the EURAXESS gateway.
// ABOUTME: Re-exports the public API: Client, ClientBuilder, Options, PageResponse, UpstreamFetchError, ErrorKind.

//! Fetches the job feed and job-detail pages with a fixed timeout and user agent.
//!
//! # Example
//!
//! ```no_run
//! use euraxess_fetch::{Client, UpstreamFetchError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), UpstreamFetchError> {
//!     let client = Client::builder().build();
//!     let feed = client.fetch_feed("https://euraxess.ec.europa.eu/job-feed").await?;
//!     println!("{} bytes", feed.len());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod options;
pub mod resource;

pub use crate::client::{Client, PageResponse};
pub use crate::error::{ErrorKind, UpstreamFetchError};
pub use crate::options::{ClientBuilder, Options, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};

/// Tracing target for outbound HTTP traffic.
pub const TARGET_WEB_REQUEST: &str = "web_request";
