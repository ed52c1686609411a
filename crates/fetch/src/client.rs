// ABOUTME: The Client struct that performs upstream fetches for the gateway.
// ABOUTME: Provides fetch_feed (strict, text only) and fetch_page (pass-through status, headers, body).

use std::collections::BTreeMap;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING};
use tracing::{debug, info};

use crate::error::UpstreamFetchError;
use crate::options::{ClientBuilder, Options};
use crate::resource::{fetch, redirect_policy, FetchOptions};
use crate::TARGET_WEB_REQUEST;

/// An upstream page as returned by the server, unmodified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResponse {
    /// The URL that was requested.
    pub url: String,
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

/// HTTP client for the feed and job-detail pages.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct Client {
    opts: Options,
    http_client: reqwest::Client,
    page_client: reqwest::Client,
}

impl Client {
    /// Create a new ClientBuilder for configuring the client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a new Client with the given options.
    ///
    /// Pages go through a second client that leaves compressed bodies alone, so
    /// their `Content-Encoding` and `Content-Length` headers reach the caller.
    /// A custom `http_client` is used for both.
    pub fn new(opts: Options) -> Self {
        let http_client = opts.http_client.clone().unwrap_or_else(|| {
            reqwest::Client::builder()
                .redirect(redirect_policy(true))
                .user_agent(&opts.user_agent)
                .timeout(opts.timeout)
                .gzip(true)
                .brotli(true)
                .deflate(true)
                .build()
                .expect("failed to build HTTP client")
        });

        let page_client = opts.http_client.clone().unwrap_or_else(|| {
            let mut accept = HeaderMap::new();
            accept.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip, deflate, br"));
            reqwest::Client::builder()
                .redirect(redirect_policy(opts.allow_private_networks))
                .user_agent(&opts.user_agent)
                .timeout(opts.timeout)
                .default_headers(accept)
                .gzip(false)
                .brotli(false)
                .deflate(false)
                .build()
                .expect("failed to build HTTP client")
        });

        Self {
            opts,
            http_client,
            page_client,
        }
    }

    /// Options this client was built with.
    pub fn options(&self) -> &Options {
        &self.opts
    }

    /// Fetch the feed document at `url` as text.
    ///
    /// Any transport failure, timeout, or non-2xx status is an error. The feed URL
    /// is operator configuration, so the private-network guard does not apply.
    pub async fn fetch_feed(&self, url: &str) -> Result<String, UpstreamFetchError> {
        let fetch_opts = FetchOptions {
            headers: self.opts.headers.clone(),
            allow_private_networks: true,
            accept_non_success: false,
            decode_content_encoding: false,
        };

        let result = fetch(&self.http_client, url, "FetchFeed", &fetch_opts).await?;
        let text = result.text();
        info!(target: TARGET_WEB_REQUEST, "Fetched feed {} ({} bytes)", url, result.body.len());
        Ok(text)
    }

    /// Fetch a job-detail page at `url`.
    ///
    /// The upstream status is forwarded as-is, including 4xx and 5xx; only
    /// transport failures, timeouts, and refused destinations are errors.
    pub async fn fetch_page(&self, url: &str) -> Result<PageResponse, UpstreamFetchError> {
        let fetch_opts = FetchOptions {
            headers: self.opts.headers.clone(),
            allow_private_networks: self.opts.allow_private_networks,
            accept_non_success: true,
            decode_content_encoding: self.opts.http_client.is_none(),
        };

        let result = fetch(&self.page_client, url, "FetchPage", &fetch_opts).await?;
        debug!(target: TARGET_WEB_REQUEST, "Fetched page {} with status {}", url, result.status);

        Ok(PageResponse {
            url: result.url.clone(),
            status_code: result.status,
            body: result.text(),
            headers: result.headers,
        })
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new(Options::default())
    }
}
