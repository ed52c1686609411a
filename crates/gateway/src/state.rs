// ABOUTME: Shared application state handed to every axum handler.
// ABOUTME: Holds the upstream client, the memoizing feed parser, and listing defaults.

use std::sync::Arc;

use euraxess_feed::FeedParser;
use euraxess_fetch::Client;

use crate::config::ServeArgs;

#[derive(Debug, Clone)]
pub struct AppState {
    pub client: Client,
    pub parser: Arc<FeedParser>,
    pub feed_url: Arc<str>,
    pub default_limit: u16,
}

impl AppState {
    pub fn new(
        client: Client,
        parser: FeedParser,
        feed_url: impl Into<Arc<str>>,
        default_limit: u16,
    ) -> Self {
        Self {
            client,
            parser: Arc::new(parser),
            feed_url: feed_url.into(),
            default_limit,
        }
    }

    pub fn from_args(args: &ServeArgs) -> Self {
        Self::new(
            args.client(),
            FeedParser::new(args.cache_capacity),
            args.feed_url.as_str(),
            args.default_limit,
        )
    }
}
