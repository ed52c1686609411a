// ABOUTME: Bounded memoization of normalized feeds keyed on exact feed text.
// ABOUTME: FeedParser owns an LRU table so an unchanged feed is not normalized twice.

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lru::LruCache;

use crate::error::FeedError;
use crate::models::JobRecord;
use crate::parser::parse_job_feed;

/// Number of distinct feed texts remembered by default.
///
/// Each entry keeps its full feed text as the key. Upstream bodies are capped at
/// 10 MiB, so the keys alone can hold up to capacity x 10 MiB; a single-feed
/// gateway normally has one live entry.
pub const DEFAULT_CACHE_CAPACITY: NonZeroUsize = match NonZeroUsize::new(32) {
    Some(n) => n,
    None => unreachable!(),
};

/// Feed normalizer with a least-recently-used memo of recent results.
///
/// Entries are keyed on the full feed text, so a hit always equals a fresh parse.
/// Malformed input is never stored. Safe to share across request handlers.
pub struct FeedParser {
    cache: Mutex<LruCache<String, Arc<[JobRecord]>>>,
}

impl FeedParser {
    /// Creates a parser that remembers up to `capacity` distinct feed texts.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Normalizes `text`, reusing the memoized records for identical input.
    pub fn parse(&self, text: &str) -> Result<Arc<[JobRecord]>, FeedError> {
        let cached = self.lock().get(text).cloned();
        if let Some(records) = cached {
            tracing::debug!(items = records.len(), "feed cache hit");
            return Ok(records);
        }

        let records: Arc<[JobRecord]> = parse_job_feed(text)?.into();
        self.lock().put(text.to_string(), Arc::clone(&records));
        Ok(records)
    }

    /// Number of feed texts currently memoized.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> NonZeroUsize {
        self.lock().cap()
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, Arc<[JobRecord]>>> {
        // The table only holds finished results, so a poisoned lock is still usable.
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for FeedParser {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl fmt::Debug for FeedParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedParser")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(title: &str) -> String {
        format!(
            "<rss><channel><item><title>{}</title></item></channel></rss>",
            title
        )
    }

    #[test]
    fn test_identical_text_hits_cache() {
        let parser = FeedParser::default();
        let first = parser.parse(&feed("a")).unwrap();
        let second = parser.parse(&feed("a")).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(parser.len(), 1);
    }

    #[test]
    fn test_changed_text_is_reparsed() {
        let parser = FeedParser::default();
        let first = parser.parse(&feed("a")).unwrap();
        let second = parser.parse(&feed("b")).unwrap();
        assert_eq!(first[0].title.as_deref(), Some("a"));
        assert_eq!(second[0].title.as_deref(), Some("b"));
        assert_eq!(parser.len(), 2);
    }

    #[test]
    fn test_least_recently_used_is_evicted() {
        let parser = FeedParser::new(NonZeroUsize::new(2).unwrap());
        let a = parser.parse(&feed("a")).unwrap();
        parser.parse(&feed("b")).unwrap();
        // touch "a" so "b" becomes the eviction candidate
        parser.parse(&feed("a")).unwrap();
        parser.parse(&feed("c")).unwrap();
        assert_eq!(parser.len(), 2);

        let a_again = parser.parse(&feed("a")).unwrap();
        assert!(Arc::ptr_eq(&a, &a_again));
        let cache = parser.lock();
        assert!(!cache.contains(feed("b").as_str()));
    }

    #[test]
    fn test_malformed_not_cached() {
        let parser = FeedParser::default();
        assert!(parser.parse("not xml").is_err());
        assert!(parser.is_empty());
    }

    #[test]
    fn test_default_capacity() {
        assert_eq!(FeedParser::default().capacity().get(), 32);
    }
}
