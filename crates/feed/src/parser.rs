// ABOUTME: Feed normalization from RSS XML into JobRecord values.
// ABOUTME: Walks rss/channel/item on a document tree and applies the date and identifier policies.

use crate::error::FeedError;
use crate::models::{JobRecord, SOURCE_EURAXESS};
use crate::time_parse::parse_flexible_date;
use crate::xml::{parse_document, Element};

/// Parses RSS feed text into normalized job records, in feed order.
///
/// # Returns
/// * `Ok(records)` - one record per `<item>` of the first `<channel>`; empty when the
///   document has no channel, no items, or is not an `<rss>` document
/// * `Err(FeedError::Malformed)` - the text is not well-formed XML
pub fn parse_job_feed(text: &str) -> Result<Vec<JobRecord>, FeedError> {
    let root = parse_document(text)?;
    let records: Vec<JobRecord> = channel_items(&root).map(map_item).collect();
    tracing::debug!(items = records.len(), "normalized feed");
    Ok(records)
}

/// Items of the first channel under an `<rss>` root.
fn channel_items(root: &Element) -> impl Iterator<Item = &Element> {
    root.child("channel")
        .filter(move |_| root.name == "rss")
        .into_iter()
        .flat_map(|channel| channel.children_named("item"))
}

/// Maps one `<item>` element to a JobRecord.
///
/// `source_ref` prefers a non-empty guid, then the link. A missing or unreadable
/// pubDate leaves `posted_date` empty rather than failing the item.
fn map_item(item: &Element) -> JobRecord {
    let link = item.child_text("link").map(str::to_string);
    let source_ref = item
        .child_text("guid")
        .map(str::to_string)
        .or_else(|| link.clone());

    JobRecord {
        source: SOURCE_EURAXESS.to_string(),
        source_ref,
        url: link,
        title: item.child_text("title").map(str::to_string),
        description_raw: item.child_text("description").unwrap_or_default().to_string(),
        posted_date: item.child_text("pubDate").and_then(parse_flexible_date),
        raw: item.to_map(),
    }
}
