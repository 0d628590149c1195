//! Syndication feed detection for `<link>` elements.

use crate::document::Node;
use crate::error::Result;

const RSS: &str = "application/rss+xml";
const ATOM: &str = "application/atom+xml";

/// Confirms whether a link element points at a syndication feed.
pub trait FeedValidator {
    /// Feed MIME type of the link, or `None` when it is not a feed.
    ///
    /// `declared_feed` is set when the relation tokens contain `feed`.
    fn feed_type(&self, node: &Node, declared_feed: bool) -> Result<Option<String>>;
}

/// Decides by the declared MIME type and the target scheme.
#[derive(Debug, Clone, Copy, Default)]
pub struct MimeFeedValidator;

impl FeedValidator for MimeFeedValidator {
    fn feed_type(&self, node: &Node, declared_feed: bool) -> Result<Option<String>> {
        let mime = node
            .attr("type")
            .and_then(|t| t.split(';').next())
            .map(|t| t.split_whitespace().collect::<String>().to_lowercase())
            .unwrap_or_default();

        let is_feed = declared_feed || mime == RSS || mime == ATOM;
        if !is_feed {
            return Ok(None);
        }

        let loadable = node
            .href
            .as_deref()
            .is_some_and(|href| href.starts_with("http://") || href.starts_with("https://"));
        if !loadable {
            return Ok(None);
        }

        Ok(Some(if mime.is_empty() { RSS.to_string() } else { mime }))
    }
}
