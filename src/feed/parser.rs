use crate::error::{Error, Result};
use crate::feed::Post;
use feed_rs::model::Entry;
use feed_rs::parser as feed_parser;
use std::io::BufRead;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default)]
pub struct FeedParser;

impl FeedParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse an RSS or Atom document into posts, keeping document order.
    ///
    /// Entries without any usable timestamp are dropped.
    pub fn parse_feed<R: BufRead>(&self, reader: R) -> Result<Vec<Post>> {
        let feed = feed_parser::parse(reader)
            .map_err(|e| Error::FeedParse(format!("Failed to parse feed: {}", e)))?;

        let posts = feed
            .entries
            .into_iter()
            .filter_map(|entry| self.entry_to_post(entry))
            .collect();

        Ok(posts)
    }

    fn entry_to_post(&self, entry: Entry) -> Option<Post> {
        let Some(published_at) = entry.published.or(entry.updated) else {
            debug!("Skipping entry {} without a publish date", entry.id);
            return None;
        };

        let title = entry.title.map(|t| t.content).unwrap_or_default();
        let link = entry.links.first().map(|l| l.href.clone()).unwrap_or_default();
        let author = entry.authors.first().map(|a| a.name.clone()).unwrap_or_default();
        let content = entry
            .summary
            .map(|s| s.content)
            .or_else(|| entry.content.and_then(|c| c.body))
            .unwrap_or_default();

        Some(Post {
            published_at,
            author,
            title,
            content,
            link,
        })
    }

    pub fn validate_feed_url(&self, url: &str) -> Result<()> {
        let parsed_url = url::Url::parse(url)
            .map_err(|e| Error::InvalidUrl(format!("Invalid URL: {}", e)))?;

        match parsed_url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(Error::InvalidUrl(format!("Unsupported scheme: {}", scheme))),
        }
    }
}
