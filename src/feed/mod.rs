pub mod fetcher;
pub mod parser;
pub mod sort;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use sort::sort_by_recency;

/// One normalized feed entry, independent of the source it came from.
///
/// Posts are never mutated after construction. Ordering between posts is
/// derived from `published_at` alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    #[serde(rename = "date")]
    pub published_at: DateTime<Utc>,
    pub author: String,
    pub title: String,
    pub content: String,
    pub link: String,
}

impl Post {
    pub fn new(
        published_at: DateTime<Utc>,
        author: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        link: impl Into<String>,
    ) -> Self {
        Self {
            published_at,
            author: author.into(),
            title: title.into(),
            content: content.into(),
            link: link.into(),
        }
    }
}

/// Anything that can turn a source URL into a list of posts.
///
/// A source either yields every item it has or an error; there are no
/// partial results.
#[async_trait]
pub trait PostSource: Send + Sync {
    async fn fetch_posts(&self, url: &str) -> Result<Vec<Post>>;
}
