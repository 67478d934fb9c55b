use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::feed::fetcher::fetch_all;
use crate::feed::{sort_by_recency, Post, PostSource};
use crate::storage::{CursorStore, TokenGenerator};

pub const DEFAULT_PAGE_SIZE: usize = 20;
const DEFAULT_CONCURRENT_FETCHES: usize = 8;

/// Where the posts for a page come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageMode {
    /// First page: fetch and merge these sources.
    Fresh(Vec<String>),
    /// Later page: read the remainder stored under this token.
    Continue(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub mode: PageMode,
    /// `None` means the paginator's default page size.
    pub page_size: Option<usize>,
}

impl PageRequest {
    pub fn fresh(urls: Vec<String>, page_size: Option<usize>) -> Self {
        Self {
            mode: PageMode::Fresh(urls),
            page_size: page_size.filter(|n| *n > 0),
        }
    }

    pub fn continuation(token: impl Into<String>, page_size: Option<usize>) -> Self {
        Self {
            mode: PageMode::Continue(token.into()),
            page_size: page_size.filter(|n| *n > 0),
        }
    }

    /// Build a request from the raw `feeds`, `count` and `continue` query values.
    ///
    /// A continuation token wins over a feed list. Blank values count as
    /// absent, and an unparseable or non-positive `count` falls back to the
    /// default page size.
    pub fn from_query(
        feeds: Option<&str>,
        count: Option<&str>,
        continue_token: Option<&str>,
    ) -> Result<Self> {
        let page_size = parse_page_size(count);

        if let Some(token) = continue_token.map(str::trim).filter(|t| !t.is_empty()) {
            return Ok(Self::continuation(token, page_size));
        }

        let urls: Vec<String> = feeds
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(String::from)
            .collect();

        if urls.is_empty() {
            return Err(Error::MissingParameter("feeds".to_string()));
        }

        Ok(Self::fresh(urls, page_size))
    }
}

/// Parse a `count` query value; anything that is not a positive integer is `None`.
pub fn parse_page_size(count: Option<&str>) -> Option<usize> {
    count
        .and_then(|c| c.trim().parse::<i64>().ok())
        .filter(|n| *n > 0)
        .and_then(|n| usize::try_from(n).ok())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResponse {
    pub posts: Vec<Post>,
    /// Absolute link to the next page, empty when nothing remains.
    #[serde(rename = "nextURL")]
    pub next_url: String,
}

impl PageResponse {
    pub fn has_next(&self) -> bool {
        !self.next_url.is_empty()
    }
}

/// Serves pages of merged feed posts and keeps the unserved tail in a
/// cursor store between requests.
#[derive(Clone)]
pub struct Paginator {
    source: Arc<dyn PostSource>,
    store: Arc<dyn CursorStore>,
    tokens: Arc<TokenGenerator>,
    base_url: String,
    default_page_size: usize,
    concurrency: usize,
}

impl Paginator {
    pub fn new(
        source: Arc<dyn PostSource>,
        store: Arc<dyn CursorStore>,
        tokens: Arc<TokenGenerator>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            source,
            store,
            tokens,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            default_page_size: DEFAULT_PAGE_SIZE,
            concurrency: DEFAULT_CONCURRENT_FETCHES,
        }
    }

    pub fn from_config(
        config: &Config,
        source: Arc<dyn PostSource>,
        store: Arc<dyn CursorStore>,
        tokens: Arc<TokenGenerator>,
    ) -> Self {
        Self::new(source, store, tokens, config.server.base_url.clone())
            .with_default_page_size(config.settings.default_page_size)
            .with_concurrency(config.settings.concurrent_fetches)
    }

    pub fn with_default_page_size(mut self, page_size: usize) -> Self {
        self.default_page_size = page_size.max(1);
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn store(&self) -> &Arc<dyn CursorStore> {
        &self.store
    }

    /// Produce one page for `request`.
    ///
    /// Unknown or expired tokens give an empty page without a next link.
    pub async fn page(&self, request: PageRequest) -> Result<PageResponse> {
        let page_size = request.page_size.unwrap_or(self.default_page_size);

        let (posts, remaining) = match request.mode {
            PageMode::Fresh(urls) => {
                let mut posts = fetch_all(self.source.as_ref(), &urls, self.concurrency).await;
                sort_by_recency(&mut posts);
                debug!(sources = urls.len(), total = posts.len(), "Merged fresh result set");

                let remaining = posts.split_off(page_size.min(posts.len()));
                (posts, remaining)
            }
            PageMode::Continue(token) => {
                let ordered = self.store.get(&token).unwrap_or_else(|| {
                    debug!(token = %token, "Continuation token missing or expired");
                    Arc::default()
                });

                let (page, rest) = ordered.split_at(page_size.min(ordered.len()));
                (page.to_vec(), rest.to_vec())
            }
        };

        let next_url = if remaining.is_empty() {
            String::new()
        } else {
            let token = self.tokens.next_token();
            let left = remaining.len();
            self.store.put(token.clone(), remaining)?;
            debug!(token = %token, remaining = left, "Stored continuation");
            self.next_url(&token, page_size)
        };

        info!(
            returned = posts.len(),
            page_size,
            has_next = !next_url.is_empty(),
            "Served page"
        );

        Ok(PageResponse { posts, next_url })
    }

    fn next_url(&self, token: &str, page_size: usize) -> String {
        format!(
            "{}/v1/posts?continue={}&count={}",
            self.base_url, token, page_size
        )
    }
}
