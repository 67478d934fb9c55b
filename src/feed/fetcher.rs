use crate::config::Settings;
use crate::error::{Error, Result};
use crate::feed::parser::FeedParser;
use crate::feed::{Post, PostSource};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use futures::FutureExt;
use reqwest::{Client, Response};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct FeedFetcher {
    client: Client,
    parser: FeedParser,
    timeout_duration: Duration,
    user_agent: String,
}

impl Default for FeedFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedFetcher {
    pub fn new() -> Self {
        Self::with_client(Self::build_client().unwrap_or_default())
    }

    /// Build a fetcher from the `[settings]` section of the configuration.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self::with_client(Self::build_client()?)
            .with_timeout(Duration::from_secs(settings.timeout))
            .with_user_agent(settings.user_agent.clone()))
    }

    fn with_client(client: Client) -> Self {
        Self {
            client,
            parser: FeedParser::new(),
            timeout_duration: Duration::from_secs(30),
            user_agent: format!("rss-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Deadlines are enforced per request in `fetch_feed`, not by the client.
    fn build_client() -> Result<Client> {
        Client::builder()
            .redirect(reqwest::redirect::Policy::limited(10))
            .gzip(true)
            .build()
            .map_err(|e| Error::HttpError(format!("Failed to create HTTP client: {}", e)))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_duration = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }

    pub async fn fetch_feed(&self, url: &str) -> Result<Vec<Post>> {
        debug!("Fetching feed from: {}", url);

        self.parser.validate_feed_url(url)?;

        let response = timeout(self.timeout_duration, self.fetch_response(url))
            .await
            .map_err(|_| Error::Timeout(format!("Request to {} timed out", url)))??;

        if !response.status().is_success() {
            return Err(Error::HttpError(format!(
                "HTTP {} for {}: {}",
                response.status().as_u16(),
                url,
                response.status().canonical_reason().unwrap_or("Unknown error")
            )));
        }

        let content = timeout(self.timeout_duration, response.bytes())
            .await
            .map_err(|_| Error::Timeout(format!("Reading body from {} timed out", url)))?
            .map_err(|e| Error::HttpError(format!("Failed to read response body: {}", e)))?;

        debug!("Downloaded {} bytes from {}", content.len(), url);

        self.parser.parse_feed(std::io::Cursor::new(content))
    }

    async fn fetch_response(&self, url: &str) -> Result<Response> {
        self.client
            .get(url)
            .header("User-Agent", &self.user_agent)
            .header("Accept", "application/rss+xml, application/atom+xml, application/xml, text/xml, */*")
            .send()
            .await
            .map_err(|e| Error::HttpError(format!("Request failed: {}", e)))
    }
}

#[async_trait]
impl PostSource for FeedFetcher {
    async fn fetch_posts(&self, url: &str) -> Result<Vec<Post>> {
        self.fetch_feed(url).await
    }
}

/// Fetch every URL through `source` and concatenate the posts.
///
/// At most `concurrency` sources are in flight at once. A source that fails
/// contributes nothing; the failure is logged and the batch carries on.
/// Output is grouped by source in the order of `urls`, unsorted.
pub async fn fetch_all(source: &dyn PostSource, urls: &[String], concurrency: usize) -> Vec<Post> {
    let fetches: Vec<_> = urls
        .iter()
        .map(|url| async move { (url, source.fetch_posts(url).await) }.boxed())
        .collect();
    let results: Vec<(&String, Result<Vec<Post>>)> = stream::iter(fetches)
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut posts = Vec::new();
    for (url, result) in results {
        match result {
            Ok(mut items) => {
                debug!(url = %url, count = items.len(), "Fetched posts");
                posts.append(&mut items);
            }
            Err(e) => {
                warn!(url = %url, code = e.error_code(), error = %e, "Skipping feed source");
                record_source_failure(e.error_code());
            }
        }
    }

    posts
}

#[cfg(feature = "metrics")]
fn record_source_failure(code: &'static str) {
    metrics::increment_counter!("rss_client_source_failures_total", "code" => code);
}

#[cfg(not(feature = "metrics"))]
fn record_source_failure(_code: &'static str) {}
