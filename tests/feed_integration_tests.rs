use rss_client::feed::fetcher::{fetch_all, FeedFetcher};
use rss_client::feed::sort_by_recency;
use rss_client::Error;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod test_data;
use test_data::*;

/// Integration tests for fetching, parsing and merging real feed documents

async fn mount_feed(server: &MockServer, route: &str, body: &str, content_type: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", content_type),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_end_to_end_rss_processing() {
    let mock_server = MockServer::start().await;
    mount_feed(&mock_server, "/a.xml", FEED_A_RSS, "application/rss+xml").await;

    let fetcher = FeedFetcher::new();
    let posts = fetcher
        .fetch_feed(&format!("{}/a.xml", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(posts.len(), 3);
    assert_eq!(posts[0].title, "A t3");
    assert_eq!(posts[0].link, "https://a.example.com/t3");
    assert_eq!(posts[0].content, "Third post from A");
    assert_eq!(posts[0].published_at.to_rfc3339(), "2024-03-15T03:00:00+00:00");
}

#[tokio::test]
async fn test_end_to_end_atom_processing() {
    let mock_server = MockServer::start().await;
    mount_feed(&mock_server, "/b.xml", FEED_B_ATOM, "application/atom+xml").await;

    let fetcher = FeedFetcher::new();
    let posts = fetcher
        .fetch_feed(&format!("{}/b.xml", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].author, "Bob");
    assert_eq!(posts[0].content, "Newest post overall");
}

#[tokio::test]
async fn test_custom_user_agent_is_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/a.xml"))
        .and(header("user-agent", "CustomBot/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FEED_A_RSS))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = FeedFetcher::new().with_user_agent("CustomBot/1.0".to_string());
    let result = fetcher.fetch_feed(&format!("{}/a.xml", mock_server.uri())).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_merge_across_sources() {
    let mock_server = MockServer::start().await;
    mount_feed(&mock_server, "/a.xml", FEED_A_RSS, "application/rss+xml").await;
    mount_feed(&mock_server, "/b.xml", FEED_B_ATOM, "application/atom+xml").await;

    let fetcher = FeedFetcher::new();
    let urls = vec![
        format!("{}/a.xml", mock_server.uri()),
        format!("{}/b.xml", mock_server.uri()),
    ];

    let mut posts = fetch_all(&fetcher, &urls, 4).await;
    sort_by_recency(&mut posts);

    let titles: Vec<_> = posts.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["B t4", "A t3", "A t2", "A t1", "B t0"]);
}

#[tokio::test]
async fn test_partial_source_failure_equals_merge_of_the_rest() {
    let mock_server = MockServer::start().await;
    mount_feed(&mock_server, "/a.xml", FEED_A_RSS, "application/rss+xml").await;
    mount_feed(&mock_server, "/b.xml", FEED_B_ATOM, "application/atom+xml").await;
    mount_feed(&mock_server, "/broken.xml", MALFORMED_FEED, "application/xml").await;

    Mock::given(method("GET"))
        .and(path("/gone.xml"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let fetcher = FeedFetcher::new();
    let healthy = vec![
        format!("{}/a.xml", mock_server.uri()),
        format!("{}/b.xml", mock_server.uri()),
    ];
    let with_failures = vec![
        format!("{}/a.xml", mock_server.uri()),
        format!("{}/broken.xml", mock_server.uri()),
        format!("{}/gone.xml", mock_server.uri()),
        "ftp://example.com/feed.xml".to_string(),
        format!("{}/b.xml", mock_server.uri()),
    ];

    let mut expected = fetch_all(&fetcher, &healthy, 4).await;
    sort_by_recency(&mut expected);

    let mut actual = fetch_all(&fetcher, &with_failures, 4).await;
    sort_by_recency(&mut actual);

    assert_eq!(actual, expected);
}

#[tokio::test]
async fn test_slow_source_does_not_block_the_batch_forever() {
    let mock_server = MockServer::start().await;
    mount_feed(&mock_server, "/a.xml", FEED_A_RSS, "application/rss+xml").await;

    Mock::given(method("GET"))
        .and(path("/slow.xml"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(5))
                .set_body_string(FEED_B_ATOM),
        )
        .mount(&mock_server)
        .await;

    let fetcher = FeedFetcher::new().with_timeout(Duration::from_millis(200));
    let urls = vec![
        format!("{}/slow.xml", mock_server.uri()),
        format!("{}/a.xml", mock_server.uri()),
    ];

    let posts = fetch_all(&fetcher, &urls, 2).await;
    assert_eq!(posts.len(), 3);
    assert!(posts.iter().all(|p| p.title.starts_with("A ")));
}

#[tokio::test]
async fn test_large_feed_handling() {
    let mock_server = MockServer::start().await;
    mount_feed(
        &mock_server,
        "/large.xml",
        &generated_feed("large", 1000, 0),
        "application/rss+xml",
    )
    .await;

    let fetcher = FeedFetcher::new();
    let posts = fetcher
        .fetch_feed(&format!("{}/large.xml", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(posts.len(), 1000);
}

#[tokio::test]
async fn test_http_error_is_reported_per_source() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing.xml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let fetcher = FeedFetcher::new();
    let result = fetcher
        .fetch_feed(&format!("{}/missing.xml", mock_server.uri()))
        .await;

    match result {
        Err(e @ Error::HttpError(_)) => {
            assert!(e.to_string().contains("404"));
            assert!(e.is_temporary());
        }
        other => panic!("Expected HttpError, got {:?}", other.map(|p| p.len())),
    }
}
