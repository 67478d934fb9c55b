use std::path::Path;
use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

use crate::api::{self, AppState};
use crate::cli::Cli;
use crate::config::{Config, LoggingConfig};
use crate::error::{Error, Result};
use crate::pagination::{PageRequest, PageResponse};
use crate::storage::spawn_cleanup_task;

/// Start the HTTP service and block until Ctrl-C.
pub async fn serve(mut config: Config, bind: Option<String>, base_url: Option<String>) -> Result<()> {
    if let Some(bind) = bind {
        config.server.bind = bind;
    }
    if let Some(base_url) = base_url {
        config.server.base_url = base_url;
    }
    config.validate()?;

    let addr = config.bind_addr()?;

    #[cfg(feature = "metrics")]
    install_metrics_exporter(&config)?;

    let state = AppState::from_config(&config)?;
    let sweeper = spawn_cleanup_task(state.store(), config.cache.cleanup_interval());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        "Listening on {} (continuation links under {})",
        addr, config.server.base_url
    );

    let result = axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await;

    sweeper.abort();
    info!("Server stopped");
    result.map_err(Error::Io)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[cfg(feature = "metrics")]
fn install_metrics_exporter(config: &Config) -> Result<()> {
    let addr: std::net::SocketAddr = config
        .server
        .metrics_bind
        .parse()
        .map_err(|_| Error::Config(format!("Invalid metrics address: {}", config.server.metrics_bind)))?;

    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| Error::Config(format!("Failed to start metrics exporter: {}", e)))?;

    info!("Prometheus metrics on {}", addr);
    Ok(())
}

/// Fetch feeds once and print the first page as JSON on stdout
pub async fn fetch(config: &Config, feeds: Vec<String>, count: Option<usize>) -> Result<()> {
    let page = first_page(config, feeds, count).await?;

    println!("{}", serde_json::to_string_pretty(&page)?);
    Ok(())
}

/// The first page of `feeds`, without a continuation link.
///
/// Cursors live in this process only, so a link would never resolve.
pub async fn first_page(config: &Config, feeds: Vec<String>, count: Option<usize>) -> Result<PageResponse> {
    info!("Fetching {} feed(s)", feeds.len());

    let state = AppState::from_config(config)?;
    let mut page = state.paginator.page(PageRequest::fresh(feeds, count)).await?;

    if page.has_next() {
        debug!("Dropping continuation link {}", page.next_url);
        page.next_url.clear();
    }

    Ok(page)
}

pub fn show_config(config: &Config) -> Result<()> {
    print!("{}", config.to_toml()?);
    Ok(())
}

pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let cmd_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, cmd_name, &mut std::io::stdout());
}

/// Install the global tracing subscriber.
///
/// `--debug` and `--verbose` win over `RUST_LOG`, which wins over the
/// configured level. Console logs go to stderr; stdout carries command
/// output only. The returned guard must outlive all logging when writing
/// to a file.
pub fn init_logging(debug: bool, verbose: bool, logging: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    use tracing_subscriber::fmt::writer::BoxMakeWriter;
    use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer};

    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level))
    };

    let (writer, guard) = if logging.log_to_file {
        let path = Path::new(&logging.log_file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let file_name = path
            .file_name()
            .ok_or_else(|| Error::Config(format!("Invalid log file: {}", logging.log_file)))?;

        let (non_blocking, guard) =
            tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, file_name));
        (BoxMakeWriter::new(non_blocking), Some(guard))
    } else {
        (BoxMakeWriter::new(std::io::stderr), None)
    };

    let layer = if logging.json_format {
        fmt::layer().json().with_writer(writer).boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_file(debug)
            .with_line_number(debug)
            .with_ansi(!logging.log_to_file)
            .with_writer(writer)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to initialize logging: {}", e)))?;

    debug!("Logging initialized");
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
    <channel>
        <title>Fetch Feed</title>
        <item>
            <title>Newer</title>
            <link>https://example.com/2</link>
            <pubDate>Fri, 15 Mar 2024 02:00:00 GMT</pubDate>
        </item>
        <item>
            <title>Older</title>
            <link>https://example.com/1</link>
            <pubDate>Fri, 15 Mar 2024 01:00:00 GMT</pubDate>
        </item>
    </channel>
</rss>"#;

    #[tokio::test]
    async fn test_first_page_has_no_continuation_link() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(FEED))
            .mount(&mock_server)
            .await;

        let feeds = vec![format!("{}/feed.xml", mock_server.uri())];
        let page = first_page(&Config::default(), feeds, Some(1)).await.unwrap();

        assert_eq!(page.posts.len(), 1);
        assert_eq!(page.posts[0].title, "Newer");
        assert!(page.next_url.is_empty());
    }
}
