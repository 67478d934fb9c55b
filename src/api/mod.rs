pub mod handlers;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::feed::fetcher::FeedFetcher;
use crate::pagination::Paginator;
use crate::storage::{CacheConfig, CursorStore, MemoryCursorStore, TokenGenerator};

/// Process-wide state shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub paginator: Arc<Paginator>,
}

impl AppState {
    pub fn new(paginator: Paginator) -> Self {
        Self {
            paginator: Arc::new(paginator),
        }
    }

    /// Wire the real fetcher, an in-memory cursor store and a fresh token
    /// counter according to `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher = FeedFetcher::from_settings(&config.settings)?;
        let store: Arc<dyn CursorStore> =
            Arc::new(MemoryCursorStore::new(CacheConfig::from(&config.cache))?);
        let tokens = Arc::new(TokenGenerator::new());

        Ok(Self::new(Paginator::from_config(
            config,
            Arc::new(fetcher),
            store,
            tokens,
        )))
    }

    pub fn store(&self) -> Arc<dyn CursorStore> {
        Arc::clone(self.paginator.store())
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/v1/posts", get(handlers::get_posts))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = if self.is_user_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        (status, self.to_string()).into_response()
    }
}
