use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::debug;

use crate::api::AppState;
use crate::error::Result;
use crate::pagination::PageRequest;

/// Raw query string of `GET /v1/posts`. Values stay strings so a malformed
/// `count` falls back to the default instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct PostsQuery {
    pub feeds: Option<String>,
    pub count: Option<String>,
    #[serde(rename = "continue")]
    pub continue_token: Option<String>,
}

pub async fn get_posts(
    State(state): State<AppState>,
    Query(query): Query<PostsQuery>,
) -> Result<Response> {
    let request = PageRequest::from_query(
        query.feeds.as_deref(),
        query.count.as_deref(),
        query.continue_token.as_deref(),
    )
    .inspect_err(|e| debug!("Rejected posts query: {}", e))?;

    let page = state.paginator.page(request).await?;
    let body = serde_json::to_vec(&page)?;

    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}
