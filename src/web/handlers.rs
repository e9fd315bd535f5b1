//! HTTP request handlers

use super::proxy;
use super::state::AppState;
use crate::error::{error_body, FeedError};
use crate::pipeline::{PipelineError, FEED_SUFFIX};
use axum::{
    extract::State,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use tracing::{debug, error, warn};

/// Cookie carrying the CMS session token
pub const AUTH_COOKIE: &str = "auth_token";

/// Path suffix of the legacy feed view
pub const LEGACY_VIEW_SUFFIX: &str = "/@@rss_feed_view";

/// Route a wildcard request to the feed or legacy proxy handler
pub async fn dispatch(State(state): State<AppState>, uri: Uri, jar: CookieJar) -> Response {
    let token = jar.get(AUTH_COOKIE).map(|c| c.value().to_string());
    let path = uri.path();

    if path.ends_with(FEED_SUFFIX) {
        rss_feed(&state, path, token.as_deref()).await
    } else if path.ends_with(LEGACY_VIEW_SUFFIX) {
        proxy::rss_feed_view(&state, &uri, token.as_deref()).await
    } else {
        not_found().await.into_response()
    }
}

/// Feed handler
async fn rss_feed(state: &AppState, path: &str, token: Option<&str>) -> Response {
    // Dropping this handler (client gone) cancels the outbound calls.
    let cancel = state.request_token();
    let _guard = cancel.clone().drop_guard();

    match state.pipeline.run(path, token, &cancel).await {
        Ok(feed) => ([(header::CONTENT_TYPE, feed.content_type)], feed.xml).into_response(),
        Err(err) => {
            log_failure(path, &err);
            err.into_response()
        }
    }
}

fn log_failure(path: &str, err: &PipelineError) {
    let status = err.source.status_code();
    match err.source {
        FeedError::Cancelled => debug!(%path, stage = %err.stage, "feed request cancelled"),
        _ if status.is_client_error() => {
            warn!(%path, stage = %err.stage, status = status.as_u16(), "{}", err.source)
        }
        _ => error!(%path, stage = %err.stage, status = status.as_u16(), "{}", err.source),
    }
}

/// Health check handler
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION
    }))
}

/// Fallback for unknown paths
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, error_body(StatusCode::NOT_FOUND))
}
