//! Proxy for the legacy server-side feed view

use super::state::AppState;
use crate::error::FeedError;
use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

/// Upstream headers copied onto the proxied response
pub const PROXIED_HEADERS: [&str; 5] = [
    "accept-ranges",
    "cache-control",
    "content-disposition",
    "content-range",
    "content-type",
];

/// Forward `**/@@rss_feed_view` to the CMS and relay its answer
pub async fn rss_feed_view(state: &AppState, uri: &Uri, token: Option<&str>) -> Response {
    let cancel = state.request_token();
    let _guard = cancel.clone().drop_guard();

    let url = match uri.query() {
        Some(query) => format!("{}{}?{}", state.settings.api.base_path(), uri.path(), query),
        None => format!("{}{}", state.settings.api.base_path(), uri.path()),
    };
    debug!(%url, "proxying legacy feed view");

    let raw = match state.client.get_raw(&url, token, &cancel).await {
        Ok(raw) => raw,
        Err(err) => {
            warn!(%url, "legacy feed view failed: {}", err);
            return err.into_response();
        }
    };

    let status = StatusCode::from_u16(raw.status).unwrap_or(StatusCode::OK);
    let mut headers = Vec::with_capacity(PROXIED_HEADERS.len());

    for name in PROXIED_HEADERS {
        let Some(value) = raw.header(name) else {
            continue;
        };
        match HeaderValue::from_str(value) {
            Ok(value) => headers.push((HeaderName::from_static(name), value)),
            Err(_) => {
                return FeedError::Build(format!("invalid upstream {name} header")).into_response()
            }
        }
    }

    let mut response = Body::from(raw.body).into_response();
    *response.status_mut() = status;
    response.headers_mut().extend(headers);
    response
}
