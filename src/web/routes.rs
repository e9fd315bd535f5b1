//! Route definitions

use super::handlers;
use super::state::AppState;
use axum::{
    routing::{any, get},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        // `**/rss.xml` and `**/@@rss_feed_view`, any method
        .route("/*path", any(handlers::dispatch))
        .fallback(handlers::not_found)
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
