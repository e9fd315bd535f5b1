//! Web server module
//!
//! Serves generated feeds and the legacy feed view proxy.

mod handlers;
mod proxy;
mod routes;
mod state;

pub use handlers::{AUTH_COOKIE, LEGACY_VIEW_SUFFIX};
pub use proxy::PROXIED_HEADERS;
pub use routes::create_router;
pub use state::AppState;
