//! Error types for feed generation

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Errors that can abort a feed request
#[derive(Debug, Error)]
pub enum FeedError {
    /// Listing block missing or without a saved query
    #[error("No query data found in listing block")]
    MissingQuery,

    /// Upstream answered 401
    #[error("Upstream rejected credentials")]
    Unauthorized,

    /// Upstream answered 404
    #[error("Upstream resource not found: {url}")]
    NotFound { url: String },

    /// Any other non-2xx upstream status
    #[error("Upstream error: HTTP {status} from {url}")]
    Upstream { status: u16, url: String },

    /// Connection, TLS or timeout failure
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Upstream body was not the expected JSON
    #[error("Failed to decode upstream response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Feed serialization failed
    #[error("Failed to build feed: {0}")]
    Build(String),

    /// The inbound request went away
    #[error("Request cancelled")]
    Cancelled,
}

impl FeedError {
    /// Map an upstream status to an error
    pub fn from_status(status: u16, url: impl Into<String>) -> Self {
        match status {
            401 => Self::Unauthorized,
            404 => Self::NotFound { url: url.into() },
            _ => Self::Upstream {
                status,
                url: url.into(),
            },
        }
    }

    /// HTTP status returned to the client
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON body for an error status
pub fn error_body(status: StatusCode) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "error": status.canonical_reason().unwrap_or("Internal Server Error")
    }))
}

impl IntoResponse for FeedError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, error_body(status)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            FeedError::from_status(401, "u").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            FeedError::from_status(404, "u").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            FeedError::from_status(503, "u").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            FeedError::MissingQuery.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_body() {
        let Json(body) = error_body(StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Unauthorized");
        let Json(body) = error_body(StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Not Found");
        let Json(body) = error_body(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal Server Error");
    }
}
