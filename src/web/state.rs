//! Application state shared across handlers

use crate::config::Settings;
use crate::network::HttpClient;
use crate::pipeline::FeedPipeline;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Settings, read-only after startup
    pub settings: Arc<Settings>,
    /// Outbound HTTP client
    pub client: HttpClient,
    /// Feed pipeline
    pub pipeline: Arc<FeedPipeline>,
    /// Cancelled on server shutdown; parent of every request token
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Create new application state
    pub fn new(settings: Settings, client: HttpClient) -> Self {
        Self::with_shutdown(settings, client, CancellationToken::new())
    }

    /// Create state tied to an existing shutdown token
    pub fn with_shutdown(settings: Settings, client: HttpClient, shutdown: CancellationToken) -> Self {
        let settings = Arc::new(settings);
        let pipeline = Arc::new(FeedPipeline::new(settings.clone(), client.clone()));

        Self {
            settings,
            client,
            pipeline,
            shutdown,
        }
    }

    /// Token for one inbound request
    pub fn request_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }
}
