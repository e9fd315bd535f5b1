//! Feed request pipeline
//!
//! Runs the stages of a feed request strictly in order:
//! content fetch and query extraction, listing search, feed building.
//! Any failure ends the request; nothing is retried.

use crate::config::Settings;
use crate::content::ContentObject;
use crate::error::FeedError;
use crate::feed::{self, FeedAssembler, FeedDocument};
use crate::network::HttpClient;
use crate::query;
use crate::search::ListingFetcher;
use axum::response::{IntoResponse, Response};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Path suffix answered by the feed route
pub const FEED_SUFFIX: &str = "/rss.xml";

/// Stage of a feed request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    FetchingQuery,
    FetchingItems,
    BuildingFeed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FetchingQuery => "fetching query",
            Self::FetchingItems => "fetching items",
            Self::BuildingFeed => "building feed",
        };
        f.write_str(name)
    }
}

/// A failure together with the stage it happened in
#[derive(Debug, Error)]
#[error("{stage} failed: {source}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: FeedError,
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        self.source.into_response()
    }
}

/// Serialized feed plus its content type
#[derive(Debug)]
pub struct RenderedFeed {
    pub content_type: &'static str,
    pub xml: String,
}

/// Orchestrates query extraction, listing fetch and feed assembly
pub struct FeedPipeline {
    settings: Arc<Settings>,
    client: HttpClient,
    fetcher: ListingFetcher,
}

impl FeedPipeline {
    pub fn new(settings: Arc<Settings>, client: HttpClient) -> Self {
        let fetcher = ListingFetcher::new(client.clone(), &settings.api);
        Self {
            settings,
            client,
            fetcher,
        }
    }

    /// Produce the feed for `request_path` (ending in `/rss.xml`)
    pub async fn run(
        &self,
        request_path: &str,
        token: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<RenderedFeed, PipelineError> {
        let content_path = content_path(request_path);

        let listing = async {
            let url = self.settings.api.content_url(content_path);
            debug!(%url, "fetching content");
            let content: ContentObject = self.client.get_json(&url, token, cancel).await?;
            query::extract(&content, self.settings.feed.default_page_size)
        }
        .await
        .map_err(at(Stage::FetchingQuery))?;

        let items = self
            .fetcher
            .fetch_items(&listing.query, token, cancel)
            .await
            .map_err(at(Stage::FetchingItems))?;

        let feed_url = self.settings.feed.feed_link(content_path);
        let mut doc =
            FeedAssembler::new(&self.settings.feed).assemble(&listing.meta, &feed_url, &items);

        if self.settings.feed.probe_enclosure_size {
            self.probe_enclosures(&mut doc, cancel)
                .await
                .map_err(at(Stage::BuildingFeed))?;
        }

        let format = self.settings.feed.format;
        let xml = feed::render(&doc, format).map_err(at(Stage::BuildingFeed))?;

        info!(
            path = %request_path,
            entries = doc.entries.len(),
            ?format,
            "feed generated"
        );
        Ok(RenderedFeed {
            content_type: format.content_type(),
            xml,
        })
    }

    /// Fill in unknown enclosure sizes from HEAD requests
    async fn probe_enclosures(
        &self,
        doc: &mut FeedDocument,
        cancel: &CancellationToken,
    ) -> Result<(), FeedError> {
        for enclosure in doc
            .entries
            .iter_mut()
            .filter_map(|e| e.enclosure.as_mut())
            .filter(|e| e.size.is_none())
        {
            match self.client.content_length(&enclosure.url, cancel).await {
                Ok(size) => enclosure.size = size,
                Err(FeedError::Cancelled) => return Err(FeedError::Cancelled),
                Err(e) => warn!(url = %enclosure.url, "failed to get image size: {}", e),
            }
        }
        Ok(())
    }
}

/// Content path for a feed request path
pub fn content_path(request_path: &str) -> &str {
    request_path
        .strip_suffix(FEED_SUFFIX)
        .unwrap_or(request_path)
}

fn at(stage: Stage) -> impl Fn(FeedError) -> PipelineError {
    move |source| PipelineError { stage, source }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_path() {
        assert_eq!(content_path("/news/rss.xml"), "/news");
        assert_eq!(content_path("/rss.xml"), "");
        assert_eq!(content_path("/news"), "/news");
    }

    #[test]
    fn test_stage_display() {
        let err = PipelineError {
            stage: Stage::FetchingItems,
            source: FeedError::Unauthorized,
        };
        assert_eq!(
            err.to_string(),
            "fetching items failed: Upstream rejected credentials"
        );
    }
}
