//! Listing item retrieval

use super::models::{Item, SearchResponse};
use crate::config::{ApiSettings, SearchEndpoint};
use crate::error::FeedError;
use crate::network::HttpClient;
use crate::query::Query;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Resolves listing queries against the CMS search service
#[derive(Clone)]
pub struct ListingFetcher {
    client: HttpClient,
    base_path: String,
    endpoint: SearchEndpoint,
}

impl ListingFetcher {
    /// Create a fetcher for the configured API
    pub fn new(client: HttpClient, api: &ApiSettings) -> Self {
        Self {
            client,
            base_path: api.base_path().to_string(),
            endpoint: api.search_endpoint,
        }
    }

    /// Items matching `query`, in the order returned by the CMS
    pub async fn fetch_items(
        &self,
        query: &Query,
        token: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<Vec<Item>, FeedError> {
        let response: SearchResponse = match self.endpoint {
            SearchEndpoint::QuerystringSearch => {
                let url = format!("{}/@querystring-search", self.base_path);
                debug!(%url, b_size = query.b_size, "querystring search");
                self.client.post_json(&url, query, token, cancel).await?
            }
            SearchEndpoint::Search => {
                let url = format!("{}/@search", self.base_path);
                let params = query.to_search_params();
                debug!(%url, params = params.len(), "catalog search");
                self.client
                    .get_json_with_params(&url, &params, token, cancel)
                    .await?
            }
        };

        debug!(
            items = response.items.len(),
            total = response.items_total,
            "listing items fetched"
        );
        Ok(response.items)
    }
}
