//! HTTP client for calls to the CMS API

use crate::config::OutgoingSettings;
use crate::error::FeedError;
use reqwest::{header, Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Body and selected metadata of an upstream response
#[derive(Debug)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers (lossy string values)
    pub headers: Vec<(String, String)>,
    /// Response body
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Look up a header, case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// HTTP client wrapper carrying outgoing settings
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, FeedError> {
        Self::with_settings(&OutgoingSettings::default())
    }

    /// Create a new HTTP client with custom settings
    pub fn with_settings(settings: &OutgoingSettings) -> Result<Self, FeedError> {
        let user_agent = settings
            .useragent
            .clone()
            .unwrap_or_else(|| format!("volto-rss-rs/{}", crate::VERSION));

        let mut builder = Client::builder()
            .timeout(Duration::from_secs_f64(settings.request_timeout))
            .user_agent(user_agent)
            .gzip(true)
            .brotli(true);

        // SSL verification
        if !settings.verify_ssl {
            builder = builder.danger_accept_invalid_certs(true);
        }

        // Proxy settings
        if let Some(ref proxy_url) = settings.proxies.all {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        } else {
            if let Some(ref http) = settings.proxies.http {
                builder = builder.proxy(reqwest::Proxy::http(http)?);
            }
            if let Some(ref https) = settings.proxies.https {
                builder = builder.proxy(reqwest::Proxy::https(https)?);
            }
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    /// GET a JSON document
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        token: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<T, FeedError> {
        let request = self.client.get(url);
        self.fetch_json(request, url, token, cancel).await
    }

    /// GET a JSON document with query parameters
    pub async fn get_json_with_params<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(String, String)],
        token: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<T, FeedError> {
        let request = self.client.get(url).query(params);
        self.fetch_json(request, url, token, cancel).await
    }

    /// POST a JSON body and decode a JSON answer
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
        token: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<T, FeedError> {
        let request = self.client.post(url).json(body);
        self.fetch_json(request, url, token, cancel).await
    }

    /// GET a resource as-is
    pub async fn get_raw(
        &self,
        url: &str,
        token: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<RawResponse, FeedError> {
        let request = authorize(self.client.get(url), token);
        until_cancelled(cancel, async {
            let response = check_status(request.send().await?, url)?;
            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
                .collect();
            let body = response.bytes().await?.to_vec();
            Ok(RawResponse {
                status,
                headers,
                body,
            })
        })
        .await
    }

    /// Content length announced by a HEAD request, if any
    pub async fn content_length(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<u64>, FeedError> {
        let request = self.client.head(url);
        until_cancelled(cancel, async {
            let response = check_status(request.send().await?, url)?;
            Ok(response
                .headers()
                .get(header::CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok()))
        })
        .await
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &str,
        token: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<T, FeedError> {
        let request = authorize(request, token).header(header::ACCEPT, "application/json");
        until_cancelled(cancel, async {
            let response = check_status(request.send().await?, url)?;
            let text = response.text().await?;
            Ok(serde_json::from_str(&text)?)
        })
        .await
    }
}

fn authorize(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

fn check_status(response: Response, url: &str) -> Result<Response, FeedError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        debug!(%url, status = status.as_u16(), "upstream returned failure status");
        Err(FeedError::from_status(status.as_u16(), url))
    }
}

/// Drive `fut` unless `cancel` fires first
async fn until_cancelled<T, F>(cancel: &CancellationToken, fut: F) -> Result<T, FeedError>
where
    F: Future<Output = Result<T, FeedError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(FeedError::Cancelled),
        result = fut => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_client_creation() {
        let client = HttpClient::new();
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_cancelled_before_send() {
        let client = HttpClient::new().unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result: Result<serde_json::Value, _> = client
            .get_json("http://127.0.0.1:9/never", None, &cancel)
            .await;
        assert!(matches!(result, Err(FeedError::Cancelled)));
    }

    #[test]
    fn test_raw_header_lookup() {
        let raw = RawResponse {
            status: 200,
            headers: vec![("content-type".to_string(), "text/xml".to_string())],
            body: Vec::new(),
        };
        assert_eq!(raw.header("Content-Type"), Some("text/xml"));
        assert_eq!(raw.header("Cache-Control"), None);
    }
}
