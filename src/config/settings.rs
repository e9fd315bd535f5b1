//! Settings structures for Volto-RSS-RS configuration

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main settings structure, loaded once and shared read-only
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub api: ApiSettings,
    pub feed: FeedSettings,
    pub outgoing: OutgoingSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_yaml::from_str(&content)?;
        Ok(settings)
    }

    /// Merge with environment variables (RSS_FEED_* prefix)
    pub fn merge_env(&mut self) {
        self.merge_vars(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable source
    pub fn merge_vars<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = var("RSS_FEED_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Some(val) = var("RSS_FEED_BIND_ADDRESS") {
            self.server.bind_address = val;
        }
        if let Some(val) = var("RSS_FEED_API_PATH") {
            self.api.api_path = val;
        }
        if let Some(val) = var("RSS_FEED_INTERNAL_API_PATH") {
            self.api.internal_api_path = Some(val);
        }
        if let Some(val) = var("RSS_FEED_DEV_PROXY_TO_API_PATH") {
            self.api.dev_proxy_to_api_path = Some(val);
        }
        if let Some(val) = var("RSS_FEED_DEVELOPMENT") {
            self.api.development = parse_flag(&val);
        }
        if let Some(val) = var("RSS_FEED_LEGACY_TRAVERSE") {
            self.api.legacy_traverse = parse_flag(&val);
        }
        if let Some(val) = var("RSS_FEED_PUBLIC_URL") {
            self.feed.public_url = val;
        }
        if let Some(val) = var("RSS_FEED_DEFAULT_PAGE_SIZE") {
            if let Ok(size) = val.parse() {
                self.feed.default_page_size = size;
            }
        }
        if let Some(val) = var("RSS_FEED_FEED_FORMAT") {
            if let Some(format) = FeedFormat::from_name(&val) {
                self.feed.format = format;
            }
        }
    }
}

fn parse_flag(val: &str) -> bool {
    matches!(val.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Server port
    pub port: u16,
    /// Bind address
    pub bind_address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 3000,
            bind_address: "127.0.0.1".to_string(),
        }
    }
}

/// Upstream CMS API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Public API path
    pub api_path: String,
    /// API path reachable from the server side only
    pub internal_api_path: Option<String>,
    /// API path used through the development proxy
    pub dev_proxy_to_api_path: Option<String>,
    /// Development mode (no traverse suffix, dev proxy allowed)
    pub development: bool,
    /// Legacy traversal: content is fetched without the `++api++` suffix
    pub legacy_traverse: bool,
    /// Search endpoint used to resolve listing queries
    pub search_endpoint: SearchEndpoint,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            api_path: "http://localhost:8080/Plone".to_string(),
            internal_api_path: None,
            dev_proxy_to_api_path: None,
            development: false,
            legacy_traverse: false,
            search_endpoint: SearchEndpoint::default(),
        }
    }
}

impl ApiSettings {
    /// Base path for outbound API calls
    pub fn base_path(&self) -> &str {
        let base = if let Some(ref internal) = self.internal_api_path {
            internal
        } else if let (true, Some(dev)) = (self.development, self.dev_proxy_to_api_path.as_ref()) {
            dev
        } else {
            &self.api_path
        };
        base.trim_end_matches('/')
    }

    /// Suffix inserted between the base path and a content path
    pub fn traverse_suffix(&self) -> &'static str {
        if self.development || self.legacy_traverse {
            ""
        } else {
            "/++api++"
        }
    }

    /// Full URL of a content object
    pub fn content_url(&self, content_path: &str) -> String {
        format!("{}{}{}", self.base_path(), self.traverse_suffix(), content_path)
    }
}

/// Search endpoint flavour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchEndpoint {
    /// `POST @querystring-search` with the query as JSON body
    #[default]
    QuerystringSearch,
    /// `GET @search` with the query flattened into parameters
    Search,
}

/// Output feed format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedFormat {
    /// RSS 2.0
    #[default]
    Rss2,
    /// Atom 1.0
    Atom,
}

impl FeedFormat {
    /// Parse a format name as used in settings
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "rss" | "rss2" => Some(Self::Rss2),
            "atom" => Some(Self::Atom),
            _ => None,
        }
    }

    /// Response content type
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Rss2 => "application/rss+xml",
            Self::Atom => "application/atom+xml",
        }
    }
}

/// Feed generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
    /// Public URL of the site, used for feed and item links
    pub public_url: String,
    /// Batch size when the listing query does not set one
    pub default_page_size: u32,
    /// Output format
    pub format: FeedFormat,
    /// Maximum title length (None = no truncation)
    pub max_title_length: Option<usize>,
    /// Maximum description length (None = no truncation)
    pub max_description_length: Option<usize>,
    /// Feed description when the content object has none
    pub default_description: String,
    /// Feed language when the content object has none
    pub default_language: String,
    /// Generator name written into the feed
    pub generator: String,
    /// Issue a HEAD request for enclosures without a known size
    pub probe_enclosure_size: bool,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            public_url: "http://localhost:3000".to_string(),
            default_page_size: 25,
            format: FeedFormat::default(),
            max_title_length: None,
            max_description_length: None,
            default_description: "A Volto RSS Feed".to_string(),
            default_language: "en".to_string(),
            generator: "RSS Feed Generator".to_string(),
            probe_enclosure_size: false,
        }
    }
}

impl FeedSettings {
    /// Public URL without trailing slash
    pub fn site_url(&self) -> &str {
        self.public_url.trim_end_matches('/')
    }

    /// Absolute feed link for a content path
    pub fn feed_link(&self, content_path: &str) -> String {
        format!("{}{}/rss.xml", self.site_url(), content_path.trim_end_matches('/'))
    }
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Request timeout in seconds
    pub request_timeout: f64,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// User agent string (none = crate name and version)
    pub useragent: Option<String>,
    /// Proxy settings
    pub proxies: ProxySettings,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: 10.0,
            verify_ssl: true,
            useragent: None,
            proxies: ProxySettings::default(),
        }
    }
}

/// Proxy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub http: Option<String>,
    pub https: Option<String>,
    pub all: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.feed.default_page_size, 25);
        assert_eq!(settings.feed.format, FeedFormat::Rss2);
        assert!(settings.feed.max_title_length.is_none());
    }

    #[test]
    fn test_base_path_selection() {
        let mut api = ApiSettings {
            api_path: "https://example.com/".to_string(),
            ..Default::default()
        };
        assert_eq!(api.base_path(), "https://example.com");

        api.dev_proxy_to_api_path = Some("http://localhost:8080/Plone".to_string());
        assert_eq!(api.base_path(), "https://example.com");
        api.development = true;
        assert_eq!(api.base_path(), "http://localhost:8080/Plone");

        api.internal_api_path = Some("http://backend:8080/Plone".to_string());
        assert_eq!(api.base_path(), "http://backend:8080/Plone");
    }

    #[test]
    fn test_content_url_suffix() {
        let mut api = ApiSettings {
            api_path: "https://example.com".to_string(),
            ..Default::default()
        };
        assert_eq!(api.content_url("/news"), "https://example.com/++api++/news");

        api.legacy_traverse = true;
        assert_eq!(api.content_url("/news"), "https://example.com/news");
    }

    #[test]
    fn test_merge_vars() {
        let vars: HashMap<&str, &str> = [
            ("RSS_FEED_PORT", "8081"),
            ("RSS_FEED_PUBLIC_URL", "https://www.example.org"),
            ("RSS_FEED_LEGACY_TRAVERSE", "true"),
            ("RSS_FEED_FEED_FORMAT", "atom"),
            ("RSS_FEED_DEFAULT_PAGE_SIZE", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        settings.merge_vars(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(settings.server.port, 8081);
        assert_eq!(settings.feed.public_url, "https://www.example.org");
        assert!(settings.api.legacy_traverse);
        assert_eq!(settings.feed.format, FeedFormat::Atom);
        assert_eq!(settings.feed.default_page_size, 25);
    }

    #[test]
    fn test_yaml_sections() {
        let yaml = r#"
feed:
  format: atom
  max_title_length: 80
api:
  search_endpoint: search
"#;
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(settings.feed.format, FeedFormat::Atom);
        assert_eq!(settings.feed.max_title_length, Some(80));
        assert_eq!(settings.feed.default_page_size, 25);
        assert_eq!(settings.api.search_endpoint, SearchEndpoint::Search);
    }

    #[test]
    fn test_feed_link() {
        let feed = FeedSettings {
            public_url: "https://example.com/".to_string(),
            ..Default::default()
        };
        assert_eq!(feed.feed_link("/news/"), "https://example.com/news/rss.xml");
    }
}
