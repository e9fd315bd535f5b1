//! Volto-RSS-RS: RSS and Atom feeds for Volto listing blocks
//!
//! Each request to `<content path>/rss.xml` reads the saved query of the
//! content object's listing block, runs it against the CMS search
//! endpoint and answers with the matching items as a feed.

pub mod config;
pub mod content;
pub mod error;
pub mod feed;
pub mod network;
pub mod pipeline;
pub mod query;
pub mod search;
pub mod web;

pub use config::Settings;
pub use error::FeedError;
pub use pipeline::FeedPipeline;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
