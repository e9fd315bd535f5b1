//! Search module
//!
//! Submits listing queries to the CMS and decodes the matching items.

mod fetcher;
mod models;

pub use fetcher::ListingFetcher;
pub use models::{ImageScale, Item, ScaleInfo, SearchResponse};
