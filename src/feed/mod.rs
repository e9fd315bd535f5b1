//! Feed module
//!
//! Assembles listing items into a feed document and serializes it as
//! RSS 2.0 or Atom 1.0.

mod atom;
mod document;
mod rss;

pub use self::atom::to_atom;
pub use self::document::{
    enclosure, parse_date, truncate, Enclosure, FeedAssembler, FeedDocument, FeedEntry,
    FALLBACK_MIME_TYPE,
};
pub use self::rss::to_rss;

use crate::config::FeedFormat;
use crate::error::FeedError;

/// Serialize `doc` in the requested format
pub fn render(doc: &FeedDocument, format: FeedFormat) -> Result<String, FeedError> {
    match format {
        FeedFormat::Rss2 => to_rss(doc),
        FeedFormat::Atom => to_atom(doc),
    }
}
