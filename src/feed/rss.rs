//! RSS 2.0 serialization

use super::document::{FeedDocument, FeedEntry};
use crate::error::FeedError;
use rss::{CategoryBuilder, ChannelBuilder, EnclosureBuilder, GuidBuilder, ItemBuilder};

/// Serialize `doc` as an indented RSS 2.0 document
pub fn to_rss(doc: &FeedDocument) -> Result<String, FeedError> {
    let items: Vec<rss::Item> = doc.entries.iter().map(entry_to_rss_item).collect();

    let channel = ChannelBuilder::default()
        .title(doc.title.clone())
        .link(doc.link.clone())
        .description(doc.description.clone())
        .language(doc.language.clone())
        .pub_date(doc.pub_date.map(|d| d.to_rfc2822()))
        .generator(doc.generator.clone())
        .categories(categories(&doc.categories))
        .items(items)
        .build();

    let bytes = channel
        .pretty_write_to(Vec::new(), b' ', 2)
        .map_err(|e| FeedError::Build(format!("RSS serialization failed: {e}")))?;
    String::from_utf8(bytes).map_err(|e| FeedError::Build(e.to_string()))
}

fn entry_to_rss_item(entry: &FeedEntry) -> rss::Item {
    let guid = GuidBuilder::default()
        .value(entry.guid.clone())
        .permalink(entry.guid_is_permalink)
        .build();

    let enclosure = entry.enclosure.as_ref().map(|e| {
        EnclosureBuilder::default()
            .url(e.url.clone())
            .mime_type(e.mime_type.clone())
            .length(e.size.unwrap_or(0).to_string())
            .build()
    });

    ItemBuilder::default()
        .title(Some(entry.title.clone()))
        .link(Some(entry.link.clone()))
        .description(entry.description.clone())
        .guid(Some(guid))
        .pub_date(entry.date.map(|d| d.to_rfc2822()))
        .author(entry.author.clone())
        .categories(categories(&entry.categories))
        .enclosure(enclosure)
        .build()
}

fn categories(names: &[String]) -> Vec<rss::Category> {
    names
        .iter()
        .map(|name| CategoryBuilder::default().name(name.clone()).build())
        .collect()
}
