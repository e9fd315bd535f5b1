//! Atom 1.0 serialization

use super::document::{FeedDocument, FeedEntry};
use crate::error::FeedError;
use atom_syndication::{
    CategoryBuilder, Entry, EntryBuilder, FixedDateTime, GeneratorBuilder, Link, LinkBuilder,
    Person, PersonBuilder, Text, WriteConfig,
};

/// Serialize `doc` as an indented Atom 1.0 document
pub fn to_atom(doc: &FeedDocument) -> Result<String, FeedError> {
    let updated = doc.updated();

    let self_link: Link = LinkBuilder::default()
        .href(doc.feed_url.clone())
        .rel("self".to_string())
        .mime_type(Some("application/atom+xml".to_string()))
        .build();

    let alternate_link: Link = LinkBuilder::default()
        .href(doc.link.clone())
        .rel("alternate".to_string())
        .build();

    let entries: Vec<Entry> = doc
        .entries
        .iter()
        .map(|entry| entry_to_atom(entry, updated))
        .collect();

    let feed = atom_syndication::FeedBuilder::default()
        .title(Text::plain(doc.title.clone()))
        .id(doc.feed_url.clone())
        .updated(updated)
        .links(vec![self_link, alternate_link])
        .subtitle(Some(Text::plain(doc.description.clone())))
        .generator(Some(
            GeneratorBuilder::default().value(doc.generator.clone()).build(),
        ))
        .lang(Some(doc.language.clone()))
        .categories(categories(&doc.categories))
        .entries(entries)
        .build();

    let config = WriteConfig {
        write_document_declaration: true,
        indent_size: Some(2),
    };
    let bytes = feed
        .write_with_config(Vec::new(), config)
        .map_err(|e| FeedError::Build(format!("Atom serialization failed: {e}")))?;
    String::from_utf8(bytes).map_err(|e| FeedError::Build(e.to_string()))
}

fn entry_to_atom(entry: &FeedEntry, feed_updated: FixedDateTime) -> Entry {
    let mut links = vec![LinkBuilder::default()
        .href(entry.link.clone())
        .rel("alternate".to_string())
        .build()];

    if let Some(ref enclosure) = entry.enclosure {
        links.push(
            LinkBuilder::default()
                .href(enclosure.url.clone())
                .rel("enclosure".to_string())
                .mime_type(Some(enclosure.mime_type.clone()))
                .length(Some(enclosure.size.unwrap_or(0).to_string()))
                .build(),
        );
    }

    let authors: Vec<Person> = entry
        .author
        .as_ref()
        .map(|name| vec![PersonBuilder::default().name(name.clone()).build()])
        .unwrap_or_default();

    EntryBuilder::default()
        .title(Text::plain(entry.title.clone()))
        .id(entry.guid.clone())
        .updated(entry.date.unwrap_or(feed_updated))
        .published(entry.date)
        .links(links)
        .summary(entry.description.clone().map(Text::plain))
        .authors(authors)
        .categories(categories(&entry.categories))
        .build()
}

fn categories(terms: &[String]) -> Vec<atom_syndication::Category> {
    terms
        .iter()
        .map(|term| CategoryBuilder::default().term(term.clone()).build())
        .collect()
}
