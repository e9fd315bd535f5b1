//! Format-neutral feed document and its assembly from listing items

use crate::config::FeedSettings;
use crate::query::FeedMeta;
use crate::search::Item;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use url::Url;

/// Enclosure MIME type when neither the scale nor the item names one
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// Appended to truncated text
const ELLIPSIS: &str = "...";

/// Preferred image scale for enclosures
const ENCLOSURE_SCALE: &str = "preview";

/// Feed ready for serialization
#[derive(Debug, Clone, PartialEq)]
pub struct FeedDocument {
    pub title: String,
    pub description: String,
    /// Site link
    pub link: String,
    /// Absolute URL of this feed
    pub feed_url: String,
    pub language: String,
    pub pub_date: Option<DateTime<FixedOffset>>,
    pub categories: Vec<String>,
    pub generator: String,
    pub entries: Vec<FeedEntry>,
}

/// One feed entry
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub title: String,
    pub description: Option<String>,
    pub link: String,
    pub guid: String,
    /// Whether `guid` is the entry link
    pub guid_is_permalink: bool,
    pub date: Option<DateTime<FixedOffset>>,
    pub author: Option<String>,
    pub categories: Vec<String>,
    pub enclosure: Option<Enclosure>,
}

/// Attached media reference
#[derive(Debug, Clone, PartialEq)]
pub struct Enclosure {
    pub url: String,
    pub mime_type: String,
    /// Byte size, when known
    pub size: Option<u64>,
}

impl FeedDocument {
    /// Date for the feed `updated` field: own date, else newest entry, else now
    pub fn updated(&self) -> DateTime<FixedOffset> {
        self.pub_date
            .or_else(|| self.entries.iter().filter_map(|e| e.date).max())
            .unwrap_or_else(|| Utc::now().into())
    }
}

/// Builds feed documents from listing items
pub struct FeedAssembler<'a> {
    settings: &'a FeedSettings,
}

impl<'a> FeedAssembler<'a> {
    pub fn new(settings: &'a FeedSettings) -> Self {
        Self { settings }
    }

    /// Assemble the document for `meta` and `items`, keeping item order
    pub fn assemble(&self, meta: &FeedMeta, feed_url: &str, items: &[Item]) -> FeedDocument {
        let max_title = meta.max_title_length.or(self.settings.max_title_length);
        let max_description = meta
            .max_description_length
            .or(self.settings.max_description_length);

        let description = meta
            .description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(self.settings.default_description.as_str());

        let entries = items
            .iter()
            .map(|item| self.entry(item, max_title, max_description))
            .collect();

        FeedDocument {
            title: meta.title.clone(),
            description: truncate(description, max_description),
            link: self.settings.site_url().to_string(),
            feed_url: feed_url.to_string(),
            language: meta
                .language
                .clone()
                .unwrap_or_else(|| self.settings.default_language.clone()),
            pub_date: meta.date.as_deref().and_then(parse_date),
            categories: meta.subjects.clone(),
            generator: self.settings.generator.clone(),
            entries,
        }
    }

    fn entry(&self, item: &Item, max_title: Option<usize>, max_description: Option<usize>) -> FeedEntry {
        let link = self.resolve_link(item.link());
        let (guid, guid_is_permalink) = match item.uid.as_deref().filter(|u| !u.is_empty()) {
            Some(uid) => (uid.to_string(), false),
            None => (link.clone(), true),
        };

        let author = item
            .creators
            .as_ref()
            .filter(|c| !c.is_empty())
            .map(|c| c.join(", "));

        FeedEntry {
            title: truncate(&item.title, max_title),
            description: item
                .description
                .as_deref()
                .filter(|d| !d.is_empty())
                .map(|d| truncate(d, max_description)),
            enclosure: enclosure(item, &link),
            link,
            guid,
            guid_is_permalink,
            date: item.date().and_then(parse_date),
            author,
            categories: item.subjects.clone().unwrap_or_default(),
        }
    }

    /// Absolute item link; relative paths resolve against the public URL
    fn resolve_link(&self, link: Option<&str>) -> String {
        let site = self.settings.site_url();
        let Some(link) = link else {
            return site.to_string();
        };
        if Url::parse(link).is_ok() {
            return link.to_string();
        }
        match Url::parse(&format!("{}/", site)).and_then(|base| base.join(link.trim_start_matches('/'))) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{}/{}", site, link.trim_start_matches('/')),
        }
    }
}

/// Enclosure for the item's lead image, when it has one
pub fn enclosure(item: &Item, link: &str) -> Option<Enclosure> {
    let image = item.image()?;
    let download = image
        .scales
        .get(ENCLOSURE_SCALE)
        .and_then(|s| s.download.as_deref())
        .or(image.download.as_deref())?;

    let url = if Url::parse(download).is_ok() {
        download.to_string()
    } else {
        format!("{}/{}", link.trim_end_matches('/'), download.trim_start_matches('/'))
    };

    let mime_type = image
        .content_type
        .as_deref()
        .or(item.content_type.as_deref())
        .unwrap_or(FALLBACK_MIME_TYPE)
        .to_string();

    Some(Enclosure {
        url,
        mime_type,
        size: image.size,
    })
}

/// Cut `text` to `max` characters plus an ellipsis
pub fn truncate(text: &str, max: Option<usize>) -> String {
    match max {
        Some(max) if text.chars().count() > max => {
            let mut cut: String = text.chars().take(max).collect();
            cut.push_str(ELLIPSIS);
            cut
        }
        _ => text.to_string(),
    }
}

/// Parse a CMS date; naive values are taken as UTC
pub fn parse_date(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    if value.is_empty() || value == "None" {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc().fixed_offset());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}
