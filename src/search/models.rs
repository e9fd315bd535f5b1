//! Search result records

use crate::content::null_as_default;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Body of a search response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub items: Vec<Item>,
    pub items_total: Option<u64>,
}

/// One catalog record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Item {
    #[serde(rename = "@id")]
    pub id: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "getURL")]
    pub url: Option<String>,
    #[serde(rename = "UID")]
    pub uid: Option<String>,
    pub effective: Option<String>,
    pub modified: Option<String>,
    #[serde(rename = "listCreators")]
    pub creators: Option<Vec<String>>,
    #[serde(rename = "Subject")]
    pub subjects: Option<Vec<String>>,
    pub image_field: Option<String>,
    pub image_scales: Option<HashMap<String, Vec<ImageScale>>>,
    #[serde(rename = "content-type")]
    pub content_type: Option<String>,
}

/// Image record of an image field
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageScale {
    pub download: Option<String>,
    pub filename: Option<String>,
    pub size: Option<u64>,
    #[serde(rename = "content-type")]
    pub content_type: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub scales: HashMap<String, ScaleInfo>,
}

/// A named scale of an image
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleInfo {
    pub download: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Item {
    /// Item URL, preferring `getURL` over `@id`
    pub fn link(&self) -> Option<&str> {
        self.url
            .as_deref()
            .or(self.id.as_deref())
            .filter(|l| !l.is_empty())
    }

    /// Date shown in the feed: `effective`, else `modified`
    pub fn date(&self) -> Option<&str> {
        known_date(&self.effective).or_else(|| known_date(&self.modified))
    }

    /// First image record of the configured image field
    pub fn image(&self) -> Option<&ImageScale> {
        let field = self.image_field.as_deref().filter(|f| !f.is_empty())?;
        self.image_scales.as_ref()?.get(field)?.first()
    }
}

/// Plone sends the string `"None"` for an unset date
fn known_date(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != "None")
}
