//! Content object schema
//!
//! Typed view of the CMS page that backs a feed. Only the fields the feed
//! needs are modelled; everything else in the payload is ignored.

use crate::error::FeedError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Block type holding a saved search query
pub const LISTING_BLOCK: &str = "listing";

/// CMS page backing a feed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentObject {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    pub description: Option<String>,
    pub language: Option<Language>,
    #[serde(deserialize_with = "null_as_default")]
    pub subjects: Vec<String>,
    /// Publication date as sent by the CMS
    pub effective: Option<String>,
    /// Block id to block configuration, in document order
    #[serde(deserialize_with = "null_as_default")]
    pub blocks: Map<String, Value>,
    pub blocks_layout: Option<BlocksLayout>,
    /// Per-feed title cap, overriding the configured one
    pub max_title_length: Option<usize>,
    /// Per-feed description cap, overriding the configured one
    pub max_description_length: Option<usize>,
}

/// Language vocabulary term
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Language {
    pub token: Option<String>,
    pub title: Option<String>,
}

/// Block ordering
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BlocksLayout {
    pub items: Vec<String>,
}

/// The parts of a block configuration the feed cares about
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Block {
    #[serde(rename = "@type")]
    pub block_type: Option<String>,
    pub querystring: Option<QueryString>,
}

/// Saved search query of a listing block
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryString {
    #[serde(deserialize_with = "null_as_default")]
    pub query: Vec<Criterion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_on: Option<String>,
    /// A boolean "reversed" flag, an explicit order name, or anything else
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrderValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub b_size: Option<Value>,
    /// Remaining keys (limit, depth, ...) forwarded untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One filter criterion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    #[serde(rename = "i")]
    pub index: String,
    #[serde(rename = "o", default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    #[serde(rename = "v", default)]
    pub value: Value,
}

/// Raw `sort_order` as stored by the editor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SortOrderValue {
    Reversed(bool),
    Named(String),
    Other(Value),
}

/// Treat an explicit JSON `null` like a missing field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl ContentObject {
    /// Block ids in display order
    pub fn block_ids(&self) -> Vec<&str> {
        match self.blocks_layout {
            Some(ref layout) if !layout.items.is_empty() => {
                layout.items.iter().map(String::as_str).collect()
            }
            _ => self.blocks.keys().map(String::as_str).collect(),
        }
    }

    /// First block of the given type
    ///
    /// The type is matched on the raw block, so a matching block that does
    /// not decode is an error rather than skipped.
    pub fn find_block(&self, block_type: &str) -> Result<Option<Block>, FeedError> {
        let found = self
            .block_ids()
            .into_iter()
            .filter_map(|id| self.blocks.get(id))
            .find(|value| value.get("@type").and_then(Value::as_str) == Some(block_type));

        match found {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    /// Language token, if any
    pub fn language_token(&self) -> Option<&str> {
        self.language
            .as_ref()
            .and_then(|l| l.token.as_deref())
            .filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_find_listing_block() {
        let content: ContentObject = serde_json::from_value(json!({
            "title": "News feed",
            "blocks": {
                "a": {"@type": "title"},
                "b": {"@type": "listing", "querystring": {"query": []}}
            }
        }))
        .unwrap();

        let block = content.find_block(LISTING_BLOCK).unwrap().unwrap();
        assert!(block.querystring.is_some());
        assert!(content.find_block("image").unwrap().is_none());
    }

    #[test]
    fn test_layout_order_wins() {
        let content: ContentObject = serde_json::from_value(json!({
            "blocks": {
                "first": {"@type": "listing", "querystring": {"query": [], "sort_on": "created"}},
                "second": {"@type": "listing", "querystring": {"query": [], "sort_on": "effective"}}
            },
            "blocks_layout": {"items": ["second", "first"]}
        }))
        .unwrap();

        let block = content.find_block(LISTING_BLOCK).unwrap().unwrap();
        assert_eq!(
            block.querystring.unwrap().sort_on.as_deref(),
            Some("effective")
        );
    }

    #[test]
    fn test_sort_order_variants() {
        let qs: QueryString =
            serde_json::from_value(json!({"query": [], "sort_order": true})).unwrap();
        assert_eq!(qs.sort_order, Some(SortOrderValue::Reversed(true)));

        let qs: QueryString =
            serde_json::from_value(json!({"query": [], "sort_order": "ascending"})).unwrap();
        assert_eq!(
            qs.sort_order,
            Some(SortOrderValue::Named("ascending".to_string()))
        );

        let qs: QueryString =
            serde_json::from_value(json!({"query": [], "sort_order": 1})).unwrap();
        assert_eq!(qs.sort_order, Some(SortOrderValue::Other(json!(1))));
    }

    #[test]
    fn test_criterion_without_operator() {
        let content: ContentObject = serde_json::from_value(json!({
            "blocks": {
                "l": {
                    "@type": "listing",
                    "querystring": {"query": [{"i": "portal_type", "v": ["News Item"]}]}
                }
            }
        }))
        .unwrap();

        let querystring = content
            .find_block(LISTING_BLOCK)
            .unwrap()
            .and_then(|b| b.querystring)
            .unwrap();
        assert_eq!(querystring.query[0].index, "portal_type");
        assert_eq!(querystring.query[0].operator, None);
    }

    #[test]
    fn test_malformed_listing_block_is_an_error() {
        let content: ContentObject = serde_json::from_value(json!({
            "blocks": {
                "a": {"@type": "title", "querystring": "not a query"},
                "b": {"@type": "listing", "querystring": {"query": "oops"}}
            }
        }))
        .unwrap();

        assert!(matches!(
            content.find_block(LISTING_BLOCK),
            Err(FeedError::Decode(_))
        ));
        assert!(content.find_block("image").unwrap().is_none());
    }

    #[test]
    fn test_null_fields() {
        let content: ContentObject = serde_json::from_value(json!({
            "title": null,
            "subjects": null,
            "blocks": null,
            "effective": null
        }))
        .unwrap();
        assert!(content.title.is_empty());
        assert!(content.subjects.is_empty());
        assert!(content.find_block(LISTING_BLOCK).unwrap().is_none());
    }

    #[test]
    fn test_language_token() {
        let content: ContentObject =
            serde_json::from_value(json!({"language": {"token": "de", "title": "Deutsch"}}))
                .unwrap();
        assert_eq!(content.language_token(), Some("de"));
        assert_eq!(ContentObject::default().language_token(), None);
    }
}
