//! Listing query extraction
//!
//! Turns the saved query of a content object's listing block into the
//! search query sent to the CMS. Feeds always start at the first batch and
//! ask for every metadata column.

use crate::content::{ContentObject, Criterion, SortOrderValue, LISTING_BLOCK};
use crate::error::FeedError;
use serde::Serialize;
use serde_json::{Map, Value};

/// Metadata columns requested from the catalog
pub const ALL_METADATA: &str = "_all";

/// Search query derived from a listing block
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Query {
    pub query: Vec<Criterion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_on: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<Value>,
    pub b_size: u32,
    pub b_start: u32,
    pub metadata_fields: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Query {
    /// Flatten into `@search` parameters
    ///
    /// Criteria become `index=value`; list values repeat the key. Operators
    /// have no `@search` counterpart and are dropped.
    pub fn to_search_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        for criterion in &self.query {
            match criterion.value {
                Value::Array(ref values) => {
                    for value in values {
                        if let Some(v) = scalar_param(value) {
                            params.push((criterion.index.clone(), v));
                        }
                    }
                }
                ref value => {
                    if let Some(v) = scalar_param(value) {
                        params.push((criterion.index.clone(), v));
                    }
                }
            }
        }
        if let Some(ref sort_on) = self.sort_on {
            params.push(("sort_on".to_string(), sort_on.clone()));
        }
        if let Some(sort_order) = self.sort_order.as_ref().and_then(scalar_param) {
            params.push(("sort_order".to_string(), sort_order));
        }
        params.push(("b_size".to_string(), self.b_size.to_string()));
        params.push(("b_start".to_string(), self.b_start.to_string()));
        params.push(("metadata_fields".to_string(), self.metadata_fields.clone()));
        params
    }
}

fn scalar_param(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Array(_) | Value::Object(_) => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Feed-level metadata taken from the content object
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedMeta {
    pub title: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub subjects: Vec<String>,
    pub date: Option<String>,
    pub max_title_length: Option<usize>,
    pub max_description_length: Option<usize>,
}

/// Everything the feed needs from its content object
#[derive(Debug, Clone, PartialEq)]
pub struct ListingQuery {
    pub query: Query,
    pub meta: FeedMeta,
}

/// Derive the listing query of a content object
pub fn extract(content: &ContentObject, default_page_size: u32) -> Result<ListingQuery, FeedError> {
    let querystring = content
        .find_block(LISTING_BLOCK)?
        .and_then(|block| block.querystring)
        .ok_or(FeedError::MissingQuery)?;

    // Only the boolean "reversed" flag is translated
    let sort_order = querystring.sort_order.map(|order| match order {
        SortOrderValue::Reversed(true) => Value::from("descending"),
        SortOrderValue::Reversed(false) => Value::from("ascending"),
        SortOrderValue::Named(name) => Value::String(name),
        SortOrderValue::Other(value) => value,
    });

    let b_size = querystring
        .b_size
        .as_ref()
        .and_then(batch_size)
        .unwrap_or(default_page_size);

    let mut extra = querystring.extra;
    extra.remove("b_start");
    extra.remove("metadata_fields");

    let query = Query {
        query: querystring.query,
        sort_on: querystring.sort_on,
        sort_order,
        b_size,
        b_start: 0,
        metadata_fields: ALL_METADATA.to_string(),
        extra,
    };

    let meta = FeedMeta {
        title: content.title.clone(),
        description: content.description.clone(),
        language: content.language_token().map(str::to_string),
        subjects: content.subjects.clone(),
        date: content.effective.clone(),
        max_title_length: content.max_title_length,
        max_description_length: content.max_description_length,
    };

    Ok(ListingQuery { query, meta })
}

/// Positive batch size from a number or numeric string
fn batch_size(value: &Value) -> Option<u32> {
    let size = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    u32::try_from(size).ok().filter(|&s| s > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn content_with(querystring: Value) -> ContentObject {
        serde_json::from_value(json!({
            "title": "Latest news",
            "description": "What happened",
            "language": {"token": "en"},
            "subjects": ["news"],
            "effective": "2024-03-01T09:00:00+00:00",
            "blocks": {
                "t": {"@type": "title"},
                "l": {"@type": "listing", "querystring": querystring}
            }
        }))
        .unwrap()
    }

    fn news_criterion() -> Value {
        json!({
            "i": "portal_type",
            "o": "plone.app.querystring.operation.selection.any",
            "v": ["News Item"]
        })
    }

    #[test]
    fn test_reversed_true_is_descending() {
        let content = content_with(json!({"query": [news_criterion()], "sort_order": true}));
        let listing = extract(&content, 25).unwrap();
        assert_eq!(listing.query.sort_order, Some(json!("descending")));
    }

    #[test]
    fn test_reversed_false_is_ascending() {
        let content = content_with(json!({"query": [news_criterion()], "sort_order": false}));
        let listing = extract(&content, 25).unwrap();
        assert_eq!(listing.query.sort_order, Some(json!("ascending")));
    }

    #[test]
    fn test_named_sort_order_passes_through() {
        let content = content_with(json!({"query": [], "sort_order": "reverse"}));
        let listing = extract(&content, 25).unwrap();
        assert_eq!(listing.query.sort_order, Some(json!("reverse")));
    }

    #[test]
    fn test_non_boolean_sort_order_passes_through() {
        let content = content_with(json!({"query": [], "sort_order": 1}));
        let listing = extract(&content, 25).unwrap();
        assert_eq!(listing.query.sort_order, Some(json!(1)));

        let body = serde_json::to_value(&listing.query).unwrap();
        assert_eq!(body["sort_order"], 1);
        assert!(listing
            .query
            .to_search_params()
            .contains(&("sort_order".to_string(), "1".to_string())));
    }

    #[test]
    fn test_criterion_without_operator() {
        let content = content_with(json!({
            "query": [{"i": "portal_type", "v": ["News Item", "Event"]}]
        }));
        let listing = extract(&content, 25).unwrap();
        let body = serde_json::to_value(&listing.query).unwrap();

        assert_eq!(
            body["query"][0],
            json!({"i": "portal_type", "v": ["News Item", "Event"]})
        );
        assert_eq!(
            listing.query.to_search_params()[1],
            ("portal_type".to_string(), "Event".to_string())
        );
    }

    #[test]
    fn test_undecodable_listing_block() {
        let content = content_with(json!({"query": {"i": "portal_type"}}));
        assert!(matches!(extract(&content, 25), Err(FeedError::Decode(_))));
    }

    #[test]
    fn test_default_page_size() {
        let content = content_with(json!({"query": []}));
        assert_eq!(extract(&content, 25).unwrap().query.b_size, 25);

        let content = content_with(json!({"query": [], "b_size": 0}));
        assert_eq!(extract(&content, 25).unwrap().query.b_size, 25);

        let content = content_with(json!({"query": [], "b_size": "10"}));
        assert_eq!(extract(&content, 25).unwrap().query.b_size, 10);
    }

    #[test]
    fn test_paging_reset_and_metadata() {
        let content = content_with(json!({
            "query": [news_criterion()],
            "b_size": 5,
            "b_start": 40,
            "limit": "20",
            "metadata_fields": "UID"
        }));
        let listing = extract(&content, 25).unwrap();
        let body = serde_json::to_value(&listing.query).unwrap();

        assert_eq!(body["b_start"], 0);
        assert_eq!(body["b_size"], 5);
        assert_eq!(body["metadata_fields"], "_all");
        assert_eq!(body["limit"], "20");
        assert_eq!(body["query"][0]["i"], "portal_type");
    }

    #[test]
    fn test_missing_listing_block() {
        let content: ContentObject =
            serde_json::from_value(json!({"blocks": {"t": {"@type": "title"}}})).unwrap();
        assert!(matches!(extract(&content, 25), Err(FeedError::MissingQuery)));
    }

    #[test]
    fn test_listing_without_querystring() {
        let content: ContentObject =
            serde_json::from_value(json!({"blocks": {"l": {"@type": "listing"}}})).unwrap();
        assert!(matches!(extract(&content, 25), Err(FeedError::MissingQuery)));
    }

    #[test]
    fn test_feed_meta() {
        let content = content_with(json!({"query": []}));
        let meta = extract(&content, 25).unwrap().meta;
        assert_eq!(meta.title, "Latest news");
        assert_eq!(meta.language.as_deref(), Some("en"));
        assert_eq!(meta.subjects, vec!["news"]);
        assert_eq!(meta.date.as_deref(), Some("2024-03-01T09:00:00+00:00"));
    }

    #[test]
    fn test_search_params() {
        let content = content_with(json!({
            "query": [news_criterion(), {"i": "review_state", "o": "x", "v": "published"}],
            "sort_on": "effective",
            "sort_order": true
        }));
        let params = extract(&content, 25).unwrap().query.to_search_params();
        let has = |k: &str, v: &str| params.iter().any(|(pk, pv)| pk == k && pv == v);

        assert!(has("portal_type", "News Item"));
        assert!(has("review_state", "published"));
        assert!(has("sort_on", "effective"));
        assert!(has("sort_order", "descending"));
        assert!(has("b_start", "0"));
        assert!(has("metadata_fields", "_all"));
    }
}
