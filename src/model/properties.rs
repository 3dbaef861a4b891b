//! Accessors that pull display fields out of a page's properties.
//!
//! Every accessor degrades to an empty or placeholder value rather than
//! failing: a post with a missing description still renders.

use super::{PageObject, PropertyValue, RichText};
use serde::{Deserialize, Serialize};

const UNTITLED: &str = "Untitled";
const TITLE_FALLBACK_PROPERTIES: [&str; 2] = ["Name", "Title"];
const DESCRIPTION_PROPERTIES: [&str; 3] = ["Description", "Summary", "Excerpt"];
const TAGS_PROPERTY: &str = "Tags";
const STATUS_PROPERTY: &str = "Status";

/// A multi-select tag as shown on a post card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Option<String>,
    pub name: String,
    pub color: String,
}

/// Concatenates the plain text of a rich-text array.
pub fn plain_text(runs: &[RichText]) -> String {
    runs.iter().map(|run| run.plain_text.as_str()).collect()
}

/// The post title: the page's `title` property, then `Name`/`Title`, else "Untitled".
pub fn page_title(page: &PageObject) -> String {
    let title_of = |value: &PropertyValue| match value {
        PropertyValue::Title { title } if !title.is_empty() => Some(plain_text(title)),
        _ => None,
    };

    page.properties
        .values()
        .find_map(title_of)
        .or_else(|| {
            TITLE_FALLBACK_PROPERTIES
                .iter()
                .filter_map(|name| page.properties.get(*name))
                .find_map(title_of)
        })
        .filter(|title| !title.trim().is_empty())
        .unwrap_or_else(|| UNTITLED.to_string())
}

/// The first non-empty of `Description`, `Summary`, `Excerpt`.
pub fn page_description(page: &PageObject) -> String {
    DESCRIPTION_PROPERTIES
        .iter()
        .filter_map(|name| page.properties.get(*name))
        .find_map(|value| match value {
            PropertyValue::RichText { rich_text } if !rich_text.is_empty() => {
                Some(plain_text(rich_text))
            }
            _ => None,
        })
        .unwrap_or_default()
}

/// Creation date in long form, e.g. "March 5, 2024".
pub fn page_date(page: &PageObject) -> String {
    page.created_time.format("%B %-d, %Y").to_string()
}

/// Options of the `Tags` multi-select, in Notion's order.
pub fn page_tags(page: &PageObject) -> Vec<Tag> {
    match page.properties.get(TAGS_PROPERTY) {
        Some(PropertyValue::MultiSelect { multi_select }) => multi_select
            .iter()
            .map(|option| Tag {
                id: option.id.clone(),
                name: option.name.clone(),
                color: option.color.clone().unwrap_or_else(|| "default".to_string()),
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// The `Status` select (or status) value, if set.
pub fn page_status(page: &PageObject) -> Option<String> {
    match page.properties.get(STATUS_PROPERTY)? {
        PropertyValue::Select { select: Some(option) }
        | PropertyValue::Status { status: Some(option) } => Some(option.name.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn page(properties: serde_json::Value) -> PageObject {
        serde_json::from_value(json!({
            "id": "550e8400e29b41d4a716446655440000",
            "created_time": "2024-03-05T10:00:00.000Z",
            "last_edited_time": "2024-03-05T10:00:00.000Z",
            "properties": properties,
        }))
        .unwrap()
    }

    #[test]
    fn title_comes_from_any_title_typed_property() {
        let p = page(json!({
            "Post": { "type": "title", "title": [
                { "plain_text": "Rust " }, { "plain_text": "caching" }
            ]}
        }));
        assert_eq!(page_title(&p), "Rust caching");
    }

    #[test]
    fn title_falls_back_to_untitled() {
        assert_eq!(page_title(&page(json!({}))), "Untitled");
        let empty = page(json!({ "Name": { "type": "title", "title": [] } }));
        assert_eq!(page_title(&empty), "Untitled");
    }

    #[test]
    fn description_prefers_description_over_summary() {
        let p = page(json!({
            "Summary": { "type": "rich_text", "rich_text": [{ "plain_text": "short" }] },
            "Description": { "type": "rich_text", "rich_text": [{ "plain_text": "long form" }] }
        }));
        assert_eq!(page_description(&p), "long form");

        let only_excerpt = page(json!({
            "Excerpt": { "type": "rich_text", "rich_text": [{ "plain_text": "teaser" }] }
        }));
        assert_eq!(page_description(&only_excerpt), "teaser");
        assert_eq!(page_description(&page(json!({}))), "");
    }

    #[test]
    fn date_is_long_form() {
        assert_eq!(page_date(&page(json!({}))), "March 5, 2024");
    }

    #[test]
    fn tags_and_status() {
        let p = page(json!({
            "Tags": { "type": "multi_select", "multi_select": [
                { "id": "a", "name": "rust", "color": "orange" },
                { "name": "web" }
            ]},
            "Status": { "type": "status", "status": { "name": "Blogs" } }
        }));

        assert_eq!(
            page_tags(&p),
            vec![
                Tag {
                    id: Some("a".to_string()),
                    name: "rust".to_string(),
                    color: "orange".to_string(),
                },
                Tag {
                    id: None,
                    name: "web".to_string(),
                    color: "default".to_string(),
                },
            ]
        );
        assert_eq!(page_status(&p).as_deref(), Some("Blogs"));
        assert!(page_tags(&page(json!({}))).is_empty());
    }
}
