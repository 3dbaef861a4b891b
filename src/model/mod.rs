//! Typed views of the Notion objects the blog consumes.
//!
//! A collection query yields [`PageObject`]s (document summaries); the
//! same type carries a single post's metadata inside a [`DocumentDetail`].
//! Unknown property and block types deserialize into catch-all variants
//! so a new Notion feature never breaks the blog.

pub mod blocks;
pub mod properties;

use crate::error::ContentError;
use crate::types::PageId;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub use blocks::{BlockKind, BlockObject};
pub use properties::{
    page_date, page_description, page_status, page_tags, page_title, plain_text, Tag,
};

/// A Notion page: one row of the blog database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageObject {
    pub id: PageId,
    pub created_time: DateTime<Utc>,
    pub last_edited_time: DateTime<Utc>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub properties: IndexMap<String, PropertyValue>,
}

/// Value of one page property, keyed by Notion's `type` discriminator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyValue {
    Title { title: Vec<RichText> },
    RichText { rich_text: Vec<RichText> },
    Select { select: Option<SelectOption> },
    Status { status: Option<SelectOption> },
    MultiSelect { multi_select: Vec<SelectOption> },
    Date { date: Option<DateValue> },
    Checkbox { checkbox: bool },
    Number { number: Option<f64> },
    Url { url: Option<String> },
    CreatedTime { created_time: DateTime<Utc> },
    LastEditedTime { last_edited_time: DateTime<Utc> },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// Notion dates are either `YYYY-MM-DD` or full RFC 3339 timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateValue {
    pub start: String,
    #[serde(default)]
    pub end: Option<String>,
}

/// One run of rich text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichText {
    #[serde(rename = "type", default)]
    pub kind: RichTextKind,
    pub plain_text: String,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub annotations: Annotations,
}

impl RichText {
    /// Unstyled text run. Mostly useful for fixtures.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            kind: RichTextKind::Text,
            plain_text: text.into(),
            href: None,
            annotations: Annotations::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RichTextKind {
    #[default]
    Text,
    Mention,
    Equation,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Annotations {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub underline: bool,
    pub code: bool,
    pub color: String,
}

/// A single post: rendered body plus its page metadata.
///
/// `partial` is set whenever either half failed to load. A partial detail
/// is still a normal, cacheable result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentDetail {
    pub body: String,
    pub metadata: Option<PageObject>,
    pub partial: bool,
}

impl DocumentDetail {
    /// Joins the two independently settled halves of a detail fetch.
    pub fn from_outcomes(
        body: Result<String, ContentError>,
        metadata: Result<PageObject, ContentError>,
    ) -> Self {
        let partial = body.is_err() || metadata.is_err();
        Self {
            body: body.unwrap_or_default(),
            metadata: metadata.ok(),
            partial,
        }
    }

    /// Whether the body holds anything besides whitespace.
    pub fn has_body(&self) -> bool {
        !self.body.trim().is_empty()
    }
}
