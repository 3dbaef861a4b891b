//! Notion block objects as returned by the block-children endpoint.

use super::RichText;
use crate::types::BlockId;
use serde::Deserialize;

/// One block plus its (separately fetched) children.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BlockObject {
    pub id: BlockId,
    #[serde(default)]
    pub has_children: bool,
    #[serde(flatten)]
    pub kind: BlockKind,
    #[serde(skip)]
    pub children: Vec<BlockObject>,
}

impl BlockObject {
    /// Builds a childless block. Mostly useful for fixtures.
    pub fn new(kind: BlockKind) -> Self {
        Self {
            id: BlockId::new_v4(),
            has_children: false,
            kind,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<BlockObject>) -> Self {
        self.has_children = !children.is_empty();
        self.children = children;
        self
    }

    /// Whether children should be fetched when converting to markdown.
    ///
    /// Child pages are separate posts and are never descended into.
    pub fn wants_children(&self) -> bool {
        self.has_children && !matches!(self.kind, BlockKind::ChildPage { .. })
    }

    pub fn is_list_item(&self) -> bool {
        matches!(
            self.kind,
            BlockKind::BulletedListItem { .. }
                | BlockKind::NumberedListItem { .. }
                | BlockKind::ToDo { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockKind {
    Paragraph {
        paragraph: TextPayload,
    },
    #[serde(rename = "heading_1")]
    Heading1 {
        heading_1: TextPayload,
    },
    #[serde(rename = "heading_2")]
    Heading2 {
        heading_2: TextPayload,
    },
    #[serde(rename = "heading_3")]
    Heading3 {
        heading_3: TextPayload,
    },
    BulletedListItem {
        bulleted_list_item: TextPayload,
    },
    NumberedListItem {
        numbered_list_item: TextPayload,
    },
    ToDo {
        to_do: ToDoPayload,
    },
    Toggle {
        toggle: TextPayload,
    },
    Quote {
        quote: TextPayload,
    },
    Callout {
        callout: CalloutPayload,
    },
    Code {
        code: CodePayload,
    },
    Equation {
        equation: EquationPayload,
    },
    Divider {},
    Image {
        image: FilePayload,
    },
    Video {
        video: FilePayload,
    },
    File {
        file: FilePayload,
    },
    Pdf {
        pdf: FilePayload,
    },
    Bookmark {
        bookmark: LinkPayload,
    },
    Embed {
        embed: LinkPayload,
    },
    ChildPage {
        child_page: ChildPagePayload,
    },
    Table {
        table: TablePayload,
    },
    TableRow {
        table_row: TableRowPayload,
    },
    ColumnList {},
    Column {},
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct TextPayload {
    #[serde(default)]
    pub rich_text: Vec<RichText>,
}

impl TextPayload {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            rich_text: vec![RichText::plain(text)],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ToDoPayload {
    #[serde(default)]
    pub rich_text: Vec<RichText>,
    #[serde(default)]
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CalloutPayload {
    #[serde(default)]
    pub rich_text: Vec<RichText>,
    #[serde(default)]
    pub icon: Option<Icon>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Icon {
    Emoji {
        emoji: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CodePayload {
    #[serde(default)]
    pub rich_text: Vec<RichText>,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub caption: Vec<RichText>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EquationPayload {
    pub expression: String,
}

/// Hosted (`file`) or linked (`external`) media.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct FilePayload {
    #[serde(default)]
    pub external: Option<FileUrl>,
    #[serde(default)]
    pub file: Option<FileUrl>,
    #[serde(default)]
    pub caption: Vec<RichText>,
    #[serde(default)]
    pub name: Option<String>,
}

impl FilePayload {
    pub fn url(&self) -> Option<&str> {
        self.external
            .as_ref()
            .or(self.file.as_ref())
            .map(|f| f.url.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FileUrl {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LinkPayload {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub caption: Vec<RichText>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChildPagePayload {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TablePayload {
    #[serde(default)]
    pub table_width: usize,
    #[serde(default)]
    pub has_column_header: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TableRowPayload {
    #[serde(default)]
    pub cells: Vec<Vec<RichText>>,
}
