//! Block tree → markdown conversion.
//!
//! Rendering is pure: the block tree, children included, is fetched
//! beforehand (see [`NotionRepository::retrieve_block_tree`]) and this
//! module only turns it into text.
//!
//! [`NotionRepository::retrieve_block_tree`]: crate::api::NotionRepository::retrieve_block_tree

mod rich_text;

pub use rich_text::render_rich_text;

use crate::constants::CHARS_PER_BLOCK_ESTIMATE;
use crate::model::blocks::{FilePayload, LinkPayload, TablePayload};
use crate::model::{plain_text, BlockKind, BlockObject, RichText};

const CHILD_INDENT: &str = "    ";

/// Renders a page's top-level blocks to markdown.
pub fn render_blocks(blocks: &[BlockObject]) -> String {
    let rendered = render_sequence(blocks);
    log::debug!(
        "Rendered {} top-level blocks into {} characters",
        blocks.len(),
        rendered.len()
    );
    rendered
}

/// Renders sibling blocks. List items stay on adjacent lines; everything
/// else is separated by a blank line.
fn render_sequence(blocks: &[BlockObject]) -> String {
    let mut out = String::with_capacity(blocks.len() * CHARS_PER_BLOCK_ESTIMATE);
    let mut list_number = 0usize;
    let mut previous_was_list = false;

    for block in blocks {
        list_number = match block.kind {
            BlockKind::NumberedListItem { .. } => list_number + 1,
            _ => 0,
        };

        let rendered = render_block(block, list_number);
        if rendered.is_empty() {
            continue;
        }

        if !out.is_empty() {
            let tight = previous_was_list && block.is_list_item();
            out.push_str(if tight { "\n" } else { "\n\n" });
        }
        out.push_str(&rendered);
        previous_was_list = block.is_list_item();
    }

    out
}

fn render_block(block: &BlockObject, list_number: usize) -> String {
    match &block.kind {
        BlockKind::Paragraph { paragraph } => {
            with_nested(render_rich_text(&paragraph.rich_text), block)
        }
        BlockKind::Heading1 { heading_1 } => heading(1, &heading_1.rich_text),
        BlockKind::Heading2 { heading_2 } => heading(2, &heading_2.rich_text),
        BlockKind::Heading3 { heading_3 } => heading(3, &heading_3.rich_text),
        BlockKind::BulletedListItem { bulleted_list_item } => {
            list_item("- ", &bulleted_list_item.rich_text, block)
        }
        BlockKind::NumberedListItem { numbered_list_item } => list_item(
            &format!("{}. ", list_number),
            &numbered_list_item.rich_text,
            block,
        ),
        BlockKind::ToDo { to_do } => {
            let marker = if to_do.checked { "- [x] " } else { "- [ ] " };
            list_item(marker, &to_do.rich_text, block)
        }
        BlockKind::Toggle { toggle } => format!(
            "<details>\n<summary>{}</summary>\n\n{}\n</details>",
            render_rich_text(&toggle.rich_text),
            render_sequence(&block.children)
        ),
        BlockKind::Quote { quote } => {
            quoted(&with_children(render_rich_text(&quote.rich_text), block))
        }
        BlockKind::Callout { callout } => {
            let icon = match &callout.icon {
                Some(crate::model::blocks::Icon::Emoji { emoji }) => format!("{} ", emoji),
                _ => String::new(),
            };
            let text = format!("{}{}", icon, render_rich_text(&callout.rich_text));
            quoted(&with_children(text, block))
        }
        BlockKind::Code { code } => {
            let language = match code.language.as_str() {
                "plain text" => "text",
                other => other,
            };
            let mut fenced = format!("```{}\n{}\n```", language, plain_text(&code.rich_text));
            if !code.caption.is_empty() {
                fenced.push_str(&format!("\n\n_{}_", render_rich_text(&code.caption)));
            }
            fenced
        }
        BlockKind::Equation { equation } => format!("$$\n{}\n$$", equation.expression),
        BlockKind::Divider {} => "---".to_string(),
        BlockKind::Image { image } => match image.url() {
            Some(url) => format!("![{}]({})", plain_text(&image.caption), url),
            None => String::new(),
        },
        BlockKind::Video { video } => media_link(video, "video"),
        BlockKind::File { file } => media_link(file, "file"),
        BlockKind::Pdf { pdf } => media_link(pdf, "pdf"),
        BlockKind::Bookmark { bookmark } => web_link(bookmark),
        BlockKind::Embed { embed } => web_link(embed),
        BlockKind::Table { table } => render_table(table, &block.children),
        BlockKind::ColumnList {} | BlockKind::Column {} => render_sequence(&block.children),
        BlockKind::ChildPage { child_page } => {
            log::debug!("Skipping child page '{}'", child_page.title);
            String::new()
        }
        // Rows only make sense inside their table.
        BlockKind::TableRow { .. } | BlockKind::Unsupported => String::new(),
    }
}

fn heading(level: usize, text: &[RichText]) -> String {
    format!("{} {}", "#".repeat(level), render_rich_text(text))
}

fn list_item(marker: &str, text: &[RichText], block: &BlockObject) -> String {
    with_nested(format!("{}{}", marker, render_rich_text(text)), block)
}

/// Appends children indented one level below `head`.
fn with_nested(head: String, block: &BlockObject) -> String {
    if block.children.is_empty() {
        return head;
    }
    format!("{}\n{}", head, indent(&render_sequence(&block.children)))
}

/// Appends children at the same level as `head`.
fn with_children(head: String, block: &BlockObject) -> String {
    if block.children.is_empty() {
        return head;
    }
    format!("{}\n\n{}", head, render_sequence(&block.children))
}

fn indent(text: &str) -> String {
    prefix_lines(text, CHILD_INDENT)
}

fn quoted(text: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                ">".to_string()
            } else {
                format!("> {}", line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn prefix_lines(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", prefix, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn media_link(payload: &FilePayload, fallback_label: &str) -> String {
    let Some(url) = payload.url() else {
        return String::new();
    };
    let caption = plain_text(&payload.caption);
    let label = if !caption.is_empty() {
        caption
    } else {
        payload
            .name
            .clone()
            .unwrap_or_else(|| fallback_label.to_string())
    };
    format!("[{}]({})", label, url)
}

fn web_link(payload: &LinkPayload) -> String {
    if payload.url.is_empty() {
        return String::new();
    }
    let caption = plain_text(&payload.caption);
    let label = if caption.is_empty() {
        payload.url.as_str()
    } else {
        caption.as_str()
    };
    format!("[{}]({})", label, payload.url)
}

/// Markdown tables always need a header row; the first row serves as one
/// even when Notion did not flag it.
fn render_table(table: &TablePayload, rows: &[BlockObject]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .filter_map(|row| match &row.kind {
            BlockKind::TableRow { table_row } => Some(
                table_row
                    .cells
                    .iter()
                    .map(|cell| render_rich_text(cell).replace('|', "\\|"))
                    .collect(),
            ),
            _ => None,
        })
        .collect();

    let Some(width) = cells
        .iter()
        .map(Vec::len)
        .max()
        .map(|w| w.max(table.table_width))
    else {
        return String::new();
    };
    if width == 0 {
        return String::new();
    }

    let format_row = |row: &[String]| {
        let padded: Vec<&str> = (0..width)
            .map(|i| row.get(i).map(String::as_str).unwrap_or(""))
            .collect();
        format!("| {} |", padded.join(" | "))
    };

    let mut lines = Vec::with_capacity(cells.len() + 1);
    lines.push(format_row(&cells[0]));
    lines.push(format!("|{}", " --- |".repeat(width)));
    lines.extend(cells[1..].iter().map(|row| format_row(row)));
    lines.join("\n")
}
