//! Inline rendering of rich-text runs.

use crate::model::{Annotations, RichText, RichTextKind};

/// Renders a rich-text array to inline markdown.
pub fn render_rich_text(runs: &[RichText]) -> String {
    runs.iter().map(render_run).collect()
}

fn render_run(run: &RichText) -> String {
    if run.kind == RichTextKind::Equation {
        return format!("${}$", run.plain_text.trim());
    }

    // Markers must hug the text: `** bold**` is not bold in markdown.
    let text = run.plain_text.as_str();
    let core = text.trim();
    if core.is_empty() {
        return text.to_string();
    }
    let leading = &text[..text.len() - text.trim_start().len()];
    let trailing = &text[text.trim_end().len()..];

    let mut styled = apply_annotations(core, &run.annotations);
    if let Some(href) = &run.href {
        styled = format!("[{}]({})", styled, href);
    }

    format!("{}{}{}", leading, styled, trailing)
}

fn apply_annotations(text: &str, annotations: &Annotations) -> String {
    let mut result = text.to_string();

    // Code first: other markers are literal inside backticks.
    if annotations.code {
        result = format!("`{}`", result);
    }
    if annotations.strikethrough {
        result = format!("~~{}~~", result);
    }
    if annotations.bold {
        result = format!("**{}**", result);
    }
    if annotations.italic {
        result = format!("_{}_", result);
    }

    result
}
