//! Plain-text summaries of rich task descriptions.
//!
//! Occurrence chips show the description summary as a tooltip, falling back
//! to the title when the description has no text.

use crate::model::task::Task;
use once_cell::sync::Lazy;
use regex::Regex;

const PREVIEW_MAX_CHARS: usize = 100;

static MARKDOWN_IMAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[[^\]]*]\([^)]*\)").expect("valid image regex"));
static MARKDOWN_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").expect("valid link regex"));
static HTML_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</?[a-zA-Z][^>]*>").expect("valid html tag regex"));
static MARKDOWN_SYMBOL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[\*_`#>~\-\[\]\(\)!|]+"#).expect("valid markdown symbol regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Derives a single-line summary from a markdown/HTML description.
///
/// Rules:
/// - images and HTML tags are dropped, links keep their text;
/// - markup symbols are removed and whitespace collapsed;
/// - the first 100 chars are kept; `None` when nothing readable remains.
pub fn derive_description_preview(description: &str) -> Option<String> {
    let without_images = MARKDOWN_IMAGE_RE.replace_all(description, " ");
    let without_links = MARKDOWN_LINK_RE.replace_all(&without_images, "$1");
    let without_tags = HTML_TAG_RE.replace_all(&without_links, " ");
    let without_symbols = MARKDOWN_SYMBOL_RE.replace_all(&without_tags, " ");
    let normalized = WHITESPACE_RE.replace_all(&without_symbols, " ");
    let trimmed = normalized.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.chars().take(PREVIEW_MAX_CHARS).collect())
    }
}

/// Tooltip text for an occurrence chip.
pub fn tooltip_text(task: &Task) -> String {
    derive_description_preview(&task.description).unwrap_or_else(|| task.title.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::{parse_wall_clock, UserId};

    #[test]
    fn preview_strips_markup_and_keeps_link_text() {
        let preview = derive_description_preview(
            "## Steps\n\n- **rinse** the [filter](https://example.com/f)\n<p>then dry</p>",
        )
        .expect("preview should exist");
        assert_eq!(preview, "Steps rinse the filter then dry");
    }

    #[test]
    fn preview_limits_length() {
        let long = "word ".repeat(60);
        let preview = derive_description_preview(&long).expect("preview should exist");
        assert_eq!(preview.chars().count(), PREVIEW_MAX_CHARS);
    }

    #[test]
    fn tooltip_falls_back_to_title() {
        let mut task = Task::new(
            UserId::new("emp"),
            "feed cat",
            parse_wall_clock("2024-03-05T07:00").expect("valid start"),
            parse_wall_clock("2024-03-05T07:10").expect("valid end"),
        );
        task.description = "![photo](cat.png)  ".to_string();
        assert_eq!(tooltip_text(&task), "feed cat");

        task.description = "half a *can*".to_string();
        assert_eq!(tooltip_text(&task), "half a can");
    }
}
