//! HTML content and link extraction
//!
//! Turns a rendered HTML document into the flat list of [`TextBlock`]s the
//! content filters score, plus the outbound links the frontier follows.
//! Subtrees under excluded tag names (nav, footer, ...) are skipped
//! entirely.

use crate::filter::TextBlock;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Element names treated as one content block each
const BLOCK_TAGS: &[&str] = &[
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "p",
    "li",
    "pre",
    "blockquote",
    "td",
];

/// Extracts the content blocks of a document
///
/// Each block-level element becomes one [`TextBlock`] with collapsed
/// whitespace and a count of the words that sit inside anchors (used for
/// link-density scoring). An element is skipped when:
///
/// - any ancestor's tag name is in `excluded_tags`, or
/// - any ancestor is itself a block tag (the outermost block wins, so
///   nested structures are not counted twice)
pub fn extract_blocks(document: &Html, excluded_tags: &[String]) -> Vec<TextBlock> {
    let mut blocks = Vec::new();

    let (block_selector, anchor_selector) =
        match (Selector::parse(&BLOCK_TAGS.join(",")), Selector::parse("a")) {
            (Ok(blocks), Ok(anchors)) => (blocks, anchors),
            _ => return blocks,
        };

    for element in document.select(&block_selector) {
        if has_skipped_ancestor(element, excluded_tags) {
            continue;
        }

        let text = collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "));
        if text.is_empty() {
            continue;
        }

        let link_word_count = element
            .select(&anchor_selector)
            .map(|a| a.text().collect::<Vec<_>>().join(" ").split_whitespace().count())
            .sum();

        let mut block = TextBlock::new(element.value().name(), text);
        block.link_word_count = link_word_count;
        blocks.push(block);
    }

    blocks
}

/// Extracts absolute outbound links from a document
///
/// Relative hrefs are resolved against `base`; only `http`/`https` results
/// are returned. Fragment-only and unparsable hrefs are dropped.
pub fn extract_links(document: &Html, base: &Url) -> Vec<String> {
    let mut links = Vec::new();

    let link_selector = match Selector::parse("a[href]") {
        Ok(sel) => sel,
        Err(_) => return links,
    };

    for element in document.select(&link_selector) {
        let href = match element.value().attr("href") {
            Some(h) => h.trim(),
            None => continue,
        };

        if href.is_empty() || href.starts_with('#') {
            continue;
        }

        match base.join(href) {
            Ok(resolved) if resolved.scheme() == "http" || resolved.scheme() == "https" => {
                links.push(resolved.to_string());
            }
            _ => {}
        }
    }

    links
}

/// Renders filtered blocks back into a markdown document
pub fn render_markdown(blocks: &[TextBlock]) -> String {
    let mut parts = Vec::with_capacity(blocks.len());

    for block in blocks {
        let rendered = match block.tag.as_str() {
            "h1" => format!("# {}", block.text),
            "h2" => format!("## {}", block.text),
            "h3" => format!("### {}", block.text),
            "h4" => format!("#### {}", block.text),
            "h5" => format!("##### {}", block.text),
            "h6" => format!("###### {}", block.text),
            "li" => format!("- {}", block.text),
            "pre" => format!("```\n{}\n```", block.text),
            "blockquote" => format!("> {}", block.text),
            _ => block.text.clone(),
        };
        parts.push(rendered);
    }

    parts.join("\n\n")
}

fn has_skipped_ancestor(element: ElementRef, excluded_tags: &[String]) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| {
            let name = ancestor.value().name();
            BLOCK_TAGS.contains(&name) || excluded_tags.iter().any(|t| t == name)
        })
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
