//! Sitemap document parsing
//!
//! Handles the three shapes the resolver encounters: XML urlsets, XML
//! sitemap indexes, and plain-text URL lists. XML matching is
//! namespace-agnostic: every `<loc>` element is collected no matter which
//! namespace prefix the document declares, and `<loc>` elements nested
//! under `<sitemap>` entries are classified as child sitemaps instead of
//! page URLs.

use scraper::{ElementRef, Html};

/// Parsed content of one sitemap document
#[derive(Debug, Default, PartialEq)]
pub struct SitemapDocument {
    /// Page URLs listed directly in this document
    pub page_urls: Vec<String>,

    /// Referenced child sitemap documents (sitemap-index entries)
    pub child_sitemaps: Vec<String>,
}

impl SitemapDocument {
    pub fn is_empty(&self) -> bool {
        self.page_urls.is_empty() && self.child_sitemaps.is_empty()
    }
}

/// Parses a sitemap body according to its declared or sniffed content type
///
/// A body that is neither recognizable XML nor plain text yields an empty
/// document; the resolver treats that candidate as "not found".
pub fn parse_sitemap(body: &str, content_type: &str, source_url: &str) -> SitemapDocument {
    if looks_like_xml(body, content_type) {
        parse_xml_sitemap(body)
    } else if looks_like_text(content_type, source_url) {
        parse_text_sitemap(body)
    } else {
        SitemapDocument::default()
    }
}

fn looks_like_xml(body: &str, content_type: &str) -> bool {
    let trimmed = body.trim_start();
    content_type.contains("xml")
        || trimmed.starts_with("<?xml")
        || trimmed.starts_with("<urlset")
        || trimmed.starts_with("<sitemapindex")
}

fn looks_like_text(content_type: &str, source_url: &str) -> bool {
    content_type.contains("text/plain") || source_url.ends_with(".txt")
}

/// Collects `<loc>` values from an XML sitemap or sitemap index
///
/// The document is parsed leniently (unknown elements are kept in the
/// tree) and elements are matched on their local name, so any namespace
/// prefix the document declares is ignored. A `<loc>` nested under a
/// `<sitemap>` entry is a child sitemap; all others are page URLs.
fn parse_xml_sitemap(body: &str) -> SitemapDocument {
    let mut doc = SitemapDocument::default();
    let tree = Html::parse_document(body);

    for node in tree.tree.nodes() {
        let element = match ElementRef::wrap(node) {
            Some(element) => element,
            None => continue,
        };
        if local_name(element.value().name()) != "loc" {
            continue;
        }

        let value = element.text().collect::<String>().trim().to_string();
        if value.is_empty() {
            continue;
        }

        let under_sitemap_entry = node
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|ancestor| local_name(ancestor.value().name()) == "sitemap");

        if under_sitemap_entry {
            if !doc.child_sitemaps.contains(&value) {
                doc.child_sitemaps.push(value);
            }
        } else if !doc.page_urls.contains(&value) {
            doc.page_urls.push(value);
        }
    }

    doc
}

/// Tag name with any `prefix:` stripped; the HTML parser keeps prefixed
/// XML names as literal tag names
fn local_name(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

/// One absolute URL per line; lines without a URI scheme are ignored
fn parse_text_sitemap(body: &str) -> SitemapDocument {
    let mut doc = SitemapDocument::default();

    for line in body.lines() {
        let line = line.trim();
        if line.starts_with("http://") || line.starts_with("https://") {
            if !doc.page_urls.contains(&line.to_string()) {
                doc.page_urls.push(line.to_string());
            }
        }
    }

    doc
}
