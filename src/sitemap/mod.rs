//! Sitemap discovery and parsing
//!
//! This module finds the page set of a site from its published sitemaps:
//! - Probing well-known locations in a fixed order with short-circuiting
//! - Namespace-agnostic XML parsing (urlsets and sitemap indexes)
//! - Plain-text sitemaps, one URL per line
//! - One level of sitemap-index recursion

mod parser;
mod resolver;

pub use parser::{parse_sitemap, SitemapDocument};
pub use resolver::{resolve, SitemapResolution, SITEMAP_PROBE_PATHS};
