//! URL handling module for Site-Distill
//!
//! This module provides URL normalization, filesystem key mapping (domain
//! buckets and file keys), and authority comparison for crawl scoping.

mod key;
mod normalize;

use url::Url;

// Re-export main functions
pub use key::{document_file_name, domain_bucket, file_key, DOCUMENT_EXTENSION};
pub use normalize::normalize_url;

/// Returns the network authority (`host[:port]`) of a URL
///
/// The default port for the scheme is omitted, matching how `url` serializes
/// authorities. Returns `None` for URLs without a host.
pub fn authority(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host.to_string()),
    }
}

/// Checks whether two URLs share the same network authority
///
/// Used for the `include_external` crawl scoping rule: when external links
/// are excluded, only links whose authority equals the base authority are
/// enqueued.
pub fn same_authority(a: &Url, b: &Url) -> bool {
    match (authority(a), authority(b)) {
        (Some(left), Some(right)) => left == right,
        _ => false,
    }
}
