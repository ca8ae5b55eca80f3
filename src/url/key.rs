//! Mapping from URLs to stable, filesystem-safe storage keys
//!
//! Every scraped document lands at `<domain bucket>/<file key>.md`. The
//! mapping is a pure function of the URL: applying it twice to the same URL
//! always yields the same path, and re-runs overwrite in place.

use url::Url;

/// Extension appended to every document file key
pub const DOCUMENT_EXTENSION: &str = ".md";

/// Returns the storage bucket for a URL's domain
///
/// The bucket is the network authority with `:` replaced by `_` so that
/// `host:port` stays a single path component (`localhost:8080` becomes
/// `localhost_8080`). URLs without a host fall back to the literal bucket
/// `unknown`.
pub fn domain_bucket(url: &Url) -> String {
    let host = match url.host_str() {
        Some(h) => h,
        None => return "unknown".to_string(),
    };

    match url.port() {
        Some(port) => format!("{}_{}", host, port),
        None => host.to_string(),
    }
}

/// Converts a URL path into a flat file key
///
/// Leading and trailing slashes are stripped, internal slashes become `_`,
/// and every character outside `[A-Za-z0-9_-]` is stripped (not replaced).
/// An empty path maps to the literal key `index`.
///
/// The stripping is lossy: two paths differing only in stripped characters
/// (for example `/a.b` and `/ab`) collide on the same key, and the later
/// write overwrites the earlier one. This matches the behavior callers
/// already depend on and keeps re-runs deterministic.
pub fn file_key(url: &Url) -> String {
    let path = url.path().trim_matches('/').replace('/', "_");

    let key: String = path
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();

    if key.is_empty() {
        "index".to_string()
    } else {
        key
    }
}

/// Returns the full document file name for a URL (`file_key` + extension)
pub fn document_file_name(url: &Url) -> String {
    format!("{}{}", file_key(url), DOCUMENT_EXTENSION)
}
