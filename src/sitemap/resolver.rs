//! Sitemap discovery
//!
//! Probes a fixed, ordered list of well-known sitemap locations under the
//! base authority and returns at the first location that is both reachable
//! and yields at least one URL. Sitemap-index entries are followed one
//! level deep; failures on individual candidates or children are recorded
//! and never abort resolution. An empty result is the valid "no sitemap"
//! outcome, not an error.

use crate::sitemap::parser::parse_sitemap;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::collections::HashSet;
use url::Url;

/// Well-known sitemap locations, probed in exactly this order
///
/// Ordering is part of the contract: resolution short-circuits at the
/// first location that yields URLs, so reordering changes results.
pub const SITEMAP_PROBE_PATHS: &[&str] = &[
    "/sitemap.xml",
    "/sitemap_index.xml",
    "/sitemap.txt",
    "/sitemap/sitemap.xml",
    "/sitemapindex.xml",
    "/wp-sitemap.xml",
    "/sitemap_news.xml",
];

/// How many child sitemaps are fetched concurrently
const CHILD_FETCH_CONCURRENCY: usize = 4;

/// Outcome of sitemap resolution for one base URL
#[derive(Debug, Default)]
pub struct SitemapResolution {
    /// Discovered page URLs, deduplicated, in discovery order
    pub urls: Vec<Url>,

    /// The sitemap location that produced the URLs, if any
    pub sitemap_found: Option<Url>,

    /// Number of child sitemaps that could not be fetched or parsed
    pub child_errors: usize,
}

impl SitemapResolution {
    /// True when no candidate yielded URLs; the caller falls back to
    /// breadth-first traversal
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// Resolves the page set of a site from its sitemaps
///
/// # Arguments
///
/// * `client` - HTTP client used for all probe and child fetches
/// * `base_url` - Any URL on the target site; only its authority is used
///
/// # Behavior
///
/// Each location in [`SITEMAP_PROBE_PATHS`] is tried in order. A timeout,
/// non-200 status, or unparsable body silently disqualifies that candidate.
/// When a candidate parses as a sitemap index, each referenced child is
/// fetched (one level only) and its `<loc>` values merged in; child
/// failures are logged and counted but do not disqualify the parent.
pub async fn resolve(client: &Client, base_url: &Url) -> SitemapResolution {
    let root = match root_of(base_url) {
        Some(r) => r,
        None => return SitemapResolution::default(),
    };

    for probe_path in SITEMAP_PROBE_PATHS {
        let candidate = format!("{}{}", root, probe_path);
        tracing::debug!("Probing sitemap candidate {}", candidate);

        let (content_type, body) = match fetch_text(client, &candidate).await {
            Some(result) => result,
            None => continue,
        };

        let document = parse_sitemap(&body, &content_type, &candidate);
        if document.is_empty() {
            continue;
        }

        let mut seen: HashSet<String> = HashSet::new();
        let mut urls: Vec<Url> = Vec::new();
        let mut child_errors = 0;

        for raw in &document.page_urls {
            push_url(raw, &mut seen, &mut urls);
        }

        if !document.child_sitemaps.is_empty() {
            tracing::info!(
                "Sitemap index at {} with {} child sitemaps",
                candidate,
                document.child_sitemaps.len()
            );

            // Children are assumed to be leaf urlsets; their own index
            // entries are not followed further.
            let child_bodies: Vec<_> = stream::iter(document.child_sitemaps.iter())
                .map(|child| {
                    let client = client.clone();
                    async move { (child.clone(), fetch_text(&client, child).await) }
                })
                .buffered(CHILD_FETCH_CONCURRENCY)
                .collect()
                .await;

            for (child_url, fetched) in child_bodies {
                match fetched {
                    Some((child_type, child_body)) => {
                        let child_doc = parse_sitemap(&child_body, &child_type, &child_url);
                        if child_doc.page_urls.is_empty() {
                            tracing::warn!("Child sitemap {} yielded no URLs", child_url);
                            child_errors += 1;
                        }
                        for raw in &child_doc.page_urls {
                            push_url(raw, &mut seen, &mut urls);
                        }
                    }
                    None => {
                        tracing::warn!("Failed to fetch child sitemap {}", child_url);
                        child_errors += 1;
                    }
                }
            }
        }

        if !urls.is_empty() {
            tracing::info!("Found {} URLs via {}", urls.len(), candidate);
            return SitemapResolution {
                urls,
                sitemap_found: Url::parse(&candidate).ok(),
                child_errors,
            };
        }
    }

    tracing::info!("No sitemap found under {}", root);
    SitemapResolution::default()
}

/// Fetches a candidate location, returning its content type and body
///
/// Any error or non-200 status yields `None`; the candidate is simply
/// disqualified.
async fn fetch_text(client: &Client, url: &str) -> Option<(String, String)> {
    let response = match client.get(url).send().await {
        Ok(r) => r,
        Err(e) => {
            tracing::debug!("Sitemap candidate {} unreachable: {}", url, e);
            return None;
        }
    };

    if response.status().as_u16() != 200 {
        tracing::debug!("Sitemap candidate {} returned {}", url, response.status());
        return None;
    }

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    match response.text().await {
        Ok(body) => Some((content_type, body)),
        Err(e) => {
            tracing::debug!("Failed to read sitemap body from {}: {}", url, e);
            None
        }
    }
}

/// `scheme://authority` of the base URL, without path
fn root_of(base_url: &Url) -> Option<String> {
    let host = base_url.host_str()?;
    Some(match base_url.port() {
        Some(port) => format!("{}://{}:{}", base_url.scheme(), host, port),
        None => format!("{}://{}", base_url.scheme(), host),
    })
}

fn push_url(raw: &str, seen: &mut HashSet<String>, urls: &mut Vec<Url>) {
    match Url::parse(raw) {
        Ok(url) => {
            if seen.insert(url.to_string()) {
                urls.push(url);
            }
        }
        Err(e) => {
            tracing::debug!("Ignoring invalid sitemap URL {}: {}", raw, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_order_is_fixed() {
        assert_eq!(SITEMAP_PROBE_PATHS[0], "/sitemap.xml");
        assert_eq!(SITEMAP_PROBE_PATHS[1], "/sitemap_index.xml");
        assert_eq!(SITEMAP_PROBE_PATHS[2], "/sitemap.txt");
        assert_eq!(SITEMAP_PROBE_PATHS[3], "/sitemap/sitemap.xml");
        assert_eq!(SITEMAP_PROBE_PATHS[4], "/sitemapindex.xml");
    }

    #[test]
    fn test_root_of_strips_path() {
        let url = Url::parse("https://example.com/deep/page?q=1").unwrap();
        assert_eq!(root_of(&url).unwrap(), "https://example.com");
    }

    #[test]
    fn test_root_of_keeps_port() {
        let url = Url::parse("http://localhost:8080/page").unwrap();
        assert_eq!(root_of(&url).unwrap(), "http://localhost:8080");
    }
}
