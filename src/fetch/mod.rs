//! Page fetching boundary
//!
//! The crawl engine talks to page retrieval through the [`PageFetcher`]
//! trait and consumes a [`FetchOutcome`] per attempt. The bundled
//! [`HttpPageFetcher`] retrieves pages over plain HTTP and runs the
//! configured content filter; tests substitute in-memory fetchers.
//!
//! The engine-level document policy (prefer the filtered primary document,
//! fall back to the raw document, treat both-empty as an extraction
//! failure) lives with the consumer of the outcome, not here.

mod extract;
mod http;

pub use extract::{extract_blocks, extract_links, render_markdown};
pub use http::{build_http_client, HttpPageFetcher};

use std::future::Future;
use url::Url;

/// Result of one page fetch attempt
#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
    /// Whether the page was retrieved at all
    pub success: bool,

    /// The filtered ("fit") document, if the filter kept anything
    pub primary_document: Option<String>,

    /// The unfiltered extracted document
    pub fallback_document: Option<String>,

    /// Error description when `success` is false
    pub error_message: Option<String>,

    /// Absolute outbound links discovered on the page; consumed by the
    /// frontier traversal
    pub discovered_links: Vec<String>,
}

impl FetchOutcome {
    /// A failed fetch with an error message
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_message: Some(message.into()),
            ..Self::default()
        }
    }

    /// The document the engine should persist: primary if non-empty,
    /// otherwise the fallback. `None` means extraction produced nothing.
    pub fn document(&self) -> Option<&str> {
        match self.primary_document.as_deref() {
            Some(doc) if !doc.trim().is_empty() => Some(doc),
            _ => match self.fallback_document.as_deref() {
                Some(doc) if !doc.trim().is_empty() => Some(doc),
                _ => None,
            },
        }
    }
}

/// Retrieves one page and produces its extracted documents
///
/// One fetcher instance serves a whole run; the filter configuration and
/// excluded tag names are fixed at construction.
pub trait PageFetcher {
    fn fetch(&self, url: &Url) -> impl Future<Output = FetchOutcome> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_prefers_primary() {
        let outcome = FetchOutcome {
            success: true,
            primary_document: Some("fit".to_string()),
            fallback_document: Some("raw".to_string()),
            ..FetchOutcome::default()
        };
        assert_eq!(outcome.document(), Some("fit"));
    }

    #[test]
    fn test_document_falls_back_when_primary_empty() {
        let outcome = FetchOutcome {
            success: true,
            primary_document: Some("   ".to_string()),
            fallback_document: Some("raw".to_string()),
            ..FetchOutcome::default()
        };
        assert_eq!(outcome.document(), Some("raw"));
    }

    #[test]
    fn test_document_none_when_both_empty() {
        let outcome = FetchOutcome {
            success: true,
            primary_document: None,
            fallback_document: Some("".to_string()),
            ..FetchOutcome::default()
        };
        assert_eq!(outcome.document(), None);
    }
}
