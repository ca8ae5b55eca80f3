//! HTTP page fetcher
//!
//! The default [`PageFetcher`] implementation: plain reqwest GET, HTML
//! parsing with scraper, block extraction, and the run's content filter
//! applied to produce the fit document. Per-fetch timeouts are owned here;
//! the orchestration layer only enforces depth and page limits.

use crate::fetch::extract::{extract_blocks, extract_links, render_markdown};
use crate::fetch::{FetchOutcome, PageFetcher};
use crate::filter::FilterHandle;
use reqwest::Client;
use scraper::Html;
use std::time::Duration;
use url::Url;

/// Builds the HTTP client used for page fetches and sitemap probes
///
/// # Arguments
///
/// * `timeout_secs` - Per-request timeout in seconds
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(timeout_secs: u64) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(concat!("site-distill/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages over HTTP and extracts filtered markdown
pub struct HttpPageFetcher {
    client: Client,
    filter: FilterHandle,
    excluded_tags: Vec<String>,
}

impl HttpPageFetcher {
    pub fn new(client: Client, filter: FilterHandle, excluded_tags: Vec<String>) -> Self {
        Self {
            client,
            filter,
            excluded_tags,
        }
    }

    /// Parses a fetched body into documents and links
    ///
    /// Synchronous on purpose: `scraper::Html` is not `Send`, so parsing
    /// must not be held across an await point.
    fn process_body(&self, body: &str, url: &Url) -> FetchOutcome {
        let document = Html::parse_document(body);

        let blocks = extract_blocks(&document, &self.excluded_tags);
        let discovered_links = extract_links(&document, url);

        let fit_blocks = self.filter.filter_blocks(&blocks);
        let primary = render_markdown(&fit_blocks);
        let fallback = render_markdown(&blocks);

        FetchOutcome {
            success: true,
            primary_document: (!primary.is_empty()).then_some(primary),
            fallback_document: (!fallback.is_empty()).then_some(fallback),
            error_message: None,
            discovered_links,
        }
    }
}

impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &Url) -> FetchOutcome {
        tracing::debug!("Fetching {}", url);

        let response = match self.client.get(url.clone()).send().await {
            Ok(r) => r,
            Err(e) => {
                let message = if e.is_timeout() {
                    format!("Request timeout for {}", url)
                } else if e.is_connect() {
                    format!("Connection failed for {}", url)
                } else {
                    e.to_string()
                };
                return FetchOutcome::failure(message);
            }
        };

        let status = response.status();
        if !status.is_success() {
            return FetchOutcome::failure(format!("HTTP {} for {}", status.as_u16(), url));
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !content_type.is_empty()
            && !content_type.contains("text/html")
            && !content_type.contains("application/xhtml")
        {
            return FetchOutcome::failure(format!("Expected HTML, got {}", content_type));
        }

        let body = match response.text().await {
            Ok(b) => b,
            Err(e) => return FetchOutcome::failure(e.to_string()),
        };

        self.process_body(&body, url)
    }
}
