//! Crawl session coordinator
//!
//! The [`Engine`] owns the configured fetch pipeline (HTTP client, content
//! filter, excluded tags), the document store, and the event emitter, and
//! exposes the three run modes:
//!
//! - `run_single`: one URL, one result
//! - `run_batch`: an explicit URL list, attempted in order
//! - `run_site`: sitemap-first site distillation with BFS fallback
//!
//! Per-URL failures are data, not errors: every attempted URL produces a
//! [`PageResult`] in the report and a protocol event on the wire. The
//! engine returns `Err` only when it cannot run at all.

use crate::config::Config;
use crate::fetch::{build_http_client, FetchOutcome, HttpPageFetcher, PageFetcher};
use crate::filter::{build_filter, select_filter, FilterConfig};
use crate::protocol::{EventEmitter, WorkerEvent};
use crate::report::{CrawlReport, FinishReason, PageErrorKind, PageResult};
use crate::sitemap;
use crate::store::{DocumentStore, FsDocumentStore};
use crate::url::normalize_url;
use crate::{DistillError, Result};

use super::frontier::{self, FrontierEntry, PageConsumer, StopSignal, Termination};

use reqwest::Client;
use url::Url;

/// Wire form used when announcing a saved document
#[derive(Debug, Clone, Copy)]
enum SaveStyle {
    /// `[SUCCESS] Saved to: <path>` (single/batch runs)
    SavedTo,
    /// `[OK] <url> -> <path>` (site runs)
    UrlArrow,
}

/// Orchestrates fetch, filter, persist, and reporting for a run
pub struct Engine {
    config: Config,
    client: Client,
    fetcher: HttpPageFetcher,
    store: FsDocumentStore,
    events: EventEmitter,
    stop: StopSignal,
}

impl Engine {
    /// Builds an engine from a validated configuration
    ///
    /// Selects the content filter (query relevance when a non-blank query
    /// is active, density pruning otherwise), builds the shared HTTP
    /// client, and roots the document store at the configured directory.
    pub fn new(config: Config, events: EventEmitter) -> Result<Self> {
        let client = build_http_client(config.fetch.request_timeout_secs)
            .map_err(|e| DistillError::Init(format!("failed to build HTTP client: {}", e)))?;

        let filter_config = select_filter(&config.filter);
        events.emit(WorkerEvent::Info {
            message: describe_filter(&filter_config),
        });
        let filter = build_filter(&filter_config);

        let fetcher = HttpPageFetcher::new(
            client.clone(),
            filter,
            config.fetch.excluded_tags.clone(),
        );
        let store = FsDocumentStore::new(&config.output.root_dir);

        Ok(Self {
            config,
            client,
            fetcher,
            store,
            events,
            stop: StopSignal::new(),
        })
    }

    /// Handle for requesting a graceful stop from another task
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Fetches, filters, and persists a single URL
    pub async fn run_single(&self, url: &str) -> CrawlReport {
        let urls = [url.to_string()];
        self.run_batch(&urls).await
    }

    /// Attempts an explicit list of URLs in order
    ///
    /// Unparsable URLs are recorded as failed results rather than aborting
    /// the rest of the list. The page cap does not apply here; the caller
    /// chose the work set explicitly.
    pub async fn run_batch(&self, urls: &[String]) -> CrawlReport {
        let mut report = CrawlReport::new();

        for raw in urls {
            let url = match normalize_url(raw) {
                Ok(url) => url,
                Err(e) => {
                    let message = format!("Invalid URL {}: {}", raw, e);
                    self.events.emit(WorkerEvent::Failed {
                        url: None,
                        message: message.clone(),
                    });
                    // Recorded under a best-effort parse so the report
                    // still enumerates the attempt.
                    if let Ok(url) = Url::parse(raw) {
                        report.record(PageResult::failed(
                            url,
                            None,
                            PageErrorKind::FetchFailure,
                            message,
                        ));
                    } else {
                        tracing::warn!("Skipping unparsable URL in report: {}", raw);
                    }
                    continue;
                }
            };

            self.events.emit(WorkerEvent::ScrapeStarted {
                url: url.to_string(),
            });
            let outcome = self.fetcher.fetch(&url).await;
            let result = process_outcome(
                &self.store,
                &self.events,
                &url,
                None,
                outcome,
                SaveStyle::SavedTo,
            );
            report.record(result);
        }

        report.finalize(FinishReason::Completed);
        report
    }

    /// Distills a whole site rooted at `base`
    ///
    /// When `try-sitemap` is enabled, known sitemap locations are probed
    /// first; a non-empty resolution replaces traversal entirely and its
    /// work set is truncated to `max-pages`. Otherwise (or when no sitemap
    /// yields URLs) a breadth-first crawl runs from the base URL.
    pub async fn run_site(&self, base: &str) -> Result<CrawlReport> {
        let base = normalize_url(base)?;

        if self.config.crawl.try_sitemap {
            let resolution = sitemap::resolve(&self.client, &base).await;
            if !resolution.is_empty() {
                return Ok(self.run_sitemap_set(&base, resolution.urls).await);
            }
            self.events.emit(WorkerEvent::Info {
                message: "No sitemap found, falling back to deep crawl".to_string(),
            });
        }

        Ok(self.run_traversal(base).await)
    }

    /// Crawls the fixed work set a sitemap produced
    async fn run_sitemap_set(&self, base: &Url, mut urls: Vec<Url>) -> CrawlReport {
        let total = urls.len();
        if urls.len() > self.config.crawl.max_pages {
            urls.truncate(self.config.crawl.max_pages);
            tracing::info!(
                "Sitemap listed {} pages, capped to {}",
                total,
                self.config.crawl.max_pages
            );
        }
        self.events.emit(WorkerEvent::Info {
            message: format!("Found {} URLs in sitemap, crawling {}", total, urls.len()),
        });

        let mut report = CrawlReport::new();
        for url in urls {
            let url = normalize_url(url.as_str()).unwrap_or(url);
            self.events.emit(WorkerEvent::ScrapeStarted {
                url: url.to_string(),
            });
            let outcome = self.fetcher.fetch(&url).await;
            let result = process_outcome(
                &self.store,
                &self.events,
                &url,
                None,
                outcome,
                SaveStyle::UrlArrow,
            );
            report.record(result);
        }

        self.finish_site_run(&mut report, base, FinishReason::Completed);
        report
    }

    /// Runs the breadth-first fallback traversal
    async fn run_traversal(&self, base: Url) -> CrawlReport {
        let mut report = CrawlReport::new();
        let mut session = SessionConsumer {
            store: &self.store,
            events: &self.events,
            report: &mut report,
        };

        let termination = frontier::crawl(
            &self.fetcher,
            &mut session,
            base.clone(),
            &self.config.crawl,
            &self.stop,
        )
        .await;

        let reason = match termination {
            Termination::Completed => FinishReason::Completed,
            Termination::LimitReached => FinishReason::LimitReached,
            Termination::Cancelled => FinishReason::Cancelled,
        };
        self.finish_site_run(&mut report, &base, reason);
        report
    }

    fn finish_site_run(&self, report: &mut CrawlReport, base: &Url, reason: FinishReason) {
        // The wire count is pages attempted, failures included.
        self.events.emit(WorkerEvent::RunFinished {
            page_count: report.results.len(),
            bucket_path: self.store.bucket_dir(base).display().to_string(),
        });
        report.finalize(reason);
    }
}

/// Feeds traversal results into the store, wire, and report
struct SessionConsumer<'a> {
    store: &'a FsDocumentStore,
    events: &'a EventEmitter,
    report: &'a mut CrawlReport,
}

impl PageConsumer for SessionConsumer<'_> {
    fn page_fetched(&mut self, entry: &FrontierEntry, outcome: FetchOutcome) {
        self.events.emit(WorkerEvent::ScrapeStarted {
            url: entry.url.to_string(),
        });
        let result = process_outcome(
            self.store,
            self.events,
            &entry.url,
            Some(entry.depth),
            outcome,
            SaveStyle::UrlArrow,
        );
        self.report.record(result);
    }
}

/// Applies the save policy to one fetch outcome
///
/// The filtered document is preferred; when filtering strips everything,
/// the unfiltered fallback is written instead. A successful fetch with no
/// usable content in either document is an extraction failure. Pages are
/// never written empty.
fn process_outcome(
    store: &FsDocumentStore,
    events: &EventEmitter,
    url: &Url,
    depth: Option<u32>,
    outcome: FetchOutcome,
    style: SaveStyle,
) -> PageResult {
    if !outcome.success {
        let message = outcome
            .error_message
            .unwrap_or_else(|| "unknown fetch error".to_string());
        events.emit(WorkerEvent::Failed {
            url: Some(url.to_string()),
            message: message.clone(),
        });
        return PageResult::failed(url.clone(), depth, PageErrorKind::FetchFailure, message);
    }

    let document = match outcome.document() {
        Some(document) => document.to_string(),
        None => {
            let message = "no usable content in filtered or raw document".to_string();
            events.emit(WorkerEvent::Failed {
                url: Some(url.to_string()),
                message: message.clone(),
            });
            return PageResult::failed(
                url.clone(),
                depth,
                PageErrorKind::ExtractionFailure,
                message,
            );
        }
    };

    match store.persist(url, &document) {
        Ok(path) => {
            let path_display = path.display().to_string();
            let event_url = match style {
                SaveStyle::SavedTo => None,
                SaveStyle::UrlArrow => Some(url.to_string()),
            };
            events.emit(WorkerEvent::SaveSucceeded {
                url: event_url,
                path: path_display,
            });
            PageResult::saved(url.clone(), depth, document, path)
        }
        Err(e) => {
            let message = e.to_string();
            events.emit(WorkerEvent::Failed {
                url: Some(url.to_string()),
                message: message.clone(),
            });
            PageResult::failed(url.clone(), depth, PageErrorKind::Persistence, message)
        }
    }
}

fn describe_filter(config: &FilterConfig) -> String {
    match config {
        FilterConfig::Pruning {
            threshold,
            mode,
            min_words_per_block,
        } => format!(
            "Using pruning filter (threshold: {}, mode: {:?}, min words: {})",
            threshold, mode, min_words_per_block
        ),
        FilterConfig::QueryRelevance { query, threshold } => format!(
            "Using query relevance filter for '{}' (threshold: {})",
            query, threshold
        ),
    }
}
