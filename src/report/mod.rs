//! Per-URL outcomes and the aggregated crawl report
//!
//! Every attempted URL produces exactly one [`PageResult`], success or
//! failure; nothing requested is silently dropped. Results accumulate into
//! a [`CrawlReport`] that is finalized when the work set is exhausted, the
//! page limit is reached, or the run is cancelled.

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use url::Url;

/// Classification of a failed page attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageErrorKind {
    /// The page could not be retrieved at all (network, HTTP status,
    /// or backend error). Retryable by the caller; the engine does not
    /// auto-retry.
    FetchFailure,

    /// The fetch succeeded but neither the filtered nor the raw document
    /// contained usable content
    ExtractionFailure,

    /// The document was extracted but could not be written to storage
    Persistence,
}

impl std::fmt::Display for PageErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::FetchFailure => "fetch failure",
            Self::ExtractionFailure => "extraction failure",
            Self::Persistence => "persistence failure",
        };
        write!(f, "{}", name)
    }
}

/// Terminal outcome of one fetch attempt
///
/// Created once per attempted URL and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct PageResult {
    /// The attempted (normalized) URL
    pub url: Url,

    /// BFS depth the URL was discovered at, when traversal produced it
    pub depth: Option<u32>,

    /// Whether a document was extracted and persisted
    pub success: bool,

    /// The persisted document content
    pub content: Option<String>,

    /// Error classification when `success` is false
    pub error_kind: Option<PageErrorKind>,

    /// Human-readable error detail
    pub error_message: Option<String>,

    /// Where the document was written
    pub saved_path: Option<PathBuf>,

    /// Size of the persisted document in bytes (0 on failure)
    pub byte_length: usize,
}

impl PageResult {
    /// A successful, persisted result
    pub fn saved(url: Url, depth: Option<u32>, content: String, path: PathBuf) -> Self {
        let byte_length = content.len();
        Self {
            url,
            depth,
            success: true,
            content: Some(content),
            error_kind: None,
            error_message: None,
            saved_path: Some(path),
            byte_length,
        }
    }

    /// A failed result with its error classification
    pub fn failed(
        url: Url,
        depth: Option<u32>,
        kind: PageErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            url,
            depth,
            success: false,
            content: None,
            error_kind: Some(kind),
            error_message: Some(message.into()),
            saved_path: None,
            byte_length: 0,
        }
    }
}

/// Why a run stopped accepting work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    /// The work set was exhausted
    Completed,
    /// The page cap was reached
    LimitReached,
    /// A stop was requested; in-flight results were kept
    Cancelled,
}

/// Ordered collection of page results plus summary counts
#[derive(Debug)]
pub struct CrawlReport {
    /// Results in emission order (BFS dequeue order for traversal runs)
    pub results: Vec<PageResult>,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run finished; set by [`CrawlReport::finalize`]
    pub finished_at: Option<DateTime<Utc>>,

    /// Why the run stopped
    pub finish_reason: Option<FinishReason>,
}

impl CrawlReport {
    pub fn new() -> Self {
        Self {
            results: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
            finish_reason: None,
        }
    }

    /// Records one result; results arrive in emission order
    pub fn record(&mut self, result: PageResult) {
        self.results.push(result);
    }

    /// Marks the report complete
    pub fn finalize(&mut self, reason: FinishReason) {
        self.finished_at = Some(Utc::now());
        self.finish_reason = Some(reason);
    }

    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    pub fn failure_count(&self) -> usize {
        self.results.len() - self.success_count()
    }

    pub fn total_bytes(&self) -> usize {
        self.results.iter().map(|r| r.byte_length).sum()
    }

    /// Prints a human-readable summary of the run
    pub fn print_summary(&self) {
        println!("\n=== Crawl Report ===");
        println!("Pages attempted: {}", self.results.len());
        println!("Succeeded:       {}", self.success_count());
        println!("Failed:          {}", self.failure_count());
        println!("Total bytes:     {}", self.total_bytes());

        if let (Some(finished), Some(reason)) = (self.finished_at, self.finish_reason) {
            let elapsed = finished - self.started_at;
            println!(
                "Finished:        {:?} in {}.{:03}s",
                reason,
                elapsed.num_seconds(),
                elapsed.num_milliseconds().rem_euclid(1000)
            );
        }

        for result in &self.results {
            if result.success {
                let path = result
                    .saved_path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                println!("  [ok]   {} -> {}", result.url, path);
            } else {
                let kind = result
                    .error_kind
                    .map(|k| k.to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                let message = result.error_message.as_deref().unwrap_or("");
                println!("  [fail] {} ({}): {}", result.url, kind, message);
            }
        }
    }
}

impl Default for CrawlReport {
    fn default() -> Self {
        Self::new()
    }
}
