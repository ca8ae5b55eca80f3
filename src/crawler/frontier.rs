//! Breadth-first frontier traversal
//!
//! The frontier is a strict FIFO queue of discovered-but-not-yet-fetched
//! URLs. Traversal guarantees:
//!
//! - A URL's depth is fixed at first discovery; later, shallower paths to
//!   the same URL never re-queue it (duplicates are dropped, not re-queued)
//! - Links are marked visited at enqueue time, not fetch time, so a sibling
//!   page referencing the same link cannot enqueue it twice
//! - Results are handed to the consumer in dequeue order (layer by layer),
//!   even though fetches within a dequeued batch run concurrently
//! - The emitted result count never exceeds `max_pages`
//!
//! Reaching the page cap, draining the queue, and a requested stop are all
//! successful terminations, never errors. A stop prevents further dequeues
//! but lets the in-flight batch complete and be recorded.

use crate::config::CrawlSettings;
use crate::fetch::{FetchOutcome, PageFetcher};
use crate::url::{normalize_url, same_authority};
use futures::future::join_all;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use url::Url;

/// One discovered URL waiting in the frontier
///
/// Immutable once created; the depth is the depth at first discovery.
#[derive(Debug, Clone)]
pub struct FrontierEntry {
    /// The normalized URL to fetch
    pub url: Url,

    /// BFS depth (0 for the base URL)
    pub depth: u32,

    /// The page this URL was first discovered on
    pub discovered_from: Option<Url>,
}

/// Cooperative stop signal for graceful drain
///
/// Once raised, no further entries are dequeued; fetches already issued
/// complete and their results are kept.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// How a traversal run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The queue emptied
    Completed,
    /// The page cap was hit with work still queued
    LimitReached,
    /// A stop was requested; the in-flight batch was drained and kept
    Cancelled,
}

/// Receives fetched pages in dequeue order
///
/// The consumer is called exactly once per dequeued URL, success or
/// failure, before the next batch is dequeued.
pub trait PageConsumer {
    fn page_fetched(&mut self, entry: &FrontierEntry, outcome: FetchOutcome);
}

/// Runs a breadth-first crawl from `base_url`
///
/// # Arguments
///
/// * `fetcher` - Page fetch adapter; one fetch per dequeued URL
/// * `consumer` - Receives each result in dequeue order
/// * `base_url` - Seed URL at depth 0
/// * `settings` - Depth/page limits, external-link scoping, concurrency
/// * `stop` - Cooperative cancellation signal
///
/// # Link admission
///
/// A link found on a successful page is enqueued at `depth + 1` iff it
/// normalizes, has not been seen, `depth + 1 <= max_depth`, and (external
/// links are included OR the link's authority equals the base authority).
pub async fn crawl<F, C>(
    fetcher: &F,
    consumer: &mut C,
    base_url: Url,
    settings: &CrawlSettings,
    stop: &StopSignal,
) -> Termination
where
    F: PageFetcher + Sync,
    C: PageConsumer,
{
    let base = normalize_url(base_url.as_str()).unwrap_or(base_url);

    let mut visited: HashSet<String> = HashSet::new();
    visited.insert(base.to_string());

    let mut queue: VecDeque<FrontierEntry> = VecDeque::new();
    queue.push_back(FrontierEntry {
        url: base.clone(),
        depth: 0,
        discovered_from: None,
    });

    let mut emitted = 0usize;

    while !queue.is_empty() {
        if stop.is_stopped() {
            tracing::info!("Stop requested, draining with {} queued", queue.len());
            return Termination::Cancelled;
        }

        if emitted >= settings.max_pages {
            tracing::info!(
                "Page cap of {} reached with {} URLs still queued",
                settings.max_pages,
                queue.len()
            );
            return Termination::LimitReached;
        }

        // A contiguous prefix of the FIFO queue; fetched concurrently but
        // consumed in dequeue order, which preserves BFS layer order.
        let take = settings
            .max_concurrent_fetches
            .min(settings.max_pages - emitted)
            .min(queue.len());
        let batch: Vec<FrontierEntry> = queue.drain(..take).collect();

        let outcomes = join_all(batch.iter().map(|entry| fetcher.fetch(&entry.url))).await;

        for (entry, outcome) in batch.into_iter().zip(outcomes) {
            if outcome.success && entry.depth < settings.max_depth {
                enqueue_links(
                    &outcome.discovered_links,
                    &entry,
                    &base,
                    settings,
                    &mut visited,
                    &mut queue,
                );
            }

            consumer.page_fetched(&entry, outcome);
            emitted += 1;

            if emitted % 10 == 0 {
                tracing::info!(
                    "Progress: {} pages fetched, {} in frontier",
                    emitted,
                    queue.len()
                );
            }
        }
    }

    Termination::Completed
}

/// Admits newly discovered links into the frontier
fn enqueue_links(
    links: &[String],
    from: &FrontierEntry,
    base: &Url,
    settings: &CrawlSettings,
    visited: &mut HashSet<String>,
    queue: &mut VecDeque<FrontierEntry>,
) {
    for link in links {
        let normalized = match normalize_url(link) {
            Ok(url) => url,
            Err(e) => {
                tracing::trace!("Skipping unparsable link {}: {}", link, e);
                continue;
            }
        };

        if !settings.include_external && !same_authority(&normalized, base) {
            continue;
        }

        if !visited.insert(normalized.to_string()) {
            continue;
        }

        queue.push_back(FrontierEntry {
            url: normalized,
            depth: from.depth + 1,
            discovered_from: Some(from.url.clone()),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Scripted in-memory fetcher: url -> (success, outbound links)
    struct ScriptedFetcher {
        pages: HashMap<String, (bool, Vec<String>)>,
    }

    impl ScriptedFetcher {
        fn new(pages: &[(&str, bool, &[&str])]) -> Self {
            let pages = pages
                .iter()
                .map(|(url, success, links)| {
                    (
                        url.to_string(),
                        (*success, links.iter().map(|l| l.to_string()).collect()),
                    )
                })
                .collect();
            Self { pages }
        }
    }

    impl PageFetcher for ScriptedFetcher {
        async fn fetch(&self, url: &Url) -> FetchOutcome {
            match self.pages.get(url.as_str()) {
                Some((true, links)) => FetchOutcome {
                    success: true,
                    primary_document: Some(format!("content of {}", url)),
                    fallback_document: None,
                    error_message: None,
                    discovered_links: links.clone(),
                },
                Some((false, _)) => FetchOutcome::failure("scripted failure"),
                None => FetchOutcome::failure("HTTP 404"),
            }
        }
    }

    /// Collects results in arrival order; can raise a stop after N pages
    struct Collector {
        seen: Vec<(String, u32)>,
        stop_after: Option<(usize, StopSignal)>,
    }

    impl Collector {
        fn new() -> Self {
            Self {
                seen: Vec::new(),
                stop_after: None,
            }
        }
    }

    impl PageConsumer for Collector {
        fn page_fetched(&mut self, entry: &FrontierEntry, _outcome: FetchOutcome) {
            self.seen.push((entry.url.to_string(), entry.depth));
            if let Some((n, stop)) = &self.stop_after {
                if self.seen.len() >= *n {
                    stop.stop();
                }
            }
        }
    }

    fn settings(max_depth: u32, max_pages: usize) -> CrawlSettings {
        CrawlSettings {
            max_depth,
            max_pages,
            include_external: false,
            try_sitemap: false,
            max_concurrent_fetches: 2,
        }
    }

    fn base() -> Url {
        Url::parse("https://site.test/").unwrap()
    }

    #[tokio::test]
    async fn test_bfs_emits_layer_by_layer() {
        let fetcher = ScriptedFetcher::new(&[
            (
                "https://site.test/",
                true,
                &["https://site.test/a", "https://site.test/b"],
            ),
            ("https://site.test/a", true, &["https://site.test/c"]),
            ("https://site.test/b", true, &[]),
            ("https://site.test/c", true, &[]),
        ]);
        let mut collector = Collector::new();

        let termination = crawl(
            &fetcher,
            &mut collector,
            base(),
            &settings(3, 100),
            &StopSignal::new(),
        )
        .await;

        assert_eq!(termination, Termination::Completed);
        let depths: Vec<u32> = collector.seen.iter().map(|(_, d)| *d).collect();
        assert_eq!(depths, vec![0, 1, 1, 2]);
        assert_eq!(collector.seen[0].0, "https://site.test/");
        assert_eq!(collector.seen[3].0, "https://site.test/c");
    }

    #[tokio::test]
    async fn test_duplicate_links_are_dropped_not_requeued() {
        // Both /a and /b link to /shared; it must be fetched exactly once,
        // at the depth of its first discovery.
        let fetcher = ScriptedFetcher::new(&[
            (
                "https://site.test/",
                true,
                &["https://site.test/a", "https://site.test/b"],
            ),
            ("https://site.test/a", true, &["https://site.test/shared"]),
            ("https://site.test/b", true, &["https://site.test/shared"]),
            ("https://site.test/shared", true, &[]),
        ]);
        let mut collector = Collector::new();

        crawl(
            &fetcher,
            &mut collector,
            base(),
            &settings(3, 100),
            &StopSignal::new(),
        )
        .await;

        let shared_count = collector
            .seen
            .iter()
            .filter(|(url, _)| url == "https://site.test/shared")
            .count();
        assert_eq!(shared_count, 1);
        assert_eq!(collector.seen.len(), 4);
    }

    #[tokio::test]
    async fn test_depth_limit() {
        let fetcher = ScriptedFetcher::new(&[
            ("https://site.test/", true, &["https://site.test/a"]),
            ("https://site.test/a", true, &["https://site.test/deep"]),
            ("https://site.test/deep", true, &[]),
        ]);
        let mut collector = Collector::new();

        let termination = crawl(
            &fetcher,
            &mut collector,
            base(),
            &settings(1, 100),
            &StopSignal::new(),
        )
        .await;

        // depth 2 would exceed max_depth = 1, so /deep is never enqueued
        assert_eq!(termination, Termination::Completed);
        assert_eq!(collector.seen.len(), 2);
    }

    #[tokio::test]
    async fn test_max_pages_limit() {
        let fetcher = ScriptedFetcher::new(&[
            (
                "https://site.test/",
                true,
                &[
                    "https://site.test/a",
                    "https://site.test/b",
                    "https://site.test/c",
                ],
            ),
            ("https://site.test/a", true, &[]),
            ("https://site.test/b", true, &[]),
            ("https://site.test/c", true, &[]),
        ]);
        let mut collector = Collector::new();

        let termination = crawl(
            &fetcher,
            &mut collector,
            base(),
            &settings(3, 2),
            &StopSignal::new(),
        )
        .await;

        assert_eq!(termination, Termination::LimitReached);
        assert_eq!(collector.seen.len(), 2);
    }

    #[tokio::test]
    async fn test_external_links_excluded_by_default() {
        let fetcher = ScriptedFetcher::new(&[
            (
                "https://site.test/",
                true,
                &["https://other.test/page", "https://site.test/a"],
            ),
            ("https://site.test/a", true, &[]),
        ]);
        let mut collector = Collector::new();

        crawl(
            &fetcher,
            &mut collector,
            base(),
            &settings(3, 100),
            &StopSignal::new(),
        )
        .await;

        assert_eq!(collector.seen.len(), 2);
        assert!(collector
            .seen
            .iter()
            .all(|(url, _)| url.starts_with("https://site.test/")));
    }

    #[tokio::test]
    async fn test_external_links_included_when_enabled() {
        let fetcher = ScriptedFetcher::new(&[
            ("https://site.test/", true, &["https://other.test/page"]),
            ("https://other.test/page", true, &[]),
        ]);
        let mut collector = Collector::new();
        let mut s = settings(3, 100);
        s.include_external = true;

        crawl(&fetcher, &mut collector, base(), &s, &StopSignal::new()).await;

        assert_eq!(collector.seen.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_pages_still_emit_results() {
        let fetcher = ScriptedFetcher::new(&[
            (
                "https://site.test/",
                true,
                &["https://site.test/missing", "https://site.test/a"],
            ),
            ("https://site.test/a", true, &[]),
        ]);
        let mut collector = Collector::new();

        let termination = crawl(
            &fetcher,
            &mut collector,
            base(),
            &settings(3, 100),
            &StopSignal::new(),
        )
        .await;

        // /missing fails but still produces a result
        assert_eq!(termination, Termination::Completed);
        assert_eq!(collector.seen.len(), 3);
    }

    #[tokio::test]
    async fn test_stop_signal_drains_gracefully() {
        let fetcher = ScriptedFetcher::new(&[
            (
                "https://site.test/",
                true,
                &["https://site.test/a", "https://site.test/b"],
            ),
            ("https://site.test/a", true, &[]),
            ("https://site.test/b", true, &[]),
        ]);
        let stop = StopSignal::new();
        let mut collector = Collector::new();
        collector.stop_after = Some((1, stop.clone()));

        let termination = crawl(&fetcher, &mut collector, base(), &settings(3, 100), &stop).await;

        assert_eq!(termination, Termination::Cancelled);
        // The first result is kept; nothing after the stop is dequeued.
        assert!(!collector.seen.is_empty());
        assert!(collector.seen.len() < 3);
    }

    #[tokio::test]
    async fn test_pre_raised_stop_fetches_nothing() {
        let fetcher = ScriptedFetcher::new(&[("https://site.test/", true, &[])]);
        let stop = StopSignal::new();
        stop.stop();
        let mut collector = Collector::new();

        let termination = crawl(&fetcher, &mut collector, base(), &settings(3, 100), &stop).await;

        assert_eq!(termination, Termination::Cancelled);
        assert!(collector.seen.is_empty());
    }
}
