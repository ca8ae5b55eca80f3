//! Stateful parsing of a worker's line stream
//!
//! Attribution rule: a `[SUCCESS]` or `[ERROR]` line that does not carry a
//! URL belongs to the most recently seen `[SCRAPE]` URL. This makes
//! parsing order-dependent: lines must be consumed in emission order, and
//! streams from different workers must be demultiplexed before parsing or
//! the attribution state corrupts. An outcome line with no preceding
//! `[SCRAPE]` is attributed to no URL and surfaced as a reconciliation
//! gap; the run continues.

use crate::protocol::WorkerEvent;

/// One parsed line with its attribution
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEvent {
    pub event: WorkerEvent,

    /// The URL this event belongs to, after attribution
    pub attributed_url: Option<String>,

    /// True when an outcome line could not be attributed to any URL
    pub reconciliation_gap: bool,
}

/// Stateful line parser for one worker's stream
#[derive(Debug, Default)]
pub struct LineParser {
    current_url: Option<String>,
}

impl LineParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the next line of the stream
    pub fn parse_line(&mut self, line: &str) -> ParsedEvent {
        let line = line.trim_end_matches(['\r', '\n']);

        if let Some(rest) = line.strip_prefix("[SCRAPE] ") {
            let url = rest.trim().to_string();
            self.current_url = Some(url.clone());
            return ParsedEvent {
                event: WorkerEvent::ScrapeStarted { url: url.clone() },
                attributed_url: Some(url),
                reconciliation_gap: false,
            };
        }

        if let Some(rest) = line.strip_prefix("[SUCCESS] Saved to: ") {
            let path = rest.trim().to_string();
            let attributed = self.current_url.clone();
            return ParsedEvent {
                event: WorkerEvent::SaveSucceeded {
                    url: attributed.clone(),
                    path,
                },
                reconciliation_gap: attributed.is_none(),
                attributed_url: attributed,
            };
        }

        if let Some(rest) = line.strip_prefix("[OK] ") {
            // This form carries its own URL; no attribution needed.
            if let Some((url, path)) = rest.split_once(" -> ") {
                let url = url.trim().to_string();
                return ParsedEvent {
                    event: WorkerEvent::SaveSucceeded {
                        url: Some(url.clone()),
                        path: path.trim().to_string(),
                    },
                    attributed_url: Some(url),
                    reconciliation_gap: false,
                };
            }
        }

        if let Some(rest) = line.strip_prefix("[ERROR] ") {
            let attributed = self.current_url.clone();
            return ParsedEvent {
                event: WorkerEvent::Failed {
                    url: attributed.clone(),
                    message: rest.trim().to_string(),
                },
                reconciliation_gap: attributed.is_none(),
                attributed_url: attributed,
            };
        }

        if let Some(rest) = line.strip_prefix("[DONE] Crawled ") {
            if let Some(event) = parse_done_line(rest) {
                return ParsedEvent {
                    event,
                    attributed_url: None,
                    reconciliation_gap: false,
                };
            }
        }

        if let Some(rest) = line.strip_prefix("[INFO] ") {
            return ParsedEvent {
                event: WorkerEvent::Info {
                    message: rest.trim().to_string(),
                },
                attributed_url: None,
                reconciliation_gap: false,
            };
        }

        ParsedEvent {
            event: WorkerEvent::Unrecognized {
                raw_line: line.to_string(),
            },
            attributed_url: None,
            reconciliation_gap: false,
        }
    }

    /// Parses a whole stream of lines in order
    pub fn parse_stream<'a>(
        &'a mut self,
        lines: impl IntoIterator<Item = &'a str> + 'a,
    ) -> impl Iterator<Item = ParsedEvent> + 'a {
        lines.into_iter().map(move |line| self.parse_line(line))
    }
}

/// Parses the remainder of a `[DONE] Crawled ` line:
/// `<n> pages... saved in: <path>`
fn parse_done_line(rest: &str) -> Option<WorkerEvent> {
    let page_count: usize = rest.split_whitespace().next()?.parse().ok()?;
    let bucket_path = rest.split("saved in: ").nth(1)?.trim().to_string();

    Some(WorkerEvent::RunFinished {
        page_count,
        bucket_path,
    })
}

/// Aggregated view of one worker's stream
#[derive(Debug, Default, PartialEq)]
pub struct ProtocolSummary {
    /// Successful saves: attributed URL (if any) and saved path
    pub saves: Vec<(Option<String>, String)>,

    /// Failures: attributed URL (if any) and message
    pub failures: Vec<(Option<String>, String)>,

    /// The final `[DONE]` event, if one was seen
    pub finished: Option<(usize, String)>,

    /// Outcome lines that could not be attributed to a URL
    pub reconciliation_gaps: usize,

    /// Unrecognized lines, kept for logs
    pub unrecognized: Vec<String>,
}

/// Builds the aggregated report from parsed events
pub fn aggregate(events: impl IntoIterator<Item = ParsedEvent>) -> ProtocolSummary {
    let mut summary = ProtocolSummary::default();

    for parsed in events {
        if parsed.reconciliation_gap {
            summary.reconciliation_gaps += 1;
        }

        match parsed.event {
            WorkerEvent::SaveSucceeded { path, .. } => {
                summary.saves.push((parsed.attributed_url, path));
            }
            WorkerEvent::Failed { message, .. } => {
                summary.failures.push((parsed.attributed_url, message));
            }
            WorkerEvent::RunFinished {
                page_count,
                bucket_path,
            } => {
                summary.finished = Some((page_count, bucket_path));
            }
            WorkerEvent::Unrecognized { raw_line } => {
                summary.unrecognized.push(raw_line);
            }
            WorkerEvent::ScrapeStarted { .. } | WorkerEvent::Info { .. } => {}
        }
    }

    summary
}
