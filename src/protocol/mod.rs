//! Worker event protocol
//!
//! A driver process launches crawl workers and reconstructs structured
//! results from their output. Inside one process events travel as typed
//! [`WorkerEvent`] values over a channel; across process boundaries they
//! are encoded as a line-oriented text stream with fixed prefixes:
//!
//! ```text
//! [SCRAPE] <url>
//! [SUCCESS] Saved to: <path>
//! [ERROR] <message>
//! [OK] <url> -> <path>
//! [DONE] Crawled <n> pages. Markdown saved in: <path>
//! [INFO] <message>
//! ```
//!
//! The prefixes are a compatibility contract and must match verbatim.
//! Parsing is stateful (see [`parser`]): bare `[SUCCESS]`/`[ERROR]` lines
//! are attributed to the most recently seen `[SCRAPE]` URL, so a stream
//! must be consumed in emission order and streams from concurrent workers
//! must never be interleaved before parsing.

mod parser;

pub use parser::{aggregate, LineParser, ParsedEvent, ProtocolSummary};

use tokio::sync::mpsc::UnboundedSender;

/// One event in a worker's output stream
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerEvent {
    /// A page fetch is starting; establishes the attribution URL for
    /// subsequent bare outcome lines
    ScrapeStarted { url: String },

    /// A document was persisted. `url` is `None` when the wire form did
    /// not carry one (attribution happens parser-side).
    SaveSucceeded { url: Option<String>, path: String },

    /// A page attempt failed
    Failed { url: Option<String>, message: String },

    /// The run finished
    RunFinished { page_count: usize, bucket_path: String },

    /// Informational message; ignored by aggregation
    Info { message: String },

    /// A line that matched no known prefix; kept for logs, ignored by
    /// aggregation
    Unrecognized { raw_line: String },
}

impl WorkerEvent {
    /// Encodes the event as its wire line
    pub fn to_line(&self) -> String {
        match self {
            Self::ScrapeStarted { url } => format!("[SCRAPE] {}", url),
            Self::SaveSucceeded { url: Some(url), path } => format!("[OK] {} -> {}", url, path),
            Self::SaveSucceeded { url: None, path } => format!("[SUCCESS] Saved to: {}", path),
            Self::Failed { url: Some(url), message } => format!("[ERROR] {}: {}", url, message),
            Self::Failed { url: None, message } => format!("[ERROR] {}", message),
            Self::RunFinished {
                page_count,
                bucket_path,
            } => format!(
                "[DONE] Crawled {} pages. Markdown saved in: {}",
                page_count, bucket_path
            ),
            Self::Info { message } => format!("[INFO] {}", message),
            Self::Unrecognized { raw_line } => raw_line.clone(),
        }
    }
}

/// Worker-side event sink
///
/// Writes the line encoding to stdout (for an external driver) and/or
/// forwards the typed event over a channel (for an in-process driver).
pub struct EventEmitter {
    print_lines: bool,
    channel: Option<UnboundedSender<WorkerEvent>>,
}

impl EventEmitter {
    /// Emits wire lines on stdout
    pub fn stdout() -> Self {
        Self {
            print_lines: true,
            channel: None,
        }
    }

    /// Emits nothing; useful in tests
    pub fn silent() -> Self {
        Self {
            print_lines: false,
            channel: None,
        }
    }

    /// Also forward typed events over a channel
    pub fn with_channel(mut self, tx: UnboundedSender<WorkerEvent>) -> Self {
        self.channel = Some(tx);
        self
    }

    pub fn emit(&self, event: WorkerEvent) {
        if self.print_lines {
            println!("{}", event.to_line());
        }
        if let Some(tx) = &self.channel {
            // A dropped receiver means no in-process driver is listening;
            // the line output still happened.
            let _ = tx.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_encoding() {
        assert_eq!(
            WorkerEvent::ScrapeStarted {
                url: "https://example.com/a".to_string()
            }
            .to_line(),
            "[SCRAPE] https://example.com/a"
        );

        assert_eq!(
            WorkerEvent::SaveSucceeded {
                url: None,
                path: "example.com/a.md".to_string()
            }
            .to_line(),
            "[SUCCESS] Saved to: example.com/a.md"
        );

        assert_eq!(
            WorkerEvent::SaveSucceeded {
                url: Some("https://example.com/a".to_string()),
                path: "example.com/a.md".to_string()
            }
            .to_line(),
            "[OK] https://example.com/a -> example.com/a.md"
        );

        assert_eq!(
            WorkerEvent::RunFinished {
                page_count: 7,
                bucket_path: "example.com".to_string()
            }
            .to_line(),
            "[DONE] Crawled 7 pages. Markdown saved in: example.com"
        );
    }

    #[tokio::test]
    async fn test_emitter_forwards_to_channel() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let emitter = EventEmitter::silent().with_channel(tx);

        emitter.emit(WorkerEvent::Info {
            message: "hello".to_string(),
        });

        assert_eq!(
            rx.recv().await,
            Some(WorkerEvent::Info {
                message: "hello".to_string()
            })
        );
    }
}
