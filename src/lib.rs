//! Site-Distill: a site-to-markdown harvester
//!
//! This crate discovers the pages belonging to a target website (via sitemap
//! resolution or breadth-first link traversal), extracts and filters their
//! textual content, and persists the result as one markdown document per URL
//! under a per-domain folder.

pub mod config;
pub mod crawler;
pub mod fetch;
pub mod filter;
pub mod protocol;
pub mod report;
pub mod sitemap;
pub mod store;
pub mod url;

use thiserror::Error;

/// Main error type for Site-Distill operations
///
/// Fetch, extraction, and storage failures are per-page data (see
/// [`report::PageResult`]), not errors; this enum covers only the
/// conditions that stop a run from happening at all.
#[derive(Debug, Error)]
pub enum DistillError {
    #[error("Could not initialize: {0}")]
    Init(String),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Result type alias for Site-Distill operations
pub type Result<T> = std::result::Result<T, DistillError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Engine, Termination};
pub use filter::FilterConfig;
pub use report::{CrawlReport, PageErrorKind, PageResult};
pub use url::{domain_bucket, document_file_name, file_key, normalize_url};
