//! Configuration module for Site-Distill
//!
//! Configuration is loaded from a TOML file, validated once, and passed
//! explicitly through the call chain. Every option has a default so the
//! tool also runs without a config file; the CLI can override individual
//! fields.

mod parser;
mod types;
mod validation;

pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use types::{
    Config, CrawlSettings, FetchSettings, FilterSettings, OutputSettings, PruningMode,
};
pub use validation::validate;
