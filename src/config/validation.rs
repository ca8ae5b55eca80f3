//! Configuration validation
//!
//! Checks the numeric ranges and cross-field rules the rest of the engine
//! assumes. Validation runs once at load time; downstream code trusts a
//! validated [`Config`].

use crate::config::types::Config;
use crate::ConfigError;

/// Validates a configuration
///
/// # Rules
///
/// - `pruning-threshold` must be within `[0.0, 1.0]`
/// - `query-threshold` must be greater than zero
/// - `use-query` requires a non-empty `query`
/// - `max-depth`, `max-pages`, and `max-concurrent-fetches` must be at least 1
/// - `request-timeout-secs` must be at least 1
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    let filter = &config.filter;

    if !(0.0..=1.0).contains(&filter.pruning_threshold) {
        return Err(ConfigError::Validation(format!(
            "pruning-threshold must be within [0.0, 1.0], got {}",
            filter.pruning_threshold
        )));
    }

    if filter.query_threshold <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "query-threshold must be greater than 0, got {}",
            filter.query_threshold
        )));
    }

    if filter.use_query && filter.query.trim().is_empty() {
        return Err(ConfigError::Validation(
            "use-query is set but query is empty".to_string(),
        ));
    }

    let crawl = &config.crawl;

    if crawl.max_depth == 0 {
        return Err(ConfigError::Validation(
            "max-depth must be at least 1".to_string(),
        ));
    }

    if crawl.max_pages == 0 {
        return Err(ConfigError::Validation(
            "max-pages must be at least 1".to_string(),
        ));
    }

    if crawl.max_concurrent_fetches == 0 {
        return Err(ConfigError::Validation(
            "max-concurrent-fetches must be at least 1".to_string(),
        ));
    }

    if config.fetch.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be at least 1".to_string(),
        ));
    }

    Ok(())
}
