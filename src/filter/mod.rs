//! Content-filter selection and the block-filtering contract
//!
//! A run uses exactly one filter configuration, chosen once up front:
//! a non-empty query always selects query-relevance filtering, otherwise
//! density pruning applies. The filters themselves are pluggable scoring
//! functions behind the [`ContentFilter`] trait; the two built-in
//! implementations live in [`pruning`] and [`bm25`].

mod bm25;
mod pruning;

pub use bm25::Bm25Filter;
pub use pruning::PruningFilter;

use crate::config::{FilterSettings, PruningMode};

/// One extracted content block, the unit the filters score
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    /// Source element name (`p`, `h1`, `li`, ...)
    pub tag: String,

    /// Collapsed text content of the block
    pub text: String,

    /// Number of words that sit inside anchor elements
    pub link_word_count: usize,
}

impl TextBlock {
    pub fn new(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            text: text.into(),
            link_word_count: 0,
        }
    }

    /// Number of whitespace-separated words in the block
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Fraction of the block's words that are link text
    pub fn link_density(&self) -> f64 {
        let words = self.word_count();
        if words == 0 {
            return 1.0;
        }
        self.link_word_count as f64 / words as f64
    }
}

/// The filter configuration active for one run
///
/// Exactly one variant is active per run; all pages share it.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterConfig {
    /// Density pruning: discard blocks by structural/text-density score
    Pruning {
        /// Cut line in `[0.0, 1.0]`
        threshold: f64,
        /// Fixed or per-page adaptive cut line
        mode: PruningMode,
        /// Blocks with fewer words are dropped regardless of score
        min_words_per_block: usize,
    },

    /// Query relevance: discard blocks scoring below `threshold` against
    /// the query
    QueryRelevance { query: String, threshold: f64 },
}

/// A scoring function over extracted content blocks
///
/// Implementations return the kept blocks in their original order. The
/// trait is the collaborator boundary: the engine never inspects scores,
/// only the surviving blocks.
pub trait ContentFilter: Send + Sync {
    fn filter_blocks(&self, blocks: &[TextBlock]) -> Vec<TextBlock>;
}

/// Opaque handle passed to the page-extraction side
pub type FilterHandle = Box<dyn ContentFilter>;

/// Chooses the filter configuration for a run
///
/// A supplied non-empty query takes precedence even when pruning parameters
/// are also set. Selection happens once per run, not per page.
pub fn select_filter(settings: &FilterSettings) -> FilterConfig {
    if settings.use_query && !settings.query.trim().is_empty() {
        FilterConfig::QueryRelevance {
            query: settings.query.trim().to_string(),
            threshold: settings.query_threshold,
        }
    } else {
        FilterConfig::Pruning {
            threshold: settings.pruning_threshold,
            mode: settings.pruning_type,
            min_words_per_block: settings.min_word_threshold,
        }
    }
}

/// Builds the filter implementation for a configuration
pub fn build_filter(config: &FilterConfig) -> FilterHandle {
    match config {
        FilterConfig::Pruning {
            threshold,
            mode,
            min_words_per_block,
        } => Box::new(PruningFilter::new(*threshold, *mode, *min_words_per_block)),
        FilterConfig::QueryRelevance { query, threshold } => {
            Box::new(Bm25Filter::new(query, *threshold))
        }
    }
}
