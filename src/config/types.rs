use serde::Deserialize;

/// Main configuration structure for Site-Distill
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub filter: FilterSettings,
    #[serde(default)]
    pub crawl: CrawlSettings,
    #[serde(default)]
    pub fetch: FetchSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

/// Content-filter configuration
///
/// When `use_query` is set (and `query` is non-empty) a query-relevance
/// filter is built; otherwise the pruning parameters apply. The selection
/// rule itself lives in [`crate::filter::select_filter`].
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterSettings {
    /// Pruning cut line, 0.0 (keep more) to 1.0 (prune more)
    #[serde(rename = "pruning-threshold", default = "default_pruning_threshold")]
    pub pruning_threshold: f64,

    /// How the pruning cut line is applied
    #[serde(rename = "pruning-type", default)]
    pub pruning_type: PruningMode,

    /// Blocks with fewer words are dropped regardless of score
    #[serde(rename = "min-word-threshold", default = "default_min_word_threshold")]
    pub min_word_threshold: usize,

    /// Use query-relevance filtering instead of density pruning
    #[serde(rename = "use-query", default)]
    pub use_query: bool,

    /// Query for relevance filtering
    #[serde(default)]
    pub query: String,

    /// Minimum relevance score for a block to be kept
    #[serde(rename = "query-threshold", default = "default_query_threshold")]
    pub query_threshold: f64,
}

/// How the pruning threshold is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PruningMode {
    /// Constant cut line
    Fixed,
    /// Cut line adapted per page from the content density distribution
    #[default]
    Dynamic,
}

/// Crawl traversal limits
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CrawlSettings {
    /// Maximum depth to crawl from the base URL
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Maximum number of pages fetched in one run
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: usize,

    /// Follow links to other authorities
    #[serde(rename = "include-external", default)]
    pub include_external: bool,

    /// Attempt sitemap discovery before falling back to link traversal
    #[serde(rename = "try-sitemap", default = "default_true")]
    pub try_sitemap: bool,

    /// Maximum number of in-flight page fetches
    #[serde(rename = "max-concurrent-fetches", default = "default_concurrency")]
    pub max_concurrent_fetches: usize,
}

/// Page fetching configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FetchSettings {
    /// Per-request timeout in seconds
    #[serde(rename = "request-timeout-secs", default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Tag names whose subtrees are skipped during content extraction
    #[serde(rename = "excluded-tags", default = "default_excluded_tags")]
    pub excluded_tags: Vec<String>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSettings {
    /// Directory under which domain buckets are created
    #[serde(rename = "root-dir", default = "default_root_dir")]
    pub root_dir: String,
}

fn default_pruning_threshold() -> f64 {
    0.48
}

fn default_min_word_threshold() -> usize {
    10
}

fn default_query_threshold() -> f64 {
    1.2
}

fn default_max_depth() -> u32 {
    2
}

fn default_max_pages() -> usize {
    20
}

fn default_true() -> bool {
    true
}

fn default_concurrency() -> usize {
    4
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_excluded_tags() -> Vec<String> {
    ["nav", "footer", "header", "style", "script"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_root_dir() -> String {
    ".".to_string()
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            pruning_threshold: default_pruning_threshold(),
            pruning_type: PruningMode::default(),
            min_word_threshold: default_min_word_threshold(),
            use_query: false,
            query: String::new(),
            query_threshold: default_query_threshold(),
        }
    }
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_pages: default_max_pages(),
            include_external: false,
            try_sitemap: true,
            max_concurrent_fetches: default_concurrency(),
        }
    }
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_timeout_secs(),
            excluded_tags: default_excluded_tags(),
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
        }
    }
}
