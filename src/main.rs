//! Site-Distill main entry point
//!
//! Command-line interface for fetching web pages, filtering them down to
//! their content, and saving markdown documents to a mirrored directory
//! layout.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use site_distill::config::{load_config_with_hash, validate, Config, PruningMode};
use site_distill::crawler::Engine;
use site_distill::protocol::EventEmitter;
use site_distill::report::CrawlReport;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Site-Distill: websites in, markdown out
///
/// Fetches pages over HTTP, strips boilerplate with a content filter,
/// and writes one markdown file per page under a per-domain directory.
#[derive(Parser, Debug)]
#[command(name = "site-distill")]
#[command(version)]
#[command(about = "Distill websites into filtered markdown", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    /// Override the configured crawl depth limit
    #[arg(long, value_name = "N")]
    max_depth: Option<u32>,

    /// Override the configured page cap
    #[arg(long, value_name = "N")]
    max_pages: Option<usize>,

    /// Follow links to other domains during traversal
    #[arg(long)]
    include_external: bool,

    /// Skip sitemap probing and go straight to link traversal
    #[arg(long)]
    no_sitemap: bool,

    /// Filter pages for relevance to this query instead of density pruning
    #[arg(long, value_name = "QUERY")]
    query: Option<String>,

    /// Minimum relevance score for query filtering
    #[arg(long, value_name = "SCORE")]
    query_threshold: Option<f64>,

    /// Pruning cut line in [0.0, 1.0]
    #[arg(long, value_name = "SCORE")]
    pruning_threshold: Option<f64>,

    /// How the pruning cut line is applied: "fixed" or "dynamic"
    #[arg(long, value_name = "MODE")]
    pruning_type: Option<String>,

    /// Blocks with fewer words are dropped regardless of score
    #[arg(long, value_name = "N")]
    min_word_threshold: Option<usize>,

    /// Override the output root directory
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch and distill a single page
    Single {
        /// The page URL
        url: String,
    },
    /// Fetch and distill an explicit list of pages
    Batch {
        /// Page URLs, attempted in order
        urls: Vec<String>,

        /// Read additional URLs from a file, one per line
        #[arg(short, long, value_name = "FILE")]
        file: Option<PathBuf>,
    },
    /// Distill a whole site (sitemap first, then breadth-first traversal)
    Site {
        /// The site's base URL
        url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    apply_overrides(&mut config, &cli)?;
    validate(&config)?;

    let engine = Engine::new(config, EventEmitter::stdout())?;

    let report = match cli.command {
        Command::Single { ref url } => engine.run_single(url).await,
        Command::Batch { ref urls, ref file } => {
            let urls = collect_batch_urls(urls, file.as_deref())?;
            if urls.is_empty() {
                bail!("no URLs given; pass them as arguments or with --file");
            }
            engine.run_batch(&urls).await
        }
        Command::Site { ref url } => {
            spawn_stop_handler(&engine);
            engine.run_site(url).await?
        }
    };

    finish(&report, cli.quiet)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_distill=info,warn"),
            1 => EnvFilter::new("site_distill=debug,info"),
            2 => EnvFilter::new("site_distill=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Applies command-line overrides on top of the loaded configuration
fn apply_overrides(config: &mut Config, cli: &Cli) -> anyhow::Result<()> {
    if let Some(max_depth) = cli.max_depth {
        config.crawl.max_depth = max_depth;
    }
    if let Some(max_pages) = cli.max_pages {
        config.crawl.max_pages = max_pages;
    }
    if cli.include_external {
        config.crawl.include_external = true;
    }
    if cli.no_sitemap {
        config.crawl.try_sitemap = false;
    }
    if let Some(query) = &cli.query {
        config.filter.use_query = true;
        config.filter.query = query.clone();
    }
    if let Some(threshold) = cli.query_threshold {
        config.filter.query_threshold = threshold;
    }
    if let Some(threshold) = cli.pruning_threshold {
        config.filter.pruning_threshold = threshold;
    }
    if let Some(mode) = &cli.pruning_type {
        config.filter.pruning_type = match mode.as_str() {
            "fixed" => PruningMode::Fixed,
            "dynamic" => PruningMode::Dynamic,
            other => bail!("unknown pruning type: {}", other),
        };
    }
    if let Some(min_words) = cli.min_word_threshold {
        config.filter.min_word_threshold = min_words;
    }
    if let Some(output_dir) = &cli.output_dir {
        config.output.root_dir = output_dir.display().to_string();
    }
    Ok(())
}

/// Merges positional URLs with any read from `--file`
///
/// File lines are trimmed; blank lines and `#` comments are skipped.
fn collect_batch_urls(
    urls: &[String],
    file: Option<&std::path::Path>,
) -> anyhow::Result<Vec<String>> {
    let mut collected = urls.to_vec();

    if let Some(path) = file {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read URL file {}", path.display()))?;
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            collected.push(line.to_string());
        }
    }

    Ok(collected)
}

/// Triggers a graceful drain on Ctrl-C
fn spawn_stop_handler(engine: &Engine) {
    let stop = engine.stop_signal();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight pages");
            stop.stop();
        }
    });
}

/// Prints the run summary; per-URL failures never fail the process
fn finish(report: &CrawlReport, quiet: bool) -> anyhow::Result<()> {
    if !quiet {
        report.print_summary();
    }
    Ok(())
}
