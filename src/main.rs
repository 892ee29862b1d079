//! LinkRank main entry point
//!
//! This is the command-line interface for crawling, ranking and searching a
//! bounded web corpus.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use linkrank::config::{load_config_with_hash, Config, CorpusEntry, FilterStrategy};
use linkrank::crawler::run_crawl;
use linkrank::output::{load_statistics, print_page, print_search_results, print_statistics};
use linkrank::search::{clamp_limit, run_search, PageIndex};
use linkrank::storage::{open_storage, PageStore, SqliteStorage};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// LinkRank: a bounded crawler with link-graph PageRank
///
/// LinkRank crawls a corpus from a seed URL up to a fixed page budget,
/// resolves the link graph between crawled pages and ranks them with
/// PageRank. The ranked corpus can then be searched from the command line.
#[derive(Parser, Debug)]
#[command(name = "linkrank")]
#[command(version = "1.0.0")]
#[command(about = "Bounded crawler with link-graph PageRank", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    /// Corpus to operate on (defaults to the first one configured)
    #[arg(long, global = true)]
    corpus: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Drop the corpus, crawl it from its seed, then resolve links and rank
    Crawl,

    /// Show statistics and the top-ranked pages of the corpus
    Stats {
        /// Number of top-ranked pages to list
        #[arg(long, default_value_t = 10)]
        top: usize,
    },

    /// Search page titles and text
    Search {
        /// Query text
        query: String,

        /// Multiply relevance by PageRank before ordering
        #[arg(long)]
        boost: bool,

        /// Maximum number of results
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show one page by id
    Page {
        /// Page id
        id: i64,
    },

    /// Validate config and show what would be crawled without crawling
    DryRun,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let corpus = select_corpus(&config, cli.corpus.as_deref())?;

    match cli.command {
        Command::Crawl => handle_crawl(&config, corpus, &config_hash).await,
        Command::Stats { top } => handle_stats(&config, corpus, top),
        Command::Search {
            query,
            boost,
            limit,
        } => handle_search(&config, corpus, &query, boost, limit),
        Command::Page { id } => handle_page(&config, corpus, id),
        Command::DryRun => {
            handle_dry_run(&config, corpus);
            Ok(())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("linkrank=info,warn"),
            1 => EnvFilter::new("linkrank=debug,info"),
            2 => EnvFilter::new("linkrank=trace,debug"),
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

fn select_corpus<'a>(config: &'a Config, name: Option<&str>) -> anyhow::Result<&'a CorpusEntry> {
    match config.find_corpus(name) {
        Some(corpus) => Ok(corpus),
        None => bail!(
            "Unknown corpus '{}' (configured: {})",
            name.unwrap_or_default(),
            config
                .corpus
                .iter()
                .map(|c| c.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

fn open_corpus(config: &Config, corpus: &CorpusEntry) -> anyhow::Result<SqliteStorage> {
    open_storage(Path::new(&config.output.database_path), &corpus.name)
        .with_context(|| format!("Failed to open database {}", config.output.database_path))
}

/// Handles the dry-run mode: shows the configuration that would be used
fn handle_dry_run(config: &Config, corpus: &CorpusEntry) {
    println!("=== LinkRank Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Budget: {} pages", config.crawler.budget);
    println!(
        "  Max concurrent fetches: {}",
        config.crawler.max_concurrent_fetches
    );
    println!("  Rate limit: {}ms", config.crawler.rate_limit_ms);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nRanking:");
    println!("  Damping: {}", config.ranking.damping);
    println!("  Tolerance: {:e}", config.ranking.tolerance);
    println!("  Max iterations: {}", config.ranking.max_iterations);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    println!("\nCorpora ({}):", config.corpus.len());
    for entry in &config.corpus {
        let marker = if entry.name == corpus.name { "*" } else { "-" };
        println!("  {} {}", marker, entry.name);
        println!("      Seed: {}", entry.seed);
        println!("      Site root: {}", entry.site_root);
        match entry.filter {
            FilterStrategy::Namespace => println!(
                "      Filter: namespace {}",
                entry.required_prefix.as_deref().unwrap_or("/")
            ),
            FilterStrategy::SiteRelative => println!("      Filter: site-relative"),
        }
        if !entry.deny.is_empty() {
            println!("      Deny: {}", entry.deny.join(" "));
        }
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would crawl '{}' from {} (up to {} pages)",
        corpus.name, corpus.seed, config.crawler.budget
    );
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, corpus: &CorpusEntry, config_hash: &str) -> anyhow::Result<()> {
    tracing::info!("Starting crawl of corpus '{}'", corpus.name);

    let report = run_crawl(config, Some(corpus.name.as_str()), config_hash)
        .await
        .with_context(|| format!("Crawl of corpus '{}' failed", corpus.name))?;

    tracing::info!(
        "Run {} completed: {} pages stored from {} accepted URLs, {} links resolved, \
         PageRank converged in {} iterations ({:?})",
        report.run_id,
        report.pages_stored,
        report.urls_accepted,
        report.resolve.links_added,
        report.ranking.iterations,
        report.elapsed
    );
    Ok(())
}

/// Handles the stats mode: shows statistics from the database
fn handle_stats(config: &Config, corpus: &CorpusEntry, top: usize) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let storage = open_corpus(config, corpus)?;
    let stats = load_statistics(&storage, top)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the search mode
fn handle_search(
    config: &Config,
    corpus: &CorpusEntry,
    query: &str,
    boost: bool,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let storage = open_corpus(config, corpus)?;
    let limit = clamp_limit(limit, &config.search);

    let pages = storage.find_all()?;
    let index = PageIndex::from_pages(&pages)?;
    tracing::info!(
        "Searching {} pages of corpus '{}'",
        index.document_count(),
        corpus.name
    );
    let results = run_search(&index, &storage, query, boost, limit)?;

    print_search_results(query, boost, &results);
    Ok(())
}

/// Handles the page mode: shows one page or reports it missing
fn handle_page(config: &Config, corpus: &CorpusEntry, id: i64) -> anyhow::Result<()> {
    let storage = open_corpus(config, corpus)?;

    match storage.find_by_id(id)? {
        Some(page) => print_page(&page),
        None => {
            let count = storage.count()?;
            println!(
                "Page {} not found in corpus '{}' ({} pages)",
                id, corpus.name, count
            );
        }
    }

    Ok(())
}
