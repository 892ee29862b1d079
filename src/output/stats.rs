//! Statistics generation from the corpus database
//!
//! This module provides functionality for extracting and displaying
//! corpus statistics from the storage layer.

use crate::storage::{PageStore, RunRecord};
use crate::LinkRankError;

/// A page listed among the highest ranked
#[derive(Debug, Clone, PartialEq)]
pub struct RankedPage {
    pub page_id: i64,
    pub url: String,
    pub title: String,
    pub pagerank: f64,
}

/// Corpus statistics summary
#[derive(Debug, Clone)]
pub struct CorpusStatistics {
    pub corpus: String,

    /// Total number of pages stored
    pub total_pages: u64,

    /// Sum of outgoing list lengths
    pub outgoing_links: u64,

    /// Sum of incoming counts (links that resolved inside the corpus)
    pub resolved_links: u64,

    /// Pages with neither outgoing nor incoming links
    pub isolated_pages: u64,

    /// Pages without a stored rank
    pub unranked_pages: u64,

    /// Sum of all stored ranks
    pub rank_sum: f64,

    /// Highest ranked pages, best first
    pub top_pages: Vec<RankedPage>,

    /// Most recent run for the corpus
    pub latest_run: Option<RunRecord>,

    /// Seconds between start and finish of the latest run
    pub duration_seconds: Option<u64>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The store to query
/// * `top` - How many of the highest ranked pages to include
pub fn load_statistics(storage: &dyn PageStore, top: usize) -> Result<CorpusStatistics, LinkRankError> {
    let pages = storage.find_all()?;

    let mut stats = CorpusStatistics {
        corpus: storage.corpus().to_string(),
        total_pages: pages.len() as u64,
        outgoing_links: 0,
        resolved_links: 0,
        isolated_pages: 0,
        unranked_pages: 0,
        rank_sum: 0.0,
        top_pages: Vec::new(),
        latest_run: storage.get_latest_run()?,
        duration_seconds: None,
    };

    for page in &pages {
        stats.outgoing_links += page.outgoing.len() as u64;
        stats.resolved_links += u64::from(page.num_incoming);
        if page.outgoing.is_empty() && page.incoming.is_empty() {
            stats.isolated_pages += 1;
        }
        match page.pagerank {
            Some(rank) => stats.rank_sum += rank,
            None => stats.unranked_pages += 1,
        }
    }

    let mut ranked: Vec<RankedPage> = pages
        .into_iter()
        .filter_map(|page| {
            page.pagerank.map(|pagerank| RankedPage {
                page_id: page.page_id,
                url: page.url,
                title: page.title,
                pagerank,
            })
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.pagerank
            .total_cmp(&a.pagerank)
            .then(a.page_id.cmp(&b.page_id))
    });
    ranked.truncate(top);
    stats.top_pages = ranked;

    stats.duration_seconds = stats.latest_run.as_ref().and_then(run_duration);

    Ok(stats)
}

fn run_duration(run: &RunRecord) -> Option<u64> {
    let started = run.started_at.parse::<chrono::DateTime<chrono::Utc>>().ok()?;
    let finished = run
        .finished_at
        .as_ref()?
        .parse::<chrono::DateTime<chrono::Utc>>()
        .ok()?;
    u64::try_from((finished - started).num_seconds()).ok()
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CorpusStatistics) {
    println!("=== Corpus Statistics: {} ===\n", stats.corpus);

    if let Some(run) = &stats.latest_run {
        println!("Latest Run:");
        println!("  Run ID: {}", run.id);
        println!("  Status: {}", run.status.to_db_string());
        println!("  Started: {}", run.started_at);
        if let Some(finished) = &run.finished_at {
            println!("  Finished: {}", finished);
        }
        if let Some(seconds) = stats.duration_seconds {
            println!("  Duration: {}s", seconds);
        }
        if let Some(iterations) = run.iterations {
            println!("  PageRank iterations: {}", iterations);
        }
        println!();
    }

    println!("Overview:");
    println!("  Total pages: {}", stats.total_pages);
    println!("  Outgoing links: {}", stats.outgoing_links);
    println!("  Links resolved inside corpus: {}", stats.resolved_links);
    println!("  Isolated pages: {}", stats.isolated_pages);
    println!("  Unranked pages: {}", stats.unranked_pages);
    println!("  Rank sum: {:.6}", stats.rank_sum);
    println!();

    if !stats.top_pages.is_empty() {
        println!("Top Pages by PageRank:");
        for (position, page) in stats.top_pages.iter().enumerate() {
            println!(
                "  {:>3}. [{}] {:.6}  {}  {}",
                position + 1,
                page.page_id,
                page.pagerank,
                page.title,
                page.url
            );
        }
    }
}
