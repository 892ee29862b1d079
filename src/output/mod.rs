//! Output module for terminal reports
//!
//! This module handles:
//! - Corpus statistics and the top-ranked pages
//! - Single page details
//! - Search result listings

pub mod stats;

pub use stats::{load_statistics, print_statistics, CorpusStatistics, RankedPage};

use crate::search::SearchResult;
use crate::storage::Page;

/// Number of most frequent words shown for a page
const TOP_WORDS: usize = 10;

/// Prints every stored attribute of one page
pub fn print_page(page: &Page) {
    println!("=== Page {} ===\n", page.page_id);
    println!("  URL: {}", page.url);
    println!("  Title: {}", page.title);
    match page.pagerank {
        Some(rank) => println!("  PageRank: {:.6}", rank),
        None => println!("  PageRank: (not ranked)"),
    }
    println!("  Outgoing links: {}", page.outgoing.len());
    println!("  Incoming links: {}", page.num_incoming);
    println!(
        "  Words: {} ({} distinct)",
        page.word_frequency.total(),
        page.word_frequency.len()
    );
    println!();

    let mut words: Vec<(&str, u32)> = page.word_frequency.iter().collect();
    words.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    if !words.is_empty() {
        println!("Most Frequent Words:");
        for (word, count) in words.into_iter().take(TOP_WORDS) {
            println!("  {}: {}", word, count);
        }
        println!();
    }

    if !page.incoming.is_empty() {
        println!("Linked From:");
        for url in &page.incoming {
            println!("  - {}", url);
        }
        println!();
    }

    if !page.outgoing.is_empty() {
        println!("Links To:");
        for url in &page.outgoing {
            println!("  - {}", url);
        }
    }
}

/// Prints ranked search results, best first
pub fn print_search_results(query: &str, boosted: bool, results: &[SearchResult]) {
    println!(
        "=== {} result(s) for \"{}\"{} ===\n",
        results.len(),
        query,
        if boosted { " (PageRank boost)" } else { "" }
    );

    for (position, result) in results.iter().enumerate() {
        let rank = result
            .pagerank
            .map_or_else(|| "-".to_string(), |rank| format!("{:.6}", rank));
        println!(
            "  {:>3}. [{}] score {:.6}  pagerank {}  {}",
            position + 1,
            result.page_id,
            result.score,
            rank,
            result.title
        );
        println!("       {}", result.url);
    }
}
