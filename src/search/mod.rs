//! Full-text search over a ranked corpus
//!
//! This module handles:
//! - The [`SearchIndex`] seam and an in-memory tantivy implementation
//! - Optional PageRank boosting of relevance scores
//! - Clamping requested result limits to the configured range

mod index;

pub use index::{IndexDocument, PageIndex};

use crate::config::SearchConfig;
use crate::storage::PageStore;
use crate::LinkRankError;

/// A raw relevance match
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit {
    pub page_id: i64,
    pub score: f64,
}

/// Full-text index queried by the search command
pub trait SearchIndex {
    /// All matches for `query`, best first, unbounded
    fn search(&self, query: &str) -> Result<Vec<SearchHit>, LinkRankError>;
}

/// A search match joined with its page record
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub page_id: i64,
    pub url: String,
    pub title: String,
    pub pagerank: Option<f64>,

    /// Relevance score, multiplied by PageRank when boosted
    pub score: f64,
}

/// Resolves a requested limit against the configured range
///
/// A missing limit, or one outside `[min_limit, max_limit]`, falls back to
/// the default.
pub fn clamp_limit(requested: Option<usize>, limits: &SearchConfig) -> usize {
    match requested {
        Some(limit) if (limits.min_limit..=limits.max_limit).contains(&limit) => limit,
        _ => limits.default_limit,
    }
}

/// Multiplies each score by the page's rank
///
/// Unranked pages score zero.
pub fn apply_boost(results: &mut [SearchResult]) {
    for result in results {
        result.score *= result.pagerank.unwrap_or(0.0);
    }
}

/// Optionally boosts, then sorts by descending score and truncates
pub fn rank_results(mut results: Vec<SearchResult>, boost: bool, limit: usize) -> Vec<SearchResult> {
    if boost {
        apply_boost(&mut results);
    }
    results.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.page_id.cmp(&b.page_id)));
    results.truncate(limit);
    results
}

/// Queries the index and joins hits with their stored pages
///
/// Hits whose page is no longer stored are skipped.
pub fn run_search(
    index: &dyn SearchIndex,
    store: &dyn PageStore,
    query: &str,
    boost: bool,
    limit: usize,
) -> Result<Vec<SearchResult>, LinkRankError> {
    let hits = index.search(query)?;
    tracing::debug!("Query {:?} matched {} pages", query, hits.len());

    let mut results = Vec::with_capacity(hits.len());
    for hit in hits {
        let Some(page) = store.find_by_id(hit.page_id)? else {
            continue;
        };
        results.push(SearchResult {
            page_id: page.page_id,
            url: page.url,
            title: page.title,
            pagerank: page.pagerank,
            score: hit.score,
        });
    }

    Ok(rank_results(results, boost, limit))
}
