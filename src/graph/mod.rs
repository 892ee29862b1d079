//! Link graph post-processing
//!
//! Once the crawl has drained, the corpus goes through two passes:
//! 1. [`resolve_links`] fills every page's incoming list from the outgoing lists
//! 2. [`rank_corpus`] computes PageRank and stores each page's score

mod pagerank;
mod resolver;

pub use pagerank::{
    apply_damping, compute_ranks, link_indicator, normalize_rows, power_iterate, rank_corpus,
    transition_matrix, Matrix, RankOutcome, RankSettings,
};
pub use resolver::{resolve_links, resolve_pages, ResolveStats};
