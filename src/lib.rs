//! LinkRank: a bounded crawler with link-graph PageRank
//!
//! This crate crawls a bounded web corpus starting from a seed URL, resolves the
//! outgoing links of every crawled page into incoming-link sets, and ranks the
//! pages with damped power iteration. Ranked pages can then be searched with an
//! optional PageRank boost.

pub mod config;
pub mod crawler;
pub mod filter;
pub mod graph;
pub mod output;
pub mod search;
pub mod storage;
pub mod text;

use thiserror::Error;

/// Main error type for LinkRank operations
#[derive(Debug, Error)]
pub enum LinkRankError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    StorageError(#[from] storage::StorageError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Search index error: {0}")]
    Index(#[from] tantivy::TantivyError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown corpus: {0}")]
    UnknownCorpus(String),

    #[error("Failed to drop corpus '{corpus}': {source}")]
    CorpusDrop {
        corpus: String,
        source: storage::StorageError,
    },

    #[error("PageRank did not converge after {iterations} iterations (residual {residual:e})")]
    NotConverged { iterations: usize, residual: f64 },

    #[error("Lock poisoned: {0}")]
    LockPoisoned(&'static str),

    #[error("Crawl task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for LinkRank operations
pub type Result<T> = std::result::Result<T, LinkRankError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use graph::{rank_corpus, resolve_links, RankOutcome, RankSettings, ResolveStats};
pub use storage::{Page, PageStore, SqliteStorage};
pub use text::WordFrequency;
