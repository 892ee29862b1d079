//! Configuration module for LinkRank
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use linkrank::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("linkrank.toml")).unwrap();
//! println!("Crawl budget: {}", config.crawler.budget);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CorpusEntry, CrawlerConfig, FilterStrategy, OutputConfig, RankingConfig,
    SearchConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
