//! Storage module for persisting crawled pages
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite database initialization and schema management
//! - Page records scoped to a named corpus
//! - Run tracking (status, configuration hash, iteration count)

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{PageStore, StorageError, StorageResult};

use crate::text::WordFrequency;
use crate::LinkRankError;
use std::path::Path;

/// Opens the storage database for one corpus
pub fn open_storage(path: &Path, corpus: &str) -> Result<SqliteStorage, LinkRankError> {
    SqliteStorage::new(path, corpus)
}

/// One crawled document
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Sequential id in discovery order, starting at 0
    pub page_id: i64,
    pub url: String,
    pub title: String,
    pub text: String,
    /// Filtered, deduplicated links in document order
    pub outgoing: Vec<String>,
    /// URLs of corpus pages linking here, without duplicates
    pub incoming: Vec<String>,
    /// Always `incoming.len()`
    pub num_incoming: u32,
    pub pagerank: Option<f64>,
    pub word_frequency: WordFrequency,
}

impl Page {
    /// Builds a freshly crawled page with no incoming links and no rank
    pub fn new(page_id: i64, url: String, title: String, text: String, outgoing: Vec<String>) -> Self {
        let word_frequency = WordFrequency::from_text(&text);
        Self {
            page_id,
            url,
            title,
            text,
            outgoing,
            incoming: Vec::new(),
            num_incoming: 0,
            pagerank: None,
            word_frequency,
        }
    }

    /// Records `source` as linking to this page
    ///
    /// Returns false if it was already recorded.
    pub fn add_incoming(&mut self, source: &str) -> bool {
        if self.incoming.iter().any(|u| u == source) {
            return false;
        }
        self.incoming.push(source.to_string());
        self.num_incoming += 1;
        true
    }

    /// True if `url` appears among this page's outgoing or incoming links
    pub fn is_linked_with(&self, url: &str) -> bool {
        self.outgoing.iter().any(|u| u == url) || self.incoming.iter().any(|u| u == url)
    }
}

/// Represents a crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub corpus: String,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    pub iterations: Option<u64>,
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Page {
        Page::new(
            0,
            "https://example.com/a".to_string(),
            "A".to_string(),
            "apple apple pie".to_string(),
            vec!["https://example.com/b".to_string()],
        )
    }

    #[test]
    fn test_run_status_roundtrip() {
        for status in &[RunStatus::Running, RunStatus::Completed, RunStatus::Failed] {
            assert_eq!(Some(*status), RunStatus::from_db_string(status.to_db_string()));
        }
        assert_eq!(RunStatus::from_db_string("invalid"), None);
    }

    #[test]
    fn test_new_page_counts_words() {
        let page = page();
        assert_eq!(page.word_frequency.get("apple"), 2);
        assert_eq!(page.num_incoming, 0);
        assert!(page.pagerank.is_none());
    }

    #[test]
    fn test_add_incoming_rejects_duplicates() {
        let mut page = page();
        assert!(page.add_incoming("https://example.com/x"));
        assert!(!page.add_incoming("https://example.com/x"));
        assert!(page.add_incoming("https://example.com/y"));

        assert_eq!(page.incoming.len(), 2);
        assert_eq!(page.num_incoming, 2);
    }

    #[test]
    fn test_is_linked_with_either_direction() {
        let mut page = page();
        page.add_incoming("https://example.com/c");

        assert!(page.is_linked_with("https://example.com/b"));
        assert!(page.is_linked_with("https://example.com/c"));
        assert!(!page.is_linked_with("https://example.com/a"));
    }
}
