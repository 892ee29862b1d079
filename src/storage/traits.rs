//! Storage traits and error types
//!
//! This module defines the trait interface for page stores and associated
//! error types.

use crate::storage::{Page, RunRecord, RunStatus};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Page not found: {0}")]
    PageNotFound(String),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Durable record store for one corpus
///
/// Every operation is scoped to the corpus the store was opened for.
pub trait PageStore {
    /// Name of the corpus this store reads and writes
    fn corpus(&self) -> &str;

    // ===== Pages =====

    /// Persists a new page
    ///
    /// Fails with `ConstraintViolation` if the page id or URL already exists.
    fn create(&mut self, page: &Page) -> StorageResult<()>;

    /// Gets a page by id; `None` if out of range
    fn find_by_id(&self, page_id: i64) -> StorageResult<Option<Page>>;

    /// Gets a page by exact URL
    fn find_by_url(&self, url: &str) -> StorageResult<Option<Page>>;

    /// Returns the whole corpus ordered by page id
    fn find_all(&self) -> StorageResult<Vec<Page>>;

    /// Number of pages in the corpus
    fn count(&self) -> StorageResult<u64>;

    /// Persists `incoming`, `num_incoming` and `pagerank` of an existing page
    fn save(&mut self, page: &Page) -> StorageResult<()>;

    /// Saves a batch of pages
    fn save_all(&mut self, pages: &[Page]) -> StorageResult<()> {
        for page in pages {
            self.save(page)?;
        }
        Ok(())
    }

    /// Removes every page of the corpus
    fn drop_corpus(&mut self) -> StorageResult<()>;

    // ===== Runs =====

    /// Creates a new run in `Running` state and returns its id
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    fn update_run_status(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()>;

    /// Marks a run completed, recording how many power iterations ranking took
    fn complete_run(&mut self, run_id: i64, iterations: usize) -> StorageResult<()>;

    /// Gets the most recent run for this corpus
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;
}
