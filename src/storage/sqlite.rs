//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the PageStore trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{PageStore, StorageError, StorageResult};
use crate::storage::{Page, RunRecord, RunStatus};
use crate::LinkRankError;
use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::path::Path;

const PAGE_COLUMNS: &str =
    "page_id, url, title, body, outgoing, incoming, num_incoming, pagerank, word_frequency";

const UPDATE_PAGE_SQL: &str = "UPDATE pages SET incoming = ?1, num_incoming = ?2, pagerank = ?3
     WHERE corpus = ?4 AND page_id = ?5";

/// SQLite storage backend bound to a single corpus
pub struct SqliteStorage {
    conn: Connection,
    corpus: String,
}

impl SqliteStorage {
    /// Opens (or creates) the database at `path` for the named corpus
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    /// * `corpus` - Corpus name every operation is scoped to
    pub fn new(path: &Path, corpus: &str) -> Result<Self, LinkRankError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            PRAGMA mmap_size = 268435456;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn,
            corpus: corpus.to_string(),
        })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory(corpus: &str) -> Result<Self, LinkRankError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn,
            corpus: corpus.to_string(),
        })
    }

    fn query_pages(&self, filter: &str, value: &dyn rusqlite::ToSql) -> StorageResult<Vec<Page>> {
        let sql = format!(
            "SELECT {} FROM pages WHERE corpus = ?1 {} ORDER BY page_id",
            PAGE_COLUMNS, filter
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let raw = if filter.is_empty() {
            stmt.query_map(params![self.corpus], RawPage::from_row)?
                .collect::<Result<Vec<_>, _>>()?
        } else {
            stmt.query_map(params![self.corpus, value], RawPage::from_row)?
                .collect::<Result<Vec<_>, _>>()?
        };

        raw.into_iter().map(RawPage::into_page).collect()
    }
}

/// Page row as stored, before JSON columns are decoded
struct RawPage {
    page_id: i64,
    url: String,
    title: String,
    body: String,
    outgoing: String,
    incoming: String,
    num_incoming: u32,
    pagerank: Option<f64>,
    word_frequency: String,
}

impl RawPage {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            page_id: row.get(0)?,
            url: row.get(1)?,
            title: row.get(2)?,
            body: row.get(3)?,
            outgoing: row.get(4)?,
            incoming: row.get(5)?,
            num_incoming: row.get(6)?,
            pagerank: row.get(7)?,
            word_frequency: row.get(8)?,
        })
    }

    fn into_page(self) -> StorageResult<Page> {
        Ok(Page {
            page_id: self.page_id,
            url: self.url,
            title: self.title,
            text: self.body,
            outgoing: serde_json::from_str(&self.outgoing)?,
            incoming: serde_json::from_str(&self.incoming)?,
            num_incoming: self.num_incoming,
            pagerank: self.pagerank,
            word_frequency: serde_json::from_str(&self.word_frequency)?,
        })
    }
}

fn insert_error(e: rusqlite::Error, page: &Page, corpus: &str) -> StorageError {
    match e {
        rusqlite::Error::SqliteFailure(ref err, _) if err.code == ErrorCode::ConstraintViolation => {
            StorageError::ConstraintViolation(format!(
                "page {} ({}) already exists in corpus '{}'",
                page.page_id, page.url, corpus
            ))
        }
        other => StorageError::Sqlite(other),
    }
}

fn read_run(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        corpus: row.get(1)?,
        started_at: row.get(2)?,
        finished_at: row.get(3)?,
        config_hash: row.get(4)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(5)?).unwrap_or(RunStatus::Failed),
        iterations: row.get::<_, Option<i64>>(6)?.map(|i| i as u64),
    })
}

impl PageStore for SqliteStorage {
    fn corpus(&self) -> &str {
        &self.corpus
    }

    // ===== Pages =====

    fn create(&mut self, page: &Page) -> StorageResult<()> {
        let outgoing = serde_json::to_string(&page.outgoing)?;
        let incoming = serde_json::to_string(&page.incoming)?;
        let word_frequency = serde_json::to_string(&page.word_frequency)?;
        let now = Utc::now().to_rfc3339();

        self.conn
            .execute(
                "INSERT INTO pages (corpus, page_id, url, title, body, outgoing, incoming,
                 num_incoming, pagerank, word_frequency, crawled_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    self.corpus,
                    page.page_id,
                    page.url,
                    page.title,
                    page.text,
                    outgoing,
                    incoming,
                    page.num_incoming,
                    page.pagerank,
                    word_frequency,
                    now
                ],
            )
            .map_err(|e| insert_error(e, page, &self.corpus))?;

        Ok(())
    }

    fn find_by_id(&self, page_id: i64) -> StorageResult<Option<Page>> {
        Ok(self.query_pages("AND page_id = ?2", &page_id)?.into_iter().next())
    }

    fn find_by_url(&self, url: &str) -> StorageResult<Option<Page>> {
        Ok(self.query_pages("AND url = ?2", &url)?.into_iter().next())
    }

    fn find_all(&self) -> StorageResult<Vec<Page>> {
        self.query_pages("", &rusqlite::types::Null)
    }

    fn count(&self) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM pages WHERE corpus = ?1",
            params![self.corpus],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn save(&mut self, page: &Page) -> StorageResult<()> {
        let incoming = serde_json::to_string(&page.incoming)?;
        let updated = self.conn.execute(
            UPDATE_PAGE_SQL,
            params![
                incoming,
                page.num_incoming,
                page.pagerank,
                self.corpus,
                page.page_id
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::PageNotFound(format!("Page ID {}", page.page_id)));
        }
        Ok(())
    }

    fn save_all(&mut self, pages: &[Page]) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(UPDATE_PAGE_SQL)?;
            for page in pages {
                let incoming = serde_json::to_string(&page.incoming)?;
                let updated = stmt.execute(params![
                    incoming,
                    page.num_incoming,
                    page.pagerank,
                    self.corpus,
                    page.page_id
                ])?;
                if updated == 0 {
                    return Err(StorageError::PageNotFound(format!(
                        "Page ID {}",
                        page.page_id
                    )));
                }
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn drop_corpus(&mut self) -> StorageResult<()> {
        self.conn
            .execute("DELETE FROM pages WHERE corpus = ?1", params![self.corpus])?;
        Ok(())
    }

    // ===== Runs =====

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (corpus, started_at, config_hash, status) VALUES (?1, ?2, ?3, ?4)",
            params![
                self.corpus,
                now,
                config_hash,
                RunStatus::Running.to_db_string()
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update_run_status(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1 WHERE id = ?2",
            params![status.to_db_string(), run_id],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn complete_run(&mut self, run_id: i64, iterations: usize) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, iterations = ?3 WHERE id = ?4",
            params![
                RunStatus::Completed.to_db_string(),
                now,
                iterations as i64,
                run_id
            ],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                "SELECT id, corpus, started_at, finished_at, config_hash, status, iterations
                 FROM runs WHERE corpus = ?1 ORDER BY id DESC LIMIT 1",
                params![self.corpus],
                read_run,
            )
            .optional()?;
        Ok(run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(id: i64, url: &str, outgoing: &[&str]) -> Page {
        Page::new(
            id,
            url.to_string(),
            format!("Title {}", id),
            "some body text".to_string(),
            outgoing.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn test_create_and_find() {
        let mut storage = SqliteStorage::new_in_memory("wiki").unwrap();
        let original = page(0, "https://example.com/a", &["https://example.com/b"]);
        storage.create(&original).unwrap();

        let by_id = storage.find_by_id(0).unwrap().unwrap();
        assert_eq!(by_id, original);

        let by_url = storage.find_by_url("https://example.com/a").unwrap().unwrap();
        assert_eq!(by_url.page_id, 0);

        assert!(storage.find_by_id(1).unwrap().is_none());
        assert!(storage.find_by_url("https://example.com/A").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_page_id_fails() {
        let mut storage = SqliteStorage::new_in_memory("wiki").unwrap();
        storage.create(&page(0, "https://example.com/a", &[])).unwrap();

        let result = storage.create(&page(0, "https://example.com/b", &[]));
        assert!(matches!(result, Err(StorageError::ConstraintViolation(_))));
    }

    #[test]
    fn test_duplicate_url_fails() {
        let mut storage = SqliteStorage::new_in_memory("wiki").unwrap();
        storage.create(&page(0, "https://example.com/a", &[])).unwrap();

        let result = storage.create(&page(1, "https://example.com/a", &[]));
        assert!(matches!(result, Err(StorageError::ConstraintViolation(_))));
    }

    #[test]
    fn test_find_all_is_ordered_by_id() {
        let mut storage = SqliteStorage::new_in_memory("wiki").unwrap();
        storage.create(&page(2, "https://example.com/c", &[])).unwrap();
        storage.create(&page(0, "https://example.com/a", &[])).unwrap();
        storage.create(&page(1, "https://example.com/b", &[])).unwrap();

        let ids: Vec<i64> = storage.find_all().unwrap().iter().map(|p| p.page_id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(storage.count().unwrap(), 3);
    }

    #[test]
    fn test_save_updates_links_and_rank() {
        let mut storage = SqliteStorage::new_in_memory("wiki").unwrap();
        storage.create(&page(0, "https://example.com/a", &[])).unwrap();

        let mut loaded = storage.find_by_id(0).unwrap().unwrap();
        loaded.add_incoming("https://example.com/b");
        loaded.pagerank = Some(0.25);
        storage.save(&loaded).unwrap();

        let reloaded = storage.find_by_id(0).unwrap().unwrap();
        assert_eq!(reloaded.incoming, vec!["https://example.com/b".to_string()]);
        assert_eq!(reloaded.num_incoming, 1);
        assert_eq!(reloaded.pagerank, Some(0.25));
    }

    #[test]
    fn test_save_missing_page() {
        let mut storage = SqliteStorage::new_in_memory("wiki").unwrap();
        let result = storage.save(&page(7, "https://example.com/x", &[]));
        assert!(matches!(result, Err(StorageError::PageNotFound(_))));
    }

    #[test]
    fn test_save_all_rolls_back_on_missing_page() {
        let mut storage = SqliteStorage::new_in_memory("wiki").unwrap();
        storage.create(&page(0, "https://example.com/a", &[])).unwrap();

        let mut first = storage.find_by_id(0).unwrap().unwrap();
        first.pagerank = Some(1.0);
        let missing = page(9, "https://example.com/z", &[]);

        assert!(storage.save_all(&[first, missing]).is_err());
        assert_eq!(storage.find_by_id(0).unwrap().unwrap().pagerank, None);
    }

    #[test]
    fn test_drop_corpus_only_touches_own_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("linkrank.db");

        let mut wiki = SqliteStorage::new(&path, "wiki").unwrap();
        let mut fruits = SqliteStorage::new(&path, "fruits").unwrap();
        wiki.create(&page(0, "https://example.com/a", &[])).unwrap();
        fruits.create(&page(0, "https://example.com/a", &[])).unwrap();

        wiki.drop_corpus().unwrap();

        assert_eq!(wiki.count().unwrap(), 0);
        assert_eq!(fruits.count().unwrap(), 1);
    }

    #[test]
    fn test_run_lifecycle() {
        let mut storage = SqliteStorage::new_in_memory("wiki").unwrap();
        assert!(storage.get_latest_run().unwrap().is_none());

        let run_id = storage.create_run("abc123").unwrap();
        let run = storage.get_latest_run().unwrap().unwrap();
        assert_eq!(run.id, run_id);
        assert_eq!(run.status, RunStatus::Running);
        assert_eq!(run.corpus, "wiki");

        storage.complete_run(run_id, 42).unwrap();
        let run = storage.get_latest_run().unwrap().unwrap();
        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(run.iterations, Some(42));
        assert!(run.finished_at.is_some());

        assert!(matches!(
            storage.update_run_status(999, RunStatus::Failed),
            Err(StorageError::RunNotFound(999))
        ));
    }
}
