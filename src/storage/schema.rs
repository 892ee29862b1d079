//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the LinkRank database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track crawl runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    corpus TEXT NOT NULL,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    iterations INTEGER
);

CREATE INDEX IF NOT EXISTS idx_runs_corpus ON runs(corpus);

-- Crawled pages; list and map columns hold JSON
CREATE TABLE IF NOT EXISTS pages (
    corpus TEXT NOT NULL,
    page_id INTEGER NOT NULL,
    url TEXT NOT NULL,
    title TEXT NOT NULL,
    body TEXT NOT NULL,
    outgoing TEXT NOT NULL,
    incoming TEXT NOT NULL DEFAULT '[]',
    num_incoming INTEGER NOT NULL DEFAULT 0,
    pagerank REAL,
    word_frequency TEXT NOT NULL,
    crawled_at TEXT NOT NULL,
    PRIMARY KEY (corpus, page_id),
    UNIQUE (corpus, url)
);

CREATE INDEX IF NOT EXISTS idx_pages_url ON pages(corpus, url);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
