//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that coordinates:
//! - Dropping the previous contents of the corpus
//! - Dispatching frontier URLs to concurrent fetch tasks
//! - Parsing, filtering and enqueueing discovered links
//! - Storing pages with sequential ids
//! - Link resolution and PageRank once the frontier drains

use crate::config::{Config, CorpusEntry};
use crate::crawler::frontier::{Frontier, FrontierLease};
use crate::crawler::parser::{parse_html, ParsedPage};
use crate::crawler::{build_http_client, fetch_url, FetchResult};
use crate::filter::{build_filter, LinkFilter};
use crate::graph::{rank_corpus, resolve_links, RankOutcome, RankSettings, ResolveStats};
use crate::storage::{Page, PageStore, RunStatus, SqliteStorage, StorageResult};
use crate::LinkRankError;
use reqwest::Client;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use url::Url;

/// Summary of a finished crawl run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub run_id: i64,
    pub corpus: String,
    pub pages_stored: usize,
    pub urls_accepted: usize,
    pub resolve: ResolveStats,
    pub ranking: RankOutcome,
    pub elapsed: Duration,
}

/// Storage plus the page id counter
///
/// Both live behind one lock so ids are handed out in the same order pages are
/// written.
struct CorpusWriter {
    storage: SqliteStorage,
    next_page_id: i64,
}

impl CorpusWriter {
    fn insert(&mut self, url: &str, parsed: ParsedPage, outgoing: Vec<String>) -> StorageResult<i64> {
        let page = Page::new(self.next_page_id, url.to_string(), parsed.title, parsed.text, outgoing);
        self.storage.create(&page)?;
        self.next_page_id += 1;
        Ok(page.page_id)
    }
}

/// State shared by every fetch task
struct CrawlContext {
    client: Client,
    filter: Box<dyn LinkFilter>,
    frontier: Frontier,
    writer: Mutex<CorpusWriter>,
}

impl CrawlContext {
    /// Fetches, parses and stores one page
    ///
    /// Failures are logged and the URL is discarded. The lease is held until
    /// the page's links are enqueued and the page is stored.
    async fn process(&self, lease: FrontierLease) {
        let url = lease.url();
        tracing::debug!("Fetching {}", url);

        let body = match fetch_url(&self.client, url).await {
            FetchResult::Success { body, .. } => body,
            failure => {
                tracing::warn!("Discarding {}: {}", url, failure);
                return;
            }
        };

        let base = match Url::parse(url) {
            Ok(base) => base,
            Err(e) => {
                tracing::warn!("Discarding {}: {}", url, e);
                return;
            }
        };

        let parsed = parse_html(&body);
        let outgoing = self.filter.filter_links(&parsed.links, &base);
        let accepted = outgoing
            .iter()
            .filter(|link| self.frontier.enqueue(link))
            .count();

        match self.store(url, parsed, outgoing) {
            Ok(page_id) => {
                tracing::debug!("Stored page {} ({}), {} new URLs queued", page_id, url, accepted);
                if (page_id + 1) % 10 == 0 {
                    tracing::info!(
                        "Progress: {} pages stored, {} queued, {} in flight",
                        page_id + 1,
                        self.frontier.queued(),
                        self.frontier.in_flight()
                    );
                }
            }
            Err(e) => tracing::error!("Failed to store {}: {}", url, e),
        }
    }

    fn store(&self, url: &str, parsed: ParsedPage, outgoing: Vec<String>) -> Result<i64, LinkRankError> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| LinkRankError::LockPoisoned("corpus writer"))?;
        Ok(writer.insert(url, parsed, outgoing)?)
    }
}

/// Main crawler coordinator structure
pub struct Coordinator {
    context: Arc<CrawlContext>,
    corpus: CorpusEntry,
    settings: RankSettings,
    run_id: i64,
}

impl Coordinator {
    /// Creates a coordinator for one corpus
    ///
    /// The corpus' previous pages are dropped first; failure to do so is fatal.
    /// The seed URL is enqueued and counts against the budget.
    ///
    /// # Arguments
    ///
    /// * `config` - The validated configuration
    /// * `corpus_name` - Corpus to crawl; `None` picks the first one configured
    /// * `config_hash` - Hash of the configuration file, recorded on the run
    pub fn new(
        config: &Config,
        corpus_name: Option<&str>,
        config_hash: &str,
    ) -> Result<Self, LinkRankError> {
        let corpus = config
            .find_corpus(corpus_name)
            .cloned()
            .ok_or_else(|| LinkRankError::UnknownCorpus(corpus_name.unwrap_or("").to_string()))?;

        let client = build_http_client(
            &config.user_agent,
            Duration::from_secs(config.crawler.request_timeout_secs),
        )?;
        let filter = build_filter(&corpus)?;

        // No run record until nothing else can fail
        let mut storage = SqliteStorage::new(Path::new(&config.output.database_path), &corpus.name)?;
        storage
            .drop_corpus()
            .map_err(|source| LinkRankError::CorpusDrop {
                corpus: corpus.name.clone(),
                source,
            })?;
        let run_id = storage.create_run(config_hash)?;

        let frontier = Frontier::new(
            config.crawler.budget,
            config.crawler.max_concurrent_fetches as usize,
            Duration::from_millis(config.crawler.rate_limit_ms),
        );
        frontier.enqueue(&corpus.seed);

        tracing::info!(
            "Run {}: crawling corpus '{}' from {} (budget {})",
            run_id,
            corpus.name,
            corpus.seed,
            config.crawler.budget
        );

        Ok(Self {
            context: Arc::new(CrawlContext {
                client,
                filter,
                frontier,
                writer: Mutex::new(CorpusWriter {
                    storage,
                    next_page_id: 0,
                }),
            }),
            corpus,
            settings: RankSettings::from(&config.ranking),
            run_id,
        })
    }

    pub fn run_id(&self) -> i64 {
        self.run_id
    }

    /// Runs the crawl to completion, then resolves and ranks the corpus
    ///
    /// The run is marked completed on success and failed otherwise.
    pub async fn run(&mut self) -> Result<CrawlReport, LinkRankError> {
        let start_time = Instant::now();

        if let Err(e) = self.crawl().await {
            self.mark_failed();
            return Err(e);
        }

        let pages_stored = self.with_storage(|storage| Ok(storage.count()? as usize))?;
        tracing::info!(
            "Frontier drained: {} pages stored in {:?}",
            pages_stored,
            start_time.elapsed()
        );

        let (resolve, ranking) = match self.finish() {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("Run {} failed: {}", self.run_id, e);
                self.mark_failed();
                return Err(e);
            }
        };

        Ok(CrawlReport {
            run_id: self.run_id,
            corpus: self.corpus.name.clone(),
            pages_stored,
            urls_accepted: self.context.frontier.accepted(),
            resolve,
            ranking,
            elapsed: start_time.elapsed(),
        })
    }

    /// Dispatches frontier URLs until the frontier drains, then waits for every
    /// task
    async fn crawl(&self) -> Result<(), LinkRankError> {
        let mut tasks = JoinSet::new();

        while let Some(lease) = self.context.frontier.next().await {
            let context = Arc::clone(&self.context);
            tasks.spawn(async move { context.process(lease).await });
        }

        while let Some(result) = tasks.join_next().await {
            result?;
        }
        Ok(())
    }

    fn finish(&self) -> Result<(ResolveStats, RankOutcome), LinkRankError> {
        let settings = self.settings;
        let run_id = self.run_id;
        self.with_storage(|storage| {
            let resolve = resolve_links(storage)?;
            let ranking = rank_corpus(storage, &settings)?;
            storage.complete_run(run_id, ranking.iterations)?;
            Ok((resolve, ranking))
        })
    }

    fn mark_failed(&self) {
        let run_id = self.run_id;
        let result = self.with_storage(|storage| {
            storage.update_run_status(run_id, RunStatus::Failed)?;
            Ok(())
        });
        if let Err(e) = result {
            tracing::error!("Failed to mark run {} as failed: {}", run_id, e);
        }
    }

    fn with_storage<T>(
        &self,
        f: impl FnOnce(&mut SqliteStorage) -> Result<T, LinkRankError>,
    ) -> Result<T, LinkRankError> {
        let mut writer = self
            .context
            .writer
            .lock()
            .map_err(|_| LinkRankError::LockPoisoned("corpus writer"))?;
        f(&mut writer.storage)
    }
}

/// Runs a complete crawl of one corpus
///
/// # Example
///
/// ```no_run
/// use linkrank::config::load_config_with_hash;
/// use linkrank::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (config, hash) = load_config_with_hash(Path::new("linkrank.toml"))?;
/// let report = run_crawl(&config, Some("fruits"), &hash).await?;
/// println!("{} pages ranked", report.pages_stored);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: &Config,
    corpus_name: Option<&str>,
    config_hash: &str,
) -> Result<CrawlReport, LinkRankError> {
    let mut coordinator = Coordinator::new(config, corpus_name, config_hash)?;
    coordinator.run().await
}
