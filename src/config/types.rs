use serde::Deserialize;

/// Main configuration structure for LinkRank
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub corpus: Vec<CorpusEntry>,
}

impl Config {
    /// Looks up a corpus by name, or returns the first configured corpus
    pub fn find_corpus(&self, name: Option<&str>) -> Option<&CorpusEntry> {
        match name {
            Some(name) => self.corpus.iter().find(|c| c.name == name),
            None => self.corpus.first(),
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of distinct URLs accepted by the frontier in one run
    #[serde(default = "default_budget")]
    pub budget: usize,

    /// Maximum number of concurrent page fetches
    #[serde(rename = "max-concurrent-fetches", default = "default_max_concurrent")]
    pub max_concurrent_fetches: u32,

    /// Minimum time between two fetch dispatches (milliseconds)
    #[serde(rename = "rate-limit-ms", default = "default_rate_limit_ms")]
    pub rate_limit_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            budget: default_budget(),
            max_concurrent_fetches: default_max_concurrent(),
            rate_limit_ms: default_rate_limit_ms(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// PageRank parameters
#[derive(Debug, Clone, Deserialize)]
pub struct RankingConfig {
    /// Teleportation weight: `P = (1 - damping) * P_raw + damping / N`
    #[serde(default = "default_damping")]
    pub damping: f64,

    /// Euclidean distance between successive iterates that counts as converged
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Upper bound on power iterations
    #[serde(rename = "max-iterations", default = "default_max_iterations")]
    pub max_iterations: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            damping: default_damping(),
            tolerance: default_tolerance(),
            max_iterations: default_max_iterations(),
        }
    }
}

/// Result-count limits applied to search requests
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(rename = "default-limit", default = "default_limit")]
    pub default_limit: usize,

    #[serde(rename = "min-limit", default = "default_min_limit")]
    pub min_limit: usize,

    #[serde(rename = "max-limit", default = "default_max_limit")]
    pub max_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            min_limit: default_min_limit(),
            max_limit: default_max_limit(),
        }
    }
}

/// How discovered hrefs are turned into crawlable URLs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterStrategy {
    /// Keep only hrefs under a required path prefix, then prefix the site root
    Namespace,
    /// Resolve every href against the site root
    SiteRelative,
}

/// A named corpus: seed, site root and link-filter rules
#[derive(Debug, Clone, Deserialize)]
pub struct CorpusEntry {
    /// Corpus name, used to scope stored pages
    pub name: String,

    /// First URL queued in the frontier
    pub seed: String,

    /// Absolute URL relative hrefs are resolved against
    #[serde(rename = "site-root")]
    pub site_root: String,

    /// Link-filter strategy
    pub filter: FilterStrategy,

    /// Path prefix an href must start with (namespace strategy only)
    #[serde(rename = "required-prefix", default)]
    pub required_prefix: Option<String>,

    /// Hrefs containing any of these markers are never followed
    #[serde(default)]
    pub deny: Vec<String>,
}

fn default_budget() -> usize {
    1000
}

fn default_max_concurrent() -> u32 {
    10
}

fn default_rate_limit_ms() -> u64 {
    100
}

fn default_request_timeout() -> u64 {
    30
}

fn default_damping() -> f64 {
    0.1
}

fn default_tolerance() -> f64 {
    1e-4
}

fn default_max_iterations() -> usize {
    10_000
}

fn default_limit() -> usize {
    10
}

fn default_min_limit() -> usize {
    1
}

fn default_max_limit() -> usize {
    50
}
