use crate::config::types::{
    Config, CorpusEntry, CrawlerConfig, FilterStrategy, RankingConfig, SearchConfig,
    UserAgentConfig,
};
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Largest accepted crawl budget
///
/// PageRank works on a dense N x N matrix, so the budget bounds its memory.
pub const MAX_BUDGET: usize = 10_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_ranking_config(&config.ranking)?;
    validate_search_config(&config.search)?;
    validate_corpora(&config.corpus)?;
    Ok(())
}

fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.budget < 1 || config.budget > MAX_BUDGET {
        return Err(ConfigError::Validation(format!(
            "budget must be between 1 and {} (ranking uses a dense N x N matrix), got {}",
            MAX_BUDGET, config.budget
        )));
    }

    if config.max_concurrent_fetches < 1 || config.max_concurrent_fetches > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_fetches must be between 1 and 100, got {}",
            config.max_concurrent_fetches
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

fn validate_output_config(config: &crate::config::types::OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_ranking_config(config: &RankingConfig) -> Result<(), ConfigError> {
    if !(config.damping > 0.0 && config.damping < 1.0) {
        return Err(ConfigError::Validation(format!(
            "damping must be in (0, 1), got {}",
            config.damping
        )));
    }

    if !(config.tolerance > 0.0 && config.tolerance.is_finite()) {
        return Err(ConfigError::Validation(format!(
            "tolerance must be a positive number, got {}",
            config.tolerance
        )));
    }

    if config.max_iterations < 1 {
        return Err(ConfigError::Validation(
            "max_iterations must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    if config.min_limit < 1 || config.min_limit > config.max_limit {
        return Err(ConfigError::Validation(format!(
            "search limits must satisfy 1 <= min_limit <= max_limit, got [{}, {}]",
            config.min_limit, config.max_limit
        )));
    }

    if config.default_limit < config.min_limit || config.default_limit > config.max_limit {
        return Err(ConfigError::Validation(format!(
            "default_limit {} is outside [{}, {}]",
            config.default_limit, config.min_limit, config.max_limit
        )));
    }

    Ok(())
}

fn validate_corpora(corpora: &[CorpusEntry]) -> Result<(), ConfigError> {
    let mut names = HashSet::new();

    for entry in corpora {
        if entry.name.is_empty() {
            return Err(ConfigError::Validation(
                "corpus name cannot be empty".to_string(),
            ));
        }

        if !names.insert(entry.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "corpus '{}' is defined more than once",
                entry.name
            )));
        }

        validate_http_url(&entry.seed, "seed")?;
        validate_http_url(&entry.site_root, "site-root")?;

        if entry.filter == FilterStrategy::Namespace
            && entry
                .required_prefix
                .as_deref()
                .map_or(true, |p| !p.starts_with('/'))
        {
            return Err(ConfigError::Validation(format!(
                "corpus '{}' uses the namespace filter and needs a required-prefix starting with '/'",
                entry.name
            )));
        }

        if entry.deny.iter().any(|marker| marker.is_empty()) {
            return Err(ConfigError::Validation(format!(
                "corpus '{}' has an empty deny marker",
                entry.name
            )));
        }
    }

    Ok(())
}

fn validate_http_url(value: &str, field: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "{} '{}' must use http or https",
            field, value
        )));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
