//! Link filtering for discovered hrefs
//!
//! A corpus decides which of a page's raw hrefs become crawlable outgoing links.
//! Two strategies are provided:
//!
//! - [`NamespaceFilter`]: hrefs must start with a path prefix (e.g. `/wiki/`) and
//!   are made absolute by prefixing the site root.
//! - [`SiteRelativeFilter`]: hrefs are joined onto the page URL and must stay
//!   under the site root.
//!
//! Both drop hrefs containing a configured deny marker and deduplicate the result
//! while keeping first-occurrence order.

mod namespace;
mod relative;

pub use namespace::NamespaceFilter;
pub use relative::SiteRelativeFilter;

use crate::config::{CorpusEntry, FilterStrategy};
use crate::LinkRankError;
use std::collections::HashSet;
use url::Url;

/// Turns a page's raw hrefs into its outgoing URL list
pub trait LinkFilter: Send + Sync {
    /// Filters and resolves `hrefs` found on the page at `base`
    fn filter_links(&self, hrefs: &[String], base: &Url) -> Vec<String>;
}

/// Builds the filter strategy configured for a corpus
pub fn build_filter(corpus: &CorpusEntry) -> Result<Box<dyn LinkFilter>, LinkRankError> {
    let filter: Box<dyn LinkFilter> = match corpus.filter {
        FilterStrategy::Namespace => Box::new(NamespaceFilter::new(
            &corpus.site_root,
            corpus.required_prefix.as_deref().unwrap_or("/"),
            corpus.deny.clone(),
        )),
        FilterStrategy::SiteRelative => Box::new(SiteRelativeFilter::new(
            Url::parse(&corpus.site_root)?,
            corpus.deny.clone(),
        )),
    };
    Ok(filter)
}

/// True if `href` contains any of the deny markers
pub(crate) fn is_denied(href: &str, deny: &[String]) -> bool {
    deny.iter().any(|marker| href.contains(marker.as_str()))
}

/// Removes repeated URLs, keeping the first occurrence
pub(crate) fn dedup_preserving_order(urls: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.into_iter()
        .filter(|url| seen.insert(url.clone()))
        .collect()
}
