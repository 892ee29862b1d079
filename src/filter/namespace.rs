use crate::filter::{dedup_preserving_order, is_denied, LinkFilter};
use url::Url;

/// Keeps hrefs under a path namespace and prefixes them with the site root
///
/// Absolute hrefs, even to the same host, do not start with the required prefix
/// and are dropped.
#[derive(Debug, Clone)]
pub struct NamespaceFilter {
    site_root: String,
    required_prefix: String,
    deny: Vec<String>,
}

impl NamespaceFilter {
    pub fn new(site_root: &str, required_prefix: &str, deny: Vec<String>) -> Self {
        Self {
            site_root: site_root.trim_end_matches('/').to_string(),
            required_prefix: required_prefix.to_string(),
            deny,
        }
    }

    fn accepts(&self, href: &str) -> bool {
        href.starts_with(&self.required_prefix) && !is_denied(href, &self.deny)
    }
}

impl LinkFilter for NamespaceFilter {
    fn filter_links(&self, hrefs: &[String], _base: &Url) -> Vec<String> {
        dedup_preserving_order(
            hrefs
                .iter()
                .map(|href| href.trim())
                .filter(|href| self.accepts(href))
                .map(|href| format!("{}{}", self.site_root, href)),
        )
    }
}
