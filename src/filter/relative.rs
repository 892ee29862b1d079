use crate::filter::{dedup_preserving_order, is_denied, LinkFilter};
use url::Url;

/// Resolves hrefs against the page URL and keeps those under the site root
#[derive(Debug, Clone)]
pub struct SiteRelativeFilter {
    site_root: Url,
    deny: Vec<String>,
}

impl SiteRelativeFilter {
    pub fn new(site_root: Url, deny: Vec<String>) -> Self {
        Self { site_root, deny }
    }

    fn resolve(&self, href: &str, base: &Url) -> Option<String> {
        if href.is_empty() || is_denied(href, &self.deny) {
            return None;
        }

        let absolute = base.join(href).ok()?;
        if absolute.scheme() != "http" && absolute.scheme() != "https" {
            return None;
        }

        let absolute = absolute.to_string();
        absolute
            .starts_with(self.site_root.as_str())
            .then_some(absolute)
    }
}

impl LinkFilter for SiteRelativeFilter {
    fn filter_links(&self, hrefs: &[String], base: &Url) -> Vec<String> {
        dedup_preserving_order(
            hrefs
                .iter()
                .filter_map(|href| self.resolve(href.trim(), base)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT: &str = "https://people.example.edu/~course/fruitgraph/";

    fn filter(deny: &[&str]) -> SiteRelativeFilter {
        SiteRelativeFilter::new(
            Url::parse(ROOT).unwrap(),
            deny.iter().map(|s| s.to_string()).collect(),
        )
    }

    fn base() -> Url {
        Url::parse(&format!("{}N-0.html", ROOT)).unwrap()
    }

    fn hrefs(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolves_dot_relative_links() {
        let links = filter(&[]).filter_links(&hrefs(&["./N-1.html", "N-2.html"]), &base());
        assert_eq!(
            links,
            vec![format!("{}N-1.html", ROOT), format!("{}N-2.html", ROOT)]
        );
    }

    #[test]
    fn test_drops_links_outside_root() {
        let raw = hrefs(&["../other.html", "https://elsewhere.org/N-1.html", "mailto:a@b.c"]);
        assert!(filter(&[]).filter_links(&raw, &base()).is_empty());
    }

    #[test]
    fn test_applies_deny_markers() {
        let raw = hrefs(&["./N-1.html#top", "./N-2.html"]);
        assert_eq!(
            filter(&["#"]).filter_links(&raw, &base()),
            vec![format!("{}N-2.html", ROOT)]
        );
    }

    #[test]
    fn test_deduplicates_after_resolution() {
        let raw = hrefs(&["./N-1.html", "N-1.html", ""]);
        assert_eq!(filter(&[]).filter_links(&raw, &base()).len(), 1);
    }
}
