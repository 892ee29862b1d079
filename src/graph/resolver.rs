//! Incoming-link resolution
//!
//! Turns every page's outgoing list into incoming entries on the pages those
//! URLs belong to. Outgoing URLs that were never crawled are counted and
//! otherwise ignored.

use crate::storage::{Page, PageStore};
use crate::LinkRankError;
use std::collections::{BTreeSet, HashMap};

/// Counters from one resolution pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveStats {
    /// Pages in the corpus
    pub pages: usize,

    /// Outgoing links examined
    pub links_examined: usize,

    /// Incoming entries newly added
    pub links_added: usize,

    /// Outgoing links whose target is not in the corpus
    pub unresolved: usize,
}

/// Resolves incoming links for the whole corpus and persists the result
///
/// Pages are processed in id order so each incoming list is ordered by source
/// page id. Running this twice adds nothing the second time.
pub fn resolve_links(store: &mut dyn PageStore) -> Result<ResolveStats, LinkRankError> {
    let mut pages = store.find_all()?;
    let (stats, changed) = resolve_in_place(&mut pages);

    let dirty: Vec<Page> = changed.into_iter().map(|i| pages[i].clone()).collect();
    store.save_all(&dirty)?;

    tracing::info!(
        "Resolved {} links across {} pages ({} added, {} point outside the corpus)",
        stats.links_examined,
        stats.pages,
        stats.links_added,
        stats.unresolved
    );

    Ok(stats)
}

/// Resolves incoming links over pages already in memory
///
/// `pages` must be ordered by page id.
pub fn resolve_pages(pages: &mut [Page]) -> ResolveStats {
    resolve_in_place(pages).0
}

fn resolve_in_place(pages: &mut [Page]) -> (ResolveStats, BTreeSet<usize>) {
    let index: HashMap<String, usize> = pages
        .iter()
        .enumerate()
        .map(|(i, page)| (page.url.clone(), i))
        .collect();

    let mut stats = ResolveStats {
        pages: pages.len(),
        ..ResolveStats::default()
    };
    let mut changed = BTreeSet::new();

    for source in 0..pages.len() {
        let source_url = pages[source].url.clone();
        let outgoing = pages[source].outgoing.clone();

        for target_url in &outgoing {
            stats.links_examined += 1;
            match index.get(target_url) {
                Some(&target) => {
                    if pages[target].add_incoming(&source_url) {
                        stats.links_added += 1;
                        changed.insert(target);
                    }
                }
                None => stats.unresolved += 1,
            }
        }
    }

    (stats, changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStorage;

    fn page(id: i64, url: &str, outgoing: &[&str]) -> Page {
        Page::new(
            id,
            url.to_string(),
            String::new(),
            String::new(),
            outgoing.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn test_resolves_incoming_in_id_order() {
        let mut pages = vec![
            page(0, "a", &["c"]),
            page(1, "b", &["c", "a"]),
            page(2, "c", &["x"]),
        ];

        let stats = resolve_pages(&mut pages);

        assert_eq!(pages[2].incoming, vec!["a", "b"]);
        assert_eq!(pages[2].num_incoming, 2);
        assert_eq!(pages[0].incoming, vec!["b"]);
        assert!(pages[1].incoming.is_empty());
        assert_eq!(
            stats,
            ResolveStats {
                pages: 3,
                links_examined: 4,
                links_added: 3,
                unresolved: 1,
            }
        );
    }

    #[test]
    fn test_self_links_are_kept() {
        let mut pages = vec![page(0, "a", &["a"])];
        resolve_pages(&mut pages);
        assert_eq!(pages[0].incoming, vec!["a"]);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let mut store = SqliteStorage::new_in_memory("test").unwrap();
        store.create(&page(0, "a", &["b"])).unwrap();
        store.create(&page(1, "b", &["a", "b"])).unwrap();

        let first = resolve_links(&mut store).unwrap();
        let after_first = store.find_all().unwrap();
        let second = resolve_links(&mut store).unwrap();
        let after_second = store.find_all().unwrap();

        assert_eq!(first.links_added, 3);
        assert_eq!(second.links_added, 0);
        assert_eq!(after_first, after_second);
        assert_eq!(after_second[1].incoming, vec!["a", "b"]);
        assert_eq!(after_second[1].num_incoming, 2);
    }

    #[test]
    fn test_empty_corpus() {
        let mut store = SqliteStorage::new_in_memory("test").unwrap();
        assert_eq!(resolve_links(&mut store).unwrap(), ResolveStats::default());
    }
}
