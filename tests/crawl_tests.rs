//! Integration tests for the crawler
//!
//! These tests use wiremock to serve small link graphs and run the full
//! crawl, resolve and rank cycle end-to-end against a temporary database.

use linkrank::config::{
    Config, CorpusEntry, CrawlerConfig, FilterStrategy, OutputConfig, RankingConfig, SearchConfig,
    UserAgentConfig,
};
use linkrank::crawler::{run_crawl, Coordinator};
use linkrank::search::{run_search, PageIndex};
use linkrank::storage::{PageStore, RunStatus, SqliteStorage};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_config(corpus: CorpusEntry, budget: usize, db_path: &Path) -> Config {
    Config {
        crawler: CrawlerConfig {
            budget,
            max_concurrent_fetches: 1,
            rate_limit_ms: 0,
            request_timeout_secs: 5,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            database_path: db_path.to_string_lossy().to_string(),
        },
        ranking: RankingConfig::default(),
        search: SearchConfig::default(),
        corpus: vec![corpus],
    }
}

fn fruit_corpus(base_url: &str) -> CorpusEntry {
    CorpusEntry {
        name: "fruits".to_string(),
        seed: format!("{}/fruit/N-0.html", base_url),
        site_root: format!("{}/fruit/", base_url),
        filter: FilterStrategy::SiteRelative,
        required_prefix: None,
        deny: vec!["#".to_string()],
    }
}

async fn mount_page(server: &MockServer, page_path: &str, title: &str, body: &str) {
    let html = format!(
        "<html><head><title>{}</title></head><body>{}</body></html>",
        title, body
    );
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html, "text/html"))
        .mount(server)
        .await;
}

/// N-0 -> N-1, N-2; N-1 -> N-2, N-3 (missing); N-2 -> N-0
async fn mount_fruit_graph(server: &MockServer) {
    mount_page(
        server,
        "/fruit/N-0.html",
        "N-0",
        r##"<p>Apple orchard notes.</p>
            <a href="./N-1.html">one</a>
            <a href="N-2.html">two</a>
            <a href="https://elsewhere.org/N-9.html">away</a>
            <a href="#top">top</a>"##,
    )
    .await;
    mount_page(
        server,
        "/fruit/N-1.html",
        "N-1",
        r#"<p>Banana and apple.</p>
            <a href="./N-2.html">two</a>
            <a href="./N-3.html">three</a>
            <a href="../outside.html">outside</a>"#,
    )
    .await;
    mount_page(
        server,
        "/fruit/N-2.html",
        "N-2",
        r#"<p>Cherry.</p><a href="./N-0.html">zero</a>"#,
    )
    .await;
}

#[tokio::test]
async fn test_full_crawl_site_relative() {
    let server = MockServer::start().await;
    mount_fruit_graph(&server).await;
    let base = server.uri();

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("crawl.db");
    let config = create_test_config(fruit_corpus(&base), 10, &db_path);

    let report = run_crawl(&config, None, "test-hash").await.unwrap();

    assert_eq!(report.pages_stored, 3);
    assert_eq!(report.urls_accepted, 4);
    assert_eq!(report.resolve.links_added, 4);
    assert_eq!(report.resolve.unresolved, 1);
    assert!(report.ranking.converged);

    let storage = SqliteStorage::new(&db_path, "fruits").unwrap();
    let pages = storage.find_all().unwrap();
    let url = |n: u32| format!("{}/fruit/N-{}.html", base, n);

    assert_eq!(pages.len(), 3);
    assert_eq!(pages[0].url, url(0));
    assert_eq!(pages[0].title, "N-0");
    assert_eq!(pages[0].outgoing, vec![url(1), url(2)]);
    assert_eq!(pages[0].incoming, vec![url(2)]);
    assert_eq!(pages[0].word_frequency.get("apple"), 1);

    assert_eq!(pages[1].url, url(1));
    assert_eq!(pages[1].outgoing, vec![url(2), url(3)]);
    assert_eq!(pages[1].incoming, vec![url(0)]);

    assert_eq!(pages[2].url, url(2));
    assert_eq!(pages[2].incoming, vec![url(0), url(1)]);
    assert_eq!(pages[2].num_incoming, 2);

    let rank_sum: f64 = pages.iter().map(|p| p.pagerank.unwrap()).sum();
    assert!((rank_sum - 1.0).abs() < 1e-9);

    let run = storage.get_latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.config_hash, "test-hash");
    assert_eq!(run.iterations, Some(report.ranking.iterations as u64));
}

#[tokio::test]
async fn test_budget_limits_corpus() {
    let server = MockServer::start().await;
    mount_fruit_graph(&server).await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("crawl.db");
    let config = create_test_config(fruit_corpus(&server.uri()), 2, &db_path);

    let report = run_crawl(&config, None, "hash").await.unwrap();

    assert_eq!(report.urls_accepted, 2);
    assert_eq!(report.pages_stored, 2);

    let storage = SqliteStorage::new(&db_path, "fruits").unwrap();
    assert_eq!(storage.count().unwrap(), 2);
    assert!(storage
        .find_by_url(&format!("{}/fruit/N-2.html", server.uri()))
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_namespace_filter_crawl() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/wiki/Start",
        "Start",
        r##"<p>Start page.</p>
            <a href="/wiki/Target">target</a>
            <a href="/wiki/File:Logo.png">file</a>
            <a href="/wiki/Target#History">section</a>
            <a href="/w/index.php?title=Start">edit</a>"##,
    )
    .await;
    mount_page(
        &server,
        "/wiki/Target",
        "Target",
        r#"<p>Target page.</p><a href="/wiki/Start">back</a>"#,
    )
    .await;

    let corpus = CorpusEntry {
        name: "wiki".to_string(),
        seed: format!("{}/wiki/Start", base),
        site_root: base.clone(),
        filter: FilterStrategy::Namespace,
        required_prefix: Some("/wiki/".to_string()),
        deny: vec!["File:".to_string(), "#".to_string()],
    };

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("crawl.db");
    let config = create_test_config(corpus, 100, &db_path);

    let report = run_crawl(&config, Some("wiki"), "hash").await.unwrap();
    assert_eq!(report.pages_stored, 2);

    let storage = SqliteStorage::new(&db_path, "wiki").unwrap();
    let start = storage.find_by_id(0).unwrap().unwrap();
    assert_eq!(start.outgoing, vec![format!("{}/wiki/Target", base)]);

    // Resolved links count in both directions, so the two pages rank equally
    // up to the convergence tolerance
    let target = storage.find_by_id(1).unwrap().unwrap();
    let (a, b) = (start.pagerank.unwrap(), target.pagerank.unwrap());
    assert!((a - b).abs() < 1e-3);
    assert!(storage.find_by_id(2).unwrap().is_none());
}

#[tokio::test]
async fn test_recrawl_replaces_corpus() {
    let server = MockServer::start().await;
    mount_fruit_graph(&server).await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("crawl.db");
    let config = create_test_config(fruit_corpus(&server.uri()), 10, &db_path);

    run_crawl(&config, None, "first").await.unwrap();
    let mut coordinator = Coordinator::new(&config, Some("fruits"), "second").unwrap();
    let second_run = coordinator.run_id();
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.run_id, second_run);
    assert_eq!(report.pages_stored, 3);

    let storage = SqliteStorage::new(&db_path, "fruits").unwrap();
    assert_eq!(storage.count().unwrap(), 3);
    let run = storage.get_latest_run().unwrap().unwrap();
    assert_eq!(run.id, second_run);
    assert_eq!(run.config_hash, "second");
}

#[tokio::test]
async fn test_search_after_crawl() {
    let server = MockServer::start().await;
    mount_fruit_graph(&server).await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("crawl.db");
    let config = create_test_config(fruit_corpus(&server.uri()), 10, &db_path);
    run_crawl(&config, None, "hash").await.unwrap();

    let storage = SqliteStorage::new(&db_path, "fruits").unwrap();
    let pages = storage.find_all().unwrap();
    let index = PageIndex::from_pages(&pages).unwrap();

    let results = run_search(&index, &storage, "apple", false, 10).unwrap();
    let titles: Vec<&str> = results.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(results.len(), 2);
    assert!(titles.contains(&"N-0"));
    assert!(titles.contains(&"N-1"));

    let boosted = run_search(&index, &storage, "apple", true, 1).unwrap();
    assert_eq!(boosted.len(), 1);
    assert!(boosted[0].pagerank.is_some());

    assert!(run_search(&index, &storage, "durian", true, 10)
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_concurrent_crawl_assigns_unique_ids() {
    const PAGES: usize = 24;
    let server = MockServer::start().await;
    let base = server.uri();

    // Every page links to every other page, and responses finish out of order
    for i in 0..PAGES {
        let links: String = (0..PAGES)
            .filter(|&j| j != i)
            .map(|j| format!(r#"<a href="./P-{}.html">{}</a>"#, j, j))
            .collect();
        let html = format!(
            "<html><head><title>P-{}</title></head><body><p>Mesh page.</p>{}</body></html>",
            i, links
        );
        Mock::given(method("GET"))
            .and(path(format!("/mesh/P-{}.html", i)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(html, "text/html")
                    .set_delay(Duration::from_millis(((PAGES - i) % 5) as u64 * 20)),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let corpus = CorpusEntry {
        name: "mesh".to_string(),
        seed: format!("{}/mesh/P-0.html", base),
        site_root: format!("{}/mesh/", base),
        filter: FilterStrategy::SiteRelative,
        required_prefix: None,
        deny: vec!["#".to_string()],
    };
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("crawl.db");
    let mut config = create_test_config(corpus, 100, &db_path);
    config.crawler.max_concurrent_fetches = 8;

    let report = run_crawl(&config, None, "hash").await.unwrap();
    assert_eq!(report.urls_accepted, PAGES);
    assert_eq!(report.pages_stored, PAGES);

    let storage = SqliteStorage::new(&db_path, "mesh").unwrap();
    let pages = storage.find_all().unwrap();
    let ids: Vec<i64> = pages.iter().map(|p| p.page_id).collect();
    assert_eq!(ids, (0..PAGES as i64).collect::<Vec<_>>());

    let mut urls: Vec<&str> = pages.iter().map(|p| p.url.as_str()).collect();
    urls.sort();
    urls.dedup();
    assert_eq!(urls.len(), PAGES);

    for page in &pages {
        assert_eq!(page.num_incoming as usize, page.incoming.len());
        assert_eq!(page.incoming.len(), PAGES - 1);
    }

    let rank_sum: f64 = pages.iter().map(|p| p.pagerank.unwrap()).sum();
    assert!((rank_sum - 1.0).abs() < 1e-9);

    // Each page was fetched exactly once
    server.verify().await;
}
