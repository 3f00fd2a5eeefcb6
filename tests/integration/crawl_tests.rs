//! Integration tests for the crawl and harvest stages
//!
//! These tests use wiremock to create mock HTTP servers and run the real
//! HTTP transport end-to-end against a temporary raw store.

use corpus_ingest::config::{Config, CrawlerConfig, PdfConfig, StorageConfig, TargetConfig};
use corpus_ingest::crawler::Coordinator;
use corpus_ingest::state::SkipReason;
use corpus_ingest::storage::{
    parse_records, read_log, split_lines, ArtifactKind, ManifestRecord, RawLogRecord,
};
use corpus_ingest::Stage;
use std::collections::BTreeMap;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html; charset=utf-8")
}

fn pdf(body: &[u8]) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_vec(), "application/pdf")
}

async fn mount(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn mount_never(server: &MockServer, route: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html("<html>should not be fetched</html>"))
        .expect(0)
        .mount(server)
        .await;
}

/// Host key of the mock server, `127.0.0.1:<port>`
fn host_of(server: &MockServer) -> String {
    let url = url::Url::parse(&server.uri()).expect("Failed to parse server URI");
    format!(
        "{}:{}",
        url.host_str().expect("Missing host"),
        url.port().expect("Missing port")
    )
}

/// Creates a test configuration crawling `/help` on the mock server
fn create_test_config(server: &MockServer, dir: &TempDir) -> Config {
    let base = server.uri();
    let mut allow = BTreeMap::new();
    allow.insert(host_of(server), vec!["/help".to_string()]);

    Config {
        crawler: CrawlerConfig {
            user_agent: "TestBot/1.0 (+test)".to_string(),
            throttle_seconds: 0.0,
            request_timeout: 5,
            max_depth: 3,
            max_pages: 50,
            parallel_targets: false,
        },
        storage: StorageConfig {
            html_dir: dir.path().join("html"),
            pdf_dir: dir.path().join("pdfs"),
            meta_dir: dir.path().join("metadata"),
        },
        targets: vec![TargetConfig {
            base: base.clone(),
            allow_paths: vec!["/help".to_string()],
            start_urls: vec![format!("{}/help/", base)],
        }],
        pdf: PdfConfig {
            allow,
            seeds: Vec::new(),
        },
    }
}

fn log_records(coordinator: &Coordinator, host: &str) -> Vec<RawLogRecord> {
    let content = read_log(&coordinator.store().host_log_path(host)).expect("Failed to read log");
    parse_records::<RawLogRecord, _>("log", split_lines(&content))
        .map(|(_, record)| record)
        .collect()
}

fn manifest_records(coordinator: &Coordinator) -> Vec<ManifestRecord> {
    let content =
        read_log(&coordinator.store().manifest_path()).expect("Failed to read manifest");
    parse_records::<ManifestRecord, _>("manifest", split_lines(&content))
        .map(|(_, record)| record)
        .collect()
}

#[tokio::test]
async fn test_full_crawl_single_target() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount(
        &server,
        "/help/",
        html(
            r#"<html><body>
            <a href="/help/a">A</a>
            <a href="b">B</a>
            <a href="/other/x">Out of scope</a>
            <a href="https://elsewhere.test/help/">External</a>
            <a href="mailto:help@x.test">Mail</a>
            </body></html>"#,
        ),
    )
    .await;
    mount(&server, "/help/a", html("<html><body>A</body></html>")).await;
    mount(&server, "/help/b", html("<html><body>B</body></html>")).await;
    mount_never(&server, "/other/x").await;

    let coordinator = Coordinator::new(create_test_config(&server, &dir)).unwrap();
    let stats = coordinator.crawl_html().await.expect("Crawl failed");

    assert_eq!(stats.pages_saved, 3);
    assert_eq!(stats.files_written, 3);

    let host = host_of(&server);
    let records = log_records(&coordinator, &host);
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.kind == ArtifactKind::Html));
    assert!(records
        .iter()
        .all(|r| url::Url::parse(&r.url).unwrap().path().starts_with("/help")));
    assert_eq!(records[0].depth, Some(0));
    assert_eq!(records[1].depth, Some(1));

    let saved = coordinator.store().artifact_path(
        ArtifactKind::Html,
        &format!("{}_help.html", host.replace(':', "_")),
    );
    assert!(saved.exists(), "expected {} to exist", saved.display());
}

#[tokio::test]
async fn test_robots_disallow_prevents_fetch() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("User-agent: TestBot\nDisallow: /help/private\n"),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount(
        &server,
        "/help/",
        html(r#"<html><body><a href="/help/private">P</a><a href="/help/open">O</a></body></html>"#),
    )
    .await;
    mount(&server, "/help/open", html("<html>open</html>")).await;
    mount_never(&server, "/help/private").await;

    let coordinator = Coordinator::new(create_test_config(&server, &dir)).unwrap();
    let stats = coordinator.crawl_html().await.expect("Crawl failed");

    assert_eq!(stats.pages_saved, 2);
    assert_eq!(stats.skipped.get(SkipReason::RobotsDisallowed), 1);
}

#[tokio::test]
async fn test_robots_server_error_allows_everything() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount(
        &server,
        "/help/",
        html(r#"<html><body><a href="/help/private">P</a></body></html>"#),
    )
    .await;
    mount(&server, "/help/private", html("<html>private</html>")).await;

    let coordinator = Coordinator::new(create_test_config(&server, &dir)).unwrap();
    let stats = coordinator.crawl_html().await.expect("Crawl failed");

    assert_eq!(stats.pages_saved, 2);
    assert_eq!(stats.skipped.get(SkipReason::RobotsDisallowed), 0);
}

#[tokio::test]
async fn test_depth_limit() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount(&server, "/help/", html(r#"<a href="/help/1">1</a>"#)).await;
    mount(&server, "/help/1", html(r#"<a href="/help/2">2</a>"#)).await;
    mount_never(&server, "/help/2").await;

    let mut config = create_test_config(&server, &dir);
    config.crawler.max_depth = 1;
    let coordinator = Coordinator::new(config).unwrap();
    let stats = coordinator.crawl_html().await.expect("Crawl failed");

    assert_eq!(stats.pages_saved, 2);
}

#[tokio::test]
async fn test_page_budget() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let links: String = (0..10)
        .map(|i| format!(r#"<a href="/help/p{}">p{}</a>"#, i, i))
        .collect();
    mount(&server, "/help/", html(&format!("<html><body>{}</body></html>", links))).await;
    for i in 0..10 {
        mount(&server, &format!("/help/p{}", i), html("<html>page</html>")).await;
    }

    let mut config = create_test_config(&server, &dir);
    config.crawler.max_pages = 3;
    let coordinator = Coordinator::new(config).unwrap();
    let stats = coordinator.crawl_html().await.expect("Crawl failed");

    assert_eq!(stats.pages_saved, 3);
    assert_eq!(log_records(&coordinator, &host_of(&server)).len(), 3);

    let requests = server.received_requests().await.unwrap();
    let page_requests = requests
        .iter()
        .filter(|r| r.url.path() != "/robots.txt")
        .count();
    assert_eq!(page_requests, 3);
}

#[tokio::test]
async fn test_rerun_writes_no_new_files() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount(&server, "/help/", html(r#"<a href="/help/a">a</a>"#)).await;
    mount(&server, "/help/a", html("<html>a</html>")).await;

    let first = Coordinator::new(create_test_config(&server, &dir)).unwrap();
    let first_stats = first.crawl_html().await.expect("First crawl failed");
    assert_eq!(first_stats.files_written, 2);

    let second = Coordinator::new(create_test_config(&server, &dir)).unwrap();
    let second_stats = second.crawl_html().await.expect("Second crawl failed");
    assert_eq!(second_stats.pages_saved, 2);
    assert_eq!(second_stats.files_written, 0);

    let html_files = second
        .store()
        .list_artifacts(ArtifactKind::Html)
        .expect("Failed to list");
    assert_eq!(html_files.len(), 2);
    assert_eq!(log_records(&second, &host_of(&server)).len(), 4);
}

#[tokio::test]
async fn test_non_html_and_errors_are_not_logged() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount(
        &server,
        "/help/",
        html(r#"<a href="/help/data.json">json</a><a href="/help/gone">gone</a>"#),
    )
    .await;
    mount(
        &server,
        "/help/data.json",
        ResponseTemplate::new(200).set_body_raw("{\"a\":1}", "application/json"),
    )
    .await;
    mount(&server, "/help/gone", ResponseTemplate::new(404)).await;

    let coordinator = Coordinator::new(create_test_config(&server, &dir)).unwrap();
    let stats = coordinator.crawl_html().await.expect("Crawl failed");

    assert_eq!(stats.pages_saved, 1);
    assert_eq!(stats.skipped.get(SkipReason::ContentMismatch), 1);
    assert_eq!(stats.skipped.get(SkipReason::HttpStatus), 1);
    assert_eq!(log_records(&coordinator, &host_of(&server)).len(), 1);
}

#[tokio::test]
async fn test_pdf_harvest_respects_allow_map() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount(
        &server,
        "/help/",
        html(
            r#"<html><body>
            <a href="manual.pdf">Manual</a>
            <a href="/support/other.pdf">Other</a>
            </body></html>"#,
        ),
    )
    .await;
    // Once from the frontier (rejected as non-HTML), once from the harvester
    Mock::given(method("GET"))
        .and(path("/help/manual.pdf"))
        .respond_with(pdf(b"%PDF-1.4 manual"))
        .expect(2)
        .mount(&server)
        .await;
    mount_never(&server, "/support/other.pdf").await;

    let coordinator = Coordinator::new(create_test_config(&server, &dir)).unwrap();
    let stats = coordinator.run(Stage::All).await.expect("Pipeline failed");

    let crawl = stats.crawl.expect("crawl ran");
    assert_eq!(crawl.pages_saved, 1);
    assert_eq!(crawl.skipped.get(SkipReason::ContentMismatch), 1);

    let harvest = stats.harvest.expect("harvest ran");
    assert_eq!(harvest.discovered, 2);
    assert_eq!(harvest.downloaded, 1);
    assert_eq!(harvest.skipped.get(SkipReason::OutOfScope), 1);

    let host = host_of(&server);
    let pdf_records: Vec<RawLogRecord> = log_records(&coordinator, &host)
        .into_iter()
        .filter(|r| r.kind == ArtifactKind::Pdf)
        .collect();
    assert_eq!(pdf_records.len(), 1);
    assert_eq!(pdf_records[0].url, format!("{}/help/manual.pdf", server.uri()));
    assert_eq!(pdf_records[0].content_type, "application/pdf");

    let manifest = manifest_records(&coordinator);
    let pdf_entry = manifest
        .iter()
        .find(|r| r.kind == ArtifactKind::Pdf)
        .expect("pdf in manifest");
    assert_eq!(
        pdf_entry.source_url.as_deref(),
        Some(format!("{}/help/manual.pdf", server.uri()).as_str())
    );
    assert_eq!(
        pdf_entry.raw_id.as_deref(),
        Some(format!("{}.jsonl:2", host).as_str())
    );
}
