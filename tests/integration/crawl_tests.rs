//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use access_mapper::config::{parse_config, Config};
use access_mapper::crawler::{AccessLevel, Coordinator, VisitRecord};
use access_mapper::run_crawl;
use std::collections::HashSet;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration crawling from the mock server root
fn create_test_config(seed: &str, report_path: &str, concurrency: u32, max_pages: u32) -> Config {
    let mut config = Config::default();
    config.crawl.seed = seed.to_string();
    config.crawl.concurrency = concurrency;
    config.crawl.max_pages = max_pages;
    config.fetch.user_agent = "TestBot/1.0".to_string();
    config.fetch.timeout_secs = 1;
    config.fetch.connect_timeout_secs = 1;
    config.output.report_path = report_path.to_string();
    config
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html")
}

async fn mount_page(server: &MockServer, page_path: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(response)
        .mount(server)
        .await;
}

fn find<'a>(records: &'a [VisitRecord], base: &str, page_path: &str) -> &'a VisitRecord {
    let url = format!("{}{}", base, page_path);
    records
        .iter()
        .find(|r| r.url == url)
        .unwrap_or_else(|| panic!("no record for {}", url))
}

fn assert_unique(records: &[VisitRecord]) {
    let unique: HashSet<_> = records.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(unique.len(), records.len(), "duplicate records: {:?}", records);
}

#[tokio::test]
async fn test_login_page_and_external_link() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        html(r#"<a href="/login">Sign in</a><a href="https://other.test/">Elsewhere</a>"#),
    )
    .await;
    mount_page(
        &mock_server,
        "/login",
        html(r#"<form><input name="user"><input type="password" name="pw"></form>"#),
    )
    .await;

    let temp_dir = TempDir::new().unwrap();
    let report = temp_dir.path().join("crawled_urls.csv");
    let config = create_test_config(&format!("{}/", base_url), report.to_str().unwrap(), 3, 100);

    let outcome = run_crawl(config).await.expect("crawl should start");

    assert_eq!(outcome.records.len(), 2);
    assert_eq!(
        find(&outcome.records, &base_url, "/").access_level,
        AccessLevel::NoLoginRequired
    );
    assert_eq!(
        find(&outcome.records, &base_url, "/login").access_level,
        AccessLevel::RequiresLogin
    );
    assert!(outcome.records.iter().all(|r| !r.url.contains("other.test")));

    assert!(outcome.report_written);
    let csv = std::fs::read_to_string(&report).unwrap();
    assert!(csv.starts_with("url,access level,status,error"));
    assert!(csv.contains(&format!("{}/login,requires login,200,", base_url)));
    assert!(!csv.contains("other.test"));
}

#[tokio::test]
async fn test_missing_page_not_followed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", html(r#"<a href="/missing">Missing</a>"#)).await;
    mount_page(
        &mock_server,
        "/missing",
        ResponseTemplate::new(404).set_body_string(r#"<a href="/hidden">Hidden</a>"#),
    )
    .await;
    mount_page(&mock_server, "/hidden", html("hidden")).await;

    let temp_dir = TempDir::new().unwrap();
    let report = temp_dir.path().join("report.csv");
    let config = create_test_config(&format!("{}/", base_url), report.to_str().unwrap(), 2, 100);

    let outcome = Coordinator::new(config).unwrap().crawl().await;

    assert_eq!(outcome.records.len(), 2);
    let missing = find(&outcome.records, &base_url, "/missing");
    assert_eq!(missing.access_level, AccessLevel::NotAccessible);
    assert_eq!(missing.status, Some(404));
    assert!(outcome.records.iter().all(|r| !r.url.ends_with("/hidden")));
}

#[tokio::test]
async fn test_redirect_to_login() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", html(r#"<a href="/account">Account</a>"#)).await;
    mount_page(
        &mock_server,
        "/account",
        ResponseTemplate::new(302).insert_header("Location", "/login?next=/account"),
    )
    .await;
    mount_page(&mock_server, "/login", html("Please sign in")).await;

    let temp_dir = TempDir::new().unwrap();
    let report = temp_dir.path().join("report.csv");
    let config = create_test_config(&format!("{}/", base_url), report.to_str().unwrap(), 2, 100);

    let outcome = Coordinator::new(config).unwrap().crawl().await;

    let account = find(&outcome.records, &base_url, "/account");
    assert_eq!(account.access_level, AccessLevel::RequiresLogin);
    assert_eq!(account.status, Some(200));
}

#[tokio::test]
async fn test_server_error_is_unknown() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", html(r#"<a href="/broken">Broken</a>"#)).await;
    mount_page(
        &mock_server,
        "/broken",
        ResponseTemplate::new(500).set_body_string("internal error"),
    )
    .await;

    let temp_dir = TempDir::new().unwrap();
    let report = temp_dir.path().join("report.json");
    let config = create_test_config(&format!("{}/", base_url), report.to_str().unwrap(), 2, 100);

    let outcome = run_crawl(config).await.unwrap();

    let broken = find(&outcome.records, &base_url, "/broken");
    assert_eq!(broken.access_level, AccessLevel::Unknown(Some(500)));
    assert!(broken.error.is_none());

    // Format inferred from the .json extension
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().any(|row| row["access_level"] == "unknown (500)"));
}

#[tokio::test]
async fn test_timeout_recorded_as_failure() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", html(r#"<a href="/slow">Slow</a>"#)).await;
    mount_page(
        &mock_server,
        "/slow",
        html("eventually").set_delay(Duration::from_secs(3)),
    )
    .await;

    let temp_dir = TempDir::new().unwrap();
    let report = temp_dir.path().join("report.csv");
    let config = create_test_config(&format!("{}/", base_url), report.to_str().unwrap(), 2, 100);

    let outcome = Coordinator::new(config).unwrap().crawl().await;

    assert_eq!(outcome.records.len(), 2);
    let slow = find(&outcome.records, &base_url, "/slow");
    assert_eq!(slow.access_level, AccessLevel::Unknown(None));
    assert!(slow.status.is_none());
    assert!(slow.error.is_some());
    assert_eq!(outcome.statistics.levels.failures, 1);
}

#[tokio::test]
async fn test_link_cycle_terminates() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", html(r#"<a href="/b">B</a>"#)).await;
    mount_page(&mock_server, "/b", html(r#"<a href="/c">C</a><a href="/">Home</a>"#)).await;
    mount_page(&mock_server, "/c", html(r#"<a href="/d">D</a><a href="/b#top">B</a>"#)).await;
    mount_page(&mock_server, "/d", html(r#"<a href="/">Home</a><a href="/c">C</a>"#)).await;

    let temp_dir = TempDir::new().unwrap();
    let report = temp_dir.path().join("report.csv");
    let config = create_test_config(&format!("{}/", base_url), report.to_str().unwrap(), 4, 100);

    let outcome = tokio::time::timeout(
        Duration::from_secs(10),
        Coordinator::new(config).unwrap().crawl(),
    )
    .await
    .expect("crawl should terminate");

    assert_eq!(outcome.records.len(), 4);
    assert_unique(&outcome.records);
    assert!(!outcome.statistics.budget_reached());
}

#[tokio::test]
async fn test_budget_of_one_visits_only_seed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        html(r#"<a href="/a">A</a><a href="/b">B</a><a href="/c">C</a>"#),
    )
    .await;

    let temp_dir = TempDir::new().unwrap();
    let report = temp_dir.path().join("report.csv");
    let config = create_test_config(&format!("{}/", base_url), report.to_str().unwrap(), 5, 1);

    let outcome = Coordinator::new(config).unwrap().crawl().await;

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].url, format!("{}/", base_url));
    assert!(outcome.statistics.budget_reached());
}

#[tokio::test]
async fn test_concurrent_crawl_no_duplicates() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // Every page links to every other page
    let links: String = (0..30)
        .map(|i| format!(r#"<a href="/p{}">P{}</a>"#, i, i))
        .collect();

    mount_page(&mock_server, "/", html(&links)).await;
    for i in 0..30 {
        mount_page(
            &mock_server,
            &format!("/p{}", i),
            html(&links).set_delay(Duration::from_millis(20)),
        )
        .await;
    }

    let temp_dir = TempDir::new().unwrap();
    let report = temp_dir.path().join("report.csv");
    let config = create_test_config(&format!("{}/", base_url), report.to_str().unwrap(), 20, 25);

    let outcome = Coordinator::new(config).unwrap().run().await;

    assert_eq!(outcome.records.len(), 25);
    assert_unique(&outcome.records);

    // Each record was fetched exactly once
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 25);

    let csv = std::fs::read_to_string(&report).unwrap();
    assert_eq!(csv.lines().count(), 26);
}

#[tokio::test]
async fn test_config_file_drives_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", html(r#"<a href="/about">About</a>"#)).await;
    mount_page(&mock_server, "/about", html("about")).await;

    let temp_dir = TempDir::new().unwrap();
    let report = temp_dir.path().join("report.out");
    let toml = format!(
        r#"
[crawl]
seed = "{}/"
concurrency = 2
max-pages = 10

[fetch]
timeout-secs = 2

[output]
report-path = "{}"
format = "markdown"
"#,
        base_url,
        report.display()
    );

    let config = parse_config(&toml).unwrap();
    let outcome = run_crawl(config).await.unwrap();

    assert_eq!(outcome.records.len(), 2);
    let markdown = std::fs::read_to_string(&report).unwrap();
    assert!(markdown.contains("# Access-Mapper Report"));
    assert!(markdown.contains(&format!("{}/about", base_url)));
}

#[tokio::test]
async fn test_invalid_seed_is_invocation_error() {
    let temp_dir = TempDir::new().unwrap();
    let report = temp_dir.path().join("report.csv");
    let config = create_test_config("mailto:someone@x.test", report.to_str().unwrap(), 2, 10);

    assert!(run_crawl(config).await.is_err());
    assert!(!report.exists());
}
