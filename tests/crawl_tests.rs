//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use recon_crawler::config::{Config, FetcherConfig, OutputConfig, RobotsFallback};
use recon_crawler::crawler::{CrawlReport, Crawler, Jitter};
use recon_crawler::output::save_results;
use recon_crawler::CrawlStatus;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a fast test configuration seeded at the mock server
fn create_test_config(seed: &str, keywords: &[&str]) -> Config {
    let mut config = Config::default();
    config.target.seed_url = seed.to_string();
    config.target.keywords = keywords.iter().map(|k| k.to_string()).collect();
    config.crawler.delay_ms = 0;
    config.fetcher = FetcherConfig {
        max_attempts: 3,
        request_timeout_ms: 1_000,
        robots_timeout_ms: 1_000,
        backoff_min_ms: 1,
        backoff_max_ms: 5,
    };
    config
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><head><title>Test</title></head><body>{}</body></html>", body),
        "text/html",
    )
}

async fn mount_page(server: &MockServer, page: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(html(body))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_robots(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn run(config: Config) -> CrawlReport {
    Crawler::with_jitter(config, Jitter::seeded(7))
        .expect("crawler should build")
        .run(CancellationToken::new())
        .await
}

fn result_paths(report: &CrawlReport) -> Vec<String> {
    report
        .results
        .iter()
        .map(|r| url::Url::parse(&r.url).unwrap().path().to_string())
        .collect()
}

#[tokio::test]
async fn test_contact_and_email_scenario() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<p>Contact us</p><a href="/about">About</a>"#).await;
    mount_page(&server, "/about", "<p>Write to a@b.com</p>").await;

    let report = run(create_test_config(&server.uri(), &["contact"])).await;

    assert_eq!(report.status, CrawlStatus::Completed);
    assert_eq!(report.visited_count, 2);
    assert_eq!(report.result_count, 2);

    let home = &report.results.as_slice()[0];
    let contact = home.finding("contact").unwrap();
    assert_eq!(contact.occurrences, 1);
    assert_eq!(home.findings.len(), 1);

    let about = &report.results.as_slice()[1];
    let email = about.finding("EMAIL").unwrap();
    assert_eq!(email.occurrences, 1);
    assert_eq!(email.contexts, ["a@b.com"]);
}

#[tokio::test]
async fn test_robots_disallowed_url_never_requested() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nDisallow: /admin").await;
    mount_page(
        &server,
        "/",
        r#"<a href="/admin">Admin</a><a href="/public">Public</a>"#,
    )
    .await;
    mount_page(&server, "/public", "<p>nothing</p>").await;
    Mock::given(method("GET"))
        .and(path("/admin"))
        .respond_with(html("secret"))
        .expect(0)
        .mount(&server)
        .await;

    let report = run(create_test_config(&server.uri(), &["secret"])).await;

    assert_eq!(report.stats.robots_denied, 1);
    assert_eq!(report.stats.pages_fetched, 2);
    assert!(report.results.is_empty());
}

#[tokio::test]
async fn test_max_urls_bounds_visits() {
    let server = MockServer::start().await;
    let links: String = (1..=9)
        .map(|i| format!(r#"<a href="/p{}">p{}</a>"#, i, i))
        .collect();
    mount_page(&server, "/", &links).await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/p[0-9]+$"))
        .respond_with(html("<p>leaf</p>"))
        .mount(&server)
        .await;

    let mut config = create_test_config(&server.uri(), &["leaf"]);
    config.crawler.max_urls = 3;
    let report = run(config).await;

    assert_eq!(report.visited_count, 3);
    assert_eq!(result_paths(&report), ["/p1", "/p2"]);

    let page_requests = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() != "/robots.txt")
        .count();
    assert!(page_requests <= 3);
}

#[tokio::test]
async fn test_depth_zero_only_fetches_seed() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<p>admin</p><a href="/about">About</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(html("admin"))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server.uri(), &["admin"]);
    config.crawler.max_depth = 0;
    let report = run(config).await;

    assert_eq!(report.visited_count, 1);
    assert_eq!(report.result_count, 1);
    assert_eq!(report.stats.links_enqueued, 0);
}

#[tokio::test]
async fn test_breadth_first_order() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<p>mark</p><a href="/a">a</a><a href="/b">b</a>"#,
    )
    .await;
    mount_page(&server, "/a", r#"<p>mark</p><a href="/c">c</a>"#).await;
    mount_page(&server, "/b", r#"<p>mark</p><a href="/">home</a>"#).await;
    mount_page(&server, "/c", "<p>mark</p>").await;

    let mut config = create_test_config(&server.uri(), &["mark"]);
    config.crawler.max_depth = 2;
    let report = run(config).await;

    assert_eq!(result_paths(&report), ["/", "/a", "/b", "/c"]);
    assert_eq!(report.visited_count, 4);
}

#[tokio::test]
async fn test_links_to_other_hosts_not_followed() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<a href="http://other.invalid/x">x</a><a href="/same">same</a>"#,
    )
    .await;
    mount_page(&server, "/same", "<p>ok</p>").await;

    let report = run(create_test_config(&server.uri(), &["ok"])).await;

    assert_eq!(report.visited_count, 2);
    assert_eq!(result_paths(&report), ["/same"]);
}

#[tokio::test]
async fn test_failed_page_does_not_stop_crawl() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<a href="/broken">broken</a><a href="/fine">fine</a>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;
    mount_page(&server, "/fine", "<p>target</p>").await;

    let report = run(create_test_config(&server.uri(), &["target"])).await;

    assert_eq!(report.status, CrawlStatus::Completed);
    assert_eq!(report.stats.fetch_failures, 1);
    assert_eq!(result_paths(&report), ["/fine"]);
}

#[tokio::test]
async fn test_cancellation_returns_partial_report() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<p>found</p><a href="/slow">slow</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html("found").set_delay(Duration::from_secs(10)))
        .mount(&server)
        .await;

    let mut config = create_test_config(&server.uri(), &["found"]);
    config.fetcher.request_timeout_ms = 30_000;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let report = Crawler::with_jitter(config, Jitter::seeded(1))
        .unwrap()
        .run(cancel)
        .await;

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(report.status, CrawlStatus::Interrupted);
    assert_eq!(report.visited_count, 2);
    assert_eq!(result_paths(&report), ["/"]);
}

#[tokio::test]
async fn test_cancellation_interrupts_delay() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<p>found</p><a href="/next">next</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/next"))
        .respond_with(html("found"))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server.uri(), &["found"]);
    config.crawler.delay_ms = 30_000;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let report = Crawler::with_jitter(config, Jitter::seeded(1))
        .unwrap()
        .run(cancel)
        .await;

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(report.status, CrawlStatus::Interrupted);
    assert_eq!(report.visited_count, 1);
    assert_eq!(report.result_count, 1);
}

#[tokio::test]
async fn test_delay_between_requests() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<a href="/a">a</a><a href="/b">b</a>"#,
    )
    .await;
    mount_page(&server, "/a", "<p>x</p>").await;
    mount_page(&server, "/b", "<p>x</p>").await;

    let mut config = create_test_config(&server.uri(), &["x"]);
    config.crawler.delay_ms = 200;

    let started = Instant::now();
    let report = run(config).await;

    // Delays after "/" and "/a"; none after the last page
    assert!(started.elapsed() >= Duration::from_millis(400));
    assert_eq!(report.visited_count, 3);
}

#[tokio::test]
async fn test_missing_robots_with_deny_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("admin"))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server.uri(), &["admin"]);
    config.crawler.robots_fallback = RobotsFallback::Deny;
    let report = run(config).await;

    assert_eq!(report.status, CrawlStatus::Completed);
    assert_eq!(report.visited_count, 1);
    assert_eq!(report.stats.robots_denied, 1);
    assert!(report.results.is_empty());
}

#[tokio::test]
async fn test_ignore_robots_mode() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /"))
        .expect(0)
        .mount(&server)
        .await;
    mount_page(&server, "/", "<p>admin</p>").await;

    let mut config = create_test_config(&server.uri(), &["admin"]);
    config.crawler.respect_robots = false;
    let report = run(config).await;

    assert_eq!(report.result_count, 1);
}

#[tokio::test]
async fn test_crawl_and_save_results() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<p>Contact us</p><a href="/about">About</a>"#).await;
    mount_page(&server, "/about", "<p>Write to a@b.com</p>").await;

    let report = run(create_test_config(&server.uri(), &["contact"])).await;

    let dir = tempfile::tempdir().unwrap();
    let output = OutputConfig {
        directory: dir.path().to_string_lossy().into_owned(),
        json: true,
        csv: true,
        sqlite_path: Some(dir.path().join("runs.db").to_string_lossy().into_owned()),
    };
    let paths = save_results(&report, &output, "test-hash").unwrap();
    assert_eq!(paths.len(), 3);

    let json = std::fs::read_to_string(&paths[0]).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value.as_array().unwrap().len(), 2);
    assert_eq!(value[1]["findings"][0]["keyword"], "EMAIL");

    let csv = std::fs::read_to_string(&paths[1]).unwrap();
    assert!(csv.starts_with("URL,Title,Keyword,Occurrences,Context"));
    assert!(csv.contains("a@b.com"));
}

#[tokio::test]
async fn test_report_serializes_counts() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "<p>admin</p>").await;

    let report = run(create_test_config(&server.uri(), &["admin"])).await;
    let value = serde_json::to_value(&report).unwrap();

    assert_eq!(value["visited_count"], 1);
    assert_eq!(value["result_count"], 1);
    assert_eq!(value["status"], "completed");
    assert_eq!(value["results"][0]["title"], "Test");
}

#[tokio::test]
async fn test_redirect_into_disallowed_path_not_followed() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nDisallow: /private").await;
    mount_page(&server, "/", r#"<a href="/go">go</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/go"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/private"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/private"))
        .respond_with(html("secret"))
        .expect(0)
        .mount(&server)
        .await;

    let report = run(create_test_config(&server.uri(), &["secret"])).await;

    assert_eq!(report.visited_count, 2);
    assert_eq!(report.stats.robots_denied, 1);
    assert!(report.results.is_empty());
}

#[tokio::test]
async fn test_redirect_to_other_site_not_followed() {
    let server = MockServer::start().await;
    let other = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/landing"))
        .respond_with(html("secret"))
        .expect(0)
        .mount(&other)
        .await;
    mount_page(&server, "/", r#"<a href="/out">out</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/out"))
        .respond_with(
            ResponseTemplate::new(301)
                .insert_header("Location", format!("{}/landing", other.uri()).as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let report = run(create_test_config(&server.uri(), &["secret"])).await;

    assert_eq!(report.status, CrawlStatus::Completed);
    assert_eq!(report.stats.offsite_redirects, 1);
    assert_eq!(report.stats.fetch_failures, 0);
    assert!(report.results.is_empty());
}

#[tokio::test]
async fn test_findings_credited_to_redirect_landing() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/old">old</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/new"))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/new", "<p>moved</p>").await;

    let report = run(create_test_config(&server.uri(), &["moved"])).await;

    assert_eq!(result_paths(&report), ["/new"]);
}

#[tokio::test]
async fn test_redirect_to_visited_page_is_skipped() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<a href="/a">a</a><a href="/b">b</a>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html("<p>mark</p>"))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/a"))
        .expect(1)
        .mount(&server)
        .await;

    let report = run(create_test_config(&server.uri(), &["mark"])).await;

    assert_eq!(result_paths(&report), ["/a"]);
    assert_eq!(report.stats.duplicates_skipped, 1);
}

#[tokio::test]
async fn test_directory_links_resolved_against_directory() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/docs/">docs</a>"#).await;
    mount_page(&server, "/docs/", r#"<a href="intro">intro</a>"#).await;
    mount_page(&server, "/docs/intro", "<p>manual</p>").await;
    Mock::given(method("GET"))
        .and(path("/intro"))
        .respond_with(html("manual"))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server.uri(), &["manual"]);
    config.crawler.max_depth = 2;
    let report = run(config).await;

    assert_eq!(report.visited_count, 3);
    assert_eq!(result_paths(&report), ["/docs/intro"]);
}
