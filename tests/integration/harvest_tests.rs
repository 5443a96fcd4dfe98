//! Integration tests for the harvester
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! harvest cycle end-to-end: input CSV in, item directories and report out.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use sumi_harvest::config::Config;
use sumi_harvest::{run_harvest, ConfigError, HarvestError, ReportStatus};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration without rate gating or retries
fn create_test_config() -> Config {
    let mut config = Config::default();
    config.harvest.min_interval_seconds = 0.0;
    config.http.max_attempts = 1;
    config.http.fetch_timeout_seconds = 5;
    config.http.image_timeout_seconds = 5;
    config
}

/// Writes an input CSV into `dir` and returns its path
fn write_input(dir: &Path, content: &str) -> PathBuf {
    let input = dir.join("urls.csv");
    std::fs::write(&input, content).expect("Failed to write input CSV");
    input
}

fn read_report(path: &Path) -> Vec<csv::StringRecord> {
    let mut reader = csv::Reader::from_path(path).expect("Failed to open report");
    reader
        .records()
        .collect::<Result<Vec<_>, _>>()
        .expect("Failed to read report")
}

async fn mount_page(server: &MockServer, page_path: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_harvest_mixed_outcomes() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/article",
        r#"<html>
            <head>
                <title>Article</title>
                <meta property="og:title" content="Hello">
                <meta name="description" content="World">
            </head>
            <body>
                <h1>Headline</h1>
                <img src="/img/a.jpg"><img src="/img/a.jpg"><img src="/img/missing.jpg">
                <a href="/next">next</a>
            </body>
        </html>"#,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/img/a.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jpeg bytes".to_vec()))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/img/missing.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let input = write_input(
        dir.path(),
        &format!("url\n{base_url}/broken\n{base_url}/article\n"),
    );
    let output = dir.path().join("out");

    let report = run_harvest(create_test_config(), &input, &output)
        .await
        .expect("Harvest should complete");

    // One row per URL, in input order
    assert_eq!(report.rows.len(), 2);
    assert_eq!(report.rows[0].url, format!("{base_url}/broken"));
    assert_eq!(report.rows[0].status, ReportStatus::Error);
    assert!(!report.rows[0].error.is_empty());
    assert_eq!(report.rows[1].url, format!("{base_url}/article"));
    assert_eq!(report.rows[1].status, ReportStatus::Ok);

    // report.csv mirrors the rows
    let records = read_report(&output.join("report.csv"));
    assert_eq!(records.len(), 2);
    assert_eq!(&records[0][1], "error");
    assert_eq!(&records[1][1], "ok");
    assert_eq!(&records[1][3], "");

    // data.json holds the assembled record
    let item_dir = PathBuf::from(&report.rows[1].output_dir);
    let json: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(item_dir.join("data.json")).expect("data.json missing"),
    )
    .expect("data.json is not JSON");

    assert_eq!(json["title"], "Hello");
    assert_eq!(json["description"], "World");
    assert_eq!(json["h1"], "Headline");
    assert_eq!(json["og"]["og:title"], "Hello");
    assert_eq!(json["links"][0], format!("{base_url}/next"));
    assert_eq!(json["counts"]["images_found"], 2);
    assert_eq!(json["counts"]["images_downloaded"], 1);
    assert_eq!(json["counts"]["links_found"], 1);
    assert_eq!(json["images"].as_array().map(Vec::len), Some(1));

    let domain = base_url.trim_start_matches("http://");
    assert_eq!(json["domain"], domain);

    // The downloaded image sits in the item's images directory
    let image = item_dir.join("images").join("a.jpg");
    assert_eq!(std::fs::read(image).expect("image missing"), b"jpeg bytes");

    assert_eq!(report.statistics.ok, 1);
    assert_eq!(report.statistics.errors, 1);
    assert_eq!(report.statistics.images_downloaded, 1);
}

#[tokio::test]
async fn test_empty_input_writes_header_only_report() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let input = write_input(dir.path(), "url\n");
    let output = dir.path().join("out");

    let report = run_harvest(create_test_config(), &input, &output)
        .await
        .expect("Harvest should complete");

    assert!(report.rows.is_empty());
    assert_eq!(
        std::fs::read_to_string(output.join("report.csv")).expect("report missing"),
        "url,status,output_dir,error\n"
    );
}

#[tokio::test]
async fn test_missing_url_column_aborts_before_network() {
    let mock_server = MockServer::start().await;

    // No request may reach the server
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let input = write_input(dir.path(), &format!("link\n{}/page\n", mock_server.uri()));
    let output = dir.path().join("out");

    let result = run_harvest(create_test_config(), &input, &output).await;

    assert!(matches!(
        result,
        Err(HarvestError::Config(ConfigError::MissingUrlColumn { .. }))
    ));
    assert!(!output.join("report.csv").exists());
}

#[tokio::test]
async fn test_only_domain_filter() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/kept", "<html><title>Kept</title></html>").await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let input = write_input(
        dir.path(),
        &format!(
            "url\nhttps://elsewhere.invalid/page\n{}/kept\n",
            mock_server.uri()
        ),
    );
    let output = dir.path().join("out");

    let mut config = create_test_config();
    config.harvest.only_domain = Some("127.0.0.1".to_string());

    let report = run_harvest(config, &input, &output)
        .await
        .expect("Harvest should complete");

    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].status, ReportStatus::Ok);
    assert!(report.rows[0].output_dir.ends_with("-1"));
}

#[tokio::test]
async fn test_rate_gate_spaces_urls() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/a", "<html><title>A</title></html>").await;
    mount_page(&mock_server, "/b", "<html><title>B</title></html>").await;
    mount_page(&mock_server, "/c", "<html><title>C</title></html>").await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let base_url = mock_server.uri();
    let input = write_input(
        dir.path(),
        &format!("url\n{base_url}/a\n{base_url}/b\n{base_url}/c\n"),
    );
    let output = dir.path().join("out");

    let mut config = create_test_config();
    config.harvest.min_interval_seconds = 0.2;

    let started = Instant::now();
    let report = run_harvest(config, &input, &output)
        .await
        .expect("Harvest should complete");

    assert_eq!(report.rows.len(), 3);
    assert!(report.rows.iter().all(|row| row.status == ReportStatus::Ok));
    // The first URL is not gated; the next two each wait the interval
    assert!(started.elapsed() >= Duration::from_millis(400));
}

#[tokio::test]
async fn test_item_directories_are_distinct_per_index() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/same", "<html><title>Same</title></html>").await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let url = format!("{}/same", mock_server.uri());
    let input = write_input(dir.path(), &format!("url\n{url}\n{url}\n"));
    let output = dir.path().join("out");

    let report = run_harvest(create_test_config(), &input, &output)
        .await
        .expect("Harvest should complete");

    assert_eq!(report.rows.len(), 2);
    assert_ne!(report.rows[0].output_dir, report.rows[1].output_dir);
    assert!(Path::new(&report.rows[0].output_dir).join("data.json").exists());
    assert!(Path::new(&report.rows[1].output_dir).join("data.json").exists());
}
