//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the archive and run the full
//! crawl cycle end-to-end against a temporary documents directory.

use dodis_harvest::config::{ArchiveConfig, Config, CrawlerConfig, OutputConfig};
use dodis_harvest::crawler::Coordinator;
use dodis_harvest::storage::{DocumentSink, FileStorage, StorageError, StorageResult};
use dodis_harvest::{CrawlSummary, DocumentKind};
use serde_json::json;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock archive
fn create_test_config(base_url: &str, language: &str, documents_dir: &Path) -> Config {
    Config {
        crawler: CrawlerConfig {
            workers: 4,
            request_interval_ms: 50, // Very short for testing
            request_timeout_secs: 5,
            result_buffer: 8,
            post_process_limit: 4,
        },
        archive: ArchiveConfig {
            base_url: base_url.to_string(),
            start_page: 1,
            language: language.to_string(),
        },
        output: OutputConfig {
            documents_dir: documents_dir.to_string_lossy().into_owned(),
        },
    }
}

async fn run(config: Config) -> CrawlSummary {
    finish(Coordinator::new(config).expect("Failed to create coordinator")).await
}

async fn finish(coordinator: Coordinator) -> CrawlSummary {
    tokio::time::timeout(Duration::from_secs(30), coordinator.run())
        .await
        .expect("Crawl did not finish")
        .expect("Crawl failed")
}

/// Mounts one sitemap page
async fn mount_sitemap_page(
    server: &MockServer,
    page: u32,
    total_pages: u32,
    entries: serde_json::Value,
    expected_calls: u64,
) {
    let count = entries.as_array().map_or(0, |e| e.len());
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("p", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": count,
            "data": entries,
            "currentPage": page,
            "totalPages": total_pages,
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn mount_json(server: &MockServer, at: &str, body: serde_json::Value, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Document sink that refuses to write some filenames
struct FailingSink {
    inner: FileStorage,
    rejected: HashSet<String>,
}

impl FailingSink {
    fn new(root: &Path, rejected: &[&str]) -> Self {
        Self {
            inner: FileStorage::new(root).unwrap(),
            rejected: rejected.iter().map(|name| name.to_string()).collect(),
        }
    }
}

impl DocumentSink for FailingSink {
    fn save(&self, filename: &str, bytes: &[u8]) -> StorageResult<PathBuf> {
        if self.rejected.contains(filename) {
            return Err(StorageError::Write {
                path: self.inner.root().join(filename),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            });
        }
        self.inner.save(filename, bytes)
    }

    fn root(&self) -> &Path {
        self.inner.root()
    }
}

fn transcription(url: String) -> serde_json::Value {
    json!({
        "documentAttachmentType": "Transcription",
        "attachment": { "attachmentType": "xml_transcription", "presignedUrl": url }
    })
}

fn empty_document() -> serde_json::Value {
    json!({ "data": { "relatedTags": [], "attachments": [] } })
}

#[tokio::test]
async fn test_full_crawl_single_page_listing() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    let docs = TempDir::new().unwrap();

    mount_sitemap_page(&server, 1, 1, json!([{ "id": 100, "langCode": "de" }]), 1).await;
    // The placeholder total lets exactly one speculative page through
    mount_sitemap_page(&server, 2, 1, json!([]), 1).await;
    mount_sitemap_page(&server, 3, 1, json!([]), 0).await;

    Mock::given(method("GET"))
        .and(path("/100"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "relatedTags": [{ "tagId": 1, "name": "Italy", "mainTag": true }],
                "attachments": [
                    {
                        "documentAttachmentType": "Transcription",
                        "attachment": {
                            "attachmentType": "xml_transcription",
                            "presignedUrl": format!("{}/files/dodis-100.html?format=xml", base_url)
                        }
                    },
                    {
                        "documentAttachmentType": "Facsimile",
                        "attachment": {
                            "attachmentType": "pdf",
                            "presignedUrl": format!("{}/files/dodis-100.pdf", base_url)
                        }
                    },
                    {
                        "documentAttachmentType": "Appendix",
                        "attachment": {
                            "attachmentType": "pdf",
                            "presignedUrl": format!("{}/files/dodis-100-appendix.pdf", base_url)
                        }
                    }
                ]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/files/dodis-100.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>Bern, 1. Mai</p>"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/dodis-100.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.4".to_vec()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/dodis-100-appendix.pdf"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let summary = run(create_test_config(&base_url, "all", docs.path())).await;

    for name in ["sitemap-1.json", "sitemap-2.json", "100.json", "100.html", "100.pdf"] {
        assert!(docs.path().join(name).is_file(), "{} should exist", name);
    }
    assert_eq!(
        std::fs::read_to_string(docs.path().join("100.html")).unwrap(),
        "<p>Bern, 1. Mai</p>"
    );

    assert_eq!(summary.fetched(DocumentKind::Sitemap), 2);
    assert_eq!(summary.fetched(DocumentKind::DocumentRecord), 1);
    assert_eq!(summary.fetched(DocumentKind::HtmlPage), 1);
    assert_eq!(summary.fetched(DocumentKind::Facsimile), 1);
    assert_eq!(summary.urls_enqueued, 5);
    assert_eq!(summary.fetch_failures, 0);
    assert_eq!(summary.handler_failures, 0);
}

#[tokio::test]
async fn test_language_filter() {
    let server = MockServer::start().await;
    let docs = TempDir::new().unwrap();

    mount_sitemap_page(
        &server,
        1,
        1,
        json!([
            { "id": 1, "langCode": "de" },
            { "id": 2, "langCode": "fr" },
            { "id": 3, "langCode": "it" }
        ]),
        1,
    )
    .await;
    mount_sitemap_page(&server, 2, 1, json!([]), 1).await;

    mount_json(&server, "/1", empty_document(), 0).await;
    mount_json(&server, "/2", empty_document(), 1).await;
    mount_json(&server, "/3", empty_document(), 0).await;

    let summary = run(create_test_config(&server.uri(), "fr", docs.path())).await;

    assert!(docs.path().join("2.json").is_file());
    assert!(!docs.path().join("1.json").exists());
    assert!(!docs.path().join("3.json").exists());
    assert_eq!(summary.fetched(DocumentKind::DocumentRecord), 1);
}

#[tokio::test]
async fn test_failures_do_not_stop_the_crawl() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    let docs = TempDir::new().unwrap();

    mount_sitemap_page(
        &server,
        1,
        1,
        json!([
            { "id": 10, "langCode": "de" },
            { "id": 11, "langCode": "de" },
            { "id": 12, "langCode": "de" }
        ]),
        1,
    )
    .await;
    mount_sitemap_page(&server, 2, 1, json!([]), 1).await;

    // Server error: dropped, nothing stored
    Mock::given(method("GET"))
        .and(path("/10"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    // Stored, but not a document record
    Mock::given(method("GET"))
        .and(path("/11"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .expect(1)
        .mount(&server)
        .await;

    // Stored, with a transcription that is gone
    mount_json(
        &server,
        "/12",
        json!({
            "data": {
                "attachments": [{
                    "documentAttachmentType": "Transcription",
                    "attachment": {
                        "attachmentType": "xml_transcription",
                        "presignedUrl": format!("{}/files/dodis-12.html?format=xml", base_url)
                    }
                }]
            }
        }),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/files/dodis-12.html"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let summary = run(create_test_config(&base_url, "all", docs.path())).await;

    assert!(!docs.path().join("10.json").exists());
    assert!(docs.path().join("11.json").is_file());
    assert!(docs.path().join("12.json").is_file());
    assert!(!docs.path().join("12.html").exists());

    assert_eq!(summary.fetch_failures, 2);
    assert_eq!(summary.handler_failures, 1);
    assert_eq!(summary.fetched(DocumentKind::DocumentRecord), 2);
}

#[tokio::test]
async fn test_malformed_sitemap_page_keeps_walking() {
    let server = MockServer::start().await;
    let docs = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("p", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"total\":"))
        .expect(1)
        .mount(&server)
        .await;
    // Page 1 never reported a total, so the placeholder (start + 2) still
    // allows page 3 when page 2 is processed
    mount_sitemap_page(&server, 2, 2, json!([{ "id": 5, "langCode": "it" }]), 1).await;
    mount_sitemap_page(&server, 3, 2, json!([]), 1).await;
    mount_sitemap_page(&server, 4, 2, json!([]), 0).await;
    mount_json(&server, "/5", empty_document(), 1).await;

    let summary = run(create_test_config(&server.uri(), "all", docs.path())).await;

    assert!(docs.path().join("sitemap-1.json").is_file());
    assert!(docs.path().join("5.json").is_file());
    assert_eq!(summary.fetched(DocumentKind::Sitemap), 3);
    assert_eq!(summary.handler_failures, 1);
}

#[tokio::test]
async fn test_start_page_override() {
    let server = MockServer::start().await;
    let docs = TempDir::new().unwrap();

    mount_sitemap_page(&server, 1, 7, json!([]), 0).await;
    mount_sitemap_page(&server, 7, 7, json!([{ "id": 70, "langCode": "fr" }]), 1).await;
    mount_sitemap_page(&server, 8, 7, json!([]), 1).await;
    mount_sitemap_page(&server, 9, 7, json!([]), 0).await;
    mount_json(&server, "/70", empty_document(), 1).await;

    let mut config = create_test_config(&server.uri(), "all", docs.path());
    config.archive.start_page = 7;

    let summary = run(config).await;

    assert!(docs.path().join("sitemap-7.json").is_file());
    assert!(docs.path().join("70.json").is_file());
    assert_eq!(summary.fetched(DocumentKind::Sitemap), 2);
}

#[tokio::test]
async fn test_unwritable_downloads_are_dropped() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    let docs = TempDir::new().unwrap();

    mount_sitemap_page(
        &server,
        1,
        1,
        json!([
            { "id": 100, "langCode": "de" },
            { "id": 200, "langCode": "de" }
        ]),
        1,
    )
    .await;
    mount_sitemap_page(&server, 2, 1, json!([]), 1).await;

    // Fetched, but the sink refuses it, so its attachments are never seen
    mount_json(
        &server,
        "/100",
        json!({
            "data": {
                "attachments": [transcription(format!("{}/files/dodis-100.html", base_url))]
            }
        }),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/files/dodis-100.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>Bern</p>"))
        .expect(0)
        .mount(&server)
        .await;

    // A facsimile without an identifier has no filename and is never requested
    mount_json(
        &server,
        "/200",
        json!({
            "data": {
                "attachments": [{
                    "documentAttachmentType": "Facsimile",
                    "attachment": {
                        "attachmentType": "pdf",
                        "presignedUrl": format!("{}/files/scan.pdf", base_url)
                    }
                }]
            }
        }),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/files/scan.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.4".to_vec()))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(&base_url, "all", docs.path());
    let sink = FailingSink::new(docs.path(), &["100.json"]);
    let coordinator = Coordinator::with_storage(config, Arc::new(sink)).unwrap();

    let summary = finish(coordinator).await;

    assert!(!docs.path().join("100.json").exists());
    assert!(!docs.path().join("100.html").exists());
    assert!(docs.path().join("200.json").is_file());

    // sitemap 1 and 2, both records and the facsimile
    assert_eq!(summary.urls_enqueued, 5);
    assert_eq!(summary.fetch_failures, 2);
    assert_eq!(summary.handler_failures, 0);
    assert_eq!(summary.fetched(DocumentKind::DocumentRecord), 1);
    assert_eq!(summary.fetched(DocumentKind::Facsimile), 0);
}

#[tokio::test]
async fn test_xml_transcription_url_is_stored_as_document_record() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    let docs = TempDir::new().unwrap();

    mount_sitemap_page(&server, 1, 1, json!([{ "id": 100, "langCode": "de" }]), 1).await;
    mount_sitemap_page(&server, 2, 1, json!([]), 1).await;

    mount_json(
        &server,
        "/100",
        json!({
            "data": {
                "attachments": [transcription(format!("{}/files/dodis-100.xml", base_url))]
            }
        }),
        1,
    )
    .await;
    // No "html" or "pdf" in the URL, so it is named after its first number
    Mock::given(method("GET"))
        .and(path("/files/dodis-100.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<TEI/>"))
        .expect(1)
        .mount(&server)
        .await;

    let summary = run(create_test_config(&base_url, "all", docs.path())).await;

    assert_eq!(
        std::fs::read_to_string(docs.path().join("100.json")).unwrap(),
        "<TEI/>"
    );
    assert!(!docs.path().join("100.xml").exists());

    assert_eq!(summary.fetched(DocumentKind::DocumentRecord), 2);
    assert_eq!(summary.fetch_failures, 0);
    // The transcription body is then parsed as a record and fails
    assert_eq!(summary.handler_failures, 1);
}
