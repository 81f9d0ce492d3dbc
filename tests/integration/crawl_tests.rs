//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for a members site and run the full
//! login, crawl, extract and store cycle against it.

use async_trait::async_trait;
use members_mirror::config::{Config, CrawlerConfig, Credentials, RulesConfig};
use members_mirror::crawler::{Coordinator, HttpFetcher};
use members_mirror::extract::{ClassifiedItem, ExtractorKind};
use members_mirror::session::AuthError;
use members_mirror::state::DownloadState;
use members_mirror::storage::{
    DownloadJob, FileStore, ItemSink, Manifest, RunStatus, SqliteManifest, StorageResult,
    StoredFile,
};
use members_mirror::MirrorError;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Sink that keeps every job instead of writing it
#[derive(Default)]
struct RecordingSink {
    jobs: Mutex<Vec<DownloadJob>>,
}

impl RecordingSink {
    fn jobs(&self) -> Vec<DownloadJob> {
        self.jobs.lock().unwrap().clone()
    }

    fn job(&self, kind: ExtractorKind) -> DownloadJob {
        self.jobs()
            .into_iter()
            .find(|job| job.item.kind() == kind)
            .unwrap_or_else(|| panic!("no {} job", kind))
    }
}

#[async_trait]
impl ItemSink for RecordingSink {
    async fn store(&self, job: &DownloadJob) -> StorageResult<StoredFile> {
        let bytes = job.body.as_ref().map_or(0, |b| b.len() as u64);
        self.jobs.lock().unwrap().push(job.clone());
        Ok(StoredFile {
            path: PathBuf::from(&job.path),
            bytes,
        })
    }
}

/// Creates a test configuration that routes iframes on the mock host to the video extractor
fn create_test_config(output_dir: &str) -> Config {
    let mut config = Config {
        crawler: CrawlerConfig {
            max_concurrent_requests: 4,
            download_delay: 0,
            request_timeout: 5,
            fetch_retries: 0,
            ..CrawlerConfig::default()
        },
        rules: RulesConfig {
            video_domains: vec!["127.0.0.1".to_string()],
            ..RulesConfig::default()
        },
        ..Config::default()
    };
    config.output.directory = output_dir.to_string();
    config
}

fn credentials(server: &MockServer) -> Credentials {
    Credentials::new(&format!("{}/wp-login.php", server.uri()), "alice", "secret").unwrap()
}

fn fetcher(config: &Config) -> Arc<HttpFetcher> {
    Arc::new(
        HttpFetcher::new(&config.crawler)
            .unwrap()
            .with_retry_delay(Duration::from_millis(10)),
    )
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html")
}

async fn mount_login_success(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/wp-login.php"))
        .and(body_string_contains("log=alice"))
        .respond_with(html(
            r#"<html><body><a href="/wp-login.php?action=logout">Log out</a></body></html>"#,
        ))
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, at: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(html(&body))
        .mount(server)
        .await;
}

fn player_page(title: &str, script: &str) -> String {
    format!(
        "<html><head><title>{}</title></head><body><script>{}</script></body></html>",
        title, script
    )
}

#[tokio::test]
async fn test_full_crawl_routes_every_kind() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_login_success(&server).await;

    mount_page(
        &server,
        "/dashboard/",
        r#"<html><body>
            <a href="/lessons/one/">Lesson one</a>
            <a href="/files/notes.pdf">Notes</a>
            <a href="/missing/">Gone</a>
            <a href="/wp-login.php?action=logout">Log out</a>
        </body></html>"#
            .to_string(),
    )
    .await;

    mount_page(
        &server,
        "/lessons/one/",
        format!(
            r#"<html><head><title>Lesson One – Members Area</title></head><body>
                <iframe src="{base}/video/42"></iframe>
                <iframe src="{base}/video/43"></iframe>
            </body></html>"#
        ),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/files/notes.pdf"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4".to_vec(), "application/pdf"),
        )
        .expect(1)
        .mount(&server)
        .await;

    mount_page(
        &server,
        "/video/42",
        player_page(
            "Lesson One from Example Channel on Vimeo",
            r#"var config = {"progressive":[
                {"url":"https://vod.example/v/720.mp4","quality":"720p"},
                {"url":"https://vod.example/v/1080.mp4","quality":"1080p"}
            ]};"#,
        ),
    )
    .await;

    mount_page(
        &server,
        "/video/43",
        player_page(
            "Broken from Example Channel on Vimeo",
            "var config = {};",
        ),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path().to_str().unwrap());
    let sink = Arc::new(RecordingSink::default());
    let mut manifest = SqliteManifest::in_memory().unwrap();

    let coordinator = Coordinator::new(
        &config,
        credentials(&server),
        fetcher(&config),
        sink.clone(),
        &mut manifest,
        "test-hash",
    )
    .expect("Failed to create coordinator");
    let report = coordinator.run().await.expect("Crawl failed");

    // Page item keeps the fetched body and drops the site suffix
    let page = sink.job(ExtractorKind::Page);
    assert_eq!(page.item.title(), "Lesson One");
    assert_eq!(page.path, "/lessons/one/Lesson One.html");
    assert!(page.body.is_some());

    // File item lands next to the page that linked it
    let file = sink.job(ExtractorKind::File);
    assert_eq!(file.item.title(), "notes");
    assert_eq!(file.path, "/dashboard/notes.pdf");
    assert_eq!(file.url, format!("{}/files/notes.pdf", base));
    assert_eq!(file.body.as_deref(), Some(&b"%PDF-1.4"[..]));

    // Video item picks the best encoding
    let video = sink.job(ExtractorKind::Video);
    match &video.item {
        ClassifiedItem::Video {
            iframe_url,
            quality,
            ..
        } => {
            assert_eq!(iframe_url, &format!("{}/video/42", base));
            assert_eq!(*quality, 1080);
        }
        other => panic!("expected video, got {:?}", other),
    }
    assert_eq!(video.url, "https://vod.example/v/1080.mp4");
    assert_eq!(video.path, "/lessons/one/Lesson One.mp4");
    assert!(video.body.is_none());

    assert_eq!(sink.jobs().len(), 3);
    assert_eq!(report.total_items(), 3);
    assert_eq!(report.downloaded, 3);

    // The broken player is skipped without affecting its siblings
    assert_eq!(report.extraction_failures.len(), 1);
    assert!(report.extraction_failures[0].url.ends_with("/video/43"));

    // The 404 is recorded as a fetch failure
    assert_eq!(report.fetch_failures.len(), 1);
    assert!(report.fetch_failures[0].url.ends_with("/missing/"));

    let run = manifest.get_latest_run().unwrap().unwrap();
    assert_eq!(run.id, report.run_id);
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.config_hash, "test-hash");
    assert_eq!(
        manifest
            .count_items_by_state(run.id, DownloadState::Downloaded)
            .unwrap(),
        3
    );
    assert_eq!(manifest.get_failures(run.id).unwrap().len(), 2);
}

#[tokio::test]
async fn test_file_store_writes_mirror_tree() {
    let server = MockServer::start().await;

    mount_login_success(&server).await;

    mount_page(
        &server,
        "/dashboard/",
        r#"<html><body><a href="/lessons/one/">Lesson one</a></body></html>"#.to_string(),
    )
    .await;

    mount_page(
        &server,
        "/lessons/one/",
        r#"<html><head><title>Lesson One – Members Area</title></head><body>
            <a href="/files/My%20Notes.pdf">Notes</a>
        </body></html>"#
            .to_string(),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/files/My%20Notes.pdf"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4".to_vec(), "application/pdf"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path().to_str().unwrap());
    let fetcher = fetcher(&config);
    let sink = Arc::new(FileStore::new(dir.path(), fetcher.client().clone()));
    let mut manifest = SqliteManifest::in_memory().unwrap();

    let coordinator = Coordinator::new(
        &config,
        credentials(&server),
        fetcher,
        sink,
        &mut manifest,
        "test-hash",
    )
    .unwrap();
    let report = coordinator.run().await.expect("Crawl failed");

    assert_eq!(report.total_items(), 2);
    assert_eq!(report.downloaded, 2);
    assert!(report.download_failures.is_empty());

    let page = dir.path().join("lessons/one/Lesson One.html");
    assert!(std::fs::read_to_string(&page).unwrap().contains("Lesson One"));

    let file = dir.path().join("lessons/one/My Notes.pdf");
    assert_eq!(std::fs::read(&file).unwrap(), b"%PDF-1.4");

    // The crawl fetch is the only request for the file
    let file_gets = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|request| request.url.path() == "/files/My%20Notes.pdf")
        .count();
    assert_eq!(file_gets, 1);
}

#[tokio::test]
async fn test_login_retried_until_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/wp-login.php"))
        .respond_with(html("<html><body>Unknown username</body></html>"))
        .up_to_n_times(2)
        .with_priority(1)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/wp-login.php"))
        .respond_with(html(
            r#"<html><body><a href="/wp-login.php?action=logout">Log out</a></body></html>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/dashboard/"))
        .respond_with(html("<html><body>Welcome back</body></html>"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path().to_str().unwrap());
    let mut manifest = SqliteManifest::in_memory().unwrap();

    let coordinator = Coordinator::new(
        &config,
        credentials(&server),
        fetcher(&config),
        Arc::new(RecordingSink::default()),
        &mut manifest,
        "test-hash",
    )
    .unwrap();
    let report = coordinator.run().await.expect("Crawl failed");

    assert_eq!(report.responses, 1);
    assert_eq!(report.total_items(), 0);

    let run = manifest.get_latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Completed);
}

#[tokio::test]
async fn test_login_exhaustion_stops_run() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/wp-login.php"))
        .respond_with(ResponseTemplate::new(403))
        .expect(5)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/dashboard/"))
        .respond_with(html("<html><body>Welcome back</body></html>"))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path().to_str().unwrap());
    let sink = Arc::new(RecordingSink::default());
    let mut manifest = SqliteManifest::in_memory().unwrap();

    let coordinator = Coordinator::new(
        &config,
        credentials(&server),
        fetcher(&config),
        sink.clone(),
        &mut manifest,
        "test-hash",
    )
    .unwrap();
    let result = coordinator.run().await;

    match result {
        Err(MirrorError::Auth(AuthError::Exhausted { attempts, .. })) => assert_eq!(attempts, 5),
        other => panic!("expected exhausted login, got {:?}", other.map(|r| r.run_id)),
    }
    assert!(sink.jobs().is_empty());

    let run = manifest.get_latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Failed);
    assert!(run.finished_at.is_some());
}
