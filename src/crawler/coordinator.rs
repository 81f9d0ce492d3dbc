//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the mirror run, including:
//! - Logging in before any content request
//! - Managing the frontier queue
//! - Dispatching fetches and downloads onto a task set
//! - Classifying links and routing responses to extractors
//! - Recording outcomes in the manifest and the run report

use crate::classify::LinkClassifier;
use crate::config::{Config, Credentials};
use crate::crawler::{extract_links, FetchError, Fetcher, HttpFetcher, Request, Response, Scheduler};
use crate::extract::{ClassifiedItem, ExtractorKind, Extractors};
use crate::output::CrawlReport;
use crate::session::{Authenticator, LoginOutcome};
use crate::state::DownloadState;
use crate::storage::{
    DownloadJob, FailureRecord, FailureStage, FileStore, ItemSink, Manifest, RunStatus,
    SqliteManifest, StorageResult, StoredFile,
};
use crate::MirrorError;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;

/// Result of one task on the task set
enum TaskOutcome {
    Fetched {
        request: Request,
        result: Result<Response, FetchError>,
    },
    Stored {
        item_id: i64,
        job: DownloadJob,
        result: StorageResult<StoredFile>,
    },
}

/// Main crawler coordinator structure
pub struct Coordinator<'m> {
    authenticator: Authenticator,
    classifier: LinkClassifier,
    extractors: Extractors,
    scheduler: Scheduler,
    fetcher: Arc<dyn Fetcher>,
    sink: Arc<dyn ItemSink>,
    manifest: &'m mut dyn Manifest,
    run_id: i64,
    report: CrawlReport,
}

impl<'m> Coordinator<'m> {
    /// Creates a new coordinator and opens a run in the manifest
    ///
    /// # Arguments
    ///
    /// * `config` - The mirror configuration
    /// * `credentials` - Login URL and account
    /// * `fetcher` - Fetch engine for crawl requests
    /// * `sink` - Destination for classified items
    /// * `manifest` - Run, item and failure records
    /// * `config_hash` - Hash recorded with the run
    pub fn new(
        config: &Config,
        credentials: Credentials,
        fetcher: Arc<dyn Fetcher>,
        sink: Arc<dyn ItemSink>,
        manifest: &'m mut dyn Manifest,
        config_hash: &str,
    ) -> Result<Self, MirrorError> {
        let classifier = LinkClassifier::from_config(&config.rules, &credentials.site_domain());
        let authenticator = Authenticator::new(
            credentials,
            config.login.clone(),
            &config.crawler.home_path,
        )?;
        let run_id = manifest.create_run(config_hash)?;

        Ok(Self {
            authenticator,
            classifier,
            extractors: Extractors::new(config.extract.clone()),
            scheduler: Scheduler::new(&config.crawler),
            fetcher,
            sink,
            manifest,
            run_id,
            report: CrawlReport::new(run_id),
        })
    }

    pub fn run_id(&self) -> i64 {
        self.run_id
    }

    /// Runs the mirror to completion
    ///
    /// The run is marked `completed` when the frontier drains and `failed`
    /// when login is exhausted or the manifest cannot be written.
    pub async fn run(mut self) -> Result<CrawlReport, MirrorError> {
        tracing::info!("Starting mirror run {}", self.run_id);
        let start_time = Instant::now();

        let result = self.crawl().await;
        let status = match &result {
            Ok(()) => RunStatus::Completed,
            Err(_) => RunStatus::Failed,
        };
        self.manifest.finish_run(self.run_id, status)?;
        result?;

        tracing::info!(
            "Mirror run {} completed: {} responses, {} items, {} downloaded in {:?}",
            self.run_id,
            self.report.responses,
            self.report.total_items(),
            self.report.downloaded,
            start_time.elapsed()
        );

        Ok(self.report)
    }

    async fn crawl(&mut self) -> Result<(), MirrorError> {
        let home = self.authenticate().await?;
        self.scheduler.enqueue(home);

        let mut tasks: JoinSet<TaskOutcome> = JoinSet::new();

        loop {
            self.dispatch(&mut tasks).await;

            match tasks.join_next().await {
                Some(Ok(outcome)) => self.handle_outcome(outcome, &mut tasks)?,
                Some(Err(e)) => tracing::error!("Task failed: {}", e),
                None => {
                    tracing::info!("Frontier is empty, crawl complete");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Runs the login exchange; no content request is made before it succeeds
    async fn authenticate(&mut self) -> Result<Request, MirrorError> {
        let mut request = self.authenticator.start()?;

        loop {
            let outcome = match self.fetcher.fetch(request.clone()).await {
                Ok(response) => self.authenticator.evaluate(&response)?,
                Err(e) => self.authenticator.fail_attempt(e.to_string())?,
            };

            match outcome {
                LoginOutcome::Authenticated(home) => return Ok(home),
                LoginOutcome::Retry { request: retry, .. } => request = retry,
            }
        }
    }

    /// Moves requests from the frontier onto the task set while permits are free
    async fn dispatch(&mut self, tasks: &mut JoinSet<TaskOutcome>) {
        while !self.scheduler.is_empty() {
            let Some(permit) = self.scheduler.try_acquire() else {
                break;
            };
            let Some(request) = self.scheduler.pop() else {
                break;
            };

            self.scheduler.wait_for_turn().await;
            tracing::debug!("Fetching {}", request.url);

            let fetcher = Arc::clone(&self.fetcher);
            tasks.spawn(async move {
                let _permit = permit;
                let result = fetcher.fetch(request.clone()).await;
                TaskOutcome::Fetched { request, result }
            });
        }
    }

    fn handle_outcome(
        &mut self,
        outcome: TaskOutcome,
        tasks: &mut JoinSet<TaskOutcome>,
    ) -> Result<(), MirrorError> {
        match outcome {
            TaskOutcome::Fetched { request, result } => match result {
                Ok(response) if response.status >= 400 => {
                    let reason = format!("HTTP {}", response.status);
                    self.record_fetch_failure(&request, reason)
                }
                Ok(response) => self.process_response(response, tasks),
                Err(e) => self.record_fetch_failure(&request, e.to_string()),
            },
            TaskOutcome::Stored {
                item_id,
                job,
                result,
            } => self.record_stored(item_id, job, result),
        }
    }

    fn record_fetch_failure(&mut self, request: &Request, reason: String) -> Result<(), MirrorError> {
        tracing::warn!("Fetch failed for {}: {}", request.url, reason);

        self.manifest.record_failure(
            self.run_id,
            &FailureRecord {
                url: request.url.to_string(),
                stage: FailureStage::Fetch,
                extractor: request.extractor,
                reason: reason.clone(),
            },
        )?;
        self.report
            .record_fetch_failure(request.url.as_str(), request.extractor, reason);
        Ok(())
    }

    /// Extracts the response's item, then follows its links
    fn process_response(
        &mut self,
        response: Response,
        tasks: &mut JoinSet<TaskOutcome>,
    ) -> Result<(), MirrorError> {
        self.report.record_response();

        if let Some(kind) = response.request.extractor {
            match self.extractors.extract(kind, &response) {
                Ok(item) => {
                    // Page and file bytes are the response itself; videos live elsewhere
                    let body = match item {
                        ClassifiedItem::Page(_) | ClassifiedItem::File(_) => {
                            Some(response.body.clone())
                        }
                        ClassifiedItem::Video { .. } => None,
                    };
                    self.schedule_store(item, body, tasks)?;
                }
                Err(e) => self.record_extraction_failure(&response, kind, e.to_string())?,
            }
        }

        if response.request.follow && response.is_html() {
            self.follow_links(&response);
        }

        if self.report.responses % 25 == 0 {
            tracing::info!(
                "Progress: {} responses, {} queued, {} items",
                self.report.responses,
                self.scheduler.frontier_size(),
                self.report.total_items()
            );
        }

        Ok(())
    }

    fn record_extraction_failure(
        &mut self,
        response: &Response,
        kind: ExtractorKind,
        reason: String,
    ) -> Result<(), MirrorError> {
        tracing::warn!("Skipping {} ({}): {}", response.url, kind, reason);

        self.manifest.record_failure(
            self.run_id,
            &FailureRecord {
                url: response.url.to_string(),
                stage: FailureStage::Extraction,
                extractor: Some(kind),
                reason: reason.clone(),
            },
        )?;
        self.report
            .record_extraction_failure(response.url.as_str(), kind, reason);
        Ok(())
    }

    fn follow_links(&mut self, response: &Response) {
        let links = extract_links(&response.text(), &response.url, response.referrer());

        let mut queued = 0;
        for link in &links {
            for route in self.classifier.classify(link) {
                if self.scheduler.enqueue(route.request) {
                    queued += 1;
                }
            }
        }

        tracing::debug!(
            "{}: {} links, {} new requests",
            response.url,
            links.len(),
            queued
        );
    }

    /// Records an item and spawns its storage task
    ///
    /// Storage tasks share the fetch concurrency limit.
    fn schedule_store(
        &mut self,
        item: ClassifiedItem,
        body: Option<Vec<u8>>,
        tasks: &mut JoinSet<TaskOutcome>,
    ) -> Result<(), MirrorError> {
        let mut job = DownloadJob::new(item);
        if let Some(body) = body {
            job = job.with_body(body);
        }

        if !self.report.record_item(&job) {
            tracing::warn!("Storage path collision: {} ({})", job.path, job.url);
        }
        let item_id = self.manifest.record_item(self.run_id, &job)?;
        tracing::info!("{} '{}' -> {}", job.item.kind(), job.item.title(), job.path);

        let sink = Arc::clone(&self.sink);
        let semaphore = self.scheduler.semaphore();
        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok();
            let result = sink.store(&job).await;
            TaskOutcome::Stored {
                item_id,
                job,
                result,
            }
        });

        Ok(())
    }

    fn record_stored(
        &mut self,
        item_id: i64,
        job: DownloadJob,
        result: StorageResult<StoredFile>,
    ) -> Result<(), MirrorError> {
        match result {
            Ok(stored) => {
                tracing::debug!("Saved {} ({} bytes)", stored.path.display(), stored.bytes);
                self.manifest
                    .update_item_state(item_id, DownloadState::Downloaded, None)?;
                self.report.record_download(stored.bytes);
            }
            Err(e) => {
                let reason = e.to_string();
                tracing::warn!("Download failed for {}: {}", job.url, reason);
                self.manifest
                    .update_item_state(item_id, DownloadState::Failed, Some(&reason))?;
                self.report
                    .record_download_failure(&job.url, job.item.kind(), reason);
            }
        }
        Ok(())
    }
}

/// Runs a complete mirror with the HTTP fetcher, file store and SQLite manifest
///
/// # Arguments
///
/// * `config` - The mirror configuration
/// * `credentials` - Login URL and account
/// * `config_hash` - Hash recorded with the run
///
/// # Returns
///
/// * `Ok(CrawlReport)` - The run finished; individual URLs may still have failed
/// * `Err(MirrorError)` - Login was exhausted or the manifest failed
///
/// # Example
///
/// ```no_run
/// use members_mirror::config::{Config, Credentials};
/// use members_mirror::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config::default();
/// let credentials = Credentials::new("https://example.com/wp-login.php", "alice", "secret")?;
/// let report = run_crawl(&config, credentials, "hash").await?;
/// report.print_report();
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: &Config,
    credentials: Credentials,
    config_hash: &str,
) -> Result<CrawlReport, MirrorError> {
    let fetcher = HttpFetcher::new(&config.crawler)?;
    let sink = FileStore::new(&config.output.directory, fetcher.client().clone());
    let mut manifest = SqliteManifest::new(Path::new(&config.output.database_path))?;

    let coordinator = Coordinator::new(
        config,
        credentials,
        Arc::new(fetcher),
        Arc::new(sink),
        &mut manifest,
        config_hash,
    )?;

    coordinator.run().await
}
