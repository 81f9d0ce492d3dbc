//! End-of-run report
//!
//! The coordinator feeds every outcome into a `CrawlReport` as it happens;
//! nothing here touches the network or the manifest.

use crate::extract::ExtractorKind;
use crate::storage::DownloadJob;
use std::collections::{BTreeMap, HashMap};

/// One URL that did not make it into the mirror
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    pub url: String,
    pub extractor: Option<ExtractorKind>,
    pub reason: String,
}

/// Two items that were given the same storage path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathCollision {
    pub path: String,
    /// Download URL of the item that claimed the path first
    pub first_url: String,
    /// Download URL of the item that overwrote it
    pub url: String,
}

/// Tally of one run
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    pub run_id: i64,

    /// Responses received with a status below 400
    pub responses: u64,

    /// Items handed to the storage stage, per kind
    pub items_by_kind: BTreeMap<ExtractorKind, u64>,

    /// Items written to disk
    pub downloaded: u64,

    /// Bytes written to disk
    pub bytes_written: u64,

    pub fetch_failures: Vec<ReportEntry>,
    pub extraction_failures: Vec<ReportEntry>,
    pub download_failures: Vec<ReportEntry>,
    pub collisions: Vec<PathCollision>,

    /// Storage path -> download URL of the first item stored there
    paths: HashMap<String, String>,
}

impl CrawlReport {
    pub fn new(run_id: i64) -> Self {
        Self {
            run_id,
            ..Self::default()
        }
    }

    pub fn record_response(&mut self) {
        self.responses += 1;
    }

    /// Counts an item handed to the storage stage
    ///
    /// # Returns
    ///
    /// `false` if another item already claimed the same storage path
    pub fn record_item(&mut self, job: &DownloadJob) -> bool {
        *self.items_by_kind.entry(job.item.kind()).or_insert(0) += 1;

        match self.paths.get(&job.path) {
            Some(first_url) => {
                self.collisions.push(PathCollision {
                    path: job.path.clone(),
                    first_url: first_url.clone(),
                    url: job.url.clone(),
                });
                false
            }
            None => {
                self.paths.insert(job.path.clone(), job.url.clone());
                true
            }
        }
    }

    pub fn record_download(&mut self, bytes: u64) {
        self.downloaded += 1;
        self.bytes_written += bytes;
    }

    pub fn record_fetch_failure(
        &mut self,
        url: &str,
        extractor: Option<ExtractorKind>,
        reason: impl Into<String>,
    ) {
        self.fetch_failures.push(entry(url, extractor, reason));
    }

    pub fn record_extraction_failure(
        &mut self,
        url: &str,
        extractor: ExtractorKind,
        reason: impl Into<String>,
    ) {
        self.extraction_failures
            .push(entry(url, Some(extractor), reason));
    }

    pub fn record_download_failure(
        &mut self,
        url: &str,
        extractor: ExtractorKind,
        reason: impl Into<String>,
    ) {
        self.download_failures.push(entry(url, Some(extractor), reason));
    }

    pub fn items(&self, kind: ExtractorKind) -> u64 {
        self.items_by_kind.get(&kind).copied().unwrap_or(0)
    }

    pub fn total_items(&self) -> u64 {
        self.items_by_kind.values().sum()
    }

    pub fn failure_count(&self) -> usize {
        self.fetch_failures.len() + self.extraction_failures.len() + self.download_failures.len()
    }

    /// Prints the report to stdout
    pub fn print_report(&self) {
        println!("=== Mirror Report (run {}) ===\n", self.run_id);

        println!("Overview:");
        println!("  Responses processed: {}", self.responses);
        for kind in ExtractorKind::all() {
            println!("  {} items: {}", kind, self.items(kind));
        }
        println!(
            "  Downloaded: {} of {} ({} bytes)",
            self.downloaded,
            self.total_items(),
            self.bytes_written
        );
        println!();

        print_entries("Failed fetches", &self.fetch_failures);
        print_entries("Skipped extractions", &self.extraction_failures);
        print_entries("Failed downloads", &self.download_failures);

        if !self.collisions.is_empty() {
            println!("Path collisions ({}):", self.collisions.len());
            for collision in &self.collisions {
                println!(
                    "  - {}: {} overwrote {}",
                    collision.path, collision.url, collision.first_url
                );
            }
            println!();
        }

        if self.failure_count() == 0 {
            println!("No failures.");
        } else {
            println!("{} URL(s) not mirrored.", self.failure_count());
        }
    }
}

fn entry(url: &str, extractor: Option<ExtractorKind>, reason: impl Into<String>) -> ReportEntry {
    ReportEntry {
        url: url.to_string(),
        extractor,
        reason: reason.into(),
    }
}

fn print_entries(heading: &str, entries: &[ReportEntry]) {
    if entries.is_empty() {
        return;
    }

    println!("{} ({}):", heading, entries.len());
    for entry in entries {
        match entry.extractor {
            Some(kind) => println!("  - [{}] {}: {}", kind, entry.url, entry.reason),
            None => println!("  - {}: {}", entry.url, entry.reason),
        }
    }
    println!();
}
