//! Storage module for the mirror and its manifest
//!
//! This module handles:
//! - Writing downloaded items under the output directory
//! - SQLite manifest of runs, items and failures
//! - Download state tracking per item

mod files;
mod schema;
mod sqlite;
mod traits;

pub use files::FileStore;
pub use sqlite::SqliteManifest;
pub use traits::{ItemSink, Manifest, StorageError, StorageResult};

use crate::extract::{ClassifiedItem, ExtractorKind};
use crate::naming::storage_path;
use crate::state::DownloadState;
use std::fmt;
use std::path::PathBuf;

/// One item handed to the storage stage
#[derive(Debug, Clone)]
pub struct DownloadJob {
    pub item: ClassifiedItem,

    /// Relative storage path, from `naming::storage_path`
    pub path: String,

    /// URL the bytes are fetched from
    pub url: String,

    /// Body already fetched during the crawl; written as-is instead of downloading
    pub body: Option<Vec<u8>>,
}

impl DownloadJob {
    pub fn new(item: ClassifiedItem) -> Self {
        let path = storage_path(&item);
        let url = item.download_url().to_string();
        Self {
            item,
            path,
            url,
            body: None,
        }
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }
}

/// Where a job's bytes ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub path: PathBuf,
    pub bytes: u64,
}

/// Represents a mirror run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
}

/// Status of a mirror run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}

/// Represents an item in the manifest
#[derive(Debug, Clone)]
pub struct ItemRecord {
    pub id: i64,
    pub run_id: i64,
    pub kind: ExtractorKind,
    pub title: String,
    pub extension: String,
    pub origin_url: String,
    pub download_url: String,
    pub iframe_url: Option<String>,
    pub quality: Option<u32>,
    pub storage_path: String,
    pub state: DownloadState,
    pub error_message: Option<String>,
}

/// Stage at which a URL was given up on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureStage {
    /// Transport error or HTTP error status
    Fetch,
    /// The response could not be reduced to an item
    Extraction,
}

impl FailureStage {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Extraction => "extraction",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "fetch" => Some(Self::Fetch),
            "extraction" => Some(Self::Extraction),
            _ => None,
        }
    }
}

/// A URL that produced no item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    pub url: String,
    pub stage: FailureStage,
    /// Extractor the URL was routed to, if any
    pub extractor: Option<ExtractorKind>,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ItemMeta;

    #[test]
    fn test_run_status_roundtrip() {
        for status in &[RunStatus::Running, RunStatus::Completed, RunStatus::Failed] {
            let db_str = status.to_db_string();
            let parsed = RunStatus::from_db_string(db_str);
            assert_eq!(Some(*status), parsed);
        }
    }

    #[test]
    fn test_run_status_invalid() {
        assert_eq!(RunStatus::from_db_string("interrupted"), None);
    }

    #[test]
    fn test_failure_stage_roundtrip() {
        for stage in [FailureStage::Fetch, FailureStage::Extraction] {
            assert_eq!(FailureStage::from_db_string(stage.to_db_string()), Some(stage));
        }
    }

    #[test]
    fn test_download_job_uses_storage_path() {
        let item = ClassifiedItem::File(
            ItemMeta::new(
                "Notes",
                "pdf",
                "https://example.com/lessons/one/",
                "https://example.com/files/Notes.pdf",
            )
            .unwrap(),
        );
        let job = DownloadJob::new(item);

        assert_eq!(job.path, "/lessons/one/Notes.pdf");
        assert_eq!(job.url, "https://example.com/files/Notes.pdf");
        assert!(job.body.is_none());
    }
}
