//! Storage traits and error types
//!
//! This module defines the trait interfaces for the manifest and the item
//! sink, and the associated error types.

use crate::extract::ExtractorKind;
use crate::state::DownloadState;
use crate::storage::{
    DownloadJob, FailureRecord, ItemRecord, RunRecord, RunStatus, StoredFile,
};
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Item not found: {0}")]
    ItemNotFound(i64),

    #[error("Path escapes the output directory: {0}")]
    UnsafePath(String),

    #[error("Download of {url} failed: {reason}")]
    Download { url: String, reason: String },

    #[error("HTTP {status} downloading {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for manifest backends
///
/// The manifest is owned by the coordinator task, so implementations need no
/// internal synchronization.
pub trait Manifest {
    // ===== Run Management =====

    /// Creates a new run in the `running` status
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration the run uses
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Sets the final status of a run and stamps its finish time
    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()>;

    // ===== Item Management =====

    /// Records an item handed to the storage stage, in the `pending` state
    ///
    /// # Returns
    ///
    /// The item ID
    fn record_item(&mut self, run_id: i64, job: &DownloadJob) -> StorageResult<i64>;

    /// Updates the download state of an item
    fn update_item_state(
        &mut self,
        item_id: i64,
        state: DownloadState,
        error_message: Option<&str>,
    ) -> StorageResult<()>;

    /// Gets all items of a run, in insertion order
    fn get_items(&self, run_id: i64) -> StorageResult<Vec<ItemRecord>>;

    /// Counts a run's items in a download state
    fn count_items_by_state(&self, run_id: i64, state: DownloadState) -> StorageResult<u64>;

    /// Counts a run's items of one kind
    fn count_items_by_kind(&self, run_id: i64, kind: ExtractorKind) -> StorageResult<u64>;

    // ===== Failure Tracking =====

    /// Records a URL that produced no item
    fn record_failure(&mut self, run_id: i64, failure: &FailureRecord) -> StorageResult<()>;

    /// Gets all failures of a run, in insertion order
    fn get_failures(&self, run_id: i64) -> StorageResult<Vec<FailureRecord>>;
}

/// Destination for classified items
///
/// Receives each item with its storage path and writes the item's bytes.
#[async_trait]
pub trait ItemSink: Send + Sync {
    async fn store(&self, job: &DownloadJob) -> StorageResult<StoredFile>;
}
