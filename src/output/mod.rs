//! Output module for run reports and statistics
//!
//! This module handles:
//! - Tallying what a run fetched, extracted, stored and skipped
//! - Printing the end-of-run report
//! - Writing the report as a markdown summary
//! - Reading per-run statistics back from the manifest

mod markdown;
mod report;
pub mod stats;

pub use markdown::{format_markdown_report, write_markdown_report};
pub use report::{CrawlReport, PathCollision, ReportEntry};
pub use stats::{load_statistics, print_statistics, CrawlStatistics};

use crate::storage::StorageError;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Seconds between two RFC 3339 timestamps, if both parse
pub(crate) fn duration_seconds(started_at: &str, finished_at: Option<&str>) -> Option<i64> {
    let started = chrono::DateTime::parse_from_rfc3339(started_at).ok()?;
    let finished = chrono::DateTime::parse_from_rfc3339(finished_at?).ok()?;
    Some((finished - started).num_seconds())
}
