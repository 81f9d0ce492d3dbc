//! Statistics from the manifest
//!
//! Backs `--stats`: summarizes the most recent run without touching the
//! network.

use crate::extract::ExtractorKind;
use crate::output::{duration_seconds, OutputResult};
use crate::state::DownloadState;
use crate::storage::{FailureRecord, FailureStage, Manifest, RunRecord};

/// Statistics of one run
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    pub run: RunRecord,

    /// Item count per kind
    pub items_by_kind: Vec<(ExtractorKind, u64)>,

    /// Item count per download state
    pub items_by_state: Vec<(DownloadState, u64)>,

    /// URLs that produced no item
    pub failures: Vec<FailureRecord>,
}

impl CrawlStatistics {
    pub fn total_items(&self) -> u64 {
        self.items_by_kind.iter().map(|(_, count)| count).sum()
    }

    pub fn items_in_state(&self, state: DownloadState) -> u64 {
        self.items_by_state
            .iter()
            .find(|(s, _)| *s == state)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    pub fn failures_at(&self, stage: FailureStage) -> usize {
        self.failures.iter().filter(|f| f.stage == stage).count()
    }
}

/// Loads statistics for the most recent run
///
/// # Returns
///
/// * `Ok(Some(CrawlStatistics))` - Statistics of the latest run
/// * `Ok(None)` - The manifest has no runs
/// * `Err(OutputError)` - Failed to query the manifest
pub fn load_statistics(manifest: &dyn Manifest) -> OutputResult<Option<CrawlStatistics>> {
    let Some(run) = manifest.get_latest_run()? else {
        return Ok(None);
    };

    let mut items_by_kind = Vec::new();
    for kind in ExtractorKind::all() {
        items_by_kind.push((kind, manifest.count_items_by_kind(run.id, kind)?));
    }

    let mut items_by_state = Vec::new();
    for state in DownloadState::all_states() {
        items_by_state.push((state, manifest.count_items_by_state(run.id, state)?));
    }

    let failures = manifest.get_failures(run.id)?;

    Ok(Some(CrawlStatistics {
        run,
        items_by_kind,
        items_by_state,
        failures,
    }))
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Mirror Statistics ===\n");

    println!("Run {}:", stats.run.id);
    println!("  Status: {}", stats.run.status);
    println!("  Started: {}", stats.run.started_at);
    if let Some(finished) = &stats.run.finished_at {
        println!("  Finished: {}", finished);
    }
    if let Some(duration) =
        duration_seconds(&stats.run.started_at, stats.run.finished_at.as_deref())
    {
        println!("  Duration: {} seconds", duration);
    }
    println!("  Config hash: {}", stats.run.config_hash);
    println!();

    println!("Items by Kind:");
    for (kind, count) in &stats.items_by_kind {
        println!("  {}: {}", kind, count);
    }
    println!();

    let total = stats.total_items();
    println!("Items by Download State:");
    for (state, count) in &stats.items_by_state {
        let percentage = if total > 0 {
            (*count as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", state, count, percentage);
    }
    println!();

    if !stats.failures.is_empty() {
        println!(
            "Failures: {} fetch, {} extraction",
            stats.failures_at(FailureStage::Fetch),
            stats.failures_at(FailureStage::Extraction)
        );
        for failure in &stats.failures {
            println!(
                "  - [{}] {}: {}",
                failure.stage.to_db_string(),
                failure.url,
                failure.reason
            );
        }
    }
}
