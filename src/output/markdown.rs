//! Markdown summary generation
//!
//! This module writes a human-readable markdown version of the end-of-run
//! report, including per-kind counts, failures and path collisions.

use crate::extract::ExtractorKind;
use crate::output::{duration_seconds, CrawlReport, OutputResult, ReportEntry};
use crate::storage::RunRecord;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the run report as markdown
///
/// # Arguments
///
/// * `report` - The tally of the run
/// * `run` - The run's manifest record
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn write_markdown_report(
    report: &CrawlReport,
    run: &RunRecord,
    output_path: &Path,
) -> OutputResult<()> {
    let markdown = format_markdown_report(report, run);

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats the run report as markdown
pub fn format_markdown_report(report: &CrawlReport, run: &RunRecord) -> String {
    let mut md = String::new();

    md.push_str("# Members-Mirror Run Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Run ID**: {}\n", run.id));
    md.push_str(&format!("- **Started**: {}\n", run.started_at));
    if let Some(finished) = &run.finished_at {
        md.push_str(&format!("- **Finished**: {}\n", finished));
    }
    if let Some(duration) = duration_seconds(&run.started_at, run.finished_at.as_deref()) {
        md.push_str(&format!(
            "- **Duration**: {} seconds ({:.2} minutes)\n",
            duration,
            duration as f64 / 60.0
        ));
    }
    md.push_str(&format!("- **Status**: {}\n", run.status));
    md.push_str(&format!("- **Config Hash**: {}\n\n", run.config_hash));

    // Item counts
    md.push_str("## Items\n\n");
    md.push_str("| Kind | Count |\n");
    md.push_str("|------|-------|\n");
    for kind in ExtractorKind::all() {
        md.push_str(&format!("| {} | {} |\n", kind, report.items(kind)));
    }
    md.push('\n');
    md.push_str(&format!("- **Responses Processed**: {}\n", report.responses));
    md.push_str(&format!(
        "- **Downloaded**: {} of {}\n",
        report.downloaded,
        report.total_items()
    ));
    md.push_str(&format!("- **Bytes Written**: {}\n\n", report.bytes_written));

    push_entries(&mut md, "Failed Fetches", &report.fetch_failures);
    push_entries(&mut md, "Skipped Extractions", &report.extraction_failures);
    push_entries(&mut md, "Failed Downloads", &report.download_failures);

    if !report.collisions.is_empty() {
        md.push_str("## Path Collisions\n\n");
        md.push_str("| Path | First URL | Overwritten By |\n");
        md.push_str("|------|-----------|----------------|\n");
        for collision in &report.collisions {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                collision.path, collision.first_url, collision.url
            ));
        }
        md.push('\n');
    }

    md
}

fn push_entries(md: &mut String, heading: &str, entries: &[ReportEntry]) {
    if entries.is_empty() {
        return;
    }

    md.push_str(&format!("## {}\n\n", heading));
    md.push_str("| URL | Extractor | Reason |\n");
    md.push_str("|-----|-----------|--------|\n");
    for entry in entries {
        let extractor = entry.extractor.map(|k| k.as_str()).unwrap_or("-");
        md.push_str(&format!(
            "| {} | {} | {} |\n",
            entry.url,
            extractor,
            entry.reason.replace('|', "\\|")
        ));
    }
    md.push('\n');
}
