//! Members-Mirror main entry point
//!
//! This is the command-line interface for the Members-Mirror site mirror.

use anyhow::{Context, Result};
use clap::Parser;
use members_mirror::classify::LinkClassifier;
use members_mirror::config::{
    hash_config_content, load_config_with_hash, parse_config, Config, Credentials, ENV_PASSWORD,
    ENV_URL, ENV_USERNAME,
};
use members_mirror::crawler::run_crawl;
use members_mirror::output::{load_statistics, print_statistics, write_markdown_report};
use members_mirror::storage::{Manifest, SqliteManifest};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Members-Mirror: an offline mirror for login-gated sites
///
/// Members-Mirror logs into a members area, walks its links and stores every
/// page, linked file and embedded video under a directory tree that mirrors
/// the site.
#[derive(Parser, Debug)]
#[command(name = "members-mirror")]
#[command(version)]
#[command(about = "Offline mirror for login-gated sites", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Login form URL
    #[arg(long, env = ENV_URL)]
    url: Option<String>,

    /// Account name
    #[arg(long, env = ENV_USERNAME)]
    user: Option<String>,

    /// Account password
    #[arg(long, env = ENV_PASSWORD, hide_env_values = true)]
    pass: Option<String>,

    /// Output directory, overriding the configured one
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and credentials and show the rule set without crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics of the latest run from the manifest and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let (mut config, config_hash) = load(cli.config.as_deref())?;
    if let Some(output) = &cli.output {
        config.output.directory = output.display().to_string();
    }

    if cli.stats {
        return handle_stats(&config);
    }

    let credentials = credentials(&cli)?;

    if cli.dry_run {
        handle_dry_run(&config, &credentials);
        Ok(())
    } else {
        handle_crawl(&config, credentials, &config_hash).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("members_mirror=info,warn"),
            1 => EnvFilter::new("members_mirror=debug,info"),
            2 => EnvFilter::new("members_mirror=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file, or the defaults when no file is given
fn load(path: Option<&Path>) -> Result<(Config, String)> {
    match path {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok((config, hash))
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            let config = parse_config("").context("Default configuration is invalid")?;
            Ok((config, hash_config_content("")))
        }
    }
}

fn credentials(cli: &Cli) -> Result<Credentials> {
    let url = cli
        .url
        .as_deref()
        .with_context(|| format!("Login URL missing: pass --url or set {}", ENV_URL))?;
    let user = cli
        .user
        .as_deref()
        .with_context(|| format!("Username missing: pass --user or set {}", ENV_USERNAME))?;
    let pass = cli
        .pass
        .as_deref()
        .with_context(|| format!("Password missing: pass --pass or set {}", ENV_PASSWORD))?;

    Credentials::new(url, user, pass).context("Invalid credentials")
}

/// Handles the --dry-run mode: shows what a run would do
fn handle_dry_run(config: &Config, credentials: &Credentials) {
    println!("=== Members-Mirror Dry Run ===\n");

    println!("Site:");
    println!("  Login URL: {}", credentials.login_url());
    println!("  Account: {}", credentials.username());
    println!("  Home path: {}", config.crawler.home_path);

    println!("\nCrawler Configuration:");
    println!(
        "  Max concurrent requests: {}",
        config.crawler.max_concurrent_requests
    );
    println!("  Download delay: {}ms", config.crawler.download_delay);
    println!("  Request timeout: {}s", config.crawler.request_timeout);
    println!("  Fetch retries: {}", config.crawler.fetch_retries);

    println!("\nExtraction:");
    println!("  Page title: {:?}", config.extract.page_title);
    println!("  Page title suffix: {:?}", config.extract.page_title_suffix);
    println!(
        "  Video title suffix length: {}",
        config.extract.video_title_suffix_length
    );

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory);
    println!("  Database: {}", config.output.database_path);
    match &config.output.summary_path {
        Some(path) => println!("  Summary: {}", path),
        None => println!("  Summary: (none)"),
    }

    let classifier = LinkClassifier::from_config(&config.rules, &credentials.site_domain());
    println!("\nClassification Rules ({}):", classifier.rules().len());
    for rule in classifier.rules() {
        println!(
            "  - {} -> {} extractor{}",
            rule.name,
            rule.kind,
            if rule.follow { ", follows links" } else { "" }
        );
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would log in at {}", credentials.login_url());
}

/// Handles the --stats mode: shows statistics from the manifest
fn handle_stats(config: &Config) -> Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let manifest = SqliteManifest::new(Path::new(&config.output.database_path))
        .context("Failed to open manifest")?;

    match load_statistics(&manifest)? {
        Some(stats) => print_statistics(&stats),
        None => println!("No runs recorded yet"),
    }

    Ok(())
}

/// Handles the main mirror run
async fn handle_crawl(config: &Config, credentials: Credentials, config_hash: &str) -> Result<()> {
    tracing::info!(
        "Mirroring {} into {}",
        credentials.site_domain(),
        config.output.directory
    );

    let report = match run_crawl(config, credentials, config_hash).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Mirror run failed: {}", e);
            return Err(e.into());
        }
    };

    report.print_report();

    if let Some(summary_path) = &config.output.summary_path {
        let manifest = SqliteManifest::new(Path::new(&config.output.database_path))
            .context("Failed to reopen manifest")?;
        let run = manifest.get_run(report.run_id)?;
        write_markdown_report(&report, &run, Path::new(summary_path))
            .with_context(|| format!("Failed to write summary to {}", summary_path))?;
        tracing::info!("Summary written to {}", summary_path);
    }

    Ok(())
}
