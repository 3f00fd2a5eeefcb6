//! corpus-ingest main entry point
//!
//! This is the command-line interface for the crawl-and-catalog pipeline.

use anyhow::Context;
use clap::Parser;
use corpus_ingest::config::{load_config_with_hash, Config};
use corpus_ingest::crawler::run_pipeline;
use corpus_ingest::output::{load_statistics, print_pipeline_summary, print_statistics};
use corpus_ingest::{RawStore, Stage};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// corpus-ingest: crawl allow-listed sites into a raw, content-addressed corpus
///
/// Crawls HTML pages of the configured targets while respecting robots.txt
/// and a fixed politeness delay, harvests linked PDFs from an allow-map, and
/// rebuilds a deduplicated manifest of everything on disk.
#[derive(Parser, Debug)]
#[command(name = "corpus-ingest")]
#[command(version)]
#[command(about = "Allow-listed crawl-and-catalog ingestion", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Pipeline stage to run
    #[arg(long, value_enum, default_value_t = Stage::All)]
    stage: Stage,

    /// Validate config and show what would be crawled without fetching anything
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the raw store and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_run(config, cli.stage).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("corpus_ingest=info,warn"),
            1 => EnvFilter::new("corpus_ingest=debug,info"),
            2 => EnvFilter::new("corpus_ingest=trace,debug"),
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

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config) {
    println!("=== corpus-ingest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  User agent: {}", config.crawler.user_agent);
    println!("  Throttle: {}s", config.crawler.throttle_seconds);
    println!("  Request timeout: {}s", config.crawler.request_timeout);
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Max pages per target: {}", config.crawler.max_pages);
    println!("  Parallel targets: {}", config.crawler.parallel_targets);

    println!("\nStorage:");
    println!("  HTML: {}", config.storage.html_dir.display());
    println!("  PDF: {}", config.storage.pdf_dir.display());
    println!("  Metadata: {}", config.storage.meta_dir.display());

    println!("\nTargets ({}):", config.targets.len());
    for target in &config.targets {
        println!("  - {} (paths: {})", target.base, target.allow_paths.join(", "));
        for start in &target.start_urls {
            println!("    * {}", start);
        }
    }

    println!("\nPDF Allow-Map ({} hosts):", config.pdf.allow.len());
    for (host, prefixes) in &config.pdf.allow {
        println!("  - {}: {}", host, prefixes.join(", "));
    }
    if !config.pdf.seeds.is_empty() {
        println!("\nPDF Seeds ({}):", config.pdf.seeds.len());
        for seed in &config.pdf.seeds {
            println!("  * {}", seed);
        }
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would start crawling with {} start URLs",
        config.targets.iter().map(|t| t.start_urls.len()).sum::<usize>()
    );
}

/// Handles the --stats mode: shows statistics from the raw store
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let store = RawStore::new(&config.storage);
    println!("Metadata: {}\n", store.meta_dir().display());

    let stats = load_statistics(&store).context("failed to read raw store")?;
    print_statistics(&stats);
    Ok(())
}

/// Handles a pipeline run, wiring Ctrl-C to cancellation
async fn handle_run(config: Config, stage: Stage) -> anyhow::Result<()> {
    tracing::info!(
        "Running stage {:?} over {} targets",
        stage,
        config.targets.len()
    );

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current request");
            on_interrupt.cancel();
        }
    });

    let stats = run_pipeline(config, stage, cancel)
        .await
        .context("ingestion failed")?;
    print_pipeline_summary(&stats);

    if stats.cancelled {
        tracing::warn!("Run was interrupted; output written so far is intact");
    } else {
        tracing::info!("Ingestion completed successfully");
    }
    Ok(())
}
