//! Reelgraph main entry point
//!
//! This is the command-line interface for the Reelgraph member graph crawler.

use anyhow::Context;
use clap::Parser;
use reelgraph::config::{load_config_with_hash, validate, Config};
use reelgraph::crawler::{crawl, SiteUrls};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Reelgraph: a polite social-graph crawler
///
/// Reelgraph walks a film community's member graph breadth-first, recording
/// profile counts, follow edges and reviews into a SQLite database while
/// keeping its request rate under a fixed politeness budget.
#[derive(Parser, Debug)]
#[command(name = "reelgraph")]
#[command(version)]
#[command(about = "A polite social-graph crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics for the latest run in the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("loading configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, hash)
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            let config = Config::default();
            validate(&config).context("validating default configuration")?;
            (config, "default".to_string())
        }
    };

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(config, &config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("reelgraph=info,warn"),
            1 => EnvFilter::new("reelgraph=debug,info"),
            2 => EnvFilter::new("reelgraph=trace,debug"),
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

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let urls = SiteUrls::new(&config.crawler.base_url)
        .with_context(|| format!("parsing base URL {}", config.crawler.base_url))?;

    println!("=== Reelgraph Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Base URL: {}", urls.base());
    println!("  Target node count: {}", config.crawler.target_node_count);
    println!(
        "  Max edges per direction: {} ({} pages of {})",
        config.crawler.max_edges_per_direction,
        config.crawler.network_pages_per_direction(),
        config.crawler.network_page_size
    );
    println!("  Seed pages: {}", config.crawler.seed_pages);
    println!(
        "  Review pages per node: {}",
        config.crawler.review_pages_per_node
    );

    println!("\nFetcher:");
    println!("  Timeout: {}s", config.fetcher.timeout_secs);
    println!("  Max attempts: {}", config.fetcher.max_attempts);
    println!("  Backoff unit: {}ms", config.fetcher.backoff_unit_ms);

    println!("\nPoliteness:");
    println!(
        "  Delay: {}-{}ms",
        config.politeness.min_delay_ms, config.politeness.max_delay_ms
    );

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would start seeding from {}",
        urls.popular_members(1)
            .context("building seed URL")?
    );

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    use reelgraph::output::{load_statistics, print_statistics};
    use reelgraph::storage::SqliteStorage;

    println!("Database: {}\n", config.output.database_path);

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))
        .with_context(|| format!("opening database {}", config.output.database_path))?;

    match load_statistics(&storage).context("reading run statistics")? {
        Some(stats) => print_statistics(&stats),
        None => println!("No crawl runs recorded yet"),
    }

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, config_hash: &str) -> anyhow::Result<()> {
    tracing::info!(
        "Crawling {} (budget {} members, {} edges per direction)",
        config.crawler.base_url,
        config.crawler.target_node_count,
        config.crawler.max_edges_per_direction
    );

    match crawl(config, config_hash).await {
        Ok(summary) => {
            tracing::info!(
                "Crawl completed successfully: {} members accepted",
                summary.nodes_accepted
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e).context("crawl aborted")
        }
    }
}
