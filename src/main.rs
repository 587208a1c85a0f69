//! recon-crawler main entry point
//!
//! This is the command-line interface for the reconnaissance crawler.

use anyhow::Context;
use clap::Parser;
use recon_crawler::config::{self, Config};
use recon_crawler::crawler::crawl;
use recon_crawler::output::save_results;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// recon-crawler: a polite reconnaissance crawler
///
/// Crawls a site breadth first from a seed URL while respecting robots.txt,
/// searches every page for keywords, e-mail addresses and phone numbers,
/// and saves the pages that matched as JSON and CSV.
#[derive(Parser, Debug)]
#[command(name = "recon-crawler")]
#[command(version = "1.0.0")]
#[command(about = "A polite reconnaissance crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Seed URL (overrides target.seed-url)
    #[arg(short, long)]
    url: Option<String>,

    /// Keywords to search for (overrides target.keywords)
    #[arg(short, long, num_args = 1..)]
    keywords: Vec<String>,

    /// Maximum link depth from the seed
    #[arg(short, long)]
    depth: Option<u32>,

    /// Maximum number of URLs to visit
    #[arg(long)]
    max_urls: Option<usize>,

    /// Delay between requests in milliseconds
    #[arg(long)]
    delay: Option<u64>,

    /// Do not fetch or obey robots.txt
    #[arg(long)]
    ignore_robots: bool,

    /// Directory for result files
    #[arg(short, long, value_name = "DIR")]
    output: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (mut config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = config::parse_config_file_with_hash(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, hash)
        }
        None => (Config::default(), String::from("none")),
    };

    apply_overrides(&mut config, &cli);
    config::validate(&config).context("Invalid configuration")?;

    if cli.dry_run {
        print_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config, &config_hash).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("recon_crawler=info,warn"),
            1 => EnvFilter::new("recon_crawler=debug,info"),
            2 => EnvFilter::new("recon_crawler=trace,debug"),
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

/// Layers command-line values over the file configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(url) = &cli.url {
        config.target.seed_url = url.clone();
    }
    if !cli.keywords.is_empty() {
        config.target.keywords = cli.keywords.clone();
    }
    if let Some(depth) = cli.depth {
        config.crawler.max_depth = depth;
    }
    if let Some(max_urls) = cli.max_urls {
        config.crawler.max_urls = max_urls;
    }
    if let Some(delay) = cli.delay {
        config.crawler.delay_ms = delay;
    }
    if cli.ignore_robots {
        config.crawler.respect_robots = false;
    }
    if let Some(output) = &cli.output {
        config.output.directory = output.clone();
    }
}

/// Handles the --dry-run mode: shows the effective settings
fn print_dry_run(config: &Config) {
    println!("=== recon-crawler Dry Run ===\n");

    println!("Target:");
    println!("  Seed URL: {}", config.target.seed_url);
    println!("  Keywords: {}", config.target.keywords.join(", "));

    println!("\nCrawler Configuration:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Max URLs: {}", config.crawler.max_urls);
    println!("  Delay: {}ms", config.crawler.delay_ms);
    println!("  Respect robots.txt: {}", config.crawler.respect_robots);
    println!("  Robots fallback: {:?}", config.crawler.robots_fallback);

    println!("\nFetcher:");
    println!("  Max attempts: {}", config.fetcher.max_attempts);
    println!("  Request timeout: {}ms", config.fetcher.request_timeout_ms);
    println!(
        "  Backoff: {}-{}ms",
        config.fetcher.backoff_min_ms, config.fetcher.backoff_max_ms
    );
    println!(
        "  User agents: {} (rotate: {})",
        config.identity.user_agents.len(),
        config.identity.rotate
    );

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory);
    println!("  JSON: {}, CSV: {}", config.output.json, config.output.csv);
    if let Some(path) = &config.output.sqlite_path {
        println!("  Database: {}", path);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, config_hash: &str) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();

    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping crawl");
            ctrl_c.cancel();
        }
    });

    let output = config.output.clone();
    let report = crawl(config, cancel).await.context("Crawl failed")?;

    let paths = save_results(&report, &output, config_hash).context("Failed to save results")?;
    for path in &paths {
        println!("{}", path.display());
    }

    Ok(())
}
