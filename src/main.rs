//! Access-Mapper main entry point
//!
//! This is the command-line interface for the Access-Mapper crawler.

use access_mapper::config::{load_config_with_hash, validate, Config};
use access_mapper::output::{print_statistics, ReportFormat};
use access_mapper::run_crawl;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Access-Mapper: maps what an anonymous visitor can reach on a site
///
/// Access-Mapper crawls every page of one origin, starting from a seed URL,
/// and labels each page as open, login-gated, inaccessible or unknown.
#[derive(Parser, Debug)]
#[command(name = "access-mapper")]
#[command(version)]
#[command(about = "Single-origin access-level crawler", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl a site and write the access report
    Crawl(CrawlArgs),
}

#[derive(Args, Debug)]
struct CrawlArgs {
    /// Seed URL; its host is the only host that will be crawled
    #[arg(value_name = "SEED")]
    seed: Option<String>,

    /// Number of concurrent workers
    #[arg(short, long)]
    concurrency: Option<u32>,

    /// Maximum number of pages to visit
    #[arg(short, long)]
    max_pages: Option<u32>,

    /// Report file path
    #[arg(short, long, value_name = "PATH")]
    output: Option<String>,

    /// Report format (csv, json, markdown); inferred from the output path if omitted
    #[arg(short, long)]
    format: Option<ReportFormat>,

    /// Path to a TOML configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// User-Agent header to send
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Validate the configuration and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match cli.command {
        Command::Crawl(args) => {
            let dry_run = args.dry_run;
            let config = resolve_config(args)?;

            if let Err(e) = validate(&config) {
                tracing::error!("Invalid configuration: {}", e);
                return Err(e.into());
            }

            if dry_run {
                handle_dry_run(&config);
            } else {
                handle_crawl(config).await?;
            }
        }
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("access_mapper=info,warn"),
            1 => EnvFilter::new("access_mapper=debug,info"),
            2 => EnvFilter::new("access_mapper=trace,debug"),
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

/// Loads the optional config file and layers command-line flags on top
fn resolve_config(args: CrawlArgs) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((cfg, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    cfg
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => Config::default(),
    };

    if let Some(seed) = args.seed {
        config.crawl.seed = seed;
    }
    if let Some(concurrency) = args.concurrency {
        config.crawl.concurrency = concurrency;
    }
    if let Some(max_pages) = args.max_pages {
        config.crawl.max_pages = max_pages;
    }
    if let Some(output) = args.output {
        config.output.report_path = output;
    }
    if let Some(format) = args.format {
        config.output.format = Some(format);
    }
    if let Some(timeout) = args.timeout {
        config.fetch.timeout_secs = timeout;
    }
    if let Some(user_agent) = args.user_agent {
        config.fetch.user_agent = user_agent;
    }

    Ok(config)
}

/// Handles the --dry-run mode: shows the resolved configuration
fn handle_dry_run(config: &Config) {
    println!("=== Access-Mapper Dry Run ===\n");

    println!("Crawl:");
    println!("  Seed: {}", config.crawl.seed);
    println!("  Concurrency: {}", config.crawl.concurrency);
    println!("  Max pages: {}", config.crawl.max_pages);

    println!("\nFetch:");
    println!("  User agent: {}", config.fetch.user_agent);
    println!("  Timeout: {}s", config.fetch.timeout_secs);
    println!("  Connect timeout: {}s", config.fetch.connect_timeout_secs);

    println!("\nOutput:");
    println!("  Report: {}", config.output.report_path);
    println!("  Format: {}", config.output.resolved_format());

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let report_path = config.output.report_path.clone();

    match run_crawl(config).await {
        Ok(outcome) => {
            print_statistics(&outcome.statistics);
            if outcome.report_written {
                println!("✓ Report written to: {}", report_path);
            } else {
                println!("✗ Report could not be written to: {}", report_path);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
