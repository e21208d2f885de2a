//! anime-harvest main entry point
//!
//! Command-line interface for the review and detail scrapers.

use anime_harvest::config::{load_config, validate, Config, DriverEngine};
use anime_harvest::driver::{DriverFactory, HttpDriverFactory};
use anime_harvest::pipeline::{
    scrape_details, scrape_reviews, DetailRequest, DetailSource, ReviewRequest, ReviewSource,
    Summary,
};
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// anime-harvest: scrapes anime reviews and details from MyAnimeList
///
/// Targets are split across a pool of workers, each driving its own browser
/// session. Results are exported as a single JSON array.
#[derive(Parser, Debug)]
#[command(name = "anime-harvest")]
#[command(version)]
#[command(about = "Scrapes anime reviews and details from MyAnimeList", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    /// Run the browser without a window
    #[arg(long, global = true)]
    headless: bool,

    /// Number of workers (overrides the config file)
    #[arg(short, long, global = true)]
    workers: Option<usize>,

    /// Page driver backing the workers
    #[arg(long, value_enum, global = true)]
    engine: Option<DriverEngine>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape user reviews from anime review pages
    Reviews {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// JSON file of listing pages to discover anime pages from
        #[arg(short, long)]
        source_urls: Option<PathBuf>,

        /// JSON file of anime pages to scrape; "/reviews" is appended where missing.
        /// Overrides --source-urls.
        #[arg(short, long)]
        target_urls: Option<PathBuf>,

        /// Maximum number of anime pages to discover
        #[arg(short = 'l', long)]
        scrape_limit: Option<usize>,

        /// Listing pages to crawl per source URL
        #[arg(short, long)]
        pagination_limit: Option<usize>,

        /// Review pages to scrape per anime
        #[arg(short, long)]
        review_pagination_limit: Option<usize>,
    },

    /// Scrape anime details from a review export or a URL list
    Details {
        /// Exported reviews to take the anime pages from
        #[arg(required_unless_present = "urls")]
        input: Option<PathBuf>,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// JSON file of anime pages to scrape. Overrides the input file.
        #[arg(short, long)]
        urls: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {:#}", e);
            return Err(e.into());
        }
    };

    let summary = match config.driver.engine {
        DriverEngine::Chrome => run_with_browser(&cli.command, &config).await?,
        DriverEngine::Http => {
            let factory = HttpDriverFactory::new(&config.driver)?;
            run(Arc::new(factory), &cli.command, &config).await?
        }
    };

    tracing::info!(
        "Done: {} records from {} pages written to {}",
        summary.records,
        summary.targets,
        summary.output.display()
    );

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("anime_harvest=info,warn"),
            1 => EnvFilter::new("anime_harvest=debug,info"),
            2 => EnvFilter::new("anime_harvest=trace,debug"),
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

/// Loads the config file, if any, and applies command line overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match cli.config {
        Some(ref path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("could not load {}", path.display()))?
        }
        None => Config::default(),
    };

    if cli.headless {
        config.driver.headless = true;
    }
    if let Some(workers) = cli.workers {
        config.pool.workers = workers;
    }
    if let Some(engine) = cli.engine {
        config.driver.engine = engine;
    }

    if let Command::Reviews {
        scrape_limit,
        pagination_limit,
        review_pagination_limit,
        ..
    } = cli.command
    {
        if let Some(limit) = scrape_limit {
            config.discovery.scrape_limit = limit;
        }
        if let Some(pages) = pagination_limit {
            config.discovery.listing_pages = pages;
        }
        if let Some(pages) = review_pagination_limit {
            config.reviews.page_limit = pages;
        }
    }

    validate(&config).context("invalid settings")?;
    tracing::debug!("{:?}", config);
    Ok(config)
}

#[cfg(feature = "browser")]
async fn run_with_browser(
    command: &Command,
    config: &Config,
) -> Result<Summary, Box<dyn std::error::Error>> {
    use anime_harvest::driver::ChromeDriverFactory;

    let factory = ChromeDriverFactory::new(config.driver.clone());
    run(Arc::new(factory), command, config).await
}

#[cfg(not(feature = "browser"))]
async fn run_with_browser(
    _command: &Command,
    _config: &Config,
) -> Result<Summary, Box<dyn std::error::Error>> {
    Err("Browser support not compiled. Rebuild with: cargo build --features browser, \
         or pass --engine http"
        .into())
}

async fn run<F: DriverFactory>(
    factory: Arc<F>,
    command: &Command,
    config: &Config,
) -> Result<Summary, Box<dyn std::error::Error>> {
    let summary = match command {
        Command::Reviews {
            output,
            source_urls,
            target_urls,
            ..
        } => {
            let source = match target_urls {
                Some(path) => ReviewSource::Targets(path.clone()),
                None => ReviewSource::Listing {
                    seeds: source_urls.clone(),
                },
            };
            let request = ReviewRequest {
                source,
                output: output.clone(),
            };
            match scrape_reviews(factory, config, &request).await {
                Ok(summary) => summary,
                Err(e) => {
                    tracing::error!("Review scrape failed: {}", e);
                    return Err(e.into());
                }
            }
        }
        Command::Details { input, output, urls } => {
            let source = match (urls, input) {
                (Some(path), _) => DetailSource::Urls(path.clone()),
                (None, Some(path)) => DetailSource::Reviews(path.clone()),
                (None, None) => return Err("input file or URL list (-u) not specified".into()),
            };
            let request = DetailRequest {
                source,
                output: output.clone(),
            };
            match scrape_details(factory, config, &request).await {
                Ok(summary) => summary,
                Err(e) => {
                    tracing::error!("Detail scrape failed: {}", e);
                    return Err(e.into());
                }
            }
        }
    };

    Ok(summary)
}
