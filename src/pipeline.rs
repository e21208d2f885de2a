//! End-to-end scraping runs
//!
//! A run resolves its targets, fans them out over the worker pool and exports the
//! merged records. Discovery uses a session of its own, closed before the workers
//! start.

use crate::config::{validate_seed_url, Config};
use crate::discovery::{
    load_page_refs, load_snapshot_or_empty, load_url_list, save_snapshot, ListingCrawler,
    DETAIL_SCRAPER, REVIEW_SCRAPER,
};
use crate::driver::{ChallengeGate, DriverFactory, PageDriver};
use crate::extract::{DetailExtractor, ReviewExtractor};
use crate::output::export;
use crate::pool::WorkerPool;
use crate::url::review_target;
use crate::{ConfigError, Result};
use serde::Serialize;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Worker index used by the discovery session
const DISCOVERY_WORKER: usize = 0;

/// Where review targets come from
#[derive(Debug, Clone)]
pub enum ReviewSource {
    /// A snapshot of anime page URLs
    Targets(PathBuf),
    /// A listing crawl, seeded from a file of listing URLs or the configured seeds
    Listing { seeds: Option<PathBuf> },
}

/// Where detail targets come from
#[derive(Debug, Clone)]
pub enum DetailSource {
    /// A snapshot of anime page URLs
    Urls(PathBuf),
    /// A previously exported review collection
    Reviews(PathBuf),
}

#[derive(Debug, Clone)]
pub struct ReviewRequest {
    pub source: ReviewSource,
    pub output: PathBuf,
}

#[derive(Debug, Clone)]
pub struct DetailRequest {
    pub source: DetailSource,
    pub output: PathBuf,
}

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct Summary {
    pub targets: usize,
    pub records: usize,
    pub bytes: u64,
    pub output: PathBuf,
}

/// Scrapes the reviews of every target and writes them to the request's output
pub async fn scrape_reviews<F: DriverFactory>(
    factory: Arc<F>,
    config: &Config,
    request: &ReviewRequest,
) -> Result<Summary> {
    let targets = review_targets(factory.as_ref(), config, &request.source).await?;
    tracing::info!("Found {} anime pages. Starting scrape...", targets.len());

    let shards = worker_pool(factory, config)?
        .run(&targets, Arc::new(ReviewExtractor::new(config)))
        .await;

    finish(shards, targets.len(), &request.output)
}

/// Scrapes the details of every target and writes them to the request's output
pub async fn scrape_details<F: DriverFactory>(
    factory: Arc<F>,
    config: &Config,
    request: &DetailRequest,
) -> Result<Summary> {
    let targets = detail_targets(config, &request.source)?;
    tracing::info!("Found {} anime pages to scrape", targets.len());

    let shards = worker_pool(factory, config)?
        .run(&targets, Arc::new(DetailExtractor::new(config)))
        .await;

    finish(shards, targets.len(), &request.output)
}

async fn review_targets<F: DriverFactory>(
    factory: &F,
    config: &Config,
    source: &ReviewSource,
) -> Result<Vec<String>> {
    match source {
        ReviewSource::Targets(path) => {
            let urls = load_snapshot_or_empty(path)?;
            Ok(urls.iter().map(|url| review_target(url)).collect())
        }
        ReviewSource::Listing { seeds } => {
            let seeds = listing_seeds(config, seeds.as_deref())?;
            let links = discover(factory, config, &seeds).await?;
            save_snapshot(&config.output.state_dir, REVIEW_SCRAPER, &links)?;
            Ok(links.iter().map(|url| review_target(url)).collect())
        }
    }
}

fn detail_targets(config: &Config, source: &DetailSource) -> Result<Vec<String>> {
    match source {
        DetailSource::Urls(path) => load_snapshot_or_empty(path),
        DetailSource::Reviews(path) => {
            let urls = load_page_refs(path)?;
            save_snapshot(&config.output.state_dir, DETAIL_SCRAPER, &urls)?;
            Ok(urls)
        }
    }
}

/// Seeds from `path` if it exists, the configured seeds otherwise
fn listing_seeds(config: &Config, path: Option<&Path>) -> Result<Vec<String>> {
    match path {
        Some(path) if path.exists() => {
            tracing::info!("Loading source URLs from {}", path.display());
            let seeds = load_url_list(path)?;
            for seed in &seeds {
                validate_seed_url(seed)?;
            }
            Ok(seeds)
        }
        Some(path) => {
            tracing::warn!(
                "Source URL file {} not found, using the default listings",
                path.display()
            );
            Ok(config.discovery.seeds.clone())
        }
        None => Ok(config.discovery.seeds.clone()),
    }
}

async fn discover<F: DriverFactory>(
    factory: &F,
    config: &Config,
    seeds: &[String],
) -> Result<Vec<String>> {
    let mut driver = factory.open(DISCOVERY_WORKER).await?;
    let links = ListingCrawler::from_config(config)
        .crawl(&mut driver, seeds)
        .await;

    if let Err(e) = driver.close().await {
        tracing::warn!("Error closing discovery session: {}", e);
    }
    Ok(links)
}

fn worker_pool<F: DriverFactory>(factory: Arc<F>, config: &Config) -> Result<WorkerPool<F>> {
    let workers = NonZeroUsize::new(config.pool.workers)
        .ok_or_else(|| ConfigError::Validation("pool.workers must be at least 1".to_string()))?;

    Ok(WorkerPool::new(
        factory,
        ChallengeGate::new(config.timeouts.challenge_poll()),
        workers,
    ))
}

fn finish<T: Serialize>(shards: Vec<Vec<T>>, targets: usize, output: &Path) -> Result<Summary> {
    tracing::info!("Exporting...");

    let export = export(shards)?;
    export.write_to(output)?;

    let name = output
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| output.display().to_string());
    tracing::info!("Exported {} (Size {})", name, export.display_size());

    Ok(Summary {
        targets,
        records: export.records,
        bytes: export.size_bytes(),
        output: output.to_path_buf(),
    })
}
