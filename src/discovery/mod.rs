//! Target discovery
//!
//! Targets come from one of three places:
//! - a URL snapshot file written by an earlier run
//! - a crawl of ranked listing pages ([`ListingCrawler`])
//! - the `page_url` values of a previously exported review collection
//!
//! Lists built by crawling or derivation are saved as snapshots under the state
//! directory so that a later run can reuse them.

mod listing;

pub use listing::ListingCrawler;

use crate::{HarvestError, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// File name of a URL snapshot inside its state folder
pub const SNAPSHOT_FILE: &str = "urls.json";

/// State sub-directory of the review scraper
pub const REVIEW_SCRAPER: &str = "review_scraper";

/// State sub-directory of the detail scraper
pub const DETAIL_SCRAPER: &str = "anime_details";

/// Minimal view of an exported review; only the page URL is read
#[derive(Debug, Deserialize)]
struct PageRef {
    page_url: String,
}

fn read_input(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(HarvestError::MissingInput {
            path: path.to_path_buf(),
        });
    }
    Ok(std::fs::read_to_string(path)?)
}

/// Loads a JSON array of URLs
///
/// A missing file or malformed JSON is an error.
pub fn load_url_list(path: &Path) -> Result<Vec<String>> {
    let content = read_input(path)?;
    serde_json::from_str(&content).map_err(|source| HarvestError::InvalidInput {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads a URL snapshot, degrading to an empty list when it cannot be parsed
///
/// A missing file is still an error.
pub fn load_snapshot_or_empty(path: &Path) -> Result<Vec<String>> {
    match load_url_list(path) {
        Ok(urls) => {
            tracing::info!("Loaded {} URLs from {}", urls.len(), path.display());
            Ok(urls)
        }
        Err(HarvestError::InvalidInput { path, source }) => {
            tracing::error!(
                "Error while parsing URL file {}: {}. Continuing with no URLs",
                path.display(),
                source
            );
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}

/// Unique `page_url` values of an exported review collection, first-seen order
pub fn load_page_refs(path: &Path) -> Result<Vec<String>> {
    let content = read_input(path)?;
    let refs: Vec<PageRef> =
        serde_json::from_str(&content).map_err(|source| HarvestError::InvalidInput {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(unique_in_order(refs.into_iter().map(|r| r.page_url)))
}

/// Drops repeated values, keeping the first occurrence of each
pub fn unique_in_order<I>(urls: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    urls.into_iter()
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

/// Writes `urls` to `<state_dir>/<scraper>/state_<timestamp>/urls.json`
///
/// Returns the path of the snapshot file.
pub fn save_snapshot(state_dir: &Path, scraper: &str, urls: &[String]) -> Result<PathBuf> {
    let folder = state_dir.join(scraper).join(format!(
        "state_{}",
        chrono::Local::now().format("%Y-%m-%d_%H-%M-%S")
    ));
    std::fs::create_dir_all(&folder)?;

    let path = folder.join(SNAPSHOT_FILE);
    std::fs::write(&path, serde_json::to_string(urls)?)?;

    tracing::info!("Saved {} URLs to {}", urls.len(), path.display());
    Ok(path)
}
