use crate::constants::DEFAULT_LISTING_SEEDS;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for anime-harvest
///
/// Every section is optional in the TOML file; missing sections and keys fall back
/// to the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub pool: PoolConfig,
    pub driver: DriverConfig,
    pub timeouts: TimeoutConfig,
    pub details: DetailConfig,
    pub reviews: ReviewConfig,
    pub discovery: DiscoveryConfig,
    pub output: OutputConfig,
}

/// Worker pool configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Number of workers, each owning one browser session
    pub workers: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self { workers: 4 }
    }
}

/// Which page driver backs the workers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DriverEngine {
    /// Chromium over the DevTools protocol
    #[default]
    Chrome,
    /// Plain HTTP fetches parsed as static HTML
    Http,
}

/// Page driver configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    pub engine: DriverEngine,

    /// Hide the browser window
    pub headless: bool,

    #[serde(rename = "window-width")]
    pub window_width: u32,

    #[serde(rename = "window-height")]
    pub window_height: u32,

    /// Browser executable; the launcher searches the usual locations when unset
    pub executable: Option<PathBuf>,

    /// Extra browser command line arguments
    pub args: Vec<String>,

    /// User agent sent by the HTTP driver
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            engine: DriverEngine::default(),
            headless: false,
            window_width: 1280,
            window_height: 800,
            executable: None,
            args: Vec::new(),
            user_agent: format!("anime-harvest/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Bounded waits used by the traversal and discovery
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    #[serde(rename = "detail-ready-secs")]
    pub detail_ready_secs: u64,

    #[serde(rename = "review-ready-secs")]
    pub review_ready_secs: u64,

    #[serde(rename = "listing-ready-secs")]
    pub listing_ready_secs: u64,

    /// Poll interval of the challenge gate
    #[serde(rename = "challenge-poll-ms")]
    pub challenge_poll_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            detail_ready_secs: 5,
            review_ready_secs: 10,
            listing_ready_secs: 8,
            challenge_poll_ms: 1000,
        }
    }
}

impl TimeoutConfig {
    pub fn detail_ready(&self) -> Duration {
        Duration::from_secs(self.detail_ready_secs)
    }

    pub fn review_ready(&self) -> Duration {
        Duration::from_secs(self.review_ready_secs)
    }

    pub fn listing_ready(&self) -> Duration {
        Duration::from_secs(self.listing_ready_secs)
    }

    pub fn challenge_poll(&self) -> Duration {
        Duration::from_millis(self.challenge_poll_ms)
    }
}

/// Anime detail scraping configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DetailConfig {
    /// Keep numeric fields in the form they were displayed in
    #[serde(rename = "numbers-as-strings")]
    pub numbers_as_strings: bool,

    /// A target is abandoned once this many attempts have failed
    #[serde(rename = "retry-ceiling")]
    pub retry_ceiling: u32,
}

impl Default for DetailConfig {
    fn default() -> Self {
        Self {
            numbers_as_strings: false,
            retry_ceiling: 3,
        }
    }
}

/// Review scraping configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Maximum number of review pages visited per anime
    #[serde(rename = "page-limit")]
    pub page_limit: usize,

    /// A target is abandoned once failures exceed this many retries
    #[serde(rename = "retry-ceiling")]
    pub retry_ceiling: u32,

    #[serde(rename = "replace-newlines")]
    pub replace_newlines: bool,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            page_limit: 2,
            retry_ceiling: 3,
            replace_newlines: true,
        }
    }
}

/// Listing crawl configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Listing pages the crawl starts from
    pub seeds: Vec<String>,

    /// Number of listing pages visited per seed
    #[serde(rename = "listing-pages")]
    pub listing_pages: usize,

    /// Overall cap on discovered targets
    #[serde(rename = "scrape-limit")]
    pub scrape_limit: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            seeds: DEFAULT_LISTING_SEEDS.iter().map(|s| s.to_string()).collect(),
            listing_pages: 4,
            scrape_limit: 200,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root folder for URL snapshots
    #[serde(rename = "state-dir")]
    pub state_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            state_dir: PathBuf::from("temp"),
        }
    }
}
