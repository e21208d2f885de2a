//! Record extraction
//!
//! An [`Extractor`] turns a ready page into domain records. It reports failures as
//! an [`ExtractionFailure`] whose kind tells the traversal whether reloading the
//! page could help.

mod detail;
pub mod normalize;
mod review;

pub use detail::DetailExtractor;
pub use normalize::Number;
pub use review::ReviewExtractor;

use crate::driver::{DriverError, DriverResult, PageDriver};
use crate::traversal::TraversalSettings;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a page (or a single record on it) could not be extracted
#[derive(Debug, Error)]
pub enum ExtractionFailure {
    /// The driver failed: missing element, timeout, stale page
    #[error(transparent)]
    Driver(#[from] DriverError),

    /// The page loaded but a field was not in the expected shape
    #[error("malformed page: {0}")]
    Malformed(String),

    /// Content that reloading cannot fix
    #[error("unrecoverable: {0}")]
    Fatal(String),
}

impl ExtractionFailure {
    /// Transient failures are worth another attempt
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::Fatal(_))
    }
}

/// Result type for extraction
pub type ExtractionResult<T> = Result<T, ExtractionFailure>;

/// Anime metadata from a detail page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailRecord {
    pub anime: String,
    pub english_name: Option<String>,
    pub cover: String,
    pub anime_url: String,
    pub score: Number,
    pub reviews: Number,
    pub members: Number,
    pub ranking: Number,
    pub popularity: Number,
    pub synopsis: String,
    pub genres: Vec<String>,
}

/// One user review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    /// Anime page the review belongs to
    pub page_url: String,
    pub anime: String,
    pub username: String,
    pub avatar: String,
    /// Seconds since the epoch, UTC midnight of the review date
    pub timestamp: i64,
    /// 3 recommended, 2 mixed feelings, 1 not recommended
    pub feelings: u8,
    pub review_text: String,
}

/// Pulls records from the page a driver is showing
#[async_trait]
pub trait Extractor: Send + Sync + 'static {
    type Record: Serialize + Send + 'static;

    /// Timeouts, retry ceiling and pagination depth for targets of this kind
    fn settings(&self) -> TraversalSettings;

    /// Extracts every record on the current page of `target`
    async fn extract<D: PageDriver>(
        &self,
        driver: &D,
        target: &str,
    ) -> ExtractionResult<Vec<Self::Record>>;

    /// Continuation URL of a paginated target, if the page offers one
    async fn next_page<D: PageDriver>(&self, _driver: &D) -> DriverResult<Option<String>> {
        Ok(None)
    }
}
