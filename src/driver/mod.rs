//! Page driver capability
//!
//! The scraping core never talks to a browser directly. It drives pages through the
//! [`PageDriver`] and [`PageElement`] traits, and workers obtain their own session
//! from a [`DriverFactory`]. Two implementations are provided:
//!
//! - [`ChromeDriver`]: Chromium over the DevTools protocol (feature `browser`)
//! - [`HttpDriver`]: plain HTTP fetches parsed as static HTML

#[cfg(feature = "browser")]
mod chrome;
mod gate;
mod http;

#[cfg(feature = "browser")]
pub use chrome::{ChromeDriver, ChromeDriverFactory, ChromeElement};
pub use gate::ChallengeGate;
pub use http::{build_http_client, HtmlElement, HttpDriver, HttpDriverFactory};

use crate::url::same_page;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

/// Interval between checks while waiting on a page condition
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Errors raised by page drivers
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Timed out waiting for {0}")]
    Timeout(String),

    #[error("Element not found: {selector}")]
    ElementNotFound { selector: String },

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

/// Result type for driver operations
pub type DriverResult<T> = Result<T, DriverError>;

/// An element located on the current page
#[async_trait]
pub trait PageElement: Send + Sync + Sized {
    /// Rendered text, hidden descendants excluded
    async fn text(&self) -> DriverResult<String>;

    /// Raw text content, hidden descendants included
    async fn text_content(&self) -> DriverResult<String>;

    /// Attribute value; link and image sources come back as absolute URLs
    async fn attribute(&self, name: &str) -> DriverResult<Option<String>>;

    /// Descendants matching a CSS selector, in document order
    async fn find_all(&self, selector: &str) -> DriverResult<Vec<Self>>;

    async fn find_first(&self, selector: &str) -> DriverResult<Option<Self>> {
        Ok(self.find_all(selector).await?.into_iter().next())
    }

    /// First matching descendant; absence is an error
    async fn find(&self, selector: &str) -> DriverResult<Self> {
        self.find_first(selector)
            .await?
            .ok_or_else(|| DriverError::ElementNotFound {
                selector: selector.to_string(),
            })
    }
}

/// A controllable browser session showing one page at a time
#[async_trait]
pub trait PageDriver: Send + Sync {
    type Element: PageElement;

    async fn navigate(&mut self, url: &str) -> DriverResult<()>;

    /// URL the session is effectively showing, after any redirects
    async fn current_url(&self) -> DriverResult<String>;

    /// Elements matching a CSS selector, in document order
    async fn find_all(&self, selector: &str) -> DriverResult<Vec<Self::Element>>;

    async fn click(&mut self, element: &Self::Element) -> DriverResult<()>;

    /// Releases the session. Called exactly once by the owner.
    async fn close(&mut self) -> DriverResult<()>;

    async fn find_first(&self, selector: &str) -> DriverResult<Option<Self::Element>> {
        Ok(self.find_all(selector).await?.into_iter().next())
    }

    /// First matching element; absence is an error
    async fn find(&self, selector: &str) -> DriverResult<Self::Element> {
        self.find_first(selector)
            .await?
            .ok_or_else(|| DriverError::ElementNotFound {
                selector: selector.to_string(),
            })
    }

    async fn is_present(&self, selector: &str) -> DriverResult<bool> {
        Ok(!self.find_all(selector).await?.is_empty())
    }

    /// Blocks until the effective URL equals `url`
    ///
    /// Guards against silent redirects and stale loads.
    async fn wait_until_url_equals(&self, url: &str, timeout: Duration) -> DriverResult<()> {
        let deadline = Instant::now() + timeout;
        loop {
            let current = self.current_url().await?;
            if same_page(&current, url) {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(DriverError::Timeout(format!(
                    "URL {} (still at {})",
                    url, current
                )));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Blocks until an element matching `selector` exists and returns the first one
    async fn wait_until_present(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> DriverResult<Self::Element> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(element) = self.find_first(selector).await? {
                return Ok(element);
            }
            if Instant::now() >= deadline {
                return Err(DriverError::Timeout(format!("element {}", selector)));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Blocks until no element matches `selector`
    async fn wait_until_absent(&self, selector: &str, timeout: Duration) -> DriverResult<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if !self.is_present(selector).await? {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(DriverError::Timeout(format!("{} to disappear", selector)));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

/// Opens driver sessions for workers
#[async_trait]
pub trait DriverFactory: Send + Sync + 'static {
    type Driver: PageDriver + 'static;

    /// Opens a fresh session owned by `worker`
    async fn open(&self, worker: usize) -> DriverResult<Self::Driver>;
}
