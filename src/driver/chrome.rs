//! Chromium driver over the DevTools protocol
//!
//! Each session launches its own browser process with a private profile directory,
//! so a stuck or crashed browser only takes down the worker that owns it.

use crate::config::DriverConfig;
use crate::driver::{DriverError, DriverFactory, DriverResult, PageDriver, PageElement};
use async_trait::async_trait;
use chromiumoxide::element::Element;
use chromiumoxide::error::CdpError;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::path::PathBuf;
use tokio::task::JoinHandle;

fn browser_error(err: CdpError) -> DriverError {
    DriverError::Browser(err.to_string())
}

/// Launches one [`ChromeDriver`] per worker
#[derive(Debug, Clone)]
pub struct ChromeDriverFactory {
    config: DriverConfig,
}

impl ChromeDriverFactory {
    pub fn new(config: DriverConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl DriverFactory for ChromeDriverFactory {
    type Driver = ChromeDriver;

    async fn open(&self, worker: usize) -> DriverResult<ChromeDriver> {
        ChromeDriver::launch(&self.config, worker).await
    }
}

/// A browser process with a single tab
pub struct ChromeDriver {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    profile_dir: PathBuf,
}

impl ChromeDriver {
    /// Launches a browser for `worker`
    pub async fn launch(config: &DriverConfig, worker: usize) -> DriverResult<Self> {
        let profile_dir = std::env::temp_dir().join(format!(
            "anime-harvest-{}-{}",
            std::process::id(),
            worker
        ));

        tracing::info!(
            worker,
            headless = config.headless,
            "Launching browser ({}x{})",
            config.window_width,
            config.window_height
        );

        let mut builder = BrowserConfig::builder()
            .window_size(config.window_width, config.window_height)
            .user_data_dir(&profile_dir);

        // with_head means NOT headless
        if !config.headless {
            builder = builder.with_head();
        }

        if let Some(ref executable) = config.executable {
            builder = builder.chrome_executable(executable);
        }

        for arg in &config.args {
            builder = builder.arg(arg.clone());
        }

        let browser_config = builder.build().map_err(DriverError::Browser)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(browser_error)?;

        let handler = tokio::spawn(async move { while handler.next().await.is_some() {} });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(browser_error)?;

        Ok(Self {
            browser,
            page,
            handler,
            profile_dir,
        })
    }
}

#[async_trait]
impl PageDriver for ChromeDriver {
    type Element = ChromeElement;

    async fn navigate(&mut self, url: &str) -> DriverResult<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| DriverError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn current_url(&self) -> DriverResult<String> {
        Ok(self
            .page
            .url()
            .await
            .map_err(browser_error)?
            .unwrap_or_default())
    }

    async fn find_all(&self, selector: &str) -> DriverResult<Vec<ChromeElement>> {
        let elements = self
            .page
            .find_elements(selector)
            .await
            .map_err(browser_error)?;
        Ok(elements.into_iter().map(ChromeElement).collect())
    }

    async fn click(&mut self, element: &ChromeElement) -> DriverResult<()> {
        element.0.click().await.map_err(browser_error)?;
        Ok(())
    }

    async fn close(&mut self) -> DriverResult<()> {
        let closed = self.browser.close().await.map_err(browser_error);
        if closed.is_ok() {
            let _ = self.browser.wait().await;
        }
        self.handler.abort();

        if let Err(e) = std::fs::remove_dir_all(&self.profile_dir) {
            tracing::debug!("Could not remove {}: {}", self.profile_dir.display(), e);
        }

        closed.map(|_| ())
    }
}

/// An element in a [`ChromeDriver`] tab
pub struct ChromeElement(Element);

#[async_trait]
impl PageElement for ChromeElement {
    async fn text(&self) -> DriverResult<String> {
        Ok(self.0.inner_text().await.map_err(browser_error)?.unwrap_or_default())
    }

    async fn text_content(&self) -> DriverResult<String> {
        let value = self
            .0
            .property("textContent")
            .await
            .map_err(browser_error)?;
        Ok(value
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default())
    }

    /// Property first, then attribute, like WebDriver's getAttribute
    async fn attribute(&self, name: &str) -> DriverResult<Option<String>> {
        let property = self.0.property(name).await.map_err(browser_error)?;
        if let Some(serde_json::Value::String(value)) = property {
            return Ok(Some(value));
        }
        self.0.attribute(name).await.map_err(browser_error)
    }

    async fn find_all(&self, selector: &str) -> DriverResult<Vec<ChromeElement>> {
        let elements = self.0.find_elements(selector).await.map_err(browser_error)?;
        Ok(elements.into_iter().map(ChromeElement).collect())
    }
}
