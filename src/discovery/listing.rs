use crate::config::Config;
use crate::constants::{CONSENT_BUTTON, LISTING_LINK};
use crate::driver::{DriverResult, PageDriver, PageElement};
use crate::url::listing_page_url;
use std::collections::HashSet;
use std::time::Duration;

/// Collects detail page links from paginated ranking listings
#[derive(Debug, Clone)]
pub struct ListingCrawler {
    listing_pages: usize,
    scrape_limit: usize,
    ready_timeout: Duration,
}

impl ListingCrawler {
    pub fn new(listing_pages: usize, scrape_limit: usize, ready_timeout: Duration) -> Self {
        Self {
            listing_pages,
            scrape_limit,
            ready_timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.discovery.listing_pages,
            config.discovery.scrape_limit,
            config.timeouts.listing_ready(),
        )
    }

    /// Crawls each seed in turn and returns unique detail links in first-seen order
    ///
    /// Stops as soon as the scrape limit is reached, mid-page included. A seed whose
    /// page fails to load is skipped for the rest of its pages.
    pub async fn crawl<D: PageDriver>(&self, driver: &mut D, seeds: &[String]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut found = Vec::new();
        let mut consent_dismissed = false;

        'seeds: for seed in seeds {
            for page_index in 0..self.listing_pages {
                if found.len() >= self.scrape_limit {
                    tracing::info!("Reached scrape limit ({}). Skipping...", self.scrape_limit);
                    break 'seeds;
                }

                let url = listing_page_url(seed, page_index);
                tracing::debug!("Loading listing page {}", url);

                if let Err(e) = self.load(driver, &url).await {
                    tracing::warn!("Could not load listing {}: {}", url, e);
                    continue 'seeds;
                }

                if let Err(e) = self.collect_links(driver, &mut seen, &mut found).await {
                    tracing::warn!("Could not read links on {}: {}", url, e);
                }

                if !consent_dismissed {
                    consent_dismissed = self.dismiss_consent(driver).await;
                }
            }
        }

        tracing::info!("Discovered {} anime pages", found.len());
        found
    }

    async fn load<D: PageDriver>(&self, driver: &mut D, url: &str) -> DriverResult<()> {
        driver.navigate(url).await?;
        driver.wait_until_url_equals(url, self.ready_timeout).await
    }

    async fn collect_links<D: PageDriver>(
        &self,
        driver: &D,
        seen: &mut HashSet<String>,
        found: &mut Vec<String>,
    ) -> DriverResult<()> {
        for link in driver.find_all(LISTING_LINK).await? {
            let Some(href) = link.attribute("href").await? else {
                continue;
            };

            if seen.contains(&href) {
                continue;
            }

            if found.len() >= self.scrape_limit {
                tracing::info!(
                    "Reached scrape limit ({}). Skipping {}...",
                    self.scrape_limit,
                    href
                );
                break;
            }

            let name = link.text().await?;
            tracing::info!(
                "Adding anime page: \"{}\" ({}/{})",
                name,
                found.len() + 1,
                self.scrape_limit
            );
            tracing::debug!("{}", href);

            seen.insert(href.clone());
            found.push(href);
        }
        Ok(())
    }

    /// Clicks the consent banner if it is showing; returns true once it has been handled
    async fn dismiss_consent<D: PageDriver>(&self, driver: &mut D) -> bool {
        let button = match driver.find_first(CONSENT_BUTTON).await {
            Ok(Some(button)) => button,
            Ok(None) => return false,
            Err(e) => {
                tracing::debug!("Consent check failed: {}", e);
                return false;
            }
        };

        tracing::info!("Dismissing consent banner");

        let dismissed = match driver.click(&button).await {
            Ok(()) => driver
                .wait_until_absent(CONSENT_BUTTON, self.ready_timeout)
                .await,
            Err(e) => Err(e),
        };

        if let Err(e) = dismissed {
            tracing::warn!("Could not dismiss consent banner: {}", e);
        }
        true
    }
}
