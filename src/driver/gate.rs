//! Human verification gate
//!
//! When the site shows a verification prompt the scraper cannot solve, the worker
//! parks until someone clears it in the browser window. The wait has no timeout.

use crate::constants::CHALLENGE_SELECTORS;
use crate::driver::{DriverResult, PageDriver};
use std::time::Duration;

/// Blocks a worker while a challenge element is on the page
#[derive(Debug, Clone)]
pub struct ChallengeGate {
    selectors: Vec<String>,
    poll_interval: Duration,
}

impl ChallengeGate {
    /// Gate over the site's known challenge elements
    pub fn new(poll_interval: Duration) -> Self {
        Self::with_selectors(
            CHALLENGE_SELECTORS.iter().map(|s| s.to_string()).collect(),
            poll_interval,
        )
    }

    pub fn with_selectors(selectors: Vec<String>, poll_interval: Duration) -> Self {
        Self {
            selectors,
            poll_interval,
        }
    }

    /// Returns true while any challenge element is present
    pub async fn is_blocked<D: PageDriver>(&self, driver: &D) -> DriverResult<bool> {
        for selector in &self.selectors {
            if driver.is_present(selector).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Polls until no challenge element is present
    pub async fn wait_until_clear<D: PageDriver>(&self, driver: &D) -> DriverResult<()> {
        let mut waiting = false;

        while self.is_blocked(driver).await? {
            if !waiting {
                tracing::warn!("Captcha found. Waiting for user input...");
                waiting = true;
            }
            tokio::time::sleep(self.poll_interval).await;
        }

        if waiting {
            tracing::info!("Captcha cleared, resuming");
        }

        Ok(())
    }
}
