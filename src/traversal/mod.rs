//! Per-shard page traversal
//!
//! A [`Traversal`] walks one shard of targets with a single driver session. For each
//! target it navigates, waits for the page to settle on the requested URL, lets the
//! challenge gate block if needed, extracts, then either follows the target's
//! continuation page or moves on. Transient failures re-enter navigation for the same
//! page until the [`RetryRule`] gives up; fatal failures abandon the target at once.
//!
//! Nothing escapes a traversal: every failure is logged and the shard carries on.

mod cursor;

pub use cursor::TraversalCursor;

use crate::driver::{ChallengeGate, DriverResult, PageDriver};
use crate::extract::{ExtractionFailure, Extractor};
use std::time::Duration;

/// When to stop retrying the current page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryRule {
    /// Give up once the failure count reaches the ceiling
    AbandonAt(u32),
    /// Give up once the failure count exceeds the ceiling
    AbandonAfter(u32),
}

impl RetryRule {
    pub fn is_exhausted(&self, failures: u32) -> bool {
        match *self {
            Self::AbandonAt(ceiling) => failures >= ceiling,
            Self::AbandonAfter(ceiling) => failures > ceiling,
        }
    }

    /// Attempts made on a page that never succeeds
    pub fn max_attempts(&self) -> u32 {
        match *self {
            Self::AbandonAt(ceiling) => ceiling.max(1),
            Self::AbandonAfter(ceiling) => ceiling + 1,
        }
    }
}

/// How a kind of target is traversed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraversalSettings {
    /// Bound on waiting for the requested URL
    pub ready_timeout: Duration,
    pub retry: RetryRule,
    /// Pages visited per target, the first one included
    pub page_limit: usize,
}

/// States of a traversal
#[derive(Debug)]
pub enum TraversalState {
    Idle,
    Navigating,
    WaitingReady,
    Extracting,
    Advancing,
    Retrying(ExtractionFailure),
    Done,
}

/// Walks one shard with one driver session
pub struct Traversal<'a, D: PageDriver, E: Extractor> {
    driver: &'a mut D,
    extractor: &'a E,
    gate: &'a ChallengeGate,
    worker: usize,
}

impl<'a, D: PageDriver, E: Extractor> Traversal<'a, D, E> {
    pub fn new(driver: &'a mut D, extractor: &'a E, gate: &'a ChallengeGate, worker: usize) -> Self {
        Self {
            driver,
            extractor,
            gate,
            worker,
        }
    }

    /// Visits every target in order and returns the records collected
    ///
    /// The driver is left open; closing it is up to the owner.
    pub async fn run(mut self, targets: &[String]) -> Vec<E::Record> {
        let settings = self.extractor.settings();
        let total = targets.len();
        let mut cursor = TraversalCursor::new();
        let mut records = Vec::new();
        let mut state = TraversalState::Idle;

        loop {
            state = match state {
                TraversalState::Idle if cursor.is_finished(targets) => TraversalState::Done,

                TraversalState::Idle => {
                    tracing::info!(
                        worker = self.worker,
                        "[{}/{}] Visiting {}",
                        cursor.index() + 1,
                        total,
                        cursor.target(targets).unwrap_or_default()
                    );
                    TraversalState::Navigating
                }

                TraversalState::Navigating => {
                    let url = current_page(&cursor, targets);
                    if cursor.failures() > 0 {
                        tracing::debug!(
                            worker = self.worker,
                            "Reloading {} (attempt {}/{})",
                            url,
                            cursor.failures() + 1,
                            settings.retry.max_attempts()
                        );
                    }
                    match self.driver.navigate(&url).await {
                        Ok(()) => TraversalState::WaitingReady,
                        Err(e) => TraversalState::Retrying(e.into()),
                    }
                }

                TraversalState::WaitingReady => {
                    let url = current_page(&cursor, targets);
                    match self.settle(&url, settings.ready_timeout).await {
                        Ok(()) => TraversalState::Extracting,
                        Err(e) => TraversalState::Retrying(e.into()),
                    }
                }

                TraversalState::Extracting => {
                    let target = cursor.target(targets).unwrap_or_default();
                    match self.extractor.extract(&*self.driver, target).await {
                        Ok(mut page) => {
                            tracing::debug!(
                                worker = self.worker,
                                "{} records from page {} of {}",
                                page.len(),
                                cursor.page_index() + 1,
                                target
                            );
                            records.append(&mut page);
                            cursor.reset_failures();
                            TraversalState::Advancing
                        }
                        Err(failure) if !failure.is_transient() => {
                            tracing::warn!(
                                worker = self.worker,
                                "Abandoning {}: {}",
                                target,
                                failure
                            );
                            cursor.advance();
                            TraversalState::Idle
                        }
                        Err(failure) => TraversalState::Retrying(failure),
                    }
                }

                TraversalState::Advancing => {
                    if cursor.page_index() + 1 < settings.page_limit {
                        match self.extractor.next_page(&*self.driver).await {
                            Ok(Some(next)) => {
                                tracing::debug!(worker = self.worker, "Continuing to {}", next);
                                cursor.continue_to(next);
                                TraversalState::Navigating
                            }
                            Ok(None) => {
                                cursor.advance();
                                TraversalState::Idle
                            }
                            Err(e) => {
                                tracing::warn!(
                                    worker = self.worker,
                                    "Could not find the next page: {}",
                                    e
                                );
                                cursor.advance();
                                TraversalState::Idle
                            }
                        }
                    } else {
                        cursor.advance();
                        TraversalState::Idle
                    }
                }

                TraversalState::Retrying(failure) => {
                    let url = current_page(&cursor, targets);
                    let failures = cursor.record_failure();
                    if settings.retry.is_exhausted(failures) {
                        tracing::warn!(
                            worker = self.worker,
                            "Giving up on {} after {} attempts: {}",
                            url,
                            failures,
                            failure
                        );
                        cursor.advance();
                        TraversalState::Idle
                    } else {
                        tracing::warn!(
                            worker = self.worker,
                            "Attempt {}/{} on {} failed: {}. Retrying...",
                            failures,
                            settings.retry.max_attempts(),
                            url,
                            failure
                        );
                        TraversalState::Navigating
                    }
                }

                TraversalState::Done => break,
            };
        }

        tracing::info!(
            worker = self.worker,
            "Shard finished: {} records from {} targets",
            records.len(),
            total
        );

        records
    }

    /// Waits for the requested URL, then for any challenge to clear
    async fn settle(&self, url: &str, timeout: Duration) -> DriverResult<()> {
        self.driver.wait_until_url_equals(url, timeout).await?;
        self.gate.wait_until_clear(&*self.driver).await
    }
}

fn current_page(cursor: &TraversalCursor, targets: &[String]) -> String {
    cursor
        .page_url(targets)
        .map(str::to_string)
        .unwrap_or_default()
}
