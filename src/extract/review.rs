use crate::config::Config;
use crate::constants::review as sel;
use crate::driver::{DriverResult, PageDriver, PageElement};
use crate::extract::normalize::{
    merge_truncated, parse_calendar_date, preview, sentiment_score, unix_timestamp,
};
use crate::extract::{ExtractionFailure, ExtractionResult, Extractor, ReviewRecord};
use crate::traversal::{RetryRule, TraversalSettings};
use crate::url::anime_page_url;
use async_trait::async_trait;
use std::time::Duration;

/// Words of review text shown in progress logs
const PREVIEW_WORDS: usize = 10;

/// Extracts [`ReviewRecord`]s from a review listing and follows its pagination
#[derive(Debug, Clone)]
pub struct ReviewExtractor {
    replace_newlines: bool,
    ready_timeout: Duration,
    retry_ceiling: u32,
    page_limit: usize,
}

impl ReviewExtractor {
    pub fn new(config: &Config) -> Self {
        Self {
            replace_newlines: config.reviews.replace_newlines,
            ready_timeout: config.timeouts.review_ready(),
            retry_ceiling: config.reviews.retry_ceiling,
            page_limit: config.reviews.page_limit,
        }
    }

    async fn extract_review<E: PageElement>(
        &self,
        entry: &E,
        page_url: &str,
        anime: &str,
    ) -> ExtractionResult<ReviewRecord> {
        let username = entry.find(sel::USERNAME).await?.text().await?;
        let date = entry.find(sel::DATE).await?.text().await?;
        let verdict = entry.find(sel::VERDICT).await?.text().await?;
        let body = entry.find(sel::BODY).await?;
        let hidden = match body.find_first(sel::BODY_HIDDEN).await? {
            Some(rest) => Some(rest.text_content().await?),
            None => None,
        };
        let avatar = entry
            .find(sel::AVATAR)
            .await?
            .attribute("src")
            .await?
            .unwrap_or_default();

        let feelings = sentiment_score(&verdict)
            .ok_or_else(|| ExtractionFailure::Fatal(format!("unknown verdict '{}'", verdict)))?;

        let timestamp = parse_calendar_date(&date)
            .and_then(unix_timestamp)
            .ok_or_else(|| ExtractionFailure::Fatal(format!("unreadable date '{}'", date)))?;

        let mut review_text = merge_truncated(&body.text().await?, hidden.as_deref());
        if self.replace_newlines {
            review_text = review_text.replace('\n', " ");
        }

        tracing::info!(
            "{} {} ({}): \"{}\"",
            anime,
            username,
            verdict.trim(),
            preview(&review_text, PREVIEW_WORDS)
        );

        Ok(ReviewRecord {
            page_url: page_url.to_string(),
            anime: anime.to_string(),
            username,
            avatar,
            timestamp,
            feelings,
            review_text,
        })
    }
}

#[async_trait]
impl Extractor for ReviewExtractor {
    type Record = ReviewRecord;

    fn settings(&self) -> TraversalSettings {
        TraversalSettings {
            ready_timeout: self.ready_timeout,
            retry: RetryRule::AbandonAfter(self.retry_ceiling),
            page_limit: self.page_limit,
        }
    }

    async fn extract<D: PageDriver>(
        &self,
        driver: &D,
        target: &str,
    ) -> ExtractionResult<Vec<ReviewRecord>> {
        let anime = driver
            .wait_until_present(sel::TITLE, self.ready_timeout)
            .await?
            .text()
            .await?;
        driver
            .wait_until_present(sel::ENTRY, self.ready_timeout)
            .await?;

        let entries = driver.find_all(sel::ENTRY).await?;
        let page_url = anime_page_url(target);

        tracing::info!("Found {} reviews for {}", entries.len(), anime);

        let mut records = Vec::with_capacity(entries.len());
        for (idx, entry) in entries.iter().enumerate() {
            match self.extract_review(entry, &page_url, &anime).await {
                Ok(record) => records.push(record),
                Err(ExtractionFailure::Fatal(reason)) => {
                    tracing::warn!(
                        "Skipping review {}/{} for {}: {}",
                        idx + 1,
                        entries.len(),
                        anime,
                        reason
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Ok(records)
    }

    async fn next_page<D: PageDriver>(&self, driver: &D) -> DriverResult<Option<String>> {
        match driver.find_first(sel::MORE_REVIEWS).await? {
            Some(link) => link.attribute("href").await,
            None => Ok(None),
        }
    }
}
