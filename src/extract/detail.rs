use crate::config::Config;
use crate::constants::detail as sel;
use crate::driver::{PageDriver, PageElement};
use crate::extract::normalize::{clean_synopsis, count_field, score_field, strip_label};
use crate::extract::{DetailRecord, ExtractionFailure, ExtractionResult, Extractor};
use crate::traversal::{RetryRule, TraversalSettings};
use async_trait::async_trait;
use std::time::Duration;

/// Extracts a [`DetailRecord`] from an anime page
#[derive(Debug, Clone)]
pub struct DetailExtractor {
    numbers_as_strings: bool,
    ready_timeout: Duration,
    retry_ceiling: u32,
}

impl DetailExtractor {
    pub fn new(config: &Config) -> Self {
        Self {
            numbers_as_strings: config.details.numbers_as_strings,
            ready_timeout: config.timeouts.detail_ready(),
            retry_ceiling: config.details.retry_ceiling,
        }
    }
}

#[async_trait]
impl Extractor for DetailExtractor {
    type Record = DetailRecord;

    fn settings(&self) -> TraversalSettings {
        TraversalSettings {
            ready_timeout: self.ready_timeout,
            retry: RetryRule::AbandonAt(self.retry_ceiling),
            page_limit: 1,
        }
    }

    async fn extract<D: PageDriver>(
        &self,
        driver: &D,
        target: &str,
    ) -> ExtractionResult<Vec<DetailRecord>> {
        let anime = driver
            .wait_until_present(sel::TITLE, self.ready_timeout)
            .await?
            .text()
            .await?;

        let english_name = match driver.find_first(sel::ENGLISH_TITLE).await? {
            Some(element) => Some(element.text().await?),
            None => None,
        };

        let cover = match driver.find_first(sel::COVER).await? {
            Some(element) => element.attribute("src").await?.unwrap_or_default(),
            None => String::new(),
        };

        // data-user reads like "1,234,567 users"
        let review_count = driver
            .find(sel::SCORE)
            .await?
            .attribute("data-user")
            .await?
            .ok_or_else(|| ExtractionFailure::Malformed("score has no data-user".to_string()))?;
        let review_count = review_count.split(' ').next().unwrap_or_default();

        let score = driver.find(sel::SCORE_LABEL).await?.text().await?;
        let ranked = driver.find(sel::RANKED).await?.text().await?;
        let popularity = driver.find(sel::POPULARITY).await?.text().await?;
        let members = driver.find(sel::MEMBERS).await?.text().await?;
        let synopsis = driver.find(sel::SYNOPSIS).await?.text().await?;

        let mut genres = Vec::new();
        for genre in driver.find_all(sel::GENRE).await? {
            genres.push(genre.text_content().await?.trim().to_string());
        }

        let ranked = strip_label(&ranked, sel::RANKED_PREFIX_LEN);
        let popularity = strip_label(&popularity, sel::POPULARITY_PREFIX_LEN);
        let members = strip_label(&members, sel::MEMBERS_PREFIX_LEN);

        tracing::info!(
            "{} ({} @ {} reviews) #{}",
            anime,
            score,
            review_count,
            ranked
        );

        let keep_text = self.numbers_as_strings;
        Ok(vec![DetailRecord {
            anime,
            english_name,
            cover,
            anime_url: target.to_string(),
            score: score_field(&score, keep_text),
            reviews: count_field(review_count, keep_text),
            members: count_field(members, keep_text),
            ranking: count_field(ranked, keep_text),
            popularity: count_field(popularity, keep_text),
            synopsis: clean_synopsis(&synopsis),
            genres,
        }])
    }
}
