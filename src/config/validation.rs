use crate::config::types::{
    Config, DetailConfig, DiscoveryConfig, DriverConfig, PoolConfig, ReviewConfig, TimeoutConfig,
};
use crate::ConfigError;
use url::Url;

/// Upper bound on workers; every worker owns a full browser process
const MAX_WORKERS: usize = 32;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_pool_config(&config.pool)?;
    validate_driver_config(&config.driver)?;
    validate_timeout_config(&config.timeouts)?;
    validate_detail_config(&config.details)?;
    validate_review_config(&config.reviews)?;
    validate_discovery_config(&config.discovery)?;
    Ok(())
}

fn validate_pool_config(config: &PoolConfig) -> Result<(), ConfigError> {
    if config.workers < 1 || config.workers > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and {}, got {}",
            MAX_WORKERS, config.workers
        )));
    }
    Ok(())
}

fn validate_driver_config(config: &DriverConfig) -> Result<(), ConfigError> {
    if config.window_width == 0 || config.window_height == 0 {
        return Err(ConfigError::Validation(format!(
            "window size must be non-zero, got {}x{}",
            config.window_width, config.window_height
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_timeout_config(config: &TimeoutConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("detail-ready-secs", config.detail_ready_secs),
        ("review-ready-secs", config.review_ready_secs),
        ("listing-ready-secs", config.listing_ready_secs),
        ("challenge-poll-ms", config.challenge_poll_ms),
    ] {
        if value == 0 {
            return Err(ConfigError::Validation(format!("{} must be > 0", name)));
        }
    }
    Ok(())
}

fn validate_detail_config(config: &DetailConfig) -> Result<(), ConfigError> {
    if config.retry_ceiling < 1 {
        return Err(ConfigError::Validation(
            "details.retry-ceiling must be >= 1".to_string(),
        ));
    }
    Ok(())
}

fn validate_review_config(config: &ReviewConfig) -> Result<(), ConfigError> {
    if config.retry_ceiling < 1 {
        return Err(ConfigError::Validation(
            "reviews.retry-ceiling must be >= 1".to_string(),
        ));
    }

    if config.page_limit < 1 {
        return Err(ConfigError::Validation(
            "reviews.page-limit must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_discovery_config(config: &DiscoveryConfig) -> Result<(), ConfigError> {
    if config.listing_pages < 1 {
        return Err(ConfigError::Validation(
            "discovery.listing-pages must be >= 1".to_string(),
        ));
    }

    if config.scrape_limit < 1 {
        return Err(ConfigError::Validation(
            "discovery.scrape-limit must be >= 1".to_string(),
        ));
    }

    for seed in &config.seeds {
        validate_seed_url(seed)?;
    }

    Ok(())
}

/// Checks that a listing seed is an absolute HTTP(S) URL
pub fn validate_seed_url(seed: &str) -> Result<(), ConfigError> {
    let url = Url::parse(seed)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' must use HTTP or HTTPS",
            seed
        )));
    }

    Ok(())
}
