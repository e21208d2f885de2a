//! anime-harvest: a browser-driven anime metadata and review scraper
//!
//! This crate splits a list of target pages across a fixed pool of workers, drives
//! one browser session per worker through its share of the pages, extracts
//! normalized records, and exports the merged result as JSON.

pub mod config;
pub mod constants;
pub mod discovery;
pub mod driver;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod pool;
pub mod traversal;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for anime-harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Driver error: {0}")]
    Driver(#[from] driver::DriverError),

    #[error("Input file not found: {}", path.display())]
    MissingInput { path: PathBuf },

    #[error("Failed to parse {}: {source}", path.display())]
    InvalidInput {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for anime-harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use extract::{DetailRecord, ReviewRecord};
pub use output::{export, format_size, Export};
pub use pool::{partition, WorkerPool};
