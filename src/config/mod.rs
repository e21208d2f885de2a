//! Configuration module for anime-harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! All keys are optional; a missing file section means "use the defaults".
//!
//! # Example
//!
//! ```no_run
//! use anime_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Scraping with {} workers", config.pool.workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, DetailConfig, DiscoveryConfig, DriverConfig, DriverEngine, OutputConfig,
    PoolConfig, ReviewConfig, TimeoutConfig,
};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::{validate, validate_seed_url};
