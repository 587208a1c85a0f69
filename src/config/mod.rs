//! Configuration module
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use recon_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("recon.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, ExtractorConfig, FetcherConfig, IdentityConfig, OutputConfig,
    RobotsFallback, TargetConfig, DEFAULT_USER_AGENTS,
};

// Re-export parser functions
pub use parser::{
    hash_content, load_config, parse_config_file,
    parse_config_file_with_hash, parse_config_str,
};
pub use validation::validate;
