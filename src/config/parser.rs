use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use recon_crawler::config::load_config;
///
/// let config = load_config(Path::new("recon.toml")).unwrap();
/// println!("Max depth: {}", config.crawler.max_depth);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let config = parse_config_file(path)?;
    validate(&config)?;
    Ok(config)
}

/// Reads and parses a configuration file without validating it
///
/// Callers that layer command-line overrides on top of the file use this,
/// then validate the merged result.
pub fn parse_config_file(path: &Path) -> Result<Config, ConfigError> {
    parse_config_file_with_hash(path).map(|(config, _)| config)
}

/// Reads a configuration file once, returning the parsed config and its hash
///
/// Like [`parse_config_file`], the result is not validated.
///
/// # Returns
///
/// * `Ok((Config, String))` - The config and the hex SHA-256 of the file
/// * `Err(ConfigError)` - Failed to read or parse the file
pub fn parse_config_file_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config_str(&content)?;
    Ok((config, hash_content(&content)))
}

/// Parses configuration from a TOML string without validating it
pub fn parse_config_str(content: &str) -> Result<Config, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Hex-encoded SHA-256 of configuration text
///
/// The hash is stored alongside each run so results can be traced back to
/// the exact configuration that produced them.
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
