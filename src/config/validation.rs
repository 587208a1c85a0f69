use crate::config::types::{
    Config, CrawlerConfig, ExtractorConfig, FetcherConfig, IdentityConfig, OutputConfig,
    TargetConfig,
};
use crate::url::normalize_url;
use crate::ConfigError;

/// Highest attempt budget accepted for a single URL
const MAX_ATTEMPTS_LIMIT: u32 = 10;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_target_config(&config.target)?;
    validate_crawler_config(&config.crawler)?;
    validate_fetcher_config(&config.fetcher)?;
    validate_identity_config(&config.identity)?;
    validate_extractor_config(&config.extractor)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the seed URL and keyword list
fn validate_target_config(config: &TargetConfig) -> Result<(), ConfigError> {
    validate_seed_url(&config.seed_url)?;

    for keyword in &config.keywords {
        if keyword.trim().is_empty() {
            return Err(ConfigError::Validation(
                "keywords cannot contain empty entries".to_string(),
            ));
        }
    }

    Ok(())
}

/// The seed must be an absolute http(s) URL with a host
fn validate_seed_url(seed: &str) -> Result<(), ConfigError> {
    if seed.is_empty() {
        return Err(ConfigError::Validation("seed-url is required".to_string()));
    }

    normalize_url(seed)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

    Ok(())
}

/// Validates crawler bounds
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    // max_depth >= 0 is always true for u32, so no check needed

    if config.max_urls < 1 {
        return Err(ConfigError::Validation(format!(
            "max-urls must be >= 1, got {}",
            config.max_urls
        )));
    }

    Ok(())
}

/// Validates retry and timeout settings
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 || config.max_attempts > MAX_ATTEMPTS_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max-attempts must be between 1 and {}, got {}",
            MAX_ATTEMPTS_LIMIT, config.max_attempts
        )));
    }

    if config.request_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "request-timeout-ms must be > 0".to_string(),
        ));
    }

    if config.robots_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "robots-timeout-ms must be > 0".to_string(),
        ));
    }

    if config.backoff_min_ms > config.backoff_max_ms {
        return Err(ConfigError::Validation(format!(
            "backoff-min-ms ({}) must not exceed backoff-max-ms ({})",
            config.backoff_min_ms, config.backoff_max_ms
        )));
    }

    Ok(())
}

/// Validates the identity pool
fn validate_identity_config(config: &IdentityConfig) -> Result<(), ConfigError> {
    if config.user_agents.is_empty() {
        return Err(ConfigError::Validation(
            "user-agents must contain at least one identity".to_string(),
        ));
    }

    if config.user_agents.iter().any(|ua| ua.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "user-agents cannot contain empty entries".to_string(),
        ));
    }

    Ok(())
}

/// Validates content search settings
fn validate_extractor_config(config: &ExtractorConfig) -> Result<(), ConfigError> {
    if config.max_contexts < 1 {
        return Err(ConfigError::Validation(format!(
            "max-contexts must be >= 1, got {}",
            config.max_contexts
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    if matches!(config.sqlite_path.as_deref(), Some("")) {
        return Err(ConfigError::Validation(
            "sqlite-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.target.seed_url = "https://example.com/".to_string();
        config
    }

    #[test]
    fn test_default_config_with_seed_is_valid() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_seed_url() {
        assert!(validate_seed_url("https://example.com").is_ok());
        assert!(validate_seed_url("http://127.0.0.1:8080/start").is_ok());

        assert!(validate_seed_url("").is_err());
        assert!(validate_seed_url("example.com").is_err());
        assert!(validate_seed_url("ftp://example.com").is_err());
        assert!(validate_seed_url("/relative/path").is_err());
    }

    #[test]
    fn test_empty_keyword_rejected() {
        let mut config = valid_config();
        config.target.keywords = vec!["ok".to_string(), "  ".to_string()];
        assert!(matches!(
            validate(&config).unwrap_err(),
            ConfigError::Validation(_)
        ));
    }

    #[test]
    fn test_zero_max_urls_rejected() {
        let mut config = valid_config();
        config.crawler.max_urls = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_attempt_bounds() {
        let mut config = valid_config();
        config.fetcher.max_attempts = 0;
        assert!(validate(&config).is_err());

        config.fetcher.max_attempts = MAX_ATTEMPTS_LIMIT + 1;
        assert!(validate(&config).is_err());

        config.fetcher.max_attempts = 1;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_backoff_window_must_be_ordered() {
        let mut config = valid_config();
        config.fetcher.backoff_min_ms = 500;
        config.fetcher.backoff_max_ms = 100;
        assert!(validate(&config).is_err());

        config.fetcher.backoff_max_ms = 500;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_identity_pool_required() {
        let mut config = valid_config();
        config.identity.user_agents.clear();
        assert!(validate(&config).is_err());

        config.identity.user_agents = vec!["".to_string()];
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_max_contexts_at_least_one() {
        let mut config = valid_config();
        config.extractor.max_contexts = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_empty_sqlite_path_rejected() {
        let mut config = valid_config();
        config.output.sqlite_path = Some(String::new());
        assert!(validate(&config).is_err());
    }
}
