use serde::Deserialize;

/// Browser identities rotated across requests when no list is configured
pub const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.0.3 Safari/605.1.15",
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:89.0) Gecko/20100101 Firefox/89.0",
];

/// Main configuration structure
///
/// Every section is optional in the TOML file; missing keys take the
/// defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub target: TargetConfig,
    pub crawler: CrawlerConfig,
    pub fetcher: FetcherConfig,
    pub identity: IdentityConfig,
    pub extractor: ExtractorConfig,
    pub output: OutputConfig,
}

/// What to crawl and what to look for
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Absolute http(s) URL the crawl starts from
    #[serde(rename = "seed-url")]
    pub seed_url: String,

    /// Keywords matched case-insensitively as whole words
    pub keywords: Vec<String>,
}

/// What to do with an origin whose robots.txt cannot be retrieved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RobotsFallback {
    /// Crawl as if robots.txt were empty (fail-open)
    #[default]
    Allow,
    /// Treat the whole origin as disallowed
    Deny,
}

/// Crawl bounds and politeness settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum link depth from the seed (the seed is depth 0)
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Maximum number of URLs visited or queued over the whole crawl
    #[serde(rename = "max-urls")]
    pub max_urls: usize,

    /// Pause between consecutive page requests (milliseconds)
    #[serde(rename = "delay-ms")]
    pub delay_ms: u64,

    /// Whether robots.txt is consulted at all
    #[serde(rename = "respect-robots")]
    pub respect_robots: bool,

    /// Policy applied when robots.txt is unreachable or not 2xx
    #[serde(rename = "robots-fallback")]
    pub robots_fallback: RobotsFallback,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 1,
            max_urls: 50,
            delay_ms: 1000,
            respect_robots: true,
            robots_fallback: RobotsFallback::Allow,
        }
    }
}

/// Retry and timeout settings for page retrieval
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Attempts per URL, counting the first one
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Timeout of a single page request (milliseconds)
    #[serde(rename = "request-timeout-ms")]
    pub request_timeout_ms: u64,

    /// Timeout of a robots.txt request (milliseconds)
    #[serde(rename = "robots-timeout-ms")]
    pub robots_timeout_ms: u64,

    /// Lower bound of the backoff after a transient failure (milliseconds)
    #[serde(rename = "backoff-min-ms")]
    pub backoff_min_ms: u64,

    /// Upper bound of the backoff after a transient failure (milliseconds)
    #[serde(rename = "backoff-max-ms")]
    pub backoff_max_ms: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            request_timeout_ms: 15_000,
            robots_timeout_ms: 5_000,
            backoff_min_ms: 1_000,
            backoff_max_ms: 3_000,
        }
    }
}

/// User-agent identities presented to servers
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Pool of user-agent strings
    #[serde(rename = "user-agents")]
    pub user_agents: Vec<String>,

    /// Pick a random identity per attempt instead of always the first
    pub rotate: bool,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            user_agents: DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect(),
            rotate: true,
        }
    }
}

/// Content search settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Characters of context kept on each side of a keyword match
    #[serde(rename = "context-window")]
    pub context_window: usize,

    /// Maximum number of context snippets per keyword
    #[serde(rename = "max-contexts")]
    pub max_contexts: usize,

    /// Title recorded for pages without a `<title>`
    #[serde(rename = "untitled-placeholder")]
    pub untitled_placeholder: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            context_window: 30,
            max_contexts: 5,
            untitled_placeholder: "Untitled".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving the result files
    pub directory: String,

    /// Write the structured JSON export
    pub json: bool,

    /// Write the flattened CSV export
    pub csv: bool,

    /// Optional SQLite database recording every run
    #[serde(rename = "sqlite-path")]
    pub sqlite_path: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "results".to_string(),
            json: true,
            csv: true,
            sqlite_path: None,
        }
    }
}
