//! Robots.txt handling module
//!
//! This module fetches, parses and caches robots.txt per origin, and answers
//! whether a given identity may fetch a given URL.
//!
//! # Components
//!
//! - `RobotsRules`: the parsed rule groups
//! - `RobotsPolicy`: cached rules (or fallback) for one origin
//! - `PolitenessGate`: the cache plus the robots.txt fetch

mod cache;
mod parser;

pub use cache::RobotsPolicy;
pub use parser::{RobotsRules, RuleGroup};

use crate::config::{CrawlerConfig, FetcherConfig, RobotsFallback};
use crate::url::origin_key;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

/// Decides whether a URL may be fetched, caching robots.txt per origin
#[derive(Debug)]
pub struct PolitenessGate {
    client: Client,
    respect: bool,
    fallback: RobotsFallback,
    timeout: Duration,
    cache: HashMap<String, RobotsPolicy>,
}

impl PolitenessGate {
    /// Creates a gate
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP client used for robots.txt requests; it should follow
    ///   redirects
    /// * `crawler` - Supplies the robots toggle and fallback
    /// * `fetcher` - Supplies the robots.txt timeout
    pub fn new(client: Client, crawler: &CrawlerConfig, fetcher: &FetcherConfig) -> Self {
        Self {
            client,
            respect: crawler.respect_robots,
            fallback: crawler.robots_fallback,
            timeout: Duration::from_millis(fetcher.robots_timeout_ms),
            cache: HashMap::new(),
        }
    }

    /// Checks whether `identity` may fetch `url`
    ///
    /// The first reference to an origin fetches its robots.txt; later calls
    /// are answered from the cache. With robots compliance off this always
    /// returns true and never touches the network.
    pub async fn can_fetch(&mut self, identity: &str, url: &Url) -> bool {
        if !self.respect {
            return true;
        }

        let origin = origin_key(url);
        if !self.cache.contains_key(&origin) {
            let policy = self.fetch_policy(&origin, identity).await;
            self.cache.insert(origin.clone(), policy);
        }

        let path = request_path(url);
        match self.cache.get(&origin) {
            Some(policy) => policy.is_allowed(identity, &path),
            None => self.fallback == RobotsFallback::Allow,
        }
    }

    /// Number of origins with a cached policy
    pub fn cached_origins(&self) -> usize {
        self.cache.len()
    }

    async fn fetch_policy(&self, origin: &str, identity: &str) -> RobotsPolicy {
        let robots_url = format!("{}/robots.txt", origin);
        tracing::debug!("Fetching {}", robots_url);

        let response = self
            .client
            .get(&robots_url)
            .header(USER_AGENT, identity)
            .timeout(self.timeout)
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => return self.unavailable(&robots_url, &e.to_string()),
        };

        let status = response.status();
        if !status.is_success() {
            return self.unavailable(&robots_url, &format!("HTTP {}", status.as_u16()));
        }

        match response.text().await {
            Ok(body) => {
                let policy = RobotsPolicy::from_content(&body, self.fallback);
                tracing::debug!(
                    "Loaded {} ({} rule groups)",
                    robots_url,
                    policy.rules.as_ref().map_or(0, |r| r.groups().len())
                );
                policy
            }
            Err(e) => self.unavailable(&robots_url, &e.to_string()),
        }
    }

    fn unavailable(&self, robots_url: &str, reason: &str) -> RobotsPolicy {
        match self.fallback {
            RobotsFallback::Allow => tracing::warn!(
                "Could not retrieve {} ({}), allowing all paths",
                robots_url,
                reason
            ),
            RobotsFallback::Deny => tracing::warn!(
                "Could not retrieve {} ({}), denying the whole origin",
                robots_url,
                reason
            ),
        }
        RobotsPolicy::unavailable(self.fallback)
    }
}

/// Path plus query, the part of a URL robots rules are matched against
fn request_path(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::build_robots_client;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gate(respect: bool, fallback: RobotsFallback) -> PolitenessGate {
        let crawler = CrawlerConfig {
            respect_robots: respect,
            robots_fallback: fallback,
            ..CrawlerConfig::default()
        };
        PolitenessGate::new(Client::new(), &crawler, &FetcherConfig::default())
    }

    #[test]
    fn test_request_path() {
        let url = Url::parse("https://example.com/search?q=1").unwrap();
        assert_eq!(request_path(&url), "/search?q=1");
        let url = Url::parse("https://example.com/").unwrap();
        assert_eq!(request_path(&url), "/");
    }

    #[tokio::test]
    async fn test_robots_fetched_once_per_origin() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /admin"))
            .expect(1)
            .mount(&server)
            .await;

        let mut gate = gate(true, RobotsFallback::Allow);
        let base = Url::parse(&server.uri()).unwrap();

        assert!(gate.can_fetch("Bot", &base.join("/").unwrap()).await);
        assert!(!gate.can_fetch("Bot", &base.join("/admin").unwrap()).await);
        assert!(gate.can_fetch("Bot", &base.join("/page").unwrap()).await);
        assert_eq!(gate.cached_origins(), 1);
    }

    #[tokio::test]
    async fn test_missing_robots_fails_open() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let mut gate = gate(true, RobotsFallback::Allow);
        let url = Url::parse(&format!("{}/admin", server.uri())).unwrap();
        assert!(gate.can_fetch("Bot", &url).await);
        assert_eq!(gate.cached_origins(), 1);
    }

    #[tokio::test]
    async fn test_missing_robots_with_deny_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let mut gate = gate(true, RobotsFallback::Deny);
        let url = Url::parse(&format!("{}/", server.uri())).unwrap();
        assert!(!gate.can_fetch("Bot", &url).await);
    }

    #[tokio::test]
    async fn test_redirected_robots_is_followed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(301).insert_header("Location", "/rules.txt"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rules.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /admin"))
            .expect(1)
            .mount(&server)
            .await;

        let client = build_robots_client(&FetcherConfig::default()).unwrap();
        let mut gate = PolitenessGate::new(client, &CrawlerConfig::default(), &FetcherConfig::default());
        let base = Url::parse(&server.uri()).unwrap();

        assert!(!gate.can_fetch("Bot", &base.join("/admin").unwrap()).await);
        assert!(gate.can_fetch("Bot", &base.join("/page").unwrap()).await);
    }

    #[tokio::test]
    async fn test_ignore_robots_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /"))
            .expect(0)
            .mount(&server)
            .await;

        let mut gate = gate(false, RobotsFallback::Deny);
        let url = Url::parse(&format!("{}/anything", server.uri())).unwrap();
        assert!(gate.can_fetch("Bot", &url).await);
        assert_eq!(gate.cached_origins(), 0);
    }

    #[tokio::test]
    async fn test_unreachable_origin_uses_fallback() {
        // Nothing listens on port 9 (discard) in the test environment
        let mut gate = gate(true, RobotsFallback::Allow);
        let url = Url::parse("http://127.0.0.1:9/page").unwrap();
        assert!(gate.can_fetch("Bot", &url).await);
    }
}
