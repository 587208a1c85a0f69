//! Per-origin robots.txt policy cache entries

use crate::config::RobotsFallback;
use crate::robots::RobotsRules;
use chrono::{DateTime, Utc};

/// Cached robots.txt policy for one origin
///
/// Created on the first reference to the origin and never replaced for the
/// rest of the crawl.
#[derive(Debug, Clone)]
pub struct RobotsPolicy {
    /// Whether robots.txt was retrieved with a success status
    pub fetched: bool,

    /// Parsed rules; `None` when the fetch failed and the fallback applies
    pub rules: Option<RobotsRules>,

    /// Decision used when `rules` is `None`
    pub fallback: RobotsFallback,

    /// When the robots.txt was requested
    pub fetched_at: DateTime<Utc>,
}

impl RobotsPolicy {
    /// Creates a policy from retrieved robots.txt content
    pub fn from_content(content: &str, fallback: RobotsFallback) -> Self {
        Self {
            fetched: true,
            rules: Some(RobotsRules::parse(content)),
            fallback,
            fetched_at: Utc::now(),
        }
    }

    /// Creates a policy for an origin whose robots.txt could not be retrieved
    pub fn unavailable(fallback: RobotsFallback) -> Self {
        Self {
            fetched: false,
            rules: None,
            fallback,
            fetched_at: Utc::now(),
        }
    }

    /// Checks whether `identity` may fetch `path` under this policy
    pub fn is_allowed(&self, identity: &str, path: &str) -> bool {
        match &self.rules {
            Some(rules) => rules.is_allowed(identity, path),
            None => self.fallback == RobotsFallback::Allow,
        }
    }
}
