//! Request identities and randomness
//!
//! Every random choice the crawler makes (which user agent to present, how
//! long to back off) goes through a [`Jitter`] source, so tests can pin the
//! sequence with a fixed seed.

use crate::config::IdentityConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

/// Source of randomness for identity choice and backoff
#[derive(Debug, Clone)]
pub struct Jitter {
    rng: StdRng,
}

impl Jitter {
    /// Creates a jitter source seeded from the operating system
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Creates a deterministic jitter source
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Picks an index in `0..len`
    ///
    /// Returns 0 when `len` is 0 or 1.
    pub fn pick_index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        self.rng.random_range(0..len)
    }

    /// Draws a backoff duration uniformly from `[min, max]`
    ///
    /// # Arguments
    ///
    /// * `min` - Lower bound, inclusive
    /// * `max` - Upper bound, inclusive; clamped up to `min` if smaller
    pub fn backoff(&mut self, min: Duration, max: Duration) -> Duration {
        let min_ms = min.as_millis() as u64;
        let max_ms = (max.as_millis() as u64).max(min_ms);
        Duration::from_millis(self.rng.random_range(min_ms..=max_ms))
    }
}

impl Default for Jitter {
    fn default() -> Self {
        Self::from_entropy()
    }
}

/// Pool of user-agent strings presented to servers
#[derive(Debug, Clone)]
pub struct IdentityPool {
    user_agents: Vec<String>,
    rotate: bool,
}

impl IdentityPool {
    pub fn new(config: &IdentityConfig) -> Self {
        Self {
            user_agents: config.user_agents.clone(),
            rotate: config.rotate,
        }
    }

    /// Chooses the identity for the next request
    ///
    /// Random when rotation is on, otherwise always the first entry. An empty
    /// pool yields an empty string; validation rejects such configs.
    pub fn pick(&self, jitter: &mut Jitter) -> &str {
        let index = if self.rotate {
            jitter.pick_index(self.user_agents.len())
        } else {
            0
        };
        self.user_agents
            .get(index)
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.user_agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.user_agents.is_empty()
    }
}
