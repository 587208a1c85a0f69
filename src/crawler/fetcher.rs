//! HTTP fetcher implementation
//!
//! This module handles all page requests for the crawler, including:
//! - Building the HTTP clients
//! - Choosing a request identity per attempt
//! - Consulting the politeness gate before every request
//! - Following same-site redirects hop by hop
//! - Bounded retries with randomized backoff
//! - Outcome classification

use crate::config::{FetcherConfig, IdentityConfig};
use crate::crawler::identity::{IdentityPool, Jitter};
use crate::robots::PolitenessGate;
use crate::url::SiteScope;
use reqwest::header::{LOCATION, USER_AGENT};
use reqwest::redirect::Policy;
use reqwest::{Client, Response, StatusCode};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

/// Most redirect hops followed within one attempt
pub const MAX_REDIRECTS: usize = 10;

/// Redirect hops allowed when fetching robots.txt
const ROBOTS_MAX_REDIRECTS: usize = 5;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Page retrieved with HTTP 200
    Success {
        /// Page body content
        body: String,
        /// URL the body came from, after same-site redirects
        final_url: Url,
        /// HTTP status code
        status: u16,
        /// Attempts used, including this one
        attempts: u32,
    },

    /// robots.txt forbids `url` for the chosen identity
    ///
    /// `url` is the requested URL or a redirect target; nothing was sent to
    /// it.
    Denied {
        url: Url,
        /// The identity that was refused
        identity: String,
        /// Requests already sent for this fetch (earlier attempts or hops)
        requests: u32,
    },

    /// A redirect pointed outside the site; the target was not requested
    OffSite {
        location: Url,
        attempts: u32,
    },

    /// Last attempt ended with a network, timeout or body-read error
    TransientFailure {
        /// Error description
        error: String,
        /// Attempts used
        attempts: u32,
    },

    /// Last attempt ended with a non-200 status, or redirects looped or ran
    /// past [`MAX_REDIRECTS`]
    PermanentFailure {
        /// The HTTP status code
        status: u16,
        /// Attempts used
        attempts: u32,
    },
}

impl FetchResult {
    /// Returns true if at least one request was sent
    ///
    /// The crawl delay only applies after these results.
    pub fn touched_network(&self) -> bool {
        match self {
            Self::Denied { requests, .. } => *requests > 0,
            _ => true,
        }
    }
}

/// Outcome of one attempt
enum Attempt {
    Body { body: String, final_url: Url },
    Denied(Url),
    OffSite(Url),
    TooManyRedirects(StatusCode),
    Status(StatusCode),
    Error(String),
}

/// Builds the HTTP client for page requests
///
/// Redirects are not followed by the client: the fetcher follows them
/// itself so every hop passes the site scope and the politeness gate. The
/// user agent and the request timeout are set per request.
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(Duration::from_millis(config.request_timeout_ms))
        .redirect(Policy::none()) // Handle redirects manually
        .gzip(true)
        .brotli(true)
        .build()
}

/// Builds the HTTP client for robots.txt requests
///
/// robots.txt is commonly redirected (http to https, bare host to `www`),
/// so a short chain is followed here.
pub fn build_robots_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(Duration::from_millis(config.robots_timeout_ms))
        .redirect(Policy::limited(ROBOTS_MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Retrieves pages with retries, rotating identities
#[derive(Debug)]
pub struct Fetcher {
    client: Client,
    identities: IdentityPool,
    jitter: Jitter,
    config: FetcherConfig,
}

impl Fetcher {
    pub fn new(
        client: Client,
        identity: &IdentityConfig,
        config: &FetcherConfig,
        jitter: Jitter,
    ) -> Self {
        Self {
            client,
            identities: IdentityPool::new(identity),
            jitter,
            config: config.clone(),
        }
    }

    /// Fetches a URL
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | robots.txt denies the identity | Immediate → Denied, no request sent |
    /// | HTTP 200 | Success |
    /// | 3xx to a same-site URL | Follow the hop (gate checked again) |
    /// | 3xx to another site | Immediate → OffSite |
    /// | Redirect loop or more than 10 hops | Immediate → PermanentFailure |
    /// | Any other status | Next attempt, no backoff |
    /// | Network / timeout / body error | Backoff in `[min, max]`, next attempt |
    ///
    /// After `max_attempts` the last attempt decides between
    /// `PermanentFailure` and `TransientFailure`.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to fetch
    /// * `gate` - Politeness gate consulted with each attempt's identity
    /// * `scope` - Site that redirect targets must stay on
    pub async fn fetch(
        &mut self,
        url: &Url,
        gate: &mut PolitenessGate,
        scope: &SiteScope,
    ) -> FetchResult {
        let max_attempts = self.config.max_attempts.max(1);
        let mut requests = 0u32;
        let mut last = FetchResult::TransientFailure {
            error: "no attempt made".to_string(),
            attempts: 0,
        };

        for attempt in 1..=max_attempts {
            let identity = self.identities.pick(&mut self.jitter).to_string();

            match self
                .attempt(url, &identity, gate, scope, &mut requests)
                .await
            {
                Attempt::Body { body, final_url } => {
                    tracing::debug!("Fetched {} (attempt {}/{})", final_url, attempt, max_attempts);
                    return FetchResult::Success {
                        body,
                        final_url,
                        status: StatusCode::OK.as_u16(),
                        attempts: attempt,
                    };
                }
                Attempt::Denied(denied) => {
                    tracing::info!("Blocked by robots.txt: {}", denied);
                    return FetchResult::Denied {
                        url: denied,
                        identity,
                        requests,
                    };
                }
                Attempt::OffSite(location) => {
                    tracing::info!("{} redirects off-site to {}", url, location);
                    return FetchResult::OffSite {
                        location,
                        attempts: attempt,
                    };
                }
                Attempt::TooManyRedirects(status) => {
                    tracing::warn!("Redirect loop or chain too long from {}", url);
                    return FetchResult::PermanentFailure {
                        status: status.as_u16(),
                        attempts: attempt,
                    };
                }
                Attempt::Status(status) => {
                    tracing::warn!(
                        "HTTP {} for {} (attempt {}/{})",
                        status.as_u16(),
                        url,
                        attempt,
                        max_attempts
                    );
                    last = FetchResult::PermanentFailure {
                        status: status.as_u16(),
                        attempts: attempt,
                    };
                }
                Attempt::Error(error) => {
                    tracing::warn!(
                        "Request to {} failed (attempt {}/{}): {}",
                        url,
                        attempt,
                        max_attempts,
                        error
                    );
                    if attempt < max_attempts {
                        let delay = self.jitter.backoff(
                            Duration::from_millis(self.config.backoff_min_ms),
                            Duration::from_millis(self.config.backoff_max_ms),
                        );
                        tracing::debug!("Backing off {:?} before retrying {}", delay, url);
                        tokio::time::sleep(delay).await;
                    }
                    last = FetchResult::TransientFailure {
                        error,
                        attempts: attempt,
                    };
                }
            }
        }

        last
    }

    /// Runs one attempt, following same-site redirects
    async fn attempt(
        &self,
        url: &Url,
        identity: &str,
        gate: &mut PolitenessGate,
        scope: &SiteScope,
        requests: &mut u32,
    ) -> Attempt {
        let mut current = url.clone();
        let mut hops: HashSet<String> = HashSet::new();

        loop {
            if !gate.can_fetch(identity, &current).await {
                return Attempt::Denied(current);
            }

            *requests += 1;
            let response = self
                .client
                .get(current.as_str())
                .header(USER_AGENT, identity)
                .timeout(Duration::from_millis(self.config.request_timeout_ms))
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => return Attempt::Error(describe_error(&e)),
            };

            let status = response.status();
            if status.is_redirection() {
                let Some(target) = redirect_target(&current, &response) else {
                    return Attempt::Status(status);
                };
                if !scope.contains(&target) {
                    return Attempt::OffSite(target);
                }

                hops.insert(current.to_string());
                if hops.len() > MAX_REDIRECTS || hops.contains(target.as_str()) {
                    return Attempt::TooManyRedirects(status);
                }

                tracing::debug!("HTTP {} {} -> {}", status.as_u16(), current, target);
                current = target;
                continue;
            }

            if status != StatusCode::OK {
                return Attempt::Status(status);
            }

            return match response.text().await {
                Ok(body) => Attempt::Body {
                    body,
                    final_url: current,
                },
                Err(e) => Attempt::Error(describe_error(&e)),
            };
        }
    }
}

/// Resolves the `Location` of a redirect response against the request URL
///
/// Returns `None` when the header is missing, unreadable or not http(s).
fn redirect_target(from: &Url, response: &Response) -> Option<Url> {
    let location = response.headers().get(LOCATION)?.to_str().ok()?;
    let mut target = from.join(location).ok()?;
    target.set_fragment(None);
    matches!(target.scheme(), "http" | "https").then_some(target)
}

fn describe_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else {
        e.to_string()
    }
}
