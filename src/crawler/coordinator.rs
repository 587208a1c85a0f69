//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that drives every other component:
//! - Popping tasks from the frontier in breadth-first order
//! - Fetching through the politeness gate
//! - Extracting findings and enqueuing same-site links
//! - Pausing between requests
//! - Stopping promptly on cancellation with a partial report

use crate::config::Config;
use crate::crawler::extractor::{extract_page, KeywordMatcher};
use crate::crawler::fetcher::{build_http_client, build_robots_client, FetchResult, Fetcher};
use crate::crawler::frontier::{CrawlTask, Frontier};
use crate::crawler::identity::Jitter;
use crate::robots::PolitenessGate;
use crate::state::{CrawlState, CrawlStats, CrawlStatus, PageOutcome, PageResult, ResultSet};
use crate::url::SiteScope;
use crate::ReconError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// How often a progress line is logged, in processed URLs
const PROGRESS_INTERVAL: usize = 10;

/// What a finished (or interrupted) crawl hands back to its caller
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub status: CrawlStatus,

    /// Seed URL as configured, fragment removed
    pub seed: String,

    /// Number of distinct URLs popped for processing
    pub visited_count: usize,

    /// Number of pages that produced findings
    pub result_count: usize,

    pub results: ResultSet,
    pub stats: CrawlStats,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlReport {
    /// Host of the seed URL, used to name output files
    pub fn seed_host(&self) -> String {
        url::Url::parse(&self.seed)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// Wall-clock duration of the crawl
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Main crawler structure
///
/// Owns every piece of crawl state; one `Crawler` runs one crawl.
pub struct Crawler {
    config: Config,
    seed: CrawlTask,
    scope: SiteScope,
    matcher: KeywordMatcher,
    fetcher: Fetcher,
    gate: PolitenessGate,
    state: CrawlState,
}

impl Crawler {
    /// Creates a crawler with OS-seeded randomness
    ///
    /// # Arguments
    ///
    /// * `config` - A validated configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to run
    /// * `Err(ReconError)` - Bad seed URL, bad keyword pattern or HTTP client failure
    pub fn new(config: Config) -> Result<Self, ReconError> {
        Self::with_jitter(config, Jitter::from_entropy())
    }

    /// Creates a crawler with a caller-supplied randomness source
    pub fn with_jitter(config: Config, jitter: Jitter) -> Result<Self, ReconError> {
        let seed = CrawlTask::new(&config.target.seed_url, 0)?;
        let scope = SiteScope::from_seed(&seed.url)?;
        let matcher = KeywordMatcher::new(&config.target.keywords)?;

        let gate = PolitenessGate::new(
            build_robots_client(&config.fetcher)?,
            &config.crawler,
            &config.fetcher,
        );
        let fetcher = Fetcher::new(
            build_http_client(&config.fetcher)?,
            &config.identity,
            &config.fetcher,
            jitter,
        );

        let frontier = Frontier::new(config.crawler.max_depth, config.crawler.max_urls);

        Ok(Self {
            config,
            seed,
            scope,
            matcher,
            fetcher,
            gate,
            state: CrawlState::new(frontier),
        })
    }

    /// Runs the crawl to completion or until `cancel` fires
    ///
    /// # Crawl Loop
    ///
    /// 1. Pop the next task; stop when the frontier is empty or the URL budget is spent
    /// 2. Skip it if already visited, otherwise mark it visited
    /// 3. Fetch it (the politeness gate is consulted per request, redirects
    ///    included)
    /// 4. On success, extract findings and enqueue links at depth + 1
    /// 5. Pause for the configured delay if a request was sent
    ///
    /// The fetch and the delay are both raced against the token, so
    /// cancellation takes effect without waiting for either.
    pub async fn run(mut self, cancel: CancellationToken) -> CrawlReport {
        let started_at = Utc::now();
        self.state.status = CrawlStatus::Running;

        tracing::info!(
            "Starting crawl of {} (max depth {}, max URLs {}, {} keywords)",
            self.seed.url,
            self.config.crawler.max_depth,
            self.config.crawler.max_urls,
            self.matcher.len()
        );

        let seed = self.seed.clone();
        self.state.frontier.push(seed, &self.state.visited);

        let delay = Duration::from_millis(self.config.crawler.delay_ms);
        let mut processed = 0usize;

        while self.state.has_budget() {
            if cancel.is_cancelled() {
                self.state.status = CrawlStatus::Interrupted;
                break;
            }

            let Some(task) = self.state.frontier.pop() else {
                break;
            };

            if !self.state.visited.mark(task.key()) {
                tracing::debug!("Already visited: {}", task.url);
                self.state.stats.record(PageOutcome::AlreadyVisited);
                continue;
            }

            tracing::debug!("Processing {} (depth {})", task.url, task.depth);

            let fetched = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    self.state.status = CrawlStatus::Interrupted;
                    break;
                }
                result = self.fetcher.fetch(&task.url, &mut self.gate, &self.scope) => result,
            };

            let touched_network = fetched.touched_network();
            let outcome = self.process(&task, fetched);
            tracing::debug!("{} -> {}", task.url, outcome);
            self.state.stats.record(outcome);
            processed += 1;

            if processed % PROGRESS_INTERVAL == 0 {
                tracing::info!(
                    "Progress: {} URLs visited, {} queued, {} results",
                    self.state.visited.len(),
                    self.state.frontier.len(),
                    self.state.results.len()
                );
            }

            if touched_network
                && !delay.is_zero()
                && !self.state.frontier.is_empty()
                && self.state.has_budget()
            {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        self.state.status = CrawlStatus::Interrupted;
                        break;
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }

        if self.state.status == CrawlStatus::Running {
            self.state.status = CrawlStatus::Completed;
        }

        let report = CrawlReport {
            status: self.state.status,
            seed: self.seed.url.to_string(),
            visited_count: self.state.visited.len(),
            result_count: self.state.results.len(),
            results: self.state.results,
            stats: self.state.stats,
            started_at,
            finished_at: Utc::now(),
        };

        tracing::info!(
            "Crawl {}: {} URLs visited, {} results found in {}s ({} robots.txt origins)",
            report.status.as_str(),
            report.visited_count,
            report.result_count,
            report.elapsed().num_seconds(),
            self.gate.cached_origins()
        );

        report
    }

    /// Turns a fetch result into findings and new frontier entries
    fn process(&mut self, task: &CrawlTask, fetched: FetchResult) -> PageOutcome {
        let (body, page_url) = match fetched {
            FetchResult::Success {
                body, final_url, ..
            } => (body, final_url),
            FetchResult::Denied { .. } => return PageOutcome::RobotsDenied,
            FetchResult::OffSite { .. } => return PageOutcome::OffSiteRedirect,
            FetchResult::PermanentFailure { status, attempts } => {
                tracing::warn!(
                    "Giving up on {} after {} attempts (HTTP {})",
                    task.url,
                    attempts,
                    status
                );
                return PageOutcome::PermanentFailure;
            }
            FetchResult::TransientFailure { error, attempts } => {
                tracing::warn!(
                    "Giving up on {} after {} attempts: {}",
                    task.url,
                    attempts,
                    error
                );
                return PageOutcome::TransientFailure;
            }
        };

        // A redirect landing counts as visited, so the same page is never
        // fetched or reported twice
        if page_url != task.url {
            match CrawlTask::from_url(page_url.clone(), task.depth) {
                Ok(landing) if landing.key() != task.key() => {
                    if !self.state.visited.mark(landing.key()) {
                        tracing::debug!("{} redirected to visited {}", task.url, page_url);
                        return PageOutcome::AlreadyVisited;
                    }
                }
                _ => {}
            }
        }

        let page = extract_page(
            &body,
            &page_url,
            &self.scope,
            &self.matcher,
            &self.config.extractor,
        );

        self.state.stats.links_discovered += page.links.len();
        if task.depth < self.state.frontier.max_depth() {
            for link in page.links {
                let Ok(child) = CrawlTask::from_url(link, task.depth + 1) else {
                    continue;
                };
                if self.state.frontier.push(child, &self.state.visited).is_queued() {
                    self.state.stats.links_enqueued += 1;
                }
            }
        }

        let finding_count = page.findings.len();
        match PageResult::new(page_url.to_string(), page.title, page.findings) {
            Some(result) => {
                tracing::info!("Found {} findings on {}", finding_count, page_url);
                self.state.record_result(result);
                PageOutcome::Matched
            }
            None => PageOutcome::NoFindings,
        }
    }
}
