//! Mutable state of one crawl
//!
//! Everything the controller mutates between iterations lives in a single
//! [`CrawlState`] value: the visited set, the frontier, the result set and
//! the running counters.

use crate::crawler::Frontier;
use crate::state::{PageOutcome, PageResult, ResultSet};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Lifecycle of a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlStatus {
    Idle,
    Running,
    /// Frontier drained or URL budget spent
    Completed,
    /// Stopped by a cancellation signal; results are partial
    Interrupted,
}

impl CrawlStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Completed | Self::Interrupted)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Interrupted => "interrupted",
        }
    }
}

/// Normalized URLs that have been popped for processing
///
/// Grows monotonically; a URL is marked at most once.
#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    urls: HashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `url` as visited
    ///
    /// Returns false if it was already marked, so check and mark happen in
    /// one step.
    pub fn mark(&mut self, url: &str) -> bool {
        self.urls.insert(url.to_string())
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// Counters collected while crawling
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlStats {
    /// Pages whose body was retrieved
    pub pages_fetched: usize,

    /// Pages that produced a result
    pub pages_with_findings: usize,

    /// URLs given up on after exhausting their attempts
    pub fetch_failures: usize,

    /// URLs skipped because robots.txt disallowed them
    pub robots_denied: usize,

    /// URLs whose redirect pointed to another site
    pub offsite_redirects: usize,

    /// Popped URLs that had already been visited
    pub duplicates_skipped: usize,

    /// Same-site links found across all pages
    pub links_discovered: usize,

    /// Links accepted into the frontier
    pub links_enqueued: usize,
}

impl CrawlStats {
    /// Counts the outcome of one popped URL
    pub fn record(&mut self, outcome: PageOutcome) {
        match outcome {
            PageOutcome::Matched => {
                self.pages_fetched += 1;
                self.pages_with_findings += 1;
            }
            PageOutcome::NoFindings => self.pages_fetched += 1,
            PageOutcome::AlreadyVisited => self.duplicates_skipped += 1,
            PageOutcome::RobotsDenied => self.robots_denied += 1,
            PageOutcome::OffSiteRedirect => self.offsite_redirects += 1,
            PageOutcome::PermanentFailure | PageOutcome::TransientFailure => {
                self.fetch_failures += 1
            }
        }
    }
}

/// All state owned by the crawl controller
#[derive(Debug)]
pub struct CrawlState {
    pub status: CrawlStatus,
    pub visited: VisitedSet,
    pub frontier: Frontier,
    pub results: ResultSet,
    pub stats: CrawlStats,
}

impl CrawlState {
    /// Creates an idle state around an empty frontier
    pub fn new(frontier: Frontier) -> Self {
        Self {
            status: CrawlStatus::Idle,
            visited: VisitedSet::new(),
            frontier,
            results: ResultSet::new(),
            stats: CrawlStats::default(),
        }
    }

    /// Returns true while the URL budget allows another visit
    pub fn has_budget(&self) -> bool {
        self.visited.len() < self.frontier.max_urls()
    }

    /// Appends a page result at the end of the result set
    pub fn record_result(&mut self, result: PageResult) {
        self.results.push(result);
    }
}
