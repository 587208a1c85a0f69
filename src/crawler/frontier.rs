//! Frontier of pending crawl tasks
//!
//! This module handles:
//! - FIFO ordering of URLs to crawl, which yields breadth-first traversal
//! - Deduplication against both queued and visited URLs
//! - The depth bound and the global URL budget

use crate::state::VisitedSet;
use crate::url::normalize_parsed;
use crate::UrlError;
use std::collections::{HashSet, VecDeque};
use url::Url;

/// A URL waiting to be crawled, with its link distance from the seed
///
/// The URL is kept as discovered (minus its fragment) for fetching, link
/// resolution and robots matching; only the key is normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    /// URL to fetch
    pub url: Url,

    /// Number of links followed from the seed (seed = 0)
    pub depth: u32,

    key: String,
}

impl CrawlTask {
    /// Creates a task from a URL string
    pub fn new(url: &str, depth: u32) -> Result<Self, UrlError> {
        let url = Url::parse(url).map_err(|e| UrlError::Parse(e.to_string()))?;
        Self::from_url(url, depth)
    }

    /// Creates a task from an already parsed URL
    ///
    /// Fails for anything that is not an http(s) URL with a host.
    pub fn from_url(mut url: Url, depth: u32) -> Result<Self, UrlError> {
        url.set_fragment(None);
        let key = normalize_parsed(url.clone())?.to_string();
        Ok(Self { url, depth, key })
    }

    /// Normalized form of the URL, used for deduplication
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Result of offering a task to the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Task appended to the back of the queue
    Queued,
    /// URL was already visited
    AlreadyVisited,
    /// URL is already waiting in the queue
    AlreadyQueued,
    /// Visited plus queued URLs already reach the budget
    BudgetExhausted,
    /// Task depth exceeds the maximum depth
    TooDeep,
}

impl Admission {
    pub fn is_queued(&self) -> bool {
        matches!(self, Self::Queued)
    }
}

/// Deduplicating, bounded FIFO queue of crawl tasks
///
/// Links are pushed only after their parent page is processed and always at
/// the back, so every depth-d task is popped before any depth-(d+1) task it
/// led to.
#[derive(Debug)]
pub struct Frontier {
    queue: VecDeque<CrawlTask>,

    /// Keys of everything currently in `queue`
    queued: HashSet<String>,

    max_depth: u32,
    max_urls: usize,
}

impl Frontier {
    /// Creates an empty frontier
    ///
    /// # Arguments
    ///
    /// * `max_depth` - Deepest task depth accepted
    /// * `max_urls` - Upper bound on visited plus queued URLs
    pub fn new(max_depth: u32, max_urls: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            queued: HashSet::new(),
            max_depth,
            max_urls,
        }
    }

    /// Offers a task to the frontier
    ///
    /// The task is rejected if it is too deep, already visited or queued, or
    /// if visited plus queued URLs have reached the budget.
    pub fn push(&mut self, task: CrawlTask, visited: &VisitedSet) -> Admission {
        if task.depth > self.max_depth {
            return Admission::TooDeep;
        }

        if visited.contains(task.key()) {
            return Admission::AlreadyVisited;
        }

        if self.queued.contains(task.key()) {
            return Admission::AlreadyQueued;
        }

        if visited.len() + self.queue.len() >= self.max_urls {
            return Admission::BudgetExhausted;
        }

        tracing::trace!("Queued {} at depth {}", task.url, task.depth);
        self.queued.insert(task.key().to_string());
        self.queue.push_back(task);
        Admission::Queued
    }

    /// Removes and returns the earliest-pushed task
    pub fn pop(&mut self) -> Option<CrawlTask> {
        let task = self.queue.pop_front()?;
        self.queued.remove(task.key());
        Some(task)
    }

    /// Returns the number of queued tasks
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns whether the frontier is empty
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn max_urls(&self) -> usize {
        self.max_urls
    }
}
