//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The breadth-first frontier with its depth and URL budgets
//! - Identity rotation and backoff randomness
//! - HTTP fetching with retry and redirect handling
//! - HTML extraction of links and findings
//! - Overall crawl coordination

mod coordinator;
mod extractor;
mod fetcher;
mod frontier;
mod identity;

pub use coordinator::{CrawlReport, Crawler};
pub use extractor::{extract_page, ExtractedPage, KeywordMatcher};
pub use fetcher::{build_http_client, build_robots_client, FetchResult, Fetcher, MAX_REDIRECTS};
pub use frontier::{Admission, CrawlTask, Frontier};
pub use identity::{IdentityPool, Jitter};

use crate::config::Config;
use tokio_util::sync::CancellationToken;

/// Runs a complete crawl
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Normalize the seed and compile the keyword patterns
/// 2. Build the HTTP client and the politeness gate
/// 3. Crawl breadth first until the frontier or the URL budget runs out
/// 4. Return the report, partial if `cancel` fired
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `cancel` - Token that interrupts the crawl
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl finished or was interrupted
/// * `Err(ReconError)` - The crawler could not be set up
pub async fn crawl(config: Config, cancel: CancellationToken) -> crate::Result<CrawlReport> {
    let crawler = Crawler::new(config)?;
    Ok(crawler.run(cancel).await)
}
