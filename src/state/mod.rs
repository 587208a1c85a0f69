//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: everything the controller mutates during a crawl
//! - `PageOutcome`: how processing of a single URL ended
//! - `PageResult` / `Finding`: what a page yielded, collected in a `ResultSet`

mod crawl_state;
mod page_state;
mod results;

// Re-export main types
pub use crawl_state::{CrawlState, CrawlStats, CrawlStatus, VisitedSet};
pub use page_state::PageOutcome;
pub use results::{Finding, PageResult, ResultSet, EMAIL_KEYWORD, PHONE_KEYWORD};
