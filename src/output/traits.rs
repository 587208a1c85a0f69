//! Output handler traits and types
//!
//! This module defines the trait implemented by every result sink and the
//! errors they can report.

use crate::crawler::CrawlReport;
use crate::storage::StorageError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Trait for output handlers
///
/// A handler persists the results of one finished (or interrupted) crawl.
/// It only reads the report; a failing handler leaves it untouched.
pub trait OutputHandler {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Writes the report's results
    ///
    /// # Arguments
    ///
    /// * `report` - The crawl report to persist
    ///
    /// # Returns
    ///
    /// The path that was written
    fn write_results(&self, report: &CrawlReport) -> OutputResult<PathBuf>;
}
