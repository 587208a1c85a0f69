//! SQLite-based output handler implementation
//!
//! This module records each crawl as a run in the SQLite database, together
//! with its page results.

use crate::crawler::CrawlReport;
use crate::output::traits::{OutputHandler, OutputResult};
use crate::storage::{open_storage, RunStatus, RunSummary, Storage};
use std::path::PathBuf;

/// SQLite-based output handler
///
/// Opens the database on every write, so one handler can be reused across
/// crawls without holding a connection.
#[derive(Debug, Clone)]
pub struct SqliteOutputHandler {
    path: PathBuf,
    config_hash: String,
}

impl SqliteOutputHandler {
    /// Creates a new SQLite output handler
    ///
    /// # Arguments
    ///
    /// * `path` - Database file; created if missing
    /// * `config_hash` - Hash of the configuration, stored with each run
    pub fn new(path: impl Into<PathBuf>, config_hash: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            config_hash: config_hash.into(),
        }
    }
}

impl OutputHandler for SqliteOutputHandler {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn write_results(&self, report: &CrawlReport) -> OutputResult<PathBuf> {
        let mut storage = open_storage(&self.path)?;

        let summary = RunSummary {
            seed_url: &report.seed,
            config_hash: &self.config_hash,
            started_at: report.started_at,
            finished_at: report.finished_at,
            status: RunStatus::from(report.status),
            visited_count: report.visited_count,
        };
        let run_id = storage.record_run(&summary, &report.results)?;

        tracing::debug!("Recorded run {} in {}", run_id, self.path.display());
        Ok(self.path.clone())
    }
}
