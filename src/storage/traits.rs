//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::state::ResultSet;
use crate::storage::{RunRecord, RunSummary};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid stored value: {0}")]
    InvalidValue(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// A run is written once, after the crawl, together with its page results.
pub trait Storage {
    // ===== Run Management =====

    /// Records a finished run and all of its page results
    ///
    /// The run row and every result are written in one transaction: on
    /// error nothing of the run is left in the database.
    ///
    /// # Arguments
    ///
    /// * `run` - Seed, configuration hash, timing, status and counters
    /// * `results` - Page results in discovery order
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn record_run(&mut self, run: &RunSummary<'_>, results: &ResultSet) -> StorageResult<i64>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    // ===== Results =====

    /// Loads all page results of a run, in the order they were stored
    fn load_results(&self, run_id: i64) -> StorageResult<ResultSet>;
}
