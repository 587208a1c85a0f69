//! Storage module for persisting crawl runs
//!
//! This module records every crawl run and its results in SQLite:
//! - Schema management
//! - Run tracking with status, seed and configuration hash
//! - Page results, findings and context snippets

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::state::CrawlStatus;
use chrono::{DateTime, Utc};
use std::path::Path;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(StorageError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> StorageResult<SqliteStorage> {
    SqliteStorage::new(path)
}

/// What is known about a crawl when it is recorded
#[derive(Debug, Clone, Copy)]
pub struct RunSummary<'a> {
    pub seed_url: &'a str,
    pub config_hash: &'a str,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub status: RunStatus,
    pub visited_count: usize,
}

/// Represents a crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub seed_url: String,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    pub visited_count: u64,
    pub result_count: u64,
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Interrupted,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Interrupted => "interrupted",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "interrupted" => Some(Self::Interrupted),
            _ => None,
        }
    }
}

impl From<CrawlStatus> for RunStatus {
    fn from(status: CrawlStatus) -> Self {
        match status {
            CrawlStatus::Idle | CrawlStatus::Running => Self::Running,
            CrawlStatus::Completed => Self::Completed,
            CrawlStatus::Interrupted => Self::Interrupted,
        }
    }
}
