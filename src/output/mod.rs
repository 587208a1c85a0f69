//! Output module for persisting crawl results
//!
//! This module handles:
//! - Structured JSON export, one object per page result
//! - Flattened CSV export, one row per context snippet
//! - Recording runs in an optional SQLite database

mod csv_output;
mod json;
mod sqlite_output;
mod traits;

pub use csv_output::{CsvOutput, CSV_HEADER};
pub use json::JsonOutput;
pub use sqlite_output::SqliteOutputHandler;
pub use traits::{OutputError, OutputHandler, OutputResult};

use crate::config::OutputConfig;
use crate::crawler::CrawlReport;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// Builds the file stem shared by all exports of one crawl
///
/// Format: `recon_{host}_{YYYYmmdd-HHMMSS}`
pub fn output_base_name(host: &str, at: DateTime<Utc>) -> String {
    let host: String = host
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect();
    format!("recon_{}_{}", host, at.format("%Y%m%d-%H%M%S"))
}

/// Builds the handlers enabled by the output configuration
///
/// # Arguments
///
/// * `report` - Used for the host and timestamp in file names
/// * `config` - Which sinks are enabled and where they write
/// * `config_hash` - Stored with the run in SQLite
pub fn build_handlers(
    report: &CrawlReport,
    config: &OutputConfig,
    config_hash: &str,
) -> Vec<Box<dyn OutputHandler>> {
    let directory = Path::new(&config.directory);
    let base = output_base_name(&report.seed_host(), report.started_at);

    let mut handlers: Vec<Box<dyn OutputHandler>> = Vec::new();
    if config.json {
        handlers.push(Box::new(JsonOutput::new(
            directory.join(format!("{}.json", base)),
        )));
    }
    if config.csv {
        handlers.push(Box::new(CsvOutput::new(
            directory.join(format!("{}.csv", base)),
        )));
    }
    if let Some(sqlite_path) = &config.sqlite_path {
        handlers.push(Box::new(SqliteOutputHandler::new(sqlite_path, config_hash)));
    }
    handlers
}

/// Writes the report through every enabled sink
///
/// With an empty result set nothing is written. The output directory is
/// created when needed. The first failing sink aborts the save; the report
/// itself is only read.
///
/// # Returns
///
/// * `Ok(paths)` - Paths that were written, possibly empty
/// * `Err(OutputError)` - A sink failed
pub fn save_results(
    report: &CrawlReport,
    config: &OutputConfig,
    config_hash: &str,
) -> OutputResult<Vec<PathBuf>> {
    if report.results.is_empty() {
        tracing::info!("No results to save");
        return Ok(Vec::new());
    }

    let handlers = build_handlers(report, config, config_hash);
    if handlers.is_empty() {
        tracing::warn!("All outputs are disabled; {} results not saved", report.result_count);
        return Ok(Vec::new());
    }

    std::fs::create_dir_all(&config.directory)?;

    let mut written = Vec::with_capacity(handlers.len());
    for handler in handlers {
        let path = handler.write_results(report)?;
        tracing::info!("Saved {} output to {}", handler.name(), path.display());
        written.push(path);
    }

    Ok(written)
}
