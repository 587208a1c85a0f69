//! JSON export of crawl results

use crate::crawler::CrawlReport;
use crate::output::traits::{OutputHandler, OutputResult};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes the result set as a pretty-printed JSON array
///
/// Each element is one page result:
/// `{"url": ..., "title": ..., "findings": [{"keyword", "occurrences", "contexts"}]}`.
#[derive(Debug, Clone)]
pub struct JsonOutput {
    path: PathBuf,
}

impl JsonOutput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OutputHandler for JsonOutput {
    fn name(&self) -> &'static str {
        "json"
    }

    fn write_results(&self, report: &CrawlReport) -> OutputResult<PathBuf> {
        let mut writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(&mut writer, &report.results)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(self.path.clone())
    }
}
