//! Flattened CSV export of crawl results

use crate::crawler::CrawlReport;
use crate::output::traits::{OutputHandler, OutputResult};
use std::path::{Path, PathBuf};

/// Column names of the CSV export
pub const CSV_HEADER: [&str; 5] = ["URL", "Title", "Keyword", "Occurrences", "Context"];

/// Writes one row per (page, finding, context)
///
/// A finding without contexts still gets one row, with an empty context.
#[derive(Debug, Clone)]
pub struct CsvOutput {
    path: PathBuf,
}

impl CsvOutput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OutputHandler for CsvOutput {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn write_results(&self, report: &CrawlReport) -> OutputResult<PathBuf> {
        let mut writer = csv::Writer::from_path(&self.path)?;
        writer.write_record(CSV_HEADER)?;

        for result in &report.results {
            for finding in &result.findings {
                let occurrences = finding.occurrences.to_string();
                if finding.contexts.is_empty() {
                    writer.write_record([
                        result.url.as_str(),
                        result.title.as_str(),
                        finding.keyword.as_str(),
                        occurrences.as_str(),
                        "",
                    ])?;
                    continue;
                }
                for context in &finding.contexts {
                    writer.write_record([
                        result.url.as_str(),
                        result.title.as_str(),
                        finding.keyword.as_str(),
                        occurrences.as_str(),
                        context.as_str(),
                    ])?;
                }
            }
        }

        writer.flush()?;
        Ok(self.path.clone())
    }
}
