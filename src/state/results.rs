//! Findings and the per-crawl result set

use serde::{Deserialize, Serialize};

/// Keyword used for the synthetic e-mail finding
pub const EMAIL_KEYWORD: &str = "EMAIL";

/// Keyword used for the synthetic phone-number finding
pub const PHONE_KEYWORD: &str = "PHONE";

/// Matches of one keyword (or synthetic category) on one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// The configured keyword, or `EMAIL` / `PHONE`
    pub keyword: String,

    /// Total number of matches on the page
    pub occurrences: usize,

    /// Context snippets (keywords) or the matched strings (synthetic)
    pub contexts: Vec<String>,
}

/// A page that produced at least one finding
///
/// Built only through [`PageResult::new`], which refuses an empty finding
/// list, so every result in a [`ResultSet`] carries findings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult {
    pub url: String,
    pub title: String,
    pub findings: Vec<Finding>,
}

impl PageResult {
    /// Creates a page result, or `None` when there is nothing to report
    pub fn new(url: String, title: String, findings: Vec<Finding>) -> Option<Self> {
        if findings.is_empty() {
            return None;
        }
        Some(Self {
            url,
            title,
            findings,
        })
    }

    /// Returns the finding recorded for `keyword`, if any
    pub fn finding(&self, keyword: &str) -> Option<&Finding> {
        self.findings.iter().find(|f| f.keyword == keyword)
    }
}

/// Page results in discovery order
///
/// Append-only while the crawl runs; consumers only ever get shared access.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSet {
    results: Vec<PageResult>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a result at the end
    pub fn push(&mut self, result: PageResult) {
        self.results.push(result);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn as_slice(&self) -> &[PageResult] {
        &self.results
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PageResult> {
        self.results.iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a PageResult;
    type IntoIter = std::slice::Iter<'a, PageResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}
