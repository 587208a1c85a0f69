/// Page outcome definitions for tracking crawl progress
///
/// This module defines how the processing of a single popped URL ended.
use serde::Serialize;
use std::fmt;

/// Represents how the crawl finished with one URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageOutcome {
    // ===== Success States =====
    /// Page was fetched and produced at least one finding
    Matched,

    /// Page was fetched but produced no findings
    NoFindings,

    // ===== Skip States =====
    /// URL, or the page it redirected to, had already been visited
    AlreadyVisited,

    /// robots.txt disallows the URL (or a redirect target) for the chosen
    /// identity
    RobotsDenied,

    /// The URL redirected to another site
    OffSiteRedirect,

    // ===== Error States =====
    /// Every attempt ended with a non-200 status
    PermanentFailure,

    /// The last attempt ended with a network or timeout error
    TransientFailure,
}

impl PageOutcome {
    /// Stable string form used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Matched => "matched",
            Self::NoFindings => "no_findings",
            Self::AlreadyVisited => "already_visited",
            Self::RobotsDenied => "robots_denied",
            Self::OffSiteRedirect => "off_site_redirect",
            Self::PermanentFailure => "permanent_failure",
            Self::TransientFailure => "transient_failure",
        }
    }
}

impl fmt::Display for PageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
