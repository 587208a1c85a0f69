//! Content extraction for fetched pages
//!
//! This module turns raw HTML into:
//! - The page title (or a placeholder)
//! - Same-site links to follow
//! - Findings: keyword matches with context, plus e-mail and phone detectors
//!
//! Extraction is synchronous and deterministic; the parsed document never
//! outlives [`extract_page`], so it is never held across an await point.

use crate::config::ExtractorConfig;
use crate::state::{Finding, EMAIL_KEYWORD, PHONE_KEYWORD};
use crate::url::{normalize_parsed, SiteScope};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Node, Selector};
use std::collections::HashSet;
use url::Url;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("valid email regex")
});

static PHONE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\+?[0-9]{1,4}?[-.\s]?\(?[0-9]{1,3}?\)?[-.\s]?[0-9]{1,4}[-.\s]?[0-9]{1,4}[-.\s]?[0-9]{1,9}",
    )
    .expect("valid phone regex")
});

/// Phone candidates outside this digit count are discarded
const PHONE_DIGITS_MIN: usize = 7;
const PHONE_DIGITS_MAX: usize = 15;

/// Elements whose text is not visible on the rendered page
const HIDDEN_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Everything extracted from one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPage {
    /// Trimmed `<title>` text or the configured placeholder
    pub title: String,

    /// Same-site links resolved against the page URL, fragments removed,
    /// deduplicated on their normalized form, in document order
    pub links: Vec<Url>,

    /// Keyword findings in configuration order, then `EMAIL`, then `PHONE`
    pub findings: Vec<Finding>,
}

/// Case-insensitive whole-word matchers, compiled once per crawl
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    patterns: Vec<(String, Regex)>,
}

impl KeywordMatcher {
    /// Compiles one pattern per keyword
    ///
    /// Keywords are trimmed and empty entries skipped; regex metacharacters
    /// in keywords match literally.
    pub fn new(keywords: &[String]) -> Result<Self, regex::Error> {
        let mut patterns = Vec::with_capacity(keywords.len());
        for keyword in keywords {
            let keyword = keyword.trim();
            if keyword.is_empty() {
                continue;
            }
            let regex = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(keyword)))?;
            patterns.push((keyword.to_string(), regex));
        }
        Ok(Self { patterns })
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Extracts title, links and findings from an HTML page
///
/// # Arguments
///
/// * `html` - The page body
/// * `page_url` - URL the page was fetched from, used to resolve links
/// * `scope` - Site links must belong to
/// * `matcher` - Compiled keyword patterns
/// * `config` - Context window, context cap and title placeholder
pub fn extract_page(
    html: &str,
    page_url: &Url,
    scope: &SiteScope,
    matcher: &KeywordMatcher,
    config: &ExtractorConfig,
) -> ExtractedPage {
    let document = Html::parse_document(html);

    let title =
        extract_title(&document).unwrap_or_else(|| config.untitled_placeholder.clone());
    let links = extract_links(&document, page_url, scope);
    let text = visible_text(&document);
    let findings = search_text(&text, matcher, config);

    ExtractedPage {
        title,
        links,
        findings,
    }
}

/// Extracts the trimmed page title, if present and non-empty
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extracts same-site links from `<a href>` elements
///
/// # Link Extraction Rules
///
/// **Skipped:**
/// - Empty and fragment-only hrefs
/// - `javascript:`, `mailto:`, `tel:` and `data:` references
/// - `<a ... download>` anchors
/// - Unparseable or non-http(s) results
/// - Links whose host or port differs from the site's
fn extract_links(document: &Html, page_url: &Url, scope: &SiteScope) -> Vec<Url> {
    let mut links = Vec::new();
    let mut seen = HashSet::new();

    let Ok(a_selector) = Selector::parse("a[href]") else {
        return links;
    };

    for element in document.select(&a_selector) {
        if element.value().attr("download").is_some() {
            continue;
        }

        let Some((link, key)) = element
            .value()
            .attr("href")
            .and_then(|href| resolve_link(href, page_url))
        else {
            continue;
        };

        if !scope.contains(&link) {
            continue;
        }

        if seen.insert(key) {
            links.push(link);
        }
    }

    links
}

/// Resolves an href against the page URL
///
/// Returns the absolute URL without its fragment, plus its normalized form
/// for deduplication.
fn resolve_link(href: &str, page_url: &Url) -> Option<(Url, String)> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return None;
    }

    let mut absolute = page_url.join(href).ok()?;
    absolute.set_fragment(None);
    let key = normalize_parsed(absolute.clone()).ok()?.to_string();
    Some((absolute, key))
}

/// Concatenates every text node not inside a hidden element
fn visible_text(document: &Html) -> String {
    let mut text = String::new();

    for node in document.root_element().descendants() {
        let Node::Text(fragment) = node.value() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|e| HIDDEN_ELEMENTS.contains(&e.name()))
        });

        if !hidden {
            text.push_str(fragment);
        }
    }

    text
}

/// Runs keyword matchers and the contact detectors over visible text
///
/// The e-mail and phone detectors run even when no keywords are configured,
/// so a keyword-less crawl still reports contact details.
fn search_text(text: &str, matcher: &KeywordMatcher, config: &ExtractorConfig) -> Vec<Finding> {
    let mut findings = Vec::new();

    for (keyword, regex) in &matcher.patterns {
        let mut occurrences = 0;
        let mut contexts = Vec::new();

        for m in regex.find_iter(text) {
            occurrences += 1;
            if contexts.len() < config.max_contexts {
                contexts.push(context_snippet(text, m.start(), m.end(), config.context_window));
            }
        }

        if occurrences > 0 {
            findings.push(Finding {
                keyword: keyword.clone(),
                occurrences,
                contexts,
            });
        }
    }

    let emails: Vec<&str> = EMAIL_REGEX.find_iter(text).map(|m| m.as_str()).collect();
    if let Some(finding) = detector_finding(EMAIL_KEYWORD, &emails, config.max_contexts) {
        findings.push(finding);
    }

    let phones: Vec<&str> = PHONE_REGEX
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|candidate| {
            let digits = candidate.chars().filter(char::is_ascii_digit).count();
            (PHONE_DIGITS_MIN..=PHONE_DIGITS_MAX).contains(&digits)
        })
        .collect();
    if let Some(finding) = detector_finding(PHONE_KEYWORD, &phones, config.max_contexts) {
        findings.push(finding);
    }

    findings
}

/// Builds a synthetic finding whose contexts are the matches themselves
fn detector_finding(keyword: &str, matches: &[&str], max_contexts: usize) -> Option<Finding> {
    if matches.is_empty() {
        return None;
    }

    Some(Finding {
        keyword: keyword.to_string(),
        occurrences: matches.len(),
        contexts: matches
            .iter()
            .take(max_contexts)
            .map(|m| m.trim().to_string())
            .collect(),
    })
}

/// Cuts `window` characters on each side of a match and wraps it in ellipses
fn context_snippet(text: &str, start: usize, end: usize, window: usize) -> String {
    let from = if window == 0 {
        start
    } else {
        text[..start]
            .char_indices()
            .rev()
            .nth(window - 1)
            .map_or(0, |(i, _)| i)
    };
    let to = text[end..]
        .char_indices()
        .nth(window)
        .map_or(text.len(), |(i, _)| end + i);

    let snippet = text[from..to].replace(['\n', '\r'], " ");
    format!("...{}...", snippet.trim())
}
