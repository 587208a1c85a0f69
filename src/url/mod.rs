//! URL handling module
//!
//! This module provides URL normalization, domain extraction and the
//! same-site scope check used to keep the crawl on the seed's host.

mod domain;
mod normalize;

pub use domain::{extract_domain, origin_key};
pub use normalize::{normalize_parsed, normalize_url};

use crate::UrlError;
use url::Url;

/// The set of URLs a crawl is allowed to follow
///
/// A link is in scope when its host and explicit port equal the seed's,
/// compared the way a browser compares `host[:port]`. Subdomains are out of
/// scope, and the scheme is not part of the comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteScope {
    host: String,
    port: Option<u16>,
}

impl SiteScope {
    /// Builds the scope from the seed URL
    ///
    /// # Returns
    ///
    /// * `Ok(SiteScope)` - The seed has a host
    /// * `Err(UrlError)` - The seed has no host
    pub fn from_seed(seed: &Url) -> Result<Self, UrlError> {
        let host = extract_domain(seed).ok_or(UrlError::MissingHost)?;
        Ok(Self {
            host,
            port: seed.port(),
        })
    }

    /// Returns the seed host
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns true if `url` points at the seed's host and port
    pub fn contains(&self, url: &Url) -> bool {
        extract_domain(url).as_deref() == Some(self.host.as_str()) && url.port() == self.port
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope(seed: &str) -> SiteScope {
        SiteScope::from_seed(&Url::parse(seed).unwrap()).unwrap()
    }

    #[test]
    fn test_same_host_in_scope() {
        let scope = scope("https://example.com/");
        assert!(scope.contains(&Url::parse("https://example.com/a").unwrap()));
    }

    #[test]
    fn test_other_host_out_of_scope() {
        let scope = scope("https://example.com/");
        assert!(!scope.contains(&Url::parse("http://other.com/b").unwrap()));
    }

    #[test]
    fn test_subdomain_out_of_scope() {
        let scope = scope("https://example.com/");
        assert!(!scope.contains(&Url::parse("https://blog.example.com/").unwrap()));
    }

    #[test]
    fn test_scheme_not_compared() {
        let scope = scope("https://example.com/");
        assert!(scope.contains(&Url::parse("http://example.com/x").unwrap()));
    }

    #[test]
    fn test_port_compared() {
        let scope = scope("http://127.0.0.1:4000/");
        assert!(scope.contains(&Url::parse("http://127.0.0.1:4000/page").unwrap()));
        assert!(!scope.contains(&Url::parse("http://127.0.0.1:4001/page").unwrap()));
    }

    #[test]
    fn test_host_case_insensitive() {
        let scope = scope("https://Example.COM/");
        assert!(scope.contains(&Url::parse("https://EXAMPLE.com/a").unwrap()));
        assert_eq!(scope.host(), "example.com");
    }
}
