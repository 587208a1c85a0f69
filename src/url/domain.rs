use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host, it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use recon_crawler::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns the origin of a URL as a cache key (`scheme://host[:port]`)
///
/// robots.txt applies per origin, so http and https variants of a host, or
/// two ports on the same host, are tracked separately.
pub fn origin_key(url: &Url) -> String {
    url.origin().ascii_serialization()
}
