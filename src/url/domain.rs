use crate::url::matches_domain;
use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use members_mirror::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Checks whether the URL's host falls under any of the given domains
///
/// An empty domain list allows every host.
pub fn is_from_any_domain<S: AsRef<str>>(url: &Url, domains: &[S]) -> bool {
    if domains.is_empty() {
        return true;
    }

    match extract_domain(url) {
        Some(host) => domains
            .iter()
            .any(|domain| matches_domain(&domain.as_ref().to_lowercase(), &host)),
        None => false,
    }
}
