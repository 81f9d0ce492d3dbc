use crate::UrlError;
use url::Url;

/// Canonicalizes a URL for duplicate detection
///
/// # Canonicalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject anything other than `http`/`https`
/// 3. Require a host (lowercased by the parser)
/// 4. Remove the fragment
/// 5. Sort query parameters by key, keeping blank values
/// 6. Remove an empty query string (trailing `?`)
///
/// Unlike a link normalizer, the scheme, `www.` prefix and trailing slash are
/// kept: on a members site they frequently address different resources.
///
/// # Examples
///
/// ```
/// use members_mirror::url::canonicalize_url;
///
/// let url = canonicalize_url("https://Example.com/lesson/?b=2&a=1#top").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/lesson/?a=1&b=2");
/// ```
pub fn canonicalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    url.set_fragment(None);

    if url.query().is_some() {
        let params = sorted_query_params(&url);

        if params.is_empty() {
            url.set_query(None);
        } else {
            let mut serializer = url.query_pairs_mut();
            serializer.clear();
            for (key, value) in &params {
                serializer.append_pair(key, value);
            }
        }
    }

    Ok(url)
}

/// String key under which the scheduler remembers a URL
///
/// Falls back to the raw URL when it cannot be canonicalized, so duplicate
/// detection never rejects a request by itself.
pub fn dedup_key(url: &Url) -> String {
    canonicalize_url(url.as_str())
        .map(String::from)
        .unwrap_or_else(|_| url.to_string())
}

/// Collects query parameters sorted by key (stable, so repeated keys keep their order)
fn sorted_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    params.sort_by(|a, b| a.0.cmp(&b.0));

    params
}
