//! HTML parser for extracting links
//!
//! Collects every link a classification rule could care about, tagged with
//! the element and attribute it came from:
//! - `<a href>` and `<area href>`
//! - `<iframe src>` and `<iframe data-src>` (lazy-loaded players)

use crate::classify::DiscoveredLink;
use scraper::{Html, Selector};
use url::Url;

/// Element/attribute pairs links are read from
const LINK_SOURCES: &[(&str, &str)] = &[
    ("a", "href"),
    ("area", "href"),
    ("iframe", "src"),
    ("iframe", "data-src"),
];

/// Extracts all links from an HTML document
///
/// Relative links are resolved against the document's `<base href>` when
/// present, otherwise against `page_url`. The same URL found in several
/// places is reported once per element/attribute pair.
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `page_url` - Final URL of the response the HTML came from
/// * `referrer` - Referrer of the request that produced the response
///
/// # Example
///
/// ```
/// use members_mirror::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<html><body><a href="/page">Link</a></body></html>"#;
/// let page_url = Url::parse("https://example.com/").unwrap();
/// let links = extract_links(html, &page_url, None);
/// assert_eq!(links[0].url.as_str(), "https://example.com/page");
/// ```
pub fn extract_links(html: &str, page_url: &Url, referrer: Option<&str>) -> Vec<DiscoveredLink> {
    let document = Html::parse_document(html);
    let base_url = base_href(&document, page_url).unwrap_or_else(|| page_url.clone());

    let mut links: Vec<DiscoveredLink> = Vec::new();

    for (tag, attribute) in LINK_SOURCES {
        let Ok(selector) = Selector::parse(&format!("{}[{}]", tag, attribute)) else {
            continue;
        };

        for element in document.select(&selector) {
            let Some(href) = element.value().attr(attribute) else {
                continue;
            };
            let Some(url) = resolve_link(href, &base_url) else {
                continue;
            };

            let link = DiscoveredLink::new(url, page_url.clone())
                .from_element(tag, attribute)
                .with_referrer_header(referrer);

            if !links.contains(&link) {
                links.push(link);
            }
        }
    }

    links
}

/// Reads `<base href>`, resolved against the page URL
fn base_href(document: &Html, page_url: &Url) -> Option<Url> {
    let selector = Selector::parse("base[href]").ok()?;
    let href = document.select(&selector).next()?.value().attr("href")?;
    page_url.join(href.trim()).ok()
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
///
/// The fragment of an accepted link is dropped.
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    let mut absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() != "http" && absolute_url.scheme() != "https" {
        return None;
    }
    absolute_url.set_fragment(None);

    Some(absolute_url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_url() -> Url {
        Url::parse("https://example.com/lessons/one/").unwrap()
    }

    fn urls(html: &str) -> Vec<String> {
        extract_links(html, &page_url(), None)
            .into_iter()
            .map(|l| l.url.to_string())
            .collect()
    }

    #[test]
    fn test_extract_absolute_link() {
        let html = r#"<html><body><a href="https://other.com/page">Link</a></body></html>"#;
        assert_eq!(urls(html), vec!["https://other.com/page"]);
    }

    #[test]
    fn test_extract_relative_links() {
        let html = r#"<html><body><a href="/other">A</a><a href="notes.pdf">B</a></body></html>"#;
        assert_eq!(
            urls(html),
            vec![
                "https://example.com/other",
                "https://example.com/lessons/one/notes.pdf"
            ]
        );
    }

    #[test]
    fn test_link_metadata() {
        let html = r#"<html><body><a href="/other">A</a></body></html>"#;
        let links = extract_links(html, &page_url(), Some("https://example.com/dashboard/"));

        assert_eq!(links.len(), 1);
        assert_eq!(links[0].originating_response_url, page_url());
        assert_eq!(links[0].html_tag.as_deref(), Some("a"));
        assert_eq!(links[0].html_attribute.as_deref(), Some("href"));
        assert_eq!(
            links[0].referrer_header.as_deref(),
            Some("https://example.com/dashboard/")
        );
    }

    #[test]
    fn test_iframe_src_and_data_src() {
        let html = r#"<html><body>
            <iframe src="https://player.vimeo.com/video/1"></iframe>
            <iframe data-src="https://player.vimeo.com/video/2"></iframe>
        </body></html>"#;
        let links = extract_links(html, &page_url(), None);

        let found: Vec<(&str, &str)> = links
            .iter()
            .map(|l| {
                (
                    l.url.as_str(),
                    l.html_attribute.as_deref().unwrap_or_default(),
                )
            })
            .collect();
        assert_eq!(
            found,
            vec![
                ("https://player.vimeo.com/video/1", "src"),
                ("https://player.vimeo.com/video/2", "data-src"),
            ]
        );
        assert!(links.iter().all(|l| l.html_tag.as_deref() == Some("iframe")));
    }

    #[test]
    fn test_area_links() {
        let html = r#"<html><body><map><area href="/map-target" /></map></body></html>"#;
        let links = extract_links(html, &page_url(), None);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].html_tag.as_deref(), Some("area"));
    }

    #[test]
    fn test_base_href() {
        let html = r#"<html><head><base href="https://example.com/files/"></head>
            <body><a href="a.pdf">A</a></body></html>"#;
        assert_eq!(urls(html), vec!["https://example.com/files/a.pdf"]);
    }

    #[test]
    fn test_skip_special_schemes() {
        let html = r#"<html><body>
            <a href="javascript:void(0)">JS</a>
            <a href="mailto:test@example.com">Email</a>
            <a href="tel:+1234567890">Call</a>
            <a href="data:text/html,<h1>Test</h1>">Data</a>
            <a href="ftp://example.com/file">FTP</a>
        </body></html>"#;
        assert!(urls(html).is_empty());
    }

    #[test]
    fn test_skip_fragment_only() {
        let html = r##"<html><body><a href="#section">Jump</a></body></html>"##;
        assert!(urls(html).is_empty());
    }

    #[test]
    fn test_fragment_dropped() {
        let html = r##"<html><body><a href="/other#part-2">Link</a></body></html>"##;
        assert_eq!(urls(html), vec!["https://example.com/other"]);
    }

    #[test]
    fn test_duplicates_reported_once() {
        let html = r#"<html><body><a href="/x">1</a><a href="/x">2</a></body></html>"#;
        assert_eq!(urls(html).len(), 1);
    }

    #[test]
    fn test_mixed_valid_and_invalid_links() {
        let html = r#"
            <html>
            <body>
                <a href="/valid">Valid</a>
                <a href="javascript:alert('no')">Invalid</a>
                <a href="mailto:test@example.com">Invalid</a>
                <a href="/another-valid">Valid</a>
            </body>
            </html>
        "#;
        assert_eq!(urls(html).len(), 2);
    }
}
