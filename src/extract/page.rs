use crate::config::PageTitleMode;
use crate::crawler::Response;
use crate::extract::{title_text, ClassifiedItem, ExtractionError, ItemMeta};
use crate::url::basename;

/// Reduces an HTML page to a page item
///
/// # Arguments
///
/// * `response` - The fetched page
/// * `mode` - Where the title comes from
/// * `suffix` - Banner stripped from the end of `<title>` text in element mode
///
/// # Returns
///
/// A `ClassifiedItem::Page` whose origin and download URL are both the page's
/// own URL and whose extension is `html`.
pub fn extract_page(
    response: &Response,
    mode: PageTitleMode,
    suffix: &str,
) -> Result<ClassifiedItem, ExtractionError> {
    let title = match mode {
        PageTitleMode::Element => {
            let raw = title_text(&response.text()).ok_or(ExtractionError::MissingTitle)?;
            strip_title_suffix(&raw, suffix).to_string()
        }
        PageTitleMode::Basename => basename(&response.url)
            .ok_or_else(|| ExtractionError::MissingSegment(response.url.to_string()))?,
    };

    let url = response.url.as_str();
    ItemMeta::new(&title, "html", url, url).map(ClassifiedItem::Page)
}

/// Removes a trailing banner; titles without it are returned unchanged
fn strip_title_suffix<'a>(title: &'a str, suffix: &str) -> &'a str {
    if suffix.is_empty() {
        return title;
    }
    title
        .strip_suffix(suffix)
        .or_else(|| title.strip_suffix(suffix.trim_start()))
        .unwrap_or(title)
        .trim_end()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::Request;
    use reqwest::header::HeaderMap;
    use url::Url;

    const SUFFIX: &str = " \u{2013} Members Area";

    fn page(url: &str, body: &str) -> Response {
        let url = Url::parse(url).unwrap();
        Response::new(
            Request::get(url.clone()),
            url,
            200,
            HeaderMap::new(),
            body.as_bytes().to_vec(),
        )
    }

    #[test]
    fn test_title_suffix_removed() {
        let response = page(
            "https://example.com/lessons/foo/",
            "<html><head><title>Foo \u{2013} Members Area</title></head></html>",
        );
        let item = extract_page(&response, PageTitleMode::Element, SUFFIX).unwrap();

        assert_eq!(item.kind(), crate::extract::ExtractorKind::Page);
        assert_eq!(item.title(), "Foo");
        assert_eq!(item.extension(), "html");
        assert_eq!(item.origin_url(), "https://example.com/lessons/foo/");
        assert_eq!(item.download_url(), "https://example.com/lessons/foo/");
    }

    #[test]
    fn test_title_without_suffix_kept() {
        let response = page(
            "https://example.com/about/",
            "<html><head><title>About us</title></head></html>",
        );
        let item = extract_page(&response, PageTitleMode::Element, SUFFIX).unwrap();
        assert_eq!(item.title(), "About us");
    }

    #[test]
    fn test_missing_title_is_error() {
        let response = page("https://example.com/about/", "<html><body>hi</body></html>");
        assert_eq!(
            extract_page(&response, PageTitleMode::Element, SUFFIX).unwrap_err(),
            ExtractionError::MissingTitle
        );
    }

    #[test]
    fn test_title_that_is_only_the_suffix_is_error() {
        let response = page(
            "https://example.com/about/",
            "<html><head><title> \u{2013} Members Area</title></head></html>",
        );
        assert!(matches!(
            extract_page(&response, PageTitleMode::Element, SUFFIX).unwrap_err(),
            ExtractionError::InvalidField { field: "title", .. }
        ));
    }

    #[test]
    fn test_basename_mode() {
        let response = page(
            "https://example.com/courses/week%202/",
            "<html><head><title>ignored</title></head></html>",
        );
        let item = extract_page(&response, PageTitleMode::Basename, SUFFIX).unwrap();
        assert_eq!(item.title(), "week 2");
    }

    #[test]
    fn test_basename_mode_at_root_is_error() {
        let response = page("https://example.com/", "<html></html>");
        assert!(matches!(
            extract_page(&response, PageTitleMode::Basename, SUFFIX).unwrap_err(),
            ExtractionError::MissingSegment(_)
        ));
    }
}
