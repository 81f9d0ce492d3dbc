//! Small HTML queries shared by the extractors

use scraper::{Html, Selector};

/// Text of the first `<title>` element, trimmed; `None` if absent or blank
pub fn title_text(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Text content of every `<script>` element, in document order
pub fn script_texts(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(script_selector) = Selector::parse("script") else {
        return Vec::new();
    };

    document
        .select(&script_selector)
        .map(|element| element.text().collect::<String>())
        .filter(|text| !text.trim().is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_text() {
        let html = r#"<html><head><title>  Lesson 1 </title></head><body></body></html>"#;
        assert_eq!(title_text(html), Some("Lesson 1".to_string()));
    }

    #[test]
    fn test_title_text_missing_or_blank() {
        assert_eq!(title_text("<html><head></head></html>"), None);
        assert_eq!(title_text("<html><head><title> </title></head></html>"), None);
    }

    #[test]
    fn test_script_texts() {
        let html = r#"<html><head>
            <script src="/app.js"></script>
            <script>var a = 1;</script>
            </head><body><script>var b = 2;</script></body></html>"#;
        assert_eq!(script_texts(html), vec!["var a = 1;", "var b = 2;"]);
    }
}
