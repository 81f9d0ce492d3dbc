/// Checks if a host belongs to an allowed domain
///
/// A domain allows itself and every subdomain beneath it, so `example.com`
/// matches `example.com`, `www.example.com` and `cdn.eu.example.com`, but not
/// `notexample.com`. Both sides are expected to be lowercase.
///
/// # Examples
///
/// ```
/// use members_mirror::url::matches_domain;
///
/// assert!(matches_domain("example.com", "example.com"));
/// assert!(matches_domain("example.com", "blog.example.com"));
/// assert!(!matches_domain("example.com", "example.org"));
/// assert!(!matches_domain("vimeo.com", "notvimeo.com"));
/// ```
pub fn matches_domain(domain: &str, candidate: &str) -> bool {
    if domain.is_empty() {
        return false;
    }

    candidate == domain
        || candidate
            .strip_suffix(domain)
            .is_some_and(|rest| rest.ends_with('.'))
}

/// Returns true if any of the needles occurs in the haystack
pub fn contains_any<S: AsRef<str>>(haystack: &str, needles: &[S]) -> bool {
    needles
        .iter()
        .any(|needle| !needle.as_ref().is_empty() && haystack.contains(needle.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert!(matches_domain("example.com", "example.com"));
        assert!(matches_domain("player.vimeo.com", "player.vimeo.com"));
    }

    #[test]
    fn test_subdomain_match() {
        assert!(matches_domain("example.com", "www.example.com"));
        assert!(matches_domain("example.com", "api.v2.example.com"));
    }

    #[test]
    fn test_no_match_partial_label() {
        assert!(!matches_domain("example.com", "myexample.com"));
        assert!(!matches_domain("example.com", "example.com.org"));
        assert!(!matches_domain("player.vimeo.com", "vimeo.com"));
    }

    #[test]
    fn test_empty_strings() {
        assert!(!matches_domain("", "example.com"));
        assert!(!matches_domain("example.com", ""));
        assert!(!matches_domain("", ""));
    }

    #[test]
    fn test_contains_any() {
        let denied = ["logout", "wp-admin"];
        assert!(contains_any("https://example.com/wp-admin/edit.php", &denied));
        assert!(contains_any("https://example.com/?action=logout", &denied));
        assert!(!contains_any("https://example.com/lessons/", &denied));
    }

    #[test]
    fn test_contains_any_ignores_empty_needles() {
        assert!(!contains_any("https://example.com/", &[""]));
        assert!(!contains_any::<&str>("https://example.com/", &[]));
    }
}
