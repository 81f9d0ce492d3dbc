//! Path helpers shared by the extractors and the path namer

use std::borrow::Cow;
use url::Url;

/// Returns everything after the last `/` of a path
pub fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Percent-decodes a URL fragment, replacing invalid UTF-8 sequences
///
/// ```
/// use members_mirror::url::percent_decode;
///
/// assert_eq!(percent_decode("My%20File"), "My File");
/// ```
pub fn percent_decode(input: &str) -> String {
    match urlencoding::decode(input) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => String::from_utf8_lossy(&urlencoding::decode_binary(input.as_bytes())).into_owned(),
    }
}

/// Last non-empty path segment of a URL, percent-decoded
///
/// A trailing slash is ignored, so `/courses/intro/` yields `intro`.
/// Returns `None` for the site root.
pub fn basename(url: &Url) -> Option<String> {
    url.path()
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(percent_decode)
}

/// Lowercase extension of the URL path's last segment, without the dot
///
/// Leading dots are not extension separators (`/.htaccess` has none), and the
/// query string never contributes.
pub fn path_extension(url: &Url) -> Option<String> {
    let segment = last_segment(url.path()).trim_start_matches('.');
    let (_, extension) = segment.rsplit_once('.')?;

    if extension.is_empty() {
        None
    } else {
        Some(extension.to_lowercase())
    }
}

/// Splits a path at its last `.` into (path without extension, extension)
///
/// Returns `None` when there is no dot, when the extension is empty, or when
/// the last dot belongs to a directory name rather than the final segment.
///
/// ```
/// use members_mirror::url::split_extension;
///
/// assert_eq!(split_extension("/dir/My%20File.mp3"), Some(("/dir/My%20File", "mp3")));
/// assert_eq!(split_extension("/v1.2/readme"), None);
/// ```
pub fn split_extension(path: &str) -> Option<(&str, &str)> {
    let (stem, extension) = path.rsplit_once('.')?;

    if extension.is_empty() || extension.contains('/') {
        return None;
    }

    Some((stem, extension))
}

/// Directory part used when naming stored items
///
/// Takes the path of `url`, percent-decodes it and guarantees it starts and
/// ends with `/`. Unparseable input maps to the root directory.
///
/// ```
/// use members_mirror::url::directory_of;
///
/// assert_eq!(directory_of("https://example.com/lessons/week%201/"), "/lessons/week 1/");
/// assert_eq!(directory_of("https://example.com/lessons"), "/lessons/");
/// assert_eq!(directory_of("https://example.com"), "/");
/// ```
pub fn directory_of(url: &str) -> String {
    let path: Cow<'_, str> = match Url::parse(url) {
        Ok(parsed) => Cow::Owned(percent_decode(parsed.path())),
        Err(_) => Cow::Borrowed("/"),
    };

    let mut directory = String::with_capacity(path.len() + 2);
    if !path.starts_with('/') {
        directory.push('/');
    }
    directory.push_str(&path);
    if !directory.ends_with('/') {
        directory.push('/');
    }
    directory
}
