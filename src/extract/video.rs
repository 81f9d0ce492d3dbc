//! Video extraction from an embedded player page
//!
//! The player page carries its configuration inline in a `<script>`. Each
//! progressive encoding appears as an object holding a `"url"` ending in
//! `.mp4` followed, within the same object, by a `"quality"` such as `"720p"`.
//! URL and quality are captured by a single match so they can never be paired
//! across encodings.

use crate::crawler::Response;
use crate::extract::{script_texts, title_text, ClassifiedItem, ExtractionError, ItemMeta};
use regex::Regex;
use std::sync::LazyLock;

static VIDEO_SOURCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""url":"(https://vod[^"]*?\.mp4)"(.*?)"quality":"(\d{3,4})p""#)
        .expect("video source pattern is valid")
});

static VIDEO_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""url":"https://vod[^"]*?\.mp4""#).expect("video url pattern is valid")
});

/// One encoding of a video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoSource {
    pub url: String,
    /// Vertical resolution, e.g. 1080
    pub quality: u32,
}

/// Collects every (url, quality) pair from the given script bodies
///
/// # Errors
///
/// `MalformedMatch` when a pair would span two encodings, or when some video
/// URL has no quality of its own.
pub fn scan_video_sources(scripts: &[String]) -> Result<Vec<VideoSource>, ExtractionError> {
    let mut sources = Vec::new();
    let mut url_count = 0;

    for script in scripts {
        url_count += VIDEO_URL.find_iter(script).count();

        for caps in VIDEO_SOURCE.captures_iter(script) {
            let gap = &caps[2];
            if gap.contains(r#""url":""#) || gap.contains('}') {
                return Err(ExtractionError::MalformedMatch(format!(
                    "quality for {} belongs to another encoding",
                    &caps[1]
                )));
            }

            let quality = caps[3].parse::<u32>().map_err(|e| {
                ExtractionError::MalformedMatch(format!("quality '{}': {}", &caps[3], e))
            })?;

            sources.push(VideoSource {
                url: caps[1].replace(r"\/", "/"),
                quality,
            });
        }
    }

    if url_count != sources.len() {
        return Err(ExtractionError::MalformedMatch(format!(
            "{} video URLs but {} quality labels",
            url_count,
            sources.len()
        )));
    }

    Ok(sources)
}

/// Highest-quality source; the first one in document order wins a tie
pub fn select_best_source(sources: &[VideoSource]) -> Option<&VideoSource> {
    sources.iter().fold(None, |best, source| match best {
        Some(current) if current.quality >= source.quality => Some(current),
        _ => Some(source),
    })
}

/// Reduces a player page to a video item
///
/// # Arguments
///
/// * `response` - The fetched player page
/// * `suffix_len` - Number of trailing characters the host appends to titles
pub fn extract_video(
    response: &Response,
    suffix_len: usize,
) -> Result<ClassifiedItem, ExtractionError> {
    let html = response.text();

    let sources = scan_video_sources(&script_texts(&html))?;
    let best = select_best_source(&sources).ok_or(ExtractionError::NoVideoSources)?;

    let raw_title = title_text(&html).ok_or(ExtractionError::MissingTitle)?;
    let title = strip_fixed_suffix(&raw_title, suffix_len)?;

    let referrer = response
        .referrer()
        .ok_or_else(|| ExtractionError::MissingReferrer(response.url.to_string()))?;

    let extension = best
        .url
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .unwrap_or("mp4");

    let meta = ItemMeta::new(&title, extension, referrer, &best.url)?;

    tracing::debug!(
        "Selected {}p of {} source(s) for '{}'",
        best.quality,
        sources.len(),
        meta.title()
    );

    Ok(ClassifiedItem::Video {
        meta,
        iframe_url: response.url.to_string(),
        quality: best.quality,
    })
}

/// Drops the last `suffix_len` characters of a title
fn strip_fixed_suffix(title: &str, suffix_len: usize) -> Result<String, ExtractionError> {
    let char_count = title.chars().count();
    if char_count <= suffix_len {
        return Err(ExtractionError::TitleTooShort {
            title: title.to_string(),
            suffix_len,
        });
    }

    Ok(title.chars().take(char_count - suffix_len).collect())
}
