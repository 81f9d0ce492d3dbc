//! Extractors: reduce one fetched response to one classified item
//!
//! Each extractor is a pure function over a `Response`. A response that cannot
//! be reduced to a valid item yields an `ExtractionError`; the coordinator logs
//! and skips it without affecting any other response.

mod file;
mod html;
mod item;
mod page;
mod video;

pub use file::extract_file;
pub use html::{script_texts, title_text};
pub use item::{ClassifiedItem, ItemMeta};
pub use page::extract_page;
pub use video::{extract_video, scan_video_sources, select_best_source, VideoSource};

use crate::config::ExtractConfig;
use crate::crawler::Response;
use std::fmt;
use thiserror::Error;

/// Which extractor a response is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExtractorKind {
    Page,
    File,
    Video,
}

impl ExtractorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::File => "file",
            Self::Video => "video",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "page" => Some(Self::Page),
            "file" => Some(Self::File),
            "video" => Some(Self::Video),
            _ => None,
        }
    }

    pub fn all() -> [Self; 3] {
        [Self::Page, Self::File, Self::Video]
    }
}

impl fmt::Display for ExtractorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reasons a response could not be reduced to an item
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("page has no <title> element")]
    MissingTitle,

    #[error("URL has no path segment to name it by: {0}")]
    MissingSegment(String),

    #[error("URL has no file extension: {0}")]
    MissingExtension(String),

    #[error("request for {0} carried no referrer")]
    MissingReferrer(String),

    #[error("no video sources found")]
    NoVideoSources,

    #[error("title '{title}' is not longer than the {suffix_len}-character suffix")]
    TitleTooShort { title: String, suffix_len: usize },

    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// Matched a rule but broke one of the extractor's pairing assumptions
    #[error("malformed match: {0}")]
    MalformedMatch(String),
}

/// The three extractors bound to their configuration
#[derive(Debug, Clone)]
pub struct Extractors {
    config: ExtractConfig,
}

impl Extractors {
    pub fn new(config: ExtractConfig) -> Self {
        Self { config }
    }

    /// Runs the extractor for `kind` over `response`
    pub fn extract(
        &self,
        kind: ExtractorKind,
        response: &Response,
    ) -> Result<ClassifiedItem, ExtractionError> {
        match kind {
            ExtractorKind::Page => extract_page(
                response,
                self.config.page_title,
                &self.config.page_title_suffix,
            ),
            ExtractorKind::File => extract_file(response),
            ExtractorKind::Video => {
                extract_video(response, self.config.video_title_suffix_length)
            }
        }
    }
}
