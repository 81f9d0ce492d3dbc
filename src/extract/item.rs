//! Classified items
//!
//! Items are a closed union; every field is required and checked when the
//! item is built, so downstream code never deals with half-filled records.

use crate::extract::{ExtractionError, ExtractorKind};
use url::Url;

/// Fields shared by every item kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemMeta {
    title: String,
    extension: String,
    origin_url: String,
    download_url: String,
}

impl ItemMeta {
    /// Builds item metadata, normalizing and validating every field
    ///
    /// # Normalization
    ///
    /// - `title` is trimmed and path separators (`/`, `\`) become `-`; it must
    ///   not end up empty
    /// - `extension` is trimmed and lower-cased; it must be non-empty ASCII
    ///   alphanumeric
    /// - `origin_url` and `download_url` must be absolute URLs
    pub fn new(
        title: &str,
        extension: &str,
        origin_url: &str,
        download_url: &str,
    ) -> Result<Self, ExtractionError> {
        let title: String = title
            .trim()
            .chars()
            .map(|c| if c == '/' || c == '\\' { '-' } else { c })
            .collect();
        if title.is_empty() {
            return Err(ExtractionError::InvalidField {
                field: "title",
                reason: "empty".to_string(),
            });
        }

        let extension = extension.trim().to_lowercase();
        if extension.is_empty() || !extension.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ExtractionError::InvalidField {
                field: "extension",
                reason: format!("'{}' is not a plain alphanumeric extension", extension),
            });
        }

        Url::parse(origin_url).map_err(|e| ExtractionError::InvalidField {
            field: "origin_url",
            reason: format!("'{}': {}", origin_url, e),
        })?;
        Url::parse(download_url).map_err(|e| ExtractionError::InvalidField {
            field: "download_url",
            reason: format!("'{}': {}", download_url, e),
        })?;

        Ok(Self {
            title,
            extension,
            origin_url: origin_url.to_string(),
            download_url: download_url.to_string(),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// URL whose directory the item is stored under
    pub fn origin_url(&self) -> &str {
        &self.origin_url
    }

    /// URL the storage stage fetches the item's bytes from
    pub fn download_url(&self) -> &str {
        &self.download_url
    }
}

/// A discovered resource reduced to what the storage stage needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedItem {
    /// An HTML page; `origin_url` is the page's own URL
    Page(ItemMeta),

    /// A linked file; `origin_url` is the page that linked it
    File(ItemMeta),

    /// An embedded video; `origin_url` is the page that embedded the iframe
    Video {
        meta: ItemMeta,
        iframe_url: String,
        /// Vertical resolution of the chosen encoding
        quality: u32,
    },
}

impl ClassifiedItem {
    pub fn kind(&self) -> ExtractorKind {
        match self {
            Self::Page(_) => ExtractorKind::Page,
            Self::File(_) => ExtractorKind::File,
            Self::Video { .. } => ExtractorKind::Video,
        }
    }

    pub fn meta(&self) -> &ItemMeta {
        match self {
            Self::Page(meta) | Self::File(meta) | Self::Video { meta, .. } => meta,
        }
    }

    pub fn title(&self) -> &str {
        self.meta().title()
    }

    pub fn extension(&self) -> &str {
        self.meta().extension()
    }

    pub fn origin_url(&self) -> &str {
        self.meta().origin_url()
    }

    pub fn download_url(&self) -> &str {
        self.meta().download_url()
    }

    pub fn iframe_url(&self) -> Option<&str> {
        match self {
            Self::Video { iframe_url, .. } => Some(iframe_url),
            _ => None,
        }
    }

    pub fn quality(&self) -> Option<u32> {
        match self {
            Self::Video { quality, .. } => Some(*quality),
            _ => None,
        }
    }
}
