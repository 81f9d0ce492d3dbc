//! URL handling module for Members-Mirror
//!
//! This module provides URL canonicalization for deduplication, domain
//! extraction and matching, and the path helpers shared by the extractors and
//! the path namer.

mod domain;
mod matcher;
mod normalize;
mod path;

// Re-export main functions
pub use domain::{extract_domain, is_from_any_domain};
pub use matcher::{contains_any, matches_domain};
pub use normalize::{canonicalize_url, dedup_key};
pub use path::{
    basename, directory_of, last_segment, path_extension, percent_decode, split_extension,
};
