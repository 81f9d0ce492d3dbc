//! Members-Mirror: an offline mirror for login-gated sites
//!
//! This crate logs into a single site, walks its links, routes each discovered
//! resource to a page, file or video extractor and hands the resulting items to a
//! download stage that stores them under a path mirroring the site structure.

pub mod classify;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod naming;
pub mod output;
pub mod session;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Members-Mirror operations
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Authentication error: {0}")]
    Auth(#[from] session::AuthError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),

    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for Members-Mirror operations
pub type Result<T> = std::result::Result<T, MirrorError>;

// Re-export commonly used types
pub use classify::{DiscoveredLink, LinkClassifier};
pub use config::{Config, Credentials};
pub use extract::{ClassifiedItem, ExtractionError, ExtractorKind};
pub use naming::storage_path;
pub use session::Authenticator;
pub use state::{SessionPhase, SessionState};
