//! Configuration module for Members-Mirror
//!
//! This module handles loading, parsing, and validating the TOML configuration
//! file, plus the login credentials that are supplied at startup.
//!
//! # Example
//!
//! ```no_run
//! use members_mirror::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("mirror.toml")).unwrap();
//! println!("Concurrent requests: {}", config.crawler.max_concurrent_requests);
//! ```

mod credentials;
mod parser;
mod types;
mod validation;

// Re-export types
pub use credentials::{Credentials, ENV_PASSWORD, ENV_URL, ENV_USERNAME};
pub use types::{
    Config, CrawlerConfig, ExtractConfig, LoginConfig, OutputConfig, PageTitleMode, RulesConfig,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, hash_config_content, load_config, load_config_with_hash, parse_config,
};
