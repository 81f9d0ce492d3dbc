//! Crawler module for fetching and routing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with a shared session and retry logic
//! - HTML link extraction
//! - Request scheduling, duplicate suppression and rate limiting
//! - Overall run coordination

mod coordinator;
mod fetcher;
mod parser;
mod request;
mod scheduler;

pub use coordinator::{run_crawl, Coordinator};
pub use fetcher::{build_http_client, FetchError, Fetcher, HttpFetcher, USER_AGENT};
pub use parser::extract_links;
pub use request::{Request, Response};
pub use scheduler::{priority_for, Scheduler, PRIORITY_HOME, PRIORITY_ITEM, PRIORITY_PAGE};
