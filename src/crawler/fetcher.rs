//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the session client (cookie jar, user agent, timeouts)
//! - Form POSTs for the login exchange and GETs for everything else
//! - Sending the request's referrer as the `Referer` header
//! - Retry logic for transient failures

use crate::config::CrawlerConfig;
use crate::crawler::{Request, Response};
use async_trait::async_trait;
use reqwest::header::REFERER;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("members-mirror/", env!("CARGO_PKG_VERSION"));

/// Pause between retries of one request
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Transport-level fetch failures
///
/// HTTP error statuses are not fetch errors: the response is returned and the
/// caller decides what a 4xx or 5xx means for it.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("Could not connect to {url}: {reason}")]
    Connect { url: String, reason: String },

    #[error("Request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("Failed to read body of {url}: {reason}")]
    Body { url: String, reason: String },
}

impl FetchError {
    /// Whether the same request may succeed if sent again
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Connect { .. })
    }

    fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        let url = url.to_string();
        if error.is_timeout() {
            Self::Timeout { url }
        } else if error.is_connect() {
            Self::Connect {
                url,
                reason: error.to_string(),
            }
        } else {
            Self::Transport {
                url,
                reason: error.to_string(),
            }
        }
    }
}

/// The fetch engine seen by the coordinator
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Sends one request and returns the response it produced
    async fn fetch(&self, request: Request) -> Result<Response, FetchError>;
}

/// Builds the session HTTP client
///
/// The client keeps a cookie jar, so every request made through it (and
/// through its clones) carries the session established by the login.
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(config.request_timeout))
        .connect_timeout(Duration::from_secs(10))
        .cookie_store(true)
        .gzip(true)
        .brotli(true)
        .build()
}

/// `Fetcher` backed by a reqwest client
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    retries: u32,
    retry_delay: Duration,
}

impl HttpFetcher {
    /// Creates a fetcher with a fresh session client
    pub fn new(config: &CrawlerConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client(config)?, config.fetch_retries))
    }

    /// Creates a fetcher over an existing client
    pub fn with_client(client: Client, retries: u32) -> Self {
        Self {
            client,
            retries,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// The session client, shared with the download stage
    pub fn client(&self) -> &Client {
        &self.client
    }

    async fn send(&self, request: &Request) -> Result<Response, FetchError> {
        let url = request.url.as_str();

        let mut builder = match &request.form {
            Some(fields) => self.client.post(request.url.clone()).form(fields),
            None => self.client.get(request.url.clone()),
        };
        if let Some(referrer) = request.referrer.as_deref().filter(|r| !r.is_empty()) {
            builder = builder.header(REFERER, referrer);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status().as_u16();
        let final_url = response.url().clone();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|e| FetchError::Body {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Response::new(
            request.clone(),
            final_url,
            status,
            headers,
            body.to_vec(),
        ))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    /// Fetches with retry logic
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 5xx | Retry up to `fetch-retries` times, then return the response |
    /// | Timeout | Retry up to `fetch-retries` times, then fail |
    /// | Connection refused | Retry up to `fetch-retries` times, then fail |
    /// | Anything else | Returned immediately |
    async fn fetch(&self, request: Request) -> Result<Response, FetchError> {
        let mut attempt = 0;

        loop {
            match self.send(&request).await {
                Ok(response) if response.status >= 500 && attempt < self.retries => {
                    tracing::warn!(
                        "HTTP {} from {}, retrying ({} of {})",
                        response.status,
                        request.url,
                        attempt + 1,
                        self.retries
                    );
                }
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && attempt < self.retries => {
                    tracing::warn!("{}, retrying ({} of {})", e, attempt + 1, self.retries);
                }
                Err(e) => return Err(e),
            }

            attempt += 1;
            tokio::time::sleep(self.retry_delay).await;
        }
    }
}
