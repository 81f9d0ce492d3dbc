use serde::Deserialize;
use std::collections::BTreeMap;

/// Main configuration structure for Members-Mirror
///
/// Every section is optional in the TOML file; missing keys fall back to the
/// defaults below, which match a WordPress members area.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub login: LoginConfig,
    pub rules: RulesConfig,
    pub extract: ExtractConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of fetches and downloads in flight at once
    #[serde(rename = "max-concurrent-requests")]
    pub max_concurrent_requests: u32,

    /// Minimum time between two dispatched requests (milliseconds)
    #[serde(rename = "download-delay")]
    pub download_delay: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout")]
    pub request_timeout: u64,

    /// How many times a transport failure or 5xx response is retried
    #[serde(rename = "fetch-retries")]
    pub fetch_retries: u32,

    /// Path of the authenticated landing page, relative to the login URL's origin
    #[serde(rename = "home-path")]
    pub home_path: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: 8,
            download_delay: 250,
            request_timeout: 30,
            fetch_retries: 2,
            home_path: "/dashboard/".to_string(),
        }
    }
}

/// Login form configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoginConfig {
    /// Text that only appears in the body once the session is logged in
    #[serde(rename = "success-marker")]
    pub success_marker: String,

    /// Form field carrying the username
    #[serde(rename = "username-field")]
    pub username_field: String,

    /// Form field carrying the password
    #[serde(rename = "password-field")]
    pub password_field: String,

    /// Additional static form fields sent with every login submission
    #[serde(rename = "extra-fields")]
    pub extra_fields: BTreeMap<String, String>,
}

impl Default for LoginConfig {
    fn default() -> Self {
        let mut extra_fields = BTreeMap::new();
        extra_fields.insert("wp-submit".to_string(), "Log In".to_string());
        extra_fields.insert("testcookie".to_string(), "1".to_string());

        Self {
            success_marker: "logout".to_string(),
            username_field: "log".to_string(),
            password_field: "pwd".to_string(),
            extra_fields,
        }
    }
}

/// Link classification rule configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Domains the page rule may follow; empty means the login URL's host
    #[serde(rename = "allowed-domains")]
    pub allowed_domains: Vec<String>,

    /// Path or query substrings the page rule never follows (login, logout, admin paths)
    #[serde(rename = "ignored-paths")]
    pub ignored_paths: Vec<String>,

    /// Document extensions left to the file rule instead of being paged
    #[serde(rename = "denied-page-extensions")]
    pub denied_page_extensions: Vec<String>,

    /// Extensions the file rule never claims
    #[serde(rename = "denied-file-extensions")]
    pub denied_file_extensions: Vec<String>,

    /// Path or query substrings the file rule never claims
    #[serde(rename = "denied-file-paths")]
    pub denied_file_paths: Vec<String>,

    /// Hosts whose iframes are treated as embedded videos
    #[serde(rename = "video-domains")]
    pub video_domains: Vec<String>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            allowed_domains: Vec::new(),
            ignored_paths: ["logout", "next", "wp-login", "wp-admin", "wp-toolbar"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            denied_page_extensions: ["pdf", "zip", "xlsx", "docx", "rtf"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            denied_file_extensions: vec!["php".to_string()],
            denied_file_paths: Vec::new(),
            video_domains: vec!["player.vimeo.com".to_string()],
        }
    }
}

/// How a page item gets its title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageTitleMode {
    /// Text of the `<title>` element with the configured suffix removed
    Element,
    /// Last non-empty segment of the page URL
    Basename,
}

/// Extractor configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    #[serde(rename = "page-title")]
    pub page_title: PageTitleMode,

    /// Literal banner the site appends to every page title
    #[serde(rename = "page-title-suffix")]
    pub page_title_suffix: String,

    /// Number of trailing characters the video host appends to its titles
    #[serde(rename = "video-title-suffix-length")]
    pub video_title_suffix_length: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            page_title: PageTitleMode::Element,
            page_title_suffix: " \u{2013} Members Area".to_string(),
            video_title_suffix_length: 30,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root directory the mirror is written into
    pub directory: String,

    /// Path to the SQLite manifest
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Optional path for a markdown run summary
    #[serde(rename = "summary-path")]
    pub summary_path: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "./mirror".to_string(),
            database_path: "./mirror/manifest.db".to_string(),
            summary_path: None,
        }
    }
}
