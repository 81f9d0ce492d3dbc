//! Login credentials
//!
//! Credentials are read once at startup and never change afterwards.

use crate::ConfigError;
use std::fmt;
use url::Url;

/// Environment variable holding the login form URL
pub const ENV_URL: &str = "MIRROR_URL";

/// Environment variable holding the account name
pub const ENV_USERNAME: &str = "MIRROR_USER";

/// Environment variable holding the account password
pub const ENV_PASSWORD: &str = "MIRROR_PASS";

/// Login URL plus the account used to authenticate against it
#[derive(Clone)]
pub struct Credentials {
    login_url: Url,
    username: String,
    password: String,
}

impl Credentials {
    /// Builds validated credentials
    ///
    /// The login URL must be an absolute `http` or `https` URL with a host, and
    /// neither the username nor the password may be empty.
    pub fn new(login_url: &str, username: &str, password: &str) -> Result<Self, ConfigError> {
        let login_url = Url::parse(login_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid login URL: {}", e)))?;

        if login_url.scheme() != "http" && login_url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(format!(
                "Login URL must use http or https, got {}",
                login_url.scheme()
            )));
        }

        if login_url.host_str().is_none() {
            return Err(ConfigError::InvalidUrl(
                "Login URL has no host".to_string(),
            ));
        }

        if username.is_empty() {
            return Err(ConfigError::MissingCredential("username"));
        }

        if password.is_empty() {
            return Err(ConfigError::MissingCredential("password"));
        }

        Ok(Self {
            login_url,
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    pub fn login_url(&self) -> &Url {
        &self.login_url
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// Lowercase host of the login URL; this is the crawl's own domain
    pub fn site_domain(&self) -> String {
        self.login_url
            .host_str()
            .map(|h| h.to_lowercase())
            .unwrap_or_default()
    }

    /// Resolves a site-absolute path (e.g. `/dashboard/`) against the login URL's origin
    pub fn site_url(&self, path: &str) -> Result<Url, ConfigError> {
        self.login_url
            .join(path)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid site path '{}': {}", path, e)))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("login_url", &self.login_url.as_str())
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
