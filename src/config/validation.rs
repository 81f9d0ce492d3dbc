use crate::config::types::{
    Config, CrawlerConfig, LoginConfig, OutputConfig, RulesConfig,
};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_login_config(&config.login)?;
    validate_rules_config(&config.rules)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_requests < 1 || config.max_concurrent_requests > 64 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_requests must be between 1 and 64, got {}",
            config.max_concurrent_requests
        )));
    }

    if config.request_timeout < 1 {
        return Err(ConfigError::Validation(
            "request_timeout must be at least 1 second".to_string(),
        ));
    }

    if !config.home_path.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "home_path must start with '/', got '{}'",
            config.home_path
        )));
    }

    Ok(())
}

/// Validates login form configuration
fn validate_login_config(config: &LoginConfig) -> Result<(), ConfigError> {
    if config.success_marker.is_empty() {
        return Err(ConfigError::Validation(
            "success_marker cannot be empty".to_string(),
        ));
    }

    if config.username_field.is_empty() || config.password_field.is_empty() {
        return Err(ConfigError::Validation(
            "username_field and password_field cannot be empty".to_string(),
        ));
    }

    if config.username_field == config.password_field {
        return Err(ConfigError::Validation(format!(
            "username_field and password_field must differ, both are '{}'",
            config.username_field
        )));
    }

    Ok(())
}

/// Validates the rule lists
fn validate_rules_config(config: &RulesConfig) -> Result<(), ConfigError> {
    for domain in config.allowed_domains.iter().chain(&config.video_domains) {
        validate_domain_string(domain)?;
    }

    for extension in config
        .denied_page_extensions
        .iter()
        .chain(&config.denied_file_extensions)
    {
        validate_extension(extension)?;
    }

    if config.ignored_paths.iter().any(|p| p.is_empty())
        || config.denied_file_paths.iter().any(|p| p.is_empty())
    {
        return Err(ConfigError::Validation(
            "denied path substrings cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if matches!(&config.summary_path, Some(path) if path.is_empty()) {
        return Err(ConfigError::Validation(
            "summary_path cannot be empty when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates a bare domain string
fn validate_domain_string(domain: &str) -> Result<(), ConfigError> {
    if domain.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain cannot be empty".to_string(),
        ));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot start or end with '.' or '-'",
            domain
        )));
    }

    if domain.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot contain consecutive dots",
            domain
        )));
    }

    Ok(())
}

/// Extensions are compared without the dot, e.g. `pdf`
fn validate_extension(extension: &str) -> Result<(), ConfigError> {
    if extension.is_empty() || !extension.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ConfigError::InvalidPattern(format!(
            "Extension '{}' must be non-empty and alphanumeric (no leading dot)",
            extension
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_domain_string() {
        assert!(validate_domain_string("example.com").is_ok());
        assert!(validate_domain_string("player.vimeo.com").is_ok());
        assert!(validate_domain_string("localhost").is_ok());
        assert!(validate_domain_string("127.0.0.1").is_ok());

        assert!(validate_domain_string("").is_err());
        assert!(validate_domain_string("*.example.com").is_err());
        assert!(validate_domain_string(".example.com").is_err());
        assert!(validate_domain_string("example.com.").is_err());
        assert!(validate_domain_string("example..com").is_err());
    }

    #[test]
    fn test_validate_extension() {
        assert!(validate_extension("pdf").is_ok());
        assert!(validate_extension("mp3").is_ok());

        assert!(validate_extension("").is_err());
        assert!(validate_extension(".pdf").is_err());
        assert!(validate_extension("tar.gz").is_err());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_home_path_must_be_absolute() {
        let mut config = Config::default();
        config.crawler.home_path = "dashboard/".to_string();
        assert!(matches!(
            validate(&config).unwrap_err(),
            ConfigError::Validation(_)
        ));
    }

    #[test]
    fn test_login_fields_must_differ() {
        let mut config = Config::default();
        config.login.password_field = "log".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_empty_ignored_path_rejected() {
        let mut config = Config::default();
        config.rules.ignored_paths.push(String::new());
        assert!(validate(&config).is_err());
    }
}
