use crate::config::types::{ArchiveConfig, Config, CrawlerConfig, OutputConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_archive_config(&config.archive)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates worker pool and pacing settings
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.workers < 1 || config.workers > 64 {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and 64, got {}",
            config.workers
        )));
    }

    if config.request_interval_ms < 50 {
        return Err(ConfigError::Validation(format!(
            "request_interval_ms must be >= 50ms, got {}ms",
            config.request_interval_ms
        )));
    }

    if config.request_timeout_secs < 1 || config.request_timeout_secs > 600 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be between 1 and 600, got {}",
            config.request_timeout_secs
        )));
    }

    if config.result_buffer < 1 {
        return Err(ConfigError::Validation(
            "result_buffer must be >= 1".to_string(),
        ));
    }

    if config.post_process_limit < 1 {
        return Err(ConfigError::Validation(
            "post_process_limit must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates the archive entry point
fn validate_archive_config(config: &ArchiveConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use http or https",
            config.base_url
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' has no host",
            config.base_url
        )));
    }

    if config.start_page < 1 {
        return Err(ConfigError::Validation(
            "start_page must be >= 1".to_string(),
        ));
    }

    validate_language(&config.language)
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.documents_dir.trim().is_empty() {
        return Err(ConfigError::Validation(
            "documents_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Accepts "all" or a two-letter lowercase language code
pub(crate) fn validate_language(language: &str) -> Result<(), ConfigError> {
    if language == "all" {
        return Ok(());
    }

    if language.len() != 2 || !language.chars().all(|c| c.is_ascii_lowercase()) {
        return Err(ConfigError::Validation(format!(
            "language must be 'all' or a two-letter code like 'de', got '{}'",
            language
        )));
    }

    Ok(())
}
