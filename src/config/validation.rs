use crate::config::types::{
    BookmarkApiConfig, Config, OutputConfig, PipelineConfig, UserAgentConfig, ValidationConfig,
};
use crate::ConfigError;
use url::Url;

const MAX_CONCURRENCY: usize = 50;
const MAX_RETRIES: u32 = 10;
const MIN_TIMEOUT_MS: u64 = 100;
const MAX_TIMEOUT_MS: u64 = 120_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_pipeline_config(&config.pipeline)?;
    validate_validation_config(&config.validation)?;
    validate_bookmark_api_config(&config.bookmark_api)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

fn validate_pipeline_config(config: &PipelineConfig) -> Result<(), ConfigError> {
    if config.concurrency_limit < 1 || config.concurrency_limit > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "concurrency_limit must be between 1 and {}, got {}",
            MAX_CONCURRENCY, config.concurrency_limit
        )));
    }

    if config.max_retries > MAX_RETRIES {
        return Err(ConfigError::Validation(format!(
            "max_retries must be <= {}, got {}",
            MAX_RETRIES, config.max_retries
        )));
    }

    Ok(())
}

fn validate_validation_config(config: &ValidationConfig) -> Result<(), ConfigError> {
    validate_timeout("validation.timeout_ms", config.timeout_ms)
}

fn validate_bookmark_api_config(config: &BookmarkApiConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if matches!(config.api_token.as_deref(), Some(token) if token.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "api_token cannot be blank when set".to_string(),
        ));
    }

    validate_timeout("bookmark_api.timeout_ms", config.timeout_ms)
}

fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.client_name.is_empty() {
        return Err(ConfigError::Validation(
            "client_name cannot be empty".to_string(),
        ));
    }

    if !config
        .client_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "client_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.client_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if config.summary_path.is_empty() {
        return Err(ConfigError::Validation(
            "summary_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_timeout(field: &str, timeout_ms: u64) -> Result<(), ConfigError> {
    if !(MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&timeout_ms) {
        return Err(ConfigError::Validation(format!(
            "{} must be between {} and {}ms, got {}ms",
            field, MIN_TIMEOUT_MS, MAX_TIMEOUT_MS, timeout_ms
        )));
    }
    Ok(())
}
