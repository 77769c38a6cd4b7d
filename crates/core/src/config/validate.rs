use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Remote base URL is an http(s) URL and the timeout is not 0
/// - Cache TTL is not 0
/// - Paging sizes are non-zero and consistent
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Remote validation
    let base_url = config.remote.base_url.trim();
    if base_url.is_empty() {
        return Err(ConfigError::ValidationError(
            "remote.base_url cannot be empty".to_string(),
        ));
    }
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::ValidationError(format!(
            "remote.base_url must be an http(s) URL, got '{}'",
            base_url
        )));
    }
    if config.remote.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "remote.timeout_secs cannot be 0".to_string(),
        ));
    }

    // Cache validation
    if config.cache.ttl_secs == 0 {
        return Err(ConfigError::ValidationError(
            "cache.ttl_secs cannot be 0".to_string(),
        ));
    }
    if chrono::Duration::from_std(config.cache.ttl()).is_err() {
        return Err(ConfigError::ValidationError(format!(
            "cache.ttl_secs ({}) is out of range",
            config.cache.ttl_secs
        )));
    }

    // Paging validation
    let paging = &config.paging;
    if paging.page_size == 0 {
        return Err(ConfigError::ValidationError(
            "paging.page_size cannot be 0".to_string(),
        ));
    }
    if paging.initial_load_size < paging.page_size {
        return Err(ConfigError::ValidationError(format!(
            "paging.initial_load_size ({}) must be at least paging.page_size ({})",
            paging.initial_load_size, paging.page_size
        )));
    }
    if paging.max_size < paging.initial_load_size {
        return Err(ConfigError::ValidationError(format!(
            "paging.max_size ({}) must be at least paging.initial_load_size ({})",
            paging.max_size, paging.initial_load_size
        )));
    }

    Ok(())
}
