use crate::config::types::Config;
use crate::url::is_valid_crawl_url;
use crate::ConfigError;

/// Validates a parsed configuration
///
/// # Arguments
///
/// * `config` - The configuration to validate
///
/// # Returns
///
/// * `Ok(())` - Configuration is valid
/// * `Err(ConfigError)` - A field failed validation
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if !is_valid_crawl_url(&config.crawler.seed_url) {
        return Err(ConfigError::Validation(format!(
            "seed-url must start with http:// or https:// and be at least 10 characters: {}",
            config.crawler.seed_url
        )));
    }

    if config.crawler.fetch_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "fetch-timeout-secs must be greater than 0".to_string(),
        ));
    }

    if config.crawler.enqueue_retries == 0 {
        return Err(ConfigError::Validation(
            "enqueue-retries must be greater than 0".to_string(),
        ));
    }

    if config.indexer.max_decompressed_bytes == 0 {
        return Err(ConfigError::Validation(
            "max-decompressed-bytes must be greater than 0".to_string(),
        ));
    }

    if config.ranker.top_k == 0 {
        return Err(ConfigError::Validation(
            "top-k must be greater than 0".to_string(),
        ));
    }

    if config.ranker.bind_addr.parse::<std::net::SocketAddr>().is_err() {
        return Err(ConfigError::Validation(format!(
            "bind-addr is not a valid socket address: {}",
            config.ranker.bind_addr
        )));
    }

    for (name, value) in [
        ("metadata-path", &config.stores.metadata_path),
        ("queue-path", &config.stores.queue_path),
        ("index-path", &config.stores.index_path),
        ("archive-dir", &config.stores.archive_dir),
        ("archive-file", &config.stores.archive_file),
    ] {
        if value.is_empty() {
            return Err(ConfigError::Validation(format!("{} must not be empty", name)));
        }
    }

    if config.user_agent.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name must not be empty".to_string(),
        ));
    }

    Ok(())
}
