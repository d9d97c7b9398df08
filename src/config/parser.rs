use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// Environment overrides are applied after parsing and before validation,
/// so a config made valid (or invalid) by the environment is judged in its
/// final form.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;

    let mut config: Config = toml::from_str(&content)?;

    apply_env_overrides(&mut config);
    validate(&config)?;

    Ok(config)
}

/// Applies environment-variable overrides to a parsed configuration
///
/// Deployments inject store locations and the seed URL through the
/// environment; every variable is optional and unset variables leave the
/// file's value untouched.
///
/// | Variable             | Overrides                  |
/// |----------------------|----------------------------|
/// | `KUMO_SEED_URL`      | `crawler.seed-url`         |
/// | `KUMO_METADATA_PATH` | `stores.metadata-path`     |
/// | `KUMO_QUEUE_PATH`    | `stores.queue-path`        |
/// | `KUMO_INDEX_PATH`    | `stores.index-path`        |
/// | `KUMO_ARCHIVE_DIR`   | `stores.archive-dir`       |
/// | `KUMO_BIND_ADDR`     | `ranker.bind-addr`         |
pub fn apply_env_overrides(config: &mut Config) {
    if let Ok(v) = std::env::var("KUMO_SEED_URL") {
        config.crawler.seed_url = v;
    }
    if let Ok(v) = std::env::var("KUMO_METADATA_PATH") {
        config.stores.metadata_path = v;
    }
    if let Ok(v) = std::env::var("KUMO_QUEUE_PATH") {
        config.stores.queue_path = v;
    }
    if let Ok(v) = std::env::var("KUMO_INDEX_PATH") {
        config.stores.index_path = v;
    }
    if let Ok(v) = std::env::var("KUMO_ARCHIVE_DIR") {
        config.stores.archive_dir = v;
    }
    if let Ok(v) = std::env::var("KUMO_BIND_ADDR") {
        config.ranker.bind_addr = v;
    }
}
