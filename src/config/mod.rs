//! Configuration loading and validation
//!
//! Kumo is configured from a TOML file; a handful of environment variables
//! override the file so deployments can inject store locations and the seed
//! URL without editing it.

mod parser;
mod types;
mod validation;

pub use parser::{apply_env_overrides, load_config};
pub use types::{
    Config, CrawlerConfig, IndexerConfig, RankerConfig, StoresConfig, UserAgentConfig,
};
pub use validation::validate;
