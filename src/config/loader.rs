//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::CompositeConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `pool.max_concurrency`.
pub const ENV_THREAD_POOL_SIZE: &str = "APP_THREAD_POOL_SIZE";
/// Environment variable overriding `pool.max_queue_depth`.
pub const ENV_TASK_QUEUE_SIZE: &str = "APP_TASK_QUEUE_SIZE";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {var}: {value:?}")]
    Env { var: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load, override from the environment, and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<CompositeConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: CompositeConfig = toml::from_str(&content)?;
    finalize(config)
}

/// Build configuration from defaults plus environment overrides.
pub fn default_config() -> Result<CompositeConfig, ConfigError> {
    finalize(CompositeConfig::default())
}

fn finalize(mut config: CompositeConfig) -> Result<CompositeConfig, ConfigError> {
    apply_overrides(&mut config, |var| std::env::var(var).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply pool size overrides using `lookup` to resolve variables.
pub fn apply_overrides<F>(config: &mut CompositeConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(ENV_THREAD_POOL_SIZE) {
        config.pool.max_concurrency = parse_usize(ENV_THREAD_POOL_SIZE, value)?;
    }
    if let Some(value) = lookup(ENV_TASK_QUEUE_SIZE) {
        config.pool.max_queue_depth = parse_usize(ENV_TASK_QUEUE_SIZE, value)?;
    }
    Ok(())
}

fn parse_usize(var: &'static str, value: String) -> Result<usize, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Env { var, value })
}
