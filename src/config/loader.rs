//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::DiscoveryConfig;
use crate::config::source::SourceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Parse error: {0}")]
    Toml(#[from] toml::de::Error),

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

/// A loaded document together with its validated sources.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub document: DiscoveryConfig,
    pub sources: Vec<SourceConfig>,
}

/// Load and validate configuration. Files ending in `.toml` are read as
/// TOML, everything else as YAML.
pub fn load_config(path: &Path) -> Result<LoadedConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    let document = if is_toml {
        parse_toml(&content)?
    } else {
        parse_yaml(&content)?
    };
    let sources = validate_config(&document).map_err(ConfigError::Validation)?;

    Ok(LoadedConfig { document, sources })
}

pub fn parse_yaml(content: &str) -> Result<DiscoveryConfig, ConfigError> {
    Ok(serde_yaml::from_str(content)?)
}

pub fn parse_toml(content: &str) -> Result<DiscoveryConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}
