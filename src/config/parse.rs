use super::types::*;
use crate::config::{expand_env_vars, expand_tilde};
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation failed:\n{}", .0.join("\n"))]
    ValidationList(Vec<String>),

    #[error("validation failed: {0}")]
    Validation(String),
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    use std::io::Read;

    let mut file = File::open(path).map_err(|e| {
        ConfigError::Io(std::io::Error::new(
            e.kind(),
            format!("failed to open config file '{}': {}", path.display(), e),
        ))
    })?;

    let mut yaml_string = String::new();
    file.read_to_string(&mut yaml_string).map_err(|e| {
        ConfigError::Io(std::io::Error::new(
            e.kind(),
            format!("failed to read config file '{}': {}", path.display(), e),
        ))
    })?;

    parse_config(&yaml_string).map_err(|e| match e {
        ConfigError::YamlParse(e) => ConfigError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("in file '{}': {}", path.display(), e),
        )),
        other => other,
    })
}

/// Parse and validate a config held in memory.
pub fn parse_config(yaml: &str) -> Result<Config, ConfigError> {
    let expansion = expand_env_vars(yaml).map_err(|e| ConfigError::Validation(e.to_string()))?;
    if !expansion.unset.is_empty() {
        return Err(ConfigError::Validation(format!(
            "environment variables are not set: {}\n\
             \n\
             Set them before starting, or replace them in the config file with literal values",
            expansion.unset.join(", ")
        )));
    }

    let mut config: Config = serde_yaml::from_str(&expansion.text)?;

    expand_paths(&mut config);
    validate_config(&config)?;

    Ok(config)
}

fn expand_paths(config: &mut Config) {
    config.storage.output_dir = expand_tilde(&config.storage.output_dir);

    if let TransportConfig::Outbox { path } = &mut config.downlink.transport {
        *path = expand_tilde(path);
    }
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    let storage = &config.storage;
    if storage.max_file_size_kb == 0 {
        errors.push("storage.max_file_size_kb must be greater than zero".to_string());
    }
    if storage.max_file_ttl.is_zero() {
        errors.push("storage.max_file_ttl must be greater than zero".to_string());
    }
    if storage.file_prefix.is_empty() || storage.file_prefix.contains(['/', '\\']) {
        errors.push(format!(
            "storage.file_prefix '{}' must be non-empty and contain no path separators",
            storage.file_prefix
        ));
    }
    if storage.file_extension.is_empty() || storage.file_extension.contains(['/', '\\', '.']) {
        errors.push(format!(
            "storage.file_extension '{}' must be non-empty and contain no dots or path separators",
            storage.file_extension
        ));
    }

    if config.pipeline.heartbeat_interval_ms == 0 {
        errors.push("pipeline.heartbeat_interval_ms must be greater than zero".to_string());
    }

    if config.downlink.destination_app_id.is_empty() {
        errors.push("downlink.destination_app_id must not be empty".to_string());
    }
    match &config.downlink.transport {
        TransportConfig::Outbox { path } => {
            // A move into a directory at or under the output dir never
            // leaves it, so the file is shipped again every cycle
            if path.starts_with(&storage.output_dir) || storage.output_dir.starts_with(path) {
                errors.push(format!(
                    "downlink.transport.path '{}' must differ from storage.output_dir '{}' \
                     and neither may contain the other",
                    path.display(),
                    storage.output_dir.display()
                ));
            }
        }
        TransportConfig::Http { url } => {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                errors.push(format!("downlink.transport.url '{}' is not an http(s) URL", url));
            }
        }
    }

    let mut seen = HashSet::new();
    for plugin in &config.plugins {
        if !seen.insert(plugin.name.as_str()) {
            errors.push(format!("duplicate plugin name '{}'", plugin.name));
        }
        if plugin.permissions.is_empty() {
            errors.push(format!("plugin '{}' has no permissions", plugin.name));
        }
    }

    if config.web.listen.parse::<std::net::SocketAddr>().is_err() {
        errors.push(format!("web.listen '{}' is not a socket address", config.web.listen));
    }

    match errors.len() {
        0 => Ok(()),
        1 => Err(ConfigError::Validation(errors.remove(0))),
        _ => Err(ConfigError::ValidationList(errors)),
    }
}
