//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use crate::backends::ServiceKind;
use crate::config::schema::{GatewayConfig, LogFormat};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse a TOML file into a configuration (not yet validated).
pub fn load_file(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Overlay environment-style key/value inputs onto `config`.
///
/// `lookup` returns `None` for unset keys; empty values count as unset.
pub fn apply_env<F>(config: &mut GatewayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

    for kind in ServiceKind::ALL {
        if let Some(addr) = get(kind.env_key()) {
            *config.services.slot_mut(kind) = addr;
        }
    }

    if let Some(port) = get("PORT") {
        config.listener.port = parse_num("PORT", port)?;
    }
    if let Some(addr) = get("LISTEN_ADDR") {
        config.listener.listen_addr = addr;
    }
    if let Some(dir) = get("STATIC_DIR") {
        config.assets.static_dir = dir;
    }
    if let Some(level) = get("LOG_LEVEL") {
        config.observability.log_level = level;
    }
    if let Some(format) = get("LOG_FORMAT") {
        config.observability.log_format = match format.to_ascii_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            "json" => LogFormat::Json,
            _ => {
                return Err(ConfigError::InvalidValue {
                    key: "LOG_FORMAT",
                    value: format,
                })
            }
        };
    }
    if let Some(addr) = get("METRICS_ADDR") {
        config.observability.metrics_address = Some(addr);
    }
    if let Some(secs) = get("RPC_TIMEOUT_SECS") {
        config.timeouts.rpc_secs = parse_num("RPC_TIMEOUT_SECS", secs)?;
    }
    if let Some(secs) = get("REQUEST_TIMEOUT_SECS") {
        config.timeouts.request_secs = parse_num("REQUEST_TIMEOUT_SECS", secs)?;
    }

    Ok(())
}

fn parse_num<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { key, value })
}

/// Build the full configuration: defaults, optional TOML file, then
/// environment overrides. The result is validated.
pub fn load_config<F>(path: Option<&Path>, lookup: F) -> Result<GatewayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => load_file(path)?,
        None => GatewayConfig::default(),
    };
    apply_env(&mut config, lookup)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}
