//! Bootstrap configuration loading
//!
//! Every setting resolves in the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! This module owns tiers 3 and 4 plus discovery of the TOML file itself.
//! A missing TOML file is never fatal: the service logs a warning and starts
//! on compiled defaults. A TOML file that exists but cannot be parsed is an
//! error, since silently ignoring it would hide a misconfiguration.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit TOML config path
pub const CONFIG_PATH_ENV_VAR: &str = "CROPSENSE_CONFIG";

/// Bootstrap configuration loaded from TOML file
///
/// All fields are optional so that a partial file only overrides what it
/// names. Unset fields fall through to [`CompiledDefaults`].
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct TomlConfig {
    /// HTTP listen address, e.g. "127.0.0.1:5810"
    #[serde(default)]
    pub bind_address: Option<String>,

    /// Prediction endpoint URL
    #[serde(default)]
    pub predictor_url: Option<String>,

    /// Ambient-conditions (weather) endpoint URL
    #[serde(default)]
    pub weather_url: Option<String>,

    /// Weather provider API key
    #[serde(default)]
    pub weather_api_key: Option<String>,

    /// Timeout applied to every outbound request, in seconds
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Maximum number of recommendations rendered in the results view
    #[serde(default)]
    pub display_limit: Option<usize>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Compiled-in defaults, the last tier of configuration resolution
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub bind_address: String,
    pub predictor_url: String,
    pub weather_url: String,
    pub request_timeout_secs: u64,
}

impl CompiledDefaults {
    pub fn get() -> Self {
        Self {
            bind_address: "127.0.0.1:5810".to_string(),
            predictor_url: "http://127.0.0.1:5000/predict".to_string(),
            weather_url: "https://api.weatherapi.com/v1/current.json".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Locates the TOML config file for one service module
///
/// Search order:
/// 1. Explicit path from the command line
/// 2. `CROPSENSE_CONFIG` environment variable
/// 3. `<user config dir>/cropsense/<module>.toml` (if it exists)
/// 4. `/etc/cropsense/<module>.toml` (if it exists, unix only)
pub struct ConfigFileResolver {
    module_name: String,
}

impl ConfigFileResolver {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
        }
    }

    /// Resolve the config file path, or `None` when no file is available
    pub fn resolve(&self, cli_path: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = cli_path {
            return Some(path.to_path_buf());
        }

        if let Ok(path) = std::env::var(CONFIG_PATH_ENV_VAR) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }

        let file_name = format!("{}.toml", self.module_name);

        if let Some(user_config) = dirs::config_dir().map(|d| d.join("cropsense").join(&file_name)) {
            if user_config.exists() {
                return Some(user_config);
            }
        }

        if cfg!(unix) {
            let system_config = PathBuf::from("/etc/cropsense").join(&file_name);
            if system_config.exists() {
                return Some(system_config);
            }
        }

        None
    }
}

/// Load TOML configuration, degrading to defaults when no file exists
pub fn load_toml_config(path: Option<&Path>) -> Result<TomlConfig> {
    let Some(path) = path else {
        warn!("No config file found, using compiled defaults");
        return Ok(TomlConfig::default());
    };

    if !path.exists() {
        warn!("Config file not found: {}, using compiled defaults", path.display());
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML {} failed: {}", path.display(), e)))?;

    info!("Loaded TOML configuration from {}", path.display());
    Ok(config)
}

/// Treat blank strings as absent (an empty env var must not shadow TOML)
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
