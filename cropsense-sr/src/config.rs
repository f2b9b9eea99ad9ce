//! Configuration resolution for cropsense-sr
//!
//! Each setting resolves CLI → ENV → TOML → compiled default. The winning
//! source is logged; the weather API key value never is.

use cropsense_common::config::{non_blank, CompiledDefaults, TomlConfig};
use cropsense_common::{Error, Result};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{info, warn};

pub const BIND_ENV_VAR: &str = "CROPSENSE_BIND";
pub const PREDICTOR_URL_ENV_VAR: &str = "CROPSENSE_PREDICTOR_URL";
pub const WEATHER_URL_ENV_VAR: &str = "CROPSENSE_WEATHER_URL";
pub const WEATHER_API_KEY_ENV_VAR: &str = "CROPSENSE_WEATHER_API_KEY";

/// Values supplied on the command line (highest priority)
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub bind_address: Option<String>,
    pub predictor_url: Option<String>,
    pub weather_url: Option<String>,
    pub weather_api_key: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub display_limit: Option<usize>,
}

/// Fully resolved service settings
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind_address: SocketAddr,
    pub predictor_url: String,
    pub weather_url: String,
    pub weather_api_key: Option<String>,
    pub request_timeout: Duration,
    /// `None` renders every recommendation
    pub display_limit: Option<usize>,
}

impl ServiceConfig {
    /// Resolve every setting from its sources
    pub fn resolve(cli: &CliOverrides, toml_config: &TomlConfig) -> Result<Self> {
        let defaults = CompiledDefaults::get();

        let bind = pick(
            "bind_address",
            cli.bind_address.clone(),
            BIND_ENV_VAR,
            toml_config.bind_address.clone(),
        )
        .unwrap_or(defaults.bind_address);
        let bind_address: SocketAddr = bind
            .parse()
            .map_err(|e| Error::Config(format!("Invalid bind address '{}': {}", bind, e)))?;

        let predictor_url = pick(
            "predictor_url",
            cli.predictor_url.clone(),
            PREDICTOR_URL_ENV_VAR,
            toml_config.predictor_url.clone(),
        )
        .unwrap_or(defaults.predictor_url);

        let weather_url = pick(
            "weather_url",
            cli.weather_url.clone(),
            WEATHER_URL_ENV_VAR,
            toml_config.weather_url.clone(),
        )
        .unwrap_or(defaults.weather_url);

        let weather_api_key = pick(
            "weather_api_key",
            cli.weather_api_key.clone(),
            WEATHER_API_KEY_ENV_VAR,
            toml_config.weather_api_key.clone(),
        );
        if weather_api_key.is_none() {
            warn!(
                "Weather API key not configured; location mode will fail. Set {} or weather_api_key in TOML",
                WEATHER_API_KEY_ENV_VAR
            );
        }

        let timeout_secs = cli
            .request_timeout_secs
            .or(toml_config.request_timeout_secs)
            .unwrap_or(defaults.request_timeout_secs);
        if timeout_secs == 0 {
            return Err(Error::Config("request_timeout_secs must be at least 1".to_string()));
        }

        let display_limit = cli.display_limit.or(toml_config.display_limit);
        if display_limit == Some(0) {
            return Err(Error::Config("display_limit must be at least 1".to_string()));
        }

        Ok(Self {
            bind_address,
            predictor_url,
            weather_url,
            weather_api_key,
            request_timeout: Duration::from_secs(timeout_secs),
            display_limit,
        })
    }
}

/// First non-blank of CLI, environment, TOML; logs which one won
fn pick(
    name: &str,
    cli: Option<String>,
    env_var: &str,
    toml: Option<String>,
) -> Option<String> {
    if let Some(value) = non_blank(cli) {
        info!("{} loaded from command line", name);
        return Some(value);
    }
    if let Some(value) = non_blank(std::env::var(env_var).ok()) {
        info!("{} loaded from environment variable {}", name, env_var);
        return Some(value);
    }
    if let Some(value) = non_blank(toml) {
        info!("{} loaded from TOML config", name);
        return Some(value);
    }
    None
}
