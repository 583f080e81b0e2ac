//! Process configuration from the environment
//!
//! Credentials are required up front: the server refuses to start rather
//! than call a provider with a missing key.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_MODEL: &str = "gemini-1.5-flash";
/// Relative to the working directory; the artifact ships with the crate
const DEFAULT_MODEL_PATH: &str = "models/crop_model.json";
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 15;
const DEFAULT_SESSION_TTL_SECS: u64 = 24 * 60 * 60;
const DEFAULT_SESSION_SWEEP_SECS: u64 = 10 * 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{var} has invalid value {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub weather_api_key: String,
    pub market_api_key: String,
    /// `None` only in gateway mode
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub llm_gateway: Option<String>,
    pub model_path: PathBuf,
    pub upstream_timeout: Duration,
    pub session_ttl: Duration,
    pub session_sweep_interval: Duration,
    pub weather_base_url: String,
    pub market_base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));
        let seconds = |name: &'static str, default: u64| -> Result<Duration, ConfigError> {
            match get(name) {
                None => Ok(Duration::from_secs(default)),
                Some(value) => match value.trim().parse::<u64>() {
                    Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
                    _ => Err(ConfigError::Invalid { var: name, value }),
                },
            }
        };

        let llm_gateway = get("LLM_GATEWAY");
        let gemini_api_key = match (&llm_gateway, get("GEMINI_KEY")) {
            (_, Some(key)) => Some(key),
            (Some(_), None) => None,
            (None, None) => return Err(ConfigError::Missing("GEMINI_KEY")),
        };

        let port = match get("AGRO_PORT") {
            None => DEFAULT_PORT,
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid {
                    var: "AGRO_PORT",
                    value,
                })?,
        };

        Ok(Self {
            port,
            weather_api_key: require("WEATHER_KEY")?,
            market_api_key: require("GOV_API_KEY")?,
            gemini_api_key,
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            llm_gateway,
            model_path: get("AGRO_MODEL_PATH")
                .map_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH), PathBuf::from),
            upstream_timeout: seconds("AGRO_UPSTREAM_TIMEOUT_SECS", DEFAULT_UPSTREAM_TIMEOUT_SECS)?,
            session_ttl: seconds("AGRO_SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS)?,
            session_sweep_interval: seconds("AGRO_SESSION_SWEEP_SECS", DEFAULT_SESSION_SWEEP_SECS)?,
            weather_base_url: get("OPENWEATHER_BASE_URL")
                .unwrap_or_else(|| crate::weather::DEFAULT_BASE_URL.to_string()),
            market_base_url: get("AGMARKNET_BASE_URL")
                .unwrap_or_else(|| crate::market::DEFAULT_BASE_URL.to_string()),
        })
    }
}
