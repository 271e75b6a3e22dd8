//! Runtime configuration read from the environment.
//!
//! A `.env` file in the working directory is honoured when present.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

pub const BASE_URL_VAR: &str = "MATCHDECK_BASE_URL";
pub const SESSION_COOKIE_VAR: &str = "MATCHDECK_SESSION_COOKIE";
pub const REQUEST_TIMEOUT_VAR: &str = "MATCHDECK_REQUEST_TIMEOUT_SECS";
pub const LOG_FILE_VAR: &str = "MATCHDECK_LOG_FILE";

const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_LOG_FILE: &str = "matchdeck.log";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be an http(s) URL, got {value:?}")]
    InvalidUrl { var: &'static str, value: String },

    #[error("{var} must be a positive number of seconds, got {value:?}")]
    InvalidTimeout { var: &'static str, value: String },

    #[error("{var} must look like name=value")]
    InvalidCookie { var: &'static str },

    #[error("could not read env file: {0}")]
    EnvFile(#[from] dotenvy::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub base_url: String,
    pub session_cookie: Option<String>,
    /// No timeout unless configured; a hung request then keeps its marker set.
    pub request_timeout: Option<Duration>,
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            session_cookie: None,
            request_timeout: None,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl Config {
    /// Loads `.env` (if any) into the process environment, then reads it.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Reads a specific dotenv file without touching the process environment.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let vars = dotenvy::from_path_iter(path.as_ref())?.collect::<Result<Vec<_>, _>>()?;
        Self::from_vars(vars)
    }

    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let get = |key: &str| vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        let mut config = Config::default();

        if let Some(url) = get(BASE_URL_VAR) {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidUrl {
                    var: BASE_URL_VAR,
                    value: url.to_string(),
                });
            }
            config.base_url = url.trim_end_matches('/').to_string();
        }

        if let Some(cookie) = get(SESSION_COOKIE_VAR) {
            match cookie.split_once('=') {
                Some((name, _)) if !name.trim().is_empty() => {
                    config.session_cookie = Some(cookie.to_string());
                }
                _ => return Err(ConfigError::InvalidCookie { var: SESSION_COOKIE_VAR }),
            }
        }

        if let Some(secs) = get(REQUEST_TIMEOUT_VAR) {
            match secs.parse::<u64>() {
                Ok(n) if n > 0 => config.request_timeout = Some(Duration::from_secs(n)),
                _ => {
                    return Err(ConfigError::InvalidTimeout {
                        var: REQUEST_TIMEOUT_VAR,
                        value: secs.to_string(),
                    })
                }
            }
        }

        if let Some(path) = get(LOG_FILE_VAR) {
            config.log_file = PathBuf::from(path);
        }

        Ok(config)
    }
}
