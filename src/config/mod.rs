//! Environment-driven configuration for the dashboard and the dev backend.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 3_000;
pub const DEFAULT_PROGRESS_INTERVAL_MS: u64 = 400;
pub const DEFAULT_SIGNUP_REDIRECT_MS: u64 = 2_000;
pub const DEFAULT_STATE_DIR: &str = ".stocksignal";
pub const DEFAULT_BACKEND_PORT: u16 = 5000;

/// Deployment environment, used to pick the log format
pub fn get_environment() -> String {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "sandbox".to_string())
}

pub fn get_api_url() -> String {
    env::var("API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string())
}

pub fn get_backend_port() -> u16 {
    env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_BACKEND_PORT)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidUrl { value: String, reason: String },
    InvalidNumber { key: &'static str, value: String },
    ZeroInterval(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidUrl { value, reason } => {
                write!(f, "invalid API_URL '{}': {}", value, reason)
            }
            ConfigError::InvalidNumber { key, value } => {
                write!(f, "{} must be a whole number, got '{}'", key, value)
            }
            ConfigError::ZeroInterval(key) => write!(f, "{} must be greater than 0", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Settings shared by the shell and every view it mounts
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub api_url: Url,
    pub poll_interval: Duration,
    pub progress_interval: Duration,
    pub signup_redirect_delay: Duration,
    pub state_dir: PathBuf,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            // Constant, known to parse.
            api_url: Url::parse(DEFAULT_API_URL).expect("default API url is valid"),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            progress_interval: Duration::from_millis(DEFAULT_PROGRESS_INTERVAL_MS),
            signup_redirect_delay: Duration::from_millis(DEFAULT_SIGNUP_REDIRECT_MS),
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
        }
    }
}

impl DashboardConfig {
    /// Build the configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Missing keys fall back to the defaults; present keys must parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_url = match lookup("API_URL") {
            Some(raw) => parse_api_url(&raw)?,
            None => defaults.api_url,
        };

        let poll_interval = millis(&lookup, "POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL_MS)?;
        let progress_interval =
            millis(&lookup, "PROGRESS_INTERVAL_MS", DEFAULT_PROGRESS_INTERVAL_MS)?;
        // A zero redirect delay is allowed: it means "navigate immediately".
        let signup_redirect_delay = match lookup("SIGNUP_REDIRECT_MS") {
            Some(raw) => Duration::from_millis(parse_u64("SIGNUP_REDIRECT_MS", &raw)?),
            None => defaults.signup_redirect_delay,
        };

        let state_dir = lookup("DASHBOARD_STATE_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.state_dir);

        Ok(Self {
            api_url,
            poll_interval,
            progress_interval,
            signup_redirect_delay,
            state_dir,
        })
    }
}

fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidUrl {
        value: raw.to_string(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidUrl {
            value: raw.to_string(),
            reason: "URL cannot be used as a base".to_string(),
        });
    }
    Ok(url)
}

fn parse_u64(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        key,
        value: raw.to_string(),
    })
}

fn millis<F>(lookup: &F, key: &'static str, default_ms: u64) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = match lookup(key) {
        Some(raw) => parse_u64(key, &raw)?,
        None => default_ms,
    };
    if value == 0 {
        return Err(ConfigError::ZeroInterval(key));
    }
    Ok(Duration::from_millis(value))
}
