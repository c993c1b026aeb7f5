//! Environment-driven server configuration.
//!
//! # Responsibility
//! - Resolve bind address, storage path, logging, CORS and AI settings.
//! - Reject malformed values at startup instead of at first use.
//!
//! # Invariants
//! - Blank variables are treated as unset.
//! - The AI API key never appears in `Debug` output.

use portfolio_core::{default_log_level, AiClientConfig, HttpTransportConfig};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_BIND_ADDR: &str = "PORTFOLIO_BIND_ADDR";
pub const ENV_DB_PATH: &str = "PORTFOLIO_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "PORTFOLIO_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "PORTFOLIO_LOG_DIR";
pub const ENV_FRONTEND_ORIGIN: &str = "PORTFOLIO_FRONTEND_ORIGIN";
pub const ENV_AI_API_KEY: &str = "PORTFOLIO_AI_API_KEY";
pub const ENV_AI_BASE_URL: &str = "PORTFOLIO_AI_BASE_URL";
pub const ENV_AI_MODEL: &str = "PORTFOLIO_AI_MODEL";
pub const ENV_AI_TIMEOUT_SECS: &str = "PORTFOLIO_AI_TIMEOUT_SECS";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3001";
const DEFAULT_DB_FILE_NAME: &str = "portfolio.sqlite3";
const DEFAULT_LOG_DIR_NAME: &str = "portfolio-logs";
const DEFAULT_FRONTEND_ORIGIN: &str = "http://localhost:3000";

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value, reason } => {
                write!(f, "invalid value `{value}` for {key}: {reason}")
            }
        }
    }
}

impl Error for ConfigError {}

#[derive(Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: PathBuf,
    pub frontend_origin: String,
    pub ai_api_key: Option<String>,
    pub ai_base_url: String,
    pub ai_model: String,
    pub ai_timeout: Duration,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("bind_addr", &self.bind_addr)
            .field("db_path", &self.db_path)
            .field("log_level", &self.log_level)
            .field("log_dir", &self.log_dir)
            .field("frontend_origin", &self.frontend_origin)
            .field("ai_api_key", &self.ai_api_key.as_ref().map(|_| "<redacted>"))
            .field("ai_base_url", &self.ai_base_url)
            .field("ai_model", &self.ai_model)
            .field("ai_timeout", &self.ai_timeout)
            .finish()
    }
}

impl ServerConfig {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which maps a key to its raw value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let bind_raw = read(ENV_BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .map_err(|err| ConfigError::InvalidValue {
                key: ENV_BIND_ADDR,
                value: bind_raw.clone(),
                reason: err.to_string(),
            })?;

        let ai_timeout = match read(ENV_AI_TIMEOUT_SECS) {
            None => HttpTransportConfig::default().timeout,
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: ENV_AI_TIMEOUT_SECS,
                        value: raw,
                        reason: "expected a positive number of seconds".to_string(),
                    })
                }
            },
        };

        let frontend_origin =
            read(ENV_FRONTEND_ORIGIN).unwrap_or_else(|| DEFAULT_FRONTEND_ORIGIN.to_string());
        if !(frontend_origin.starts_with("http://") || frontend_origin.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                key: ENV_FRONTEND_ORIGIN,
                value: frontend_origin,
                reason: "expected an http(s) origin".to_string(),
            });
        }

        Ok(Self {
            bind_addr,
            db_path: read(ENV_DB_PATH)
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)),
            log_level: read(ENV_LOG_LEVEL).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: read(ENV_LOG_DIR)
                .map(|raw| absolutize(PathBuf::from(raw)))
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_LOG_DIR_NAME)),
            frontend_origin,
            ai_api_key: read(ENV_AI_API_KEY),
            ai_base_url: read(ENV_AI_BASE_URL)
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| HttpTransportConfig::default().base_url),
            ai_model: read(ENV_AI_MODEL).unwrap_or_else(|| AiClientConfig::default().model),
            ai_timeout,
        })
    }

    pub fn transport_config(&self) -> HttpTransportConfig {
        HttpTransportConfig {
            base_url: self.ai_base_url.clone(),
            api_key: self.ai_api_key.clone(),
            timeout: self.ai_timeout,
        }
    }

    /// Client settings with the configured model and fixed resilience defaults.
    pub fn ai_client_config(&self) -> AiClientConfig {
        AiClientConfig {
            model: self.ai_model.clone(),
            ..AiClientConfig::default()
        }
    }
}

/// Log directories must be absolute; relative ones resolve against the
/// working directory.
fn absolutize(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path,
    }
}
