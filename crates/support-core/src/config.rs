use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::config_env::{
    optional_trimmed_env, parse_ip_list_env, parse_list_env, parse_u16_env, parse_u64_env,
    parse_usize_env,
};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_REQUESTS_PER_WINDOW: usize = 100;
const DEFAULT_REQUEST_WINDOW_MS: u64 = 900_000;
const DEFAULT_STORE_NAME: &str = "Rouqe Golf";
const DEFAULT_SUPPORT_EMAIL: &str = "support@rouqegolf.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Production,
}

impl AppEnvironment {
    /// Error `details` are only exposed outside production.
    pub fn exposes_error_details(self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for AppEnvironment {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" | "test" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(ConfigError::InvalidConfiguration(format!(
                "APP_ENV must be development or production, got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub max_requests: usize,
    pub window_ms: u64,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: String,
    pub environment: AppEnvironment,
    pub allowed_origins: Vec<String>,
    pub rate_limit: RateLimitConfig,
    pub trusted_proxy_ips: Vec<IpAddr>,
    pub data_dir: PathBuf,
    pub store_name: String,
    pub support_email: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    MissingVar(String),
    #[error("invalid integer in env var {0}")]
    ParseInt(String),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("failed to load .env file: {0}")]
    Dotenv(String),
}

/// Loads `.env` from the working directory when present. A missing file is fine.
pub fn load_dotenv() -> Result<(), ConfigError> {
    match dotenvy::dotenv() {
        Ok(_) => Ok(()),
        Err(err) if err.not_found() => Ok(()),
        Err(err) => Err(ConfigError::Dotenv(err.to_string())),
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = parse_u16_env("PORT", DEFAULT_PORT)?;
        let environment = match optional_trimmed_env("APP_ENV") {
            Some(raw) => raw.parse::<AppEnvironment>()?,
            None => AppEnvironment::Development,
        };

        let rate_limit = RateLimitConfig {
            max_requests: parse_usize_env(
                "MAX_REQUESTS_PER_WINDOW",
                DEFAULT_MAX_REQUESTS_PER_WINDOW,
            )?,
            window_ms: parse_u64_env("REQUEST_WINDOW_MS", DEFAULT_REQUEST_WINDOW_MS)?,
        };
        if rate_limit.max_requests == 0 || rate_limit.window_ms == 0 {
            return Err(ConfigError::InvalidConfiguration(
                "MAX_REQUESTS_PER_WINDOW and REQUEST_WINDOW_MS must be greater than zero"
                    .to_string(),
            ));
        }

        Ok(Self {
            bind_addr: optional_trimmed_env("API_BIND_ADDR")
                .unwrap_or_else(|| format!("0.0.0.0:{port}")),
            environment,
            allowed_origins: parse_list_env("ALLOWED_ORIGINS"),
            rate_limit,
            trusted_proxy_ips: parse_ip_list_env("TRUSTED_PROXY_IPS")?,
            data_dir: optional_trimmed_env("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            store_name: optional_trimmed_env("STORE_NAME")
                .unwrap_or_else(|| DEFAULT_STORE_NAME.to_string()),
            support_email: optional_trimmed_env("SUPPORT_EMAIL")
                .unwrap_or_else(|| DEFAULT_SUPPORT_EMAIL.to_string()),
        })
    }
}
