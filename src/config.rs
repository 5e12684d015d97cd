use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use crate::pipeline::llm::{DEFAULT_GEMINI_URL, DEFAULT_MODEL};

/// Application-level constants
pub const APP_NAME: &str = "Clerkly";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_MAIL_FROM: &str = "Clerkly <reports@clerkly.app>";

/// Get the application data directory
/// ~/Clerkly/ on all platforms
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "clerkly=info,clerkly_lib=info,tower_http=info"
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY is not set")]
    MissingApiKey,

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Outbound mail provider settings. Absent when `CLERKLY_MAIL_URL` is unset.
#[derive(Debug, Clone, PartialEq)]
pub struct MailConfig {
    pub url: String,
    pub api_key: String,
    pub from: String,
}

/// Runtime configuration read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub gemini_url: String,
    pub bind: SocketAddr,
    pub timeout_secs: u64,
    pub mail: Option<MailConfig>,
}

impl AppConfig {
    /// Read configuration from the process environment (after `.env`).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bind_raw = get("CLERKLY_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_raw
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidValue {
                key: "CLERKLY_BIND",
                value: bind_raw.clone(),
            })?;

        let timeout_secs = match get("CLERKLY_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidValue {
                    key: "CLERKLY_TIMEOUT_SECS",
                    value: raw,
                })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let mail = get("CLERKLY_MAIL_URL").map(|url| MailConfig {
            url,
            api_key: get("CLERKLY_MAIL_KEY").unwrap_or_default(),
            from: get("CLERKLY_MAIL_FROM").unwrap_or_else(|| DEFAULT_MAIL_FROM.to_string()),
        });

        Ok(Self {
            api_key: get("GEMINI_API_KEY"),
            model: get("CLERKLY_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            gemini_url: get("CLERKLY_GEMINI_URL").unwrap_or_else(|| DEFAULT_GEMINI_URL.to_string()),
            bind,
            timeout_secs,
            mail,
        })
    }

    /// The provider key, required by anything that talks to the model.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key.as_deref().ok_or(ConfigError::MissingApiKey)
    }
}
