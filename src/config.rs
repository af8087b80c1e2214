//! Process configuration
//!
//! Read once at startup and handed to the gateway and tool registry.
//! Nothing below `main` looks at the environment.

use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_PUBLIC_DIR: &str = "public";

/// Startup configuration errors. Any of these stops the process.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY environment variable is not set")]
    MissingApiKey,
    #[error("PORT must be a number between 0 and 65535, got {0:?}")]
    InvalidPort(String),
}

/// Immutable process configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: String,
    /// ntfy-style topic URL; `None` leaves `sendNotification` answering with
    /// a "not configured" string
    pub notify_url: Option<String>,
    pub port: u16,
    pub model: String,
    pub gemini_base_url: String,
    pub public_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("GEMINI_API_KEY").ok_or(ConfigError::MissingApiKey)?;

        let port = match get("PORT") {
            Some(raw) => match raw.trim().parse::<u16>() {
                Ok(port) => port,
                Err(_) => return Err(ConfigError::InvalidPort(raw)),
            },
            None => DEFAULT_PORT,
        };

        Ok(Self {
            api_key,
            notify_url: get("NTFY_TOPIC_URL"),
            port,
            model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            gemini_base_url: get("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            public_dir: get("PUBLIC_DIR")
                .map_or_else(|| PathBuf::from(DEFAULT_PUBLIC_DIR), PathBuf::from),
        })
    }
}
