//! Startup configuration
//!
//! Secrets and tunables are read once from the environment. A missing access
//! password or API key aborts startup.

use crate::llm::DEFAULT_API_URL;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const PASSWORD_VAR: &str = "INTERVIEW_PASSWORD";
pub const API_KEY_VAR: &str = "DEEPSEEK_API_KEY";

const DEFAULT_MODEL: &str = "deepseek-chat";
const DEFAULT_MAX_TOKENS: u32 = 3000;
const DEFAULT_TEMPERATURE: f32 = 0.3;
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(2 * 60 * 60);
/// Roughly 7000 tokens at four characters per token
const DEFAULT_MAX_PROMPT_CHARS: usize = 28_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("required secret {0} is not set")]
    MissingSecret(&'static str),
    #[error("{var} has an invalid value {value:?}")]
    InvalidValue { var: &'static str, value: String },
}

/// A secret that never shows up in `Debug` output or logs
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Chat model settings sent with every completion request
#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub api_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub max_prompt_chars: usize,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            max_prompt_chars: DEFAULT_MAX_PROMPT_CHARS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub access_password: Secret,
    pub api_key: Secret,
    pub model: ModelSettings,
    pub port: u16,
    pub session_ttl: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = |var: &'static str| {
            lookup(var)
                .filter(|v| !v.trim().is_empty())
                .map(Secret::new)
                .ok_or(ConfigError::MissingSecret(var))
        };

        let access_password = secret(PASSWORD_VAR)?;
        let api_key = secret(API_KEY_VAR)?;

        let defaults = ModelSettings::default();
        let model = ModelSettings {
            api_url: lookup("DEEPSEEK_API_URL").unwrap_or(defaults.api_url),
            model: lookup("INTERVIEW_MODEL").unwrap_or(defaults.model),
            max_tokens: parse_var(&lookup, "INTERVIEW_MAX_TOKENS")?.unwrap_or(defaults.max_tokens),
            temperature: parse_var(&lookup, "INTERVIEW_TEMPERATURE")?
                .unwrap_or(defaults.temperature),
            max_prompt_chars: parse_var(&lookup, "INTERVIEW_MAX_PROMPT_CHARS")?
                .unwrap_or(defaults.max_prompt_chars),
        };

        let port = parse_var(&lookup, "INTERVIEW_PORT")?.unwrap_or(DEFAULT_PORT);
        let session_ttl = parse_var::<u64, _>(&lookup, "INTERVIEW_SESSION_TTL_SECS")?
            .map_or(DEFAULT_SESSION_TTL, Duration::from_secs);

        Ok(Self {
            access_password,
            api_key,
            model,
            port,
            session_ttl,
        })
    }
}

fn parse_var<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { var, value }),
    }
}
