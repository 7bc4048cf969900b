//! Credentials (token gate) and bot settings.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{DEFAULT_PRACTICUM_ENDPOINT, DEFAULT_RETRY_PERIOD_SECS, DEFAULT_TELEGRAM_API_URL};

/// Names of the secrets that must be present before the bot starts.
const REQUIRED_TOKENS: [&str; 3] = ["PRACTICUM_TOKEN", "TELEGRAM_TOKEN", "TELEGRAM_CHAT_ID"];

/// Secrets required to talk to Practicum and Telegram.
#[derive(Clone)]
pub struct Credentials {
    /// OAuth token for the Practicum API.
    pub practicum_token: String,

    /// Telegram bot token.
    pub telegram_token: String,

    /// Chat that receives every notification.
    pub telegram_chat_id: String,
}

impl Credentials {
    /// Reads credentials from the process environment.
    ///
    /// Expects `PRACTICUM_TOKEN`, `TELEGRAM_TOKEN` and `TELEGRAM_CHAT_ID`
    /// to be set and non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingTokens`] naming every absent or empty variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds credentials from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut values = Vec::with_capacity(REQUIRED_TOKENS.len());
        let mut missing = Vec::new();

        for name in REQUIRED_TOKENS {
            match lookup(name).map(|v| v.trim().to_owned()) {
                Some(value) if !value.is_empty() => values.push(value),
                _ => missing.push(name),
            }
        }

        if !missing.is_empty() {
            return Err(ConfigError::MissingTokens(missing));
        }

        let mut values = values.into_iter();
        Ok(Self {
            practicum_token: values.next().unwrap_or_default(),
            telegram_token: values.next().unwrap_or_default(),
            telegram_chat_id: values.next().unwrap_or_default(),
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("practicum_token", &mask_secret(&self.practicum_token))
            .field("telegram_token", &mask_secret(&self.telegram_token))
            .field("telegram_chat_id", &self.telegram_chat_id)
            .finish()
    }
}

/// Masks a secret for logging (shows last 4 characters).
#[must_use]
pub fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count > 4 {
        let tail: String = secret.chars().skip(count - 4).collect();
        format!("***{tail}")
    } else {
        "****".to_owned()
    }
}

/// How the `from_date` cursor moves between polling cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorPolicy {
    /// Keep the cursor at its start value for the whole process lifetime.
    #[default]
    Fixed,
    /// Move the cursor to the envelope's `current_date` after each successful cycle.
    Advance,
}

impl FromStr for CursorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fixed" => Ok(Self::Fixed),
            "advance" => Ok(Self::Advance),
            other => Err(format!("unknown cursor mode: {other}")),
        }
    }
}

/// Bot-specific settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotSettings {
    /// Practicum homework status endpoint.
    #[serde(default = "default_practicum_endpoint")]
    pub practicum_endpoint: String,

    /// Telegram Bot API base URL.
    #[serde(default = "default_telegram_api_url")]
    pub telegram_api_url: String,

    /// Delay between polling cycles in seconds.
    #[serde(default = "default_retry_period")]
    pub retry_period_secs: u64,

    /// Optional per-request timeout in seconds.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Whether a missing or non-integer `current_date` fails validation.
    #[serde(default)]
    pub require_current_date: bool,

    /// Cursor movement policy.
    #[serde(default)]
    pub cursor_policy: CursorPolicy,
}

fn default_practicum_endpoint() -> String {
    DEFAULT_PRACTICUM_ENDPOINT.to_owned()
}

fn default_telegram_api_url() -> String {
    DEFAULT_TELEGRAM_API_URL.to_owned()
}

fn default_retry_period() -> u64 {
    DEFAULT_RETRY_PERIOD_SECS
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            practicum_endpoint: default_practicum_endpoint(),
            telegram_api_url: default_telegram_api_url(),
            retry_period_secs: default_retry_period(),
            request_timeout_secs: None,
            require_current_date: false,
            cursor_policy: CursorPolicy::default(),
        }
    }
}

impl BotSettings {
    /// Creates bot settings from environment variables with defaults.
    #[must_use]
    pub fn from_env_with_defaults() -> Self {
        Self::from_lookup_with_defaults(|name| std::env::var(name).ok())
    }

    /// Creates bot settings from an arbitrary variable lookup, falling back
    /// to defaults for absent or unparseable values.
    #[must_use]
    pub fn from_lookup_with_defaults<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            practicum_endpoint: lookup("PRACTICUM_ENDPOINT")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(default_practicum_endpoint),
            telegram_api_url: lookup("TELEGRAM_API_URL")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(default_telegram_api_url),
            retry_period_secs: lookup("RETRY_PERIOD")
                .and_then(|s| s.trim().parse().ok())
                .filter(|&secs: &u64| secs > 0)
                .unwrap_or_else(default_retry_period),
            request_timeout_secs: lookup("REQUEST_TIMEOUT").and_then(|s| s.trim().parse().ok()),
            require_current_date: lookup("REQUIRE_CURRENT_DATE")
                .and_then(|s| parse_flag(&s))
                .unwrap_or(false),
            cursor_policy: lookup("CURSOR_MODE")
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
        }
    }

    /// Delay between polling cycles.
    #[must_use]
    pub const fn retry_period(&self) -> Duration {
        Duration::from_secs(self.retry_period_secs)
    }

    /// Per-request timeout, if configured.
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingTokens(Vec<&'static str>),
}
