//! Configuration module for the homework bot.
//!
//! Handles loading and validation of the secrets the bot needs to run
//! (the token gate) and the non-secret polling settings.

mod settings;

pub use settings::{BotSettings, ConfigError, Credentials, CursorPolicy, mask_secret};

/// Default Practicum homework status endpoint.
pub const DEFAULT_PRACTICUM_ENDPOINT: &str =
    "https://practicum.yandex.ru/api/user_api/homework_statuses/";

/// Default Telegram Bot API base URL.
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Default delay between polling cycles in seconds.
pub const DEFAULT_RETRY_PERIOD_SECS: u64 = 600;
