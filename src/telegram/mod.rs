//! Telegram notification module.
//!
//! Delivers messages to the configured chat through the Bot API and
//! provides the best-effort send used by the polling loop.

mod client;

use async_trait::async_trait;
use tracing::{debug, error};

pub use client::{NotifyError, TelegramNotifier};

/// Something that can deliver a text message to the user.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends `text` to the configured recipient.
    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}

/// Longest text the Bot API accepts in a single message.
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Shortens `text` so it fits into a single Telegram message.
#[must_use]
pub fn fit_message(text: &str) -> String {
    if text.chars().count() <= MAX_MESSAGE_CHARS {
        text.to_owned()
    } else {
        truncate_for_log(text, MAX_MESSAGE_CHARS - 3)
    }
}

/// Result of a best-effort send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    Sent,
    Failed,
}

/// Sends `text`, logging instead of returning any failure.
pub async fn send_best_effort<N: Notifier + ?Sized>(notifier: &N, text: &str) -> NotifyOutcome {
    match notifier.send(text).await {
        Ok(()) => {
            debug!("Message sent: \"{}\"", truncate_for_log(text, 60));
            NotifyOutcome::Sent
        }
        Err(e) => {
            error!(message = %text, "Failed to send Telegram message: {}", e);
            NotifyOutcome::Failed
        }
    }
}

/// Truncates a string for logging purposes.
pub(crate) fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_owned()
    } else {
        format!("{}...", s.chars().take(max_len).collect::<String>())
    }
}
