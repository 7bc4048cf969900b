//! Telegram Bot API client for sending notifications.

use std::time::Duration;

use async_trait::async_trait;
use teloxide::Bot;
use teloxide::RequestError;
use teloxide::requests::Requester;
use teloxide::types::{ChatId, Recipient};
use thiserror::Error;
use tracing::{debug, info};

use super::{Notifier, truncate_for_log};
use crate::config::mask_secret;

/// Errors that can occur while sending a Telegram message.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Telegram request failed: {0}")]
    Transport(String),

    #[error("Telegram rejected the message: {0}")]
    Rejected(String),

    #[error("Invalid Telegram client setup: {0}")]
    Setup(String),
}

impl NotifyError {
    /// Converts a teloxide error, masking the bot token in its text.
    fn from_request(err: &RequestError, token: &str) -> Self {
        let text = err.to_string().replace(token, &mask_secret(token));
        match err {
            RequestError::Network(_) | RequestError::Io(_) => Self::Transport(text),
            _ => Self::Rejected(text),
        }
    }
}

/// Sends messages to a single chat via the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramNotifier {
    bot: Bot,
    token: String,
    recipient: Recipient,
}

impl TelegramNotifier {
    /// Creates a notifier for `chat_id` using the bot `token`.
    ///
    /// A numeric `chat_id` addresses a chat; anything else is used as a
    /// channel username (`@channel`).
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Setup`] if the API URL is invalid or the HTTP
    /// client cannot be built.
    pub fn new(
        api_url: &str,
        token: impl Into<String>,
        chat_id: &str,
        timeout: Option<Duration>,
    ) -> Result<Self, NotifyError> {
        let token: String = token.into();

        let mut builder = teloxide::net::default_reqwest_settings();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| NotifyError::Setup(e.to_string()))?;

        let api_url = reqwest::Url::parse(api_url)
            .map_err(|e| NotifyError::Setup(format!("{api_url}: {e}")))?;

        Ok(Self {
            bot: Bot::with_client(token.clone(), client).set_api_url(api_url),
            token,
            recipient: parse_recipient(chat_id),
        })
    }

    /// Sends a text message to the configured chat.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Transport`] on network failure and
    /// [`NotifyError::Rejected`] if the Bot API does not accept the message.
    pub async fn send_message(&self, text: &str) -> Result<(), NotifyError> {
        debug!(
            "Sending message to {:?}: \"{}\"",
            self.recipient,
            truncate_for_log(text, 30)
        );

        self.bot
            .send_message(self.recipient.clone(), text)
            .await
            .map_err(|e| NotifyError::from_request(&e, &self.token))?;

        info!("Message delivered to {:?}", self.recipient);
        Ok(())
    }
}

fn parse_recipient(chat_id: &str) -> Recipient {
    chat_id.trim().parse::<i64>().map_or_else(
        |_| Recipient::ChannelUsername(chat_id.trim().to_owned()),
        |id| Recipient::Id(ChatId(id)),
    )
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        self.send_message(text).await
    }
}

impl std::fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("token", &mask_secret(&self.token))
            .field("recipient", &self.recipient)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{closed_url, serve_once};

    const SENT_REPLY: &str = r#"{
        "ok": true,
        "result": {
            "message_id": 7,
            "from": {"id": 123, "is_bot": true, "first_name": "HomeworkBot", "username": "hw_bot"},
            "chat": {"id": 4242, "first_name": "Student", "type": "private"},
            "date": 1700000000,
            "text": "Работа взята на проверку ревьюером."
        }
    }"#;

    #[tokio::test]
    async fn test_send_message_posts_chat_and_text() {
        let server = serve_once(200, SENT_REPLY).await;
        let notifier = TelegramNotifier::new(&server.url, "123:bot-token", "4242", None).unwrap();

        notifier
            .send_message("Работа взята на проверку ревьюером.")
            .await
            .unwrap();

        let request = server.request().await;
        assert!(
            request
                .to_lowercase()
                .starts_with("post /bot123:bot-token/sendmessage ")
        );
        assert!(request.contains(r#""chat_id":4242"#));
        assert!(request.contains("Работа взята на проверку ревьюером."));
    }

    #[tokio::test]
    async fn test_send_message_rejected() {
        let server = serve_once(
            400,
            r#"{"ok": false, "error_code": 400, "description": "Bad Request: chat not found"}"#,
        )
        .await;
        let notifier = TelegramNotifier::new(&server.url, "123:bot-token", "0", None).unwrap();

        match notifier.send_message("hi").await {
            Err(NotifyError::Rejected(description)) => {
                assert!(description.contains("chat not found"));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_send_message_transport_error_hides_token() {
        let notifier =
            TelegramNotifier::new(&closed_url().await, "123:very-secret", "1", None).unwrap();

        let err = notifier.send_message("hi").await.unwrap_err();
        assert!(matches!(err, NotifyError::Transport(_)));
        assert!(!err.to_string().contains("very-secret"));
    }

    #[test]
    fn test_invalid_api_url() {
        assert!(matches!(
            TelegramNotifier::new("not a url", "123:token", "1", None),
            Err(NotifyError::Setup(_))
        ));
    }

    #[test]
    fn test_parse_recipient() {
        assert_eq!(parse_recipient("-100123"), Recipient::Id(ChatId(-100_123)));
        assert_eq!(
            parse_recipient("@homework_channel"),
            Recipient::ChannelUsername("@homework_channel".to_owned())
        );
    }

    #[test]
    fn test_debug_masks_token() {
        let notifier =
            TelegramNotifier::new("https://api.telegram.org/", "123:very-secret", "1", None)
                .unwrap();
        let debug = format!("{notifier:?}");
        assert!(!debug.contains("very-secret"));
        assert!(debug.contains("***cret"));
    }
}
