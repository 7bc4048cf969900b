//! Homework status polling loop.
//!
//! Each cycle follows the same steps:
//! 1. Fetch statuses newer than the cursor
//! 2. Check the envelope shape
//! 3. If there are records, build a message from the first one
//! 4. Send it unless it equals the last delivered message
//! 5. Sleep for the retry period
//!
//! Any failure in steps 1-3 is turned into a diagnostic message that goes
//! through the same send path. The full diagnostic is logged; the chat gets
//! it cut to the Telegram message limit. Nothing except a startup error stops the loop.

use std::time::Duration;

use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use super::PollState;
use crate::config::{BotSettings, CursorPolicy};
use crate::homework::{ParseError, ShapeError, ValidationOptions, parse_status, validate_response};
use crate::practicum::{ApiError, StatusSource};
use crate::telegram::{Notifier, NotifyOutcome, fit_message, send_best_effort};

/// Anything that can go wrong inside a single polling cycle.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// What a single cycle ended with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A new status message was delivered.
    Notified(String),
    /// The status message equals the last delivered one.
    Unchanged,
    /// The API returned no records.
    NothingNew,
    /// A status message was built but could not be delivered.
    NotifyFailed(String),
    /// The cycle failed; carries the diagnostic text sent to the user.
    Failed(String),
}

/// Polls a [`StatusSource`] and reports changes through a [`Notifier`].
pub struct HomeworkPoller<S, N> {
    source: S,
    notifier: N,
    state: PollState,
    validation: ValidationOptions,
    cursor_policy: CursorPolicy,
    retry_period: Duration,
}

impl<S: StatusSource, N: Notifier> HomeworkPoller<S, N> {
    /// Creates a poller starting from `cursor`.
    #[must_use]
    pub fn new(source: S, notifier: N, settings: &BotSettings, cursor: i64) -> Self {
        Self {
            source,
            notifier,
            state: PollState::new(cursor),
            validation: ValidationOptions {
                require_current_date: settings.require_current_date,
            },
            cursor_policy: settings.cursor_policy,
            retry_period: settings.retry_period(),
        }
    }

    /// Sets the delay between cycles.
    #[must_use]
    pub const fn with_retry_period(mut self, period: Duration) -> Self {
        self.retry_period = period;
        self
    }

    /// Runs the polling loop forever.
    pub async fn run(&mut self) {
        info!(
            "Homework poller started (cursor: {}, retry period: {:?})",
            self.state.cursor(),
            self.retry_period
        );

        loop {
            let outcome = self.run_cycle().await;
            debug!(?outcome, "Cycle finished, next poll in {:?}", self.retry_period);
            sleep(self.retry_period).await;
        }
    }

    /// Runs a single polling cycle without sleeping.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        match self.poll().await {
            Ok((None, current_date)) => {
                debug!("No homework status updates");
                self.move_cursor(current_date);
                CycleOutcome::NothingNew
            }
            Ok((Some(message), current_date)) => {
                let message = fit_message(&message);
                if !self.state.is_new(&message) {
                    debug!("Status unchanged, not notifying");
                    self.move_cursor(current_date);
                    return CycleOutcome::Unchanged;
                }

                info!("Homework status changed: {}", message);
                match self.deliver(&message).await {
                    NotifyOutcome::Sent => {
                        self.move_cursor(current_date);
                        CycleOutcome::Notified(message)
                    }
                    NotifyOutcome::Failed => CycleOutcome::NotifyFailed(message),
                }
            }
            Err(e) => {
                let diagnostic = format!("Сбой в работе программы: {e}");
                error!("{}", diagnostic);
                let message = fit_message(&diagnostic);
                if self.state.is_new(&message) {
                    self.deliver(&message).await;
                } else {
                    debug!("Same failure already reported, not notifying");
                }
                CycleOutcome::Failed(message)
            }
        }
    }

    /// Fetches, validates and parses. Returns the message (if any records
    /// were returned) and the envelope's `current_date`.
    async fn poll(&self) -> Result<(Option<String>, Option<i64>), CycleError> {
        let payload = self.source.fetch(self.state.cursor()).await?;
        let batch = validate_response(&payload, self.validation)?;
        debug!("Received {} homework record(s)", batch.len());

        let message = batch.latest().map(parse_status).transpose()?;
        Ok((message, batch.current_date))
    }

    async fn deliver(&mut self, message: &str) -> NotifyOutcome {
        let outcome = send_best_effort(&self.notifier, message).await;
        if outcome == NotifyOutcome::Sent {
            self.state.mark_sent(message);
        } else {
            warn!("Message will be retried on the next cycle");
        }
        outcome
    }

    fn move_cursor(&mut self, current_date: Option<i64>) {
        if self.cursor_policy == CursorPolicy::Advance
            && let Some(timestamp) = current_date
        {
            self.state.advance_cursor(timestamp);
            debug!("Cursor advanced to {}", self.state.cursor());
        }
    }

    /// Gets a reference to the polling state.
    #[must_use]
    pub fn state(&self) -> &PollState {
        &self.state
    }

    /// Gets a reference to the status source.
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Gets a reference to the notifier.
    #[must_use]
    pub fn notifier(&self) -> &N {
        &self.notifier
    }
}

impl<S, N> std::fmt::Debug for HomeworkPoller<S, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HomeworkPoller")
            .field("state", &self.state)
            .field("cursor_policy", &self.cursor_policy)
            .field("retry_period", &self.retry_period)
            .finish_non_exhaustive()
    }
}
