//! Polling loop state.

/// State carried by the polling loop from one cycle to the next.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollState {
    /// `from_date` sent with the next request.
    cursor: i64,

    /// Last message successfully delivered to the user.
    last_message: Option<String>,
}

impl PollState {
    /// Creates a state polling from `cursor` with nothing sent yet.
    #[must_use]
    pub const fn new(cursor: i64) -> Self {
        Self {
            cursor,
            last_message: None,
        }
    }

    /// Current `from_date` cursor.
    #[must_use]
    pub const fn cursor(&self) -> i64 {
        self.cursor
    }

    /// Last delivered message, if any.
    #[must_use]
    pub fn last_message(&self) -> Option<&str> {
        self.last_message.as_deref()
    }

    /// Checks whether `message` differs from the last delivered one.
    #[must_use]
    pub fn is_new(&self, message: &str) -> bool {
        self.last_message.as_deref() != Some(message)
    }

    /// Records `message` as delivered.
    pub fn mark_sent(&mut self, message: impl Into<String>) {
        self.last_message = Some(message.into());
    }

    /// Moves the cursor forward to `timestamp`. Never moves it backwards.
    pub fn advance_cursor(&mut self, timestamp: i64) {
        self.cursor = self.cursor.max(timestamp);
    }
}
