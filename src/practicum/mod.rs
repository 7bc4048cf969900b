//! Practicum homework status API.
//!
//! Fetches the raw status payload for a `from_date` cursor. Shape checks
//! live in [`crate::homework`].

mod client;

use async_trait::async_trait;
use serde_json::Value;

pub use client::{ApiError, PracticumClient};

/// Something that can fetch homework statuses newer than a cursor.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Fetches the decoded JSON payload for statuses updated since `cursor`.
    async fn fetch(&self, cursor: i64) -> Result<Value, ApiError>;
}
